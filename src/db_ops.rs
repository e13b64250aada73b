use super::models::{ListingDraft, Property, Role, User};
use anyhow::Result;
use sqlx::{
    query, query_as, query_scalar,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;

/// Column list for `select`s that map into [`Property`]
pub const PROPERTY_COLUMNS: &str = "id, title, description, location, \
    property_type, sale_or_rent, price, rent, area, rooms, contact, \
    image_filename, gmap_link, owner_id";

const USER_COLUMNS: &str = "id, name, email, role";

/// Open (creating if needed) the database and bring the schema up to date.
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(8)
        .connect_with(opts)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

pub async fn get_user(db: &SqlitePool, id: i64) -> Result<Option<User>> {
    Ok(
        query_as::<_, User>(&format!(
            "select {USER_COLUMNS} from users where id = ?"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?,
    )
}

/// `email` is compared case-insensitively by the column's collation.
pub async fn get_user_by_email(
    db: &SqlitePool,
    email: &str,
) -> Result<Option<User>> {
    Ok(
        query_as::<_, User>(&format!(
            "select {USER_COLUMNS} from users where email = ?"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?,
    )
}

pub async fn get_password_hash(db: &SqlitePool, user_id: i64) -> Result<String> {
    Ok(
        query_scalar("select password_hash from users where id = ?")
            .bind(user_id)
            .fetch_one(db)
            .await?,
    )
}

/// Fails with the underlying `sqlx::Error` (wrapped in anyhow) when the email
/// is already taken; callers can downcast to tell that apart.
pub async fn insert_user(
    db: &SqlitePool,
    name: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<User> {
    let id = query(
        "insert into users (name, email, password_hash, role)
        values (?, ?, ?, ?)",
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role.as_str())
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
        role,
    })
}

pub async fn count_users(db: &SqlitePool) -> Result<i64> {
    Ok(query_scalar("select count(*) from users").fetch_one(db).await?)
}

pub async fn get_property(db: &SqlitePool, id: i64) -> Result<Option<Property>> {
    Ok(query_as::<_, Property>(&format!(
        "select {PROPERTY_COLUMNS} from property where id = ?"
    ))
    .bind(id)
    .fetch_optional(db)
    .await?)
}

pub async fn latest_properties(
    db: &SqlitePool,
    limit: i64,
) -> Result<Vec<Property>> {
    Ok(query_as::<_, Property>(&format!(
        "select {PROPERTY_COLUMNS} from property order by id desc limit ?"
    ))
    .bind(limit)
    .fetch_all(db)
    .await?)
}

pub async fn insert_property(
    db: &SqlitePool,
    owner_id: i64,
    draft: ListingDraft,
    gmap_link: String,
    image_filename: Option<String>,
) -> Result<Property> {
    let id = query(
        "
        insert into property (
            title, description, location, property_type, sale_or_rent,
            price, rent, area, rooms, contact, image_filename, gmap_link,
            owner_id
        ) values (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ",
    )
    .bind(&draft.title)
    .bind(draft.description.as_deref())
    .bind(&draft.location)
    .bind(draft.property_type.as_str())
    .bind(draft.sale_or_rent.as_str())
    .bind(draft.price)
    .bind(draft.rent)
    .bind(draft.area)
    .bind(draft.rooms)
    .bind(&draft.contact)
    .bind(image_filename.as_deref())
    .bind(&gmap_link)
    .bind(owner_id)
    .execute(db)
    .await?
    .last_insert_rowid();

    Ok(Property {
        id,
        title: draft.title,
        description: draft.description,
        location: draft.location,
        property_type: draft.property_type,
        sale_or_rent: draft.sale_or_rent,
        price: draft.price,
        rent: draft.rent,
        area: draft.area,
        rooms: draft.rooms,
        contact: draft.contact,
        image_filename,
        gmap_link,
        owner_id,
    })
}

/// Overwrites every column except `owner_id`, which never changes.
pub async fn update_property(db: &SqlitePool, p: &Property) -> Result<()> {
    query(
        "
        update property
        set
            title = ?,
            description = ?,
            location = ?,
            property_type = ?,
            sale_or_rent = ?,
            price = ?,
            rent = ?,
            area = ?,
            rooms = ?,
            contact = ?,
            image_filename = ?,
            gmap_link = ?
        where id = ?
        ",
    )
    .bind(&p.title)
    .bind(p.description.as_deref())
    .bind(&p.location)
    .bind(p.property_type.as_str())
    .bind(p.sale_or_rent.as_str())
    .bind(p.price)
    .bind(p.rent)
    .bind(p.area)
    .bind(p.rooms)
    .bind(&p.contact)
    .bind(p.image_filename.as_deref())
    .bind(&p.gmap_link)
    .bind(p.id)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn delete_property(db: &SqlitePool, id: i64) -> Result<()> {
    query("delete from property where id = ?")
        .bind(id)
        .execute(db)
        .await?;

    Ok(())
}
