//! Creating, editing and deleting listings. The caller has already been
//! resolved at the request boundary and is passed in explicitly; only the
//! owner of a listing may change or remove it.
//!
//! Any authenticated user may create a listing, whatever their role.

use super::{
    db_ops,
    errors::AppError,
    media::MediaStore,
    models::{ListingDraft, Property, User},
};
use sqlx::SqlitePool;
use std::str::FromStr;

const GMAPS_SEARCH: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Listing fields exactly as they were submitted.
#[derive(Debug, Default, Clone)]
pub struct ListingForm {
    pub title: String,
    pub description: String,
    pub location: String,
    pub property_type: String,
    pub sale_or_rent: String,
    pub price: String,
    pub rent: String,
    pub area: String,
    pub rooms: String,
    pub contact: String,
    pub gmap_link: String,
}

/// An uploaded file as received. An empty `file_name` means the form's file
/// input was left empty.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ListingForm {
    /// Assign a form field by its input name; unknown names are ignored.
    pub fn set(&mut self, field: &str, value: String) {
        let slot = match field {
            "title" => &mut self.title,
            "description" => &mut self.description,
            "location" => &mut self.location,
            "property_type" => &mut self.property_type,
            "sale_or_rent" => &mut self.sale_or_rent,
            "price" => &mut self.price,
            "rent" => &mut self.rent,
            "area" => &mut self.area,
            "rooms" => &mut self.rooms,
            "contact" => &mut self.contact,
            "gmap_link" => &mut self.gmap_link,
            _ => return,
        };
        *slot = value;
    }

    pub fn validate(&self) -> Result<ListingDraft, AppError> {
        Ok(ListingDraft {
            title: required("Title", &self.title)?,
            description: optional_text(&self.description),
            location: required("Location", &self.location)?,
            property_type: choice("Property type", &self.property_type)?,
            sale_or_rent: choice("Sale or rent", &self.sale_or_rent)?,
            price: amount("Price", &self.price)?,
            rent: amount("Rent", &self.rent)?,
            area: amount("Area", &self.area)?,
            rooms: count("Rooms", &self.rooms)?,
            contact: required("Contact", &self.contact)?,
            gmap_link: optional_text(&self.gmap_link),
        })
    }
}

fn invalid(msg: String) -> AppError {
    AppError::Validation(msg)
}

fn required(label: &str, v: &str) -> Result<String, AppError> {
    let v = v.trim();
    if v.is_empty() {
        Err(invalid(format!("{label} is required.")))
    } else {
        Ok(v.to_string())
    }
}

fn optional_text(v: &str) -> Option<String> {
    let v = v.trim();
    (!v.is_empty()).then(|| v.to_string())
}

fn choice<T: FromStr>(label: &str, v: &str) -> Result<T, AppError> {
    v.trim()
        .parse()
        .map_err(|_| invalid(format!("{label} is not one of the choices.")))
}

fn amount(label: &str, v: &str) -> Result<Option<f64>, AppError> {
    let v = v.trim();
    if v.is_empty() {
        return Ok(None);
    }
    match v.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => Ok(Some(n)),
        _ => Err(invalid(format!("{label} must be a non-negative number."))),
    }
}

fn count(label: &str, v: &str) -> Result<Option<i64>, AppError> {
    let v = v.trim();
    if v.is_empty() {
        return Ok(None);
    }
    match v.parse::<i64>() {
        Ok(n) if n >= 0 => Ok(Some(n)),
        _ => Err(invalid(format!("{label} must be a non-negative whole number."))),
    }
}

/// A maps search for `location`, used whenever no link was given.
pub fn gmaps_link(location: &str) -> String {
    format!("{GMAPS_SEARCH}{}", urlencoding::encode(location))
}

async fn store_image(
    media: &MediaStore,
    image: Option<Upload>,
) -> Result<Option<String>, AppError> {
    match image {
        Some(upload) if !upload.file_name.trim().is_empty() => {
            let name = media.store(&upload.bytes, &upload.file_name).await?;
            Ok(Some(name))
        }
        _ => Ok(None),
    }
}

pub async fn get_listing(db: &SqlitePool, id: i64) -> Result<Property, AppError> {
    db_ops::get_property(db, id).await?.ok_or(AppError::NotFound)
}

/// The listing, provided it exists and `caller` owns it.
pub async fn get_owned(
    db: &SqlitePool,
    caller: &User,
    id: i64,
) -> Result<Property, AppError> {
    let property = get_listing(db, id).await?;
    if property.owner_id != caller.id {
        tracing::warn!(
            listing = id,
            owner = property.owner_id,
            caller = caller.id,
            "refusing change to listing owned by someone else"
        );
        return Err(AppError::Forbidden);
    }
    Ok(property)
}

pub async fn create_listing(
    db: &SqlitePool,
    media: &MediaStore,
    caller: &User,
    form: &ListingForm,
    image: Option<Upload>,
) -> Result<Property, AppError> {
    let draft = form.validate()?;
    let gmap_link = draft
        .gmap_link
        .clone()
        .unwrap_or_else(|| gmaps_link(&draft.location));
    // A failed insert after this leaves the image orphaned on disk.
    let image_filename = store_image(media, image).await?;

    let property =
        db_ops::insert_property(db, caller.id, draft, gmap_link, image_filename)
            .await?;
    tracing::info!(listing = property.id, owner = caller.id, "listing created");

    Ok(property)
}

/// Replaces every field. A new image replaces the reference, but the file
/// of the previous image stays in the media store.
pub async fn edit_listing(
    db: &SqlitePool,
    media: &MediaStore,
    caller: &User,
    id: i64,
    form: &ListingForm,
    image: Option<Upload>,
) -> Result<Property, AppError> {
    let mut property = get_owned(db, caller, id).await?;
    let draft = form.validate()?;

    property.gmap_link = draft
        .gmap_link
        .unwrap_or_else(|| gmaps_link(&draft.location));
    property.title = draft.title;
    property.description = draft.description;
    property.location = draft.location;
    property.property_type = draft.property_type;
    property.sale_or_rent = draft.sale_or_rent;
    property.price = draft.price;
    property.rent = draft.rent;
    property.area = draft.area;
    property.rooms = draft.rooms;
    property.contact = draft.contact;
    if let Some(name) = store_image(media, image).await? {
        property.image_filename = Some(name);
    }

    db_ops::update_property(db, &property).await?;
    tracing::info!(listing = id, "listing updated");

    Ok(property)
}

/// Removing the image file is best-effort; the row is deleted regardless.
pub async fn delete_listing(
    db: &SqlitePool,
    media: &MediaStore,
    caller: &User,
    id: i64,
) -> Result<(), AppError> {
    let property = get_owned(db, caller, id).await?;
    if let Some(name) = &property.image_filename {
        if let Err(e) = media.remove(name).await {
            tracing::warn!(listing = id, image = %name, error = %e, "could not remove image");
        }
    }
    db_ops::delete_property(db, id).await?;
    tracing::info!(listing = id, "listing deleted");

    Ok(())
}
