//! Fixtures shared by the unit tests: every test gets its own database file
//! and upload folder inside a temp dir that lives as long as the returned
//! guard.

use super::{
    config::Config,
    db_ops,
    media::MediaStore,
    models::{AppState, ListingDraft, PropertyType, Role, SaleOrRent, User},
    pw,
};
use sqlx::SqlitePool;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_SECRET: &[u8] = b"test-secret";
pub const TEST_PASSWORD: &str = "hunter2";

pub async fn test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("test.db");
    let config = Config {
        database_url: format!("sqlite://{}", db_path.display()),
        upload_dir: dir.path().join("uploads"),
        session_secret: TEST_SECRET.to_vec(),
        bind_addr: "127.0.0.1:0".parse().expect("addr"),
        session_ttl_secs: 3600,
    };
    let db = db_ops::connect(&config.database_url).await.expect("db");
    let media = MediaStore::new(&config.upload_dir);
    media.ensure_dir().await.expect("upload dir");

    (
        AppState {
            db,
            media,
            config: Arc::new(config),
        },
        dir,
    )
}

pub async fn make_user(db: &SqlitePool, email: &str) -> User {
    db_ops::insert_user(db, "Test", email, &pw::hash(TEST_PASSWORD), Role::Owner)
        .await
        .expect("insert user")
}

pub fn draft(title: &str, location: &str) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        description: None,
        location: location.to_string(),
        property_type: PropertyType::Land,
        sale_or_rent: SaleOrRent::Sale,
        price: None,
        rent: None,
        area: None,
        rooms: None,
        contact: "555-0100".to_string(),
        gmap_link: None,
    }
}
