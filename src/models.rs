use super::{config::Config, media::MediaStore};
use sqlx::{sqlite::SqliteRow, FromRow, Row, SqlitePool};
use std::{str::FromStr, sync::Arc};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppState {
    pub db: SqlitePool,
    pub media: MediaStore,
    pub config: Arc<Config>,
}

#[derive(Error, Debug)]
#[error("{value:?} is not a valid {kind}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    #[default]
    Owner,
    Customer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Customer => "customer",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "customer" => Ok(Self::Customer),
            _ => Err(ParseEnumError::new("role", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyType {
    Land,
    House,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::House => "house",
        }
    }
}

impl FromStr for PropertyType {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "land" => Ok(Self::Land),
            "house" => Ok(Self::House),
            _ => Err(ParseEnumError::new("property type", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaleOrRent {
    Sale,
    Rent,
}

impl SaleOrRent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sale => "sale",
            Self::Rent => "rent",
        }
    }
}

impl FromStr for SaleOrRent {
    type Err = ParseEnumError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(Self::Sale),
            "rent" => Ok(Self::Rent),
            _ => Err(ParseEnumError::new("listing mode", s)),
        }
    }
}

fn decode_enum<T>(row: &SqliteRow, col: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = ParseEnumError>,
{
    let raw: String = row.try_get(col)?;
    raw.parse().map_err(|e| sqlx::Error::ColumnDecode {
        index: col.to_string(),
        source: Box::new(e),
    })
}

/// The password digest is left out; only `auth::authenticate` reads it.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl<'r> FromRow<'r, SqliteRow> for User {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            role: decode_enum(row, "role")?,
        })
    }
}

/// A listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub property_type: PropertyType,
    pub sale_or_rent: SaleOrRent,
    pub price: Option<f64>,
    pub rent: Option<f64>,
    pub area: Option<f64>,
    pub rooms: Option<i64>,
    pub contact: String,
    pub image_filename: Option<String>,
    pub gmap_link: String,
    pub owner_id: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Property {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            property_type: decode_enum(row, "property_type")?,
            sale_or_rent: decode_enum(row, "sale_or_rent")?,
            price: row.try_get("price")?,
            rent: row.try_get("rent")?,
            area: row.try_get("area")?,
            rooms: row.try_get("rooms")?,
            contact: row.try_get("contact")?,
            image_filename: row.try_get("image_filename")?,
            gmap_link: row.try_get("gmap_link")?,
            owner_id: row.try_get("owner_id")?,
        })
    }
}

/// Every writable listing field, already validated. Create and edit both
/// take one of these; edit replaces every field with it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub property_type: PropertyType,
    pub sale_or_rent: SaleOrRent,
    pub price: Option<f64>,
    pub rent: Option<f64>,
    pub area: Option<f64>,
    pub rooms: Option<i64>,
    pub contact: String,
    /// Blank means "synthesize one from `location`"
    pub gmap_link: Option<String>,
}
