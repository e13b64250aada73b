//! Listing search. The `/properties` query string is parsed leniently into a
//! [`models::ListingFilter`], which `db_ops::search` turns into one `select`
//! whose conditions are all joined with `and`.

pub mod components;
pub mod db_ops;
pub mod models;
