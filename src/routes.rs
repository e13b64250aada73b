use super::{config::UPLOAD_MAX_BYTES, controllers, middleware, models};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post, Router},
};
use tower_http::trace::TraceLayer;

#[rustfmt::skip]
pub fn get_routes() -> Router<models::AppState> {
    Router::new()
        .route("/", get(controllers::root))
        .route("/properties", get(controllers::list_properties))
        .route("/property/:id", get(controllers::property_detail))
        .route("/uploads/:filename", get(controllers::get_upload))
        .route("/register", get(controllers::register_form).post(controllers::register))
        .route("/login", get(controllers::login_form).post(controllers::login))
        .route("/logout", get(controllers::logout))
        .route("/add", get(controllers::add_form).post(controllers::add_property))
        .route("/edit/:id", get(controllers::edit_form).post(controllers::edit_property))
        .route("/delete/:id", post(controllers::delete_property))
}

/// The full application, ready to serve.
pub fn app(state: models::AppState) -> Router {
    get_routes()
        .layer(DefaultBodyLimit::max(UPLOAD_MAX_BYTES))
        .layer(from_fn(middleware::html_headers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
