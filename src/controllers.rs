use super::{
    auth, components,
    config::LATEST_LISTINGS,
    db_ops,
    errors::AppError,
    extractors::{AuthenticatedUser, Viewer},
    filter,
    flash::{self, Flash, Level},
    listings::{self, ListingForm, Upload},
    models::AppState,
    session,
};
use anyhow::Context;
use axum::{
    extract::{multipart::MultipartError, Multipart, Path, Query, State},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use std::io::ErrorKind;

/// Form-owning handlers send validation problems back to the form as a
/// flash notice instead of an error page.
fn back_to_form(to: &str, err: AppError) -> Response {
    match err {
        AppError::Validation(msg) => {
            flash::redirect(to, Some(Flash::new(Level::Danger, &msg)))
        }
        AppError::Conflict(msg) => {
            flash::redirect(to, Some(Flash::new(Level::Warning, &msg)))
        }
        other => other.into_response(),
    }
}

pub async fn root(
    State(state): State<AppState>,
    viewer: Viewer,
) -> Result<Response, AppError> {
    let latest = db_ops::latest_properties(&state.db, LATEST_LISTINGS).await?;
    Ok(viewer.page("Listings", Box::new(components::Home { latest: &latest })))
}

pub async fn list_properties(
    State(state): State<AppState>,
    viewer: Viewer,
    Query(params): Query<filter::models::SearchParams>,
) -> Result<Response, AppError> {
    let query = filter::models::ListingFilter::from(&params);
    tracing::debug!(?query, "searching listings");
    let properties = filter::db_ops::search(&state.db, &query).await?;

    Ok(viewer.page(
        "Browse listings",
        Box::new(filter::components::SearchResults {
            params: &params,
            properties: &properties,
        }),
    ))
}

pub async fn property_detail(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let property = listings::get_listing(&state.db, id).await?;
    let is_owner = viewer.user.as_ref().map(|u| u.id) == Some(property.owner_id);

    Ok(viewer.page(
        &property.title,
        Box::new(components::PropertyDetail {
            property: &property,
            is_owner,
        }),
    ))
}

pub async fn get_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let bytes = match state.media.read(&filename).await {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::NotFound)
        }
        Err(e) => return Err(e.into()),
    };
    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref()).context("mime is a valid header")?,
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    // Only raster images render inline; anything able to carry script is
    // served as a download.
    if !is_inline_image(&mime) {
        headers.insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment"),
        );
    }

    Ok((headers, bytes).into_response())
}

fn is_inline_image(m: &mime_guess::Mime) -> bool {
    m.type_() == mime_guess::mime::IMAGE && m.subtype() != mime_guess::mime::SVG
}

pub async fn register_form(viewer: Viewer) -> Response {
    viewer.page("Register", Box::new(components::RegisterForm))
}

#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    role: String,
}

pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = auth::Registration {
        name: &form.name,
        email: &form.email,
        password: &form.password,
        role: &form.role,
    };
    match auth::register(&state.db, registration).await {
        Ok(_) => flash::redirect(
            "/login",
            Some(Flash::new(
                Level::Success,
                "Registration successful. Please log in.",
            )),
        ),
        Err(e) => back_to_form("/register", e),
    }
}

pub async fn login_form(viewer: Viewer) -> Response {
    viewer.page("Log in", Box::new(components::LoginForm))
}

#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let session = auth::authenticate(&state.db, &form.email, &form.password).await?;
    let token = session::serialize_session(&state.config.session_secret, &session)?;
    tracing::info!(user_id = session.user_id, "logged in");

    let mut response =
        flash::redirect("/", Some(Flash::new(Level::Success, "Logged in.")));
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&session::session_cookie(&token))
            .context("session token is a valid header value")?,
    );
    Ok(response)
}

pub async fn logout() -> Result<Response, AppError> {
    let mut response =
        flash::redirect("/", Some(Flash::new(Level::Info, "Logged out.")));
    response.headers_mut().append(
        header::SET_COOKIE,
        HeaderValue::from_str(&session::expired_session_cookie())
            .context("expired cookie is a valid header value")?,
    );
    Ok(response)
}

fn upload_error(e: MultipartError) -> AppError {
    AppError::Upload(e.body_text())
}

/// Text fields go into the form; the `image` file field becomes the upload.
async fn read_listing_form(
    mut multipart: Multipart,
) -> Result<(ListingForm, Option<Upload>), AppError> {
    let mut form = ListingForm::default();
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "image" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.map_err(upload_error)?;
            image = Some(Upload {
                file_name,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(upload_error)?;
            form.set(&name, value);
        }
    }
    Ok((form, image))
}

pub async fn add_form(viewer: Viewer) -> Result<Response, AppError> {
    viewer.require()?;
    Ok(viewer.page(
        "Add listing",
        Box::new(components::PropertyForm { property: None }),
    ))
}

pub async fn add_property(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, image) = read_listing_form(multipart).await?;
    Ok(
        match listings::create_listing(&state.db, &state.media, &user, &form, image)
            .await
        {
            Ok(_) => flash::redirect(
                "/properties",
                Some(Flash::new(Level::Success, "Property added!")),
            ),
            Err(e) => back_to_form("/add", e),
        },
    )
}

pub async fn edit_form(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let user = viewer.require()?;
    let property = listings::get_owned(&state.db, user, id).await?;
    Ok(viewer.page(
        "Edit listing",
        Box::new(components::PropertyForm {
            property: Some(&property),
        }),
    ))
}

pub async fn edit_property(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let (form, image) = read_listing_form(multipart).await?;
    Ok(
        match listings::edit_listing(
            &state.db,
            &state.media,
            &user,
            id,
            &form,
            image,
        )
        .await
        {
            Ok(p) => flash::redirect(
                &format!("/property/{}", p.id),
                Some(Flash::new(Level::Success, "Property updated!")),
            ),
            Err(e) => back_to_form(&format!("/edit/{id}"), e),
        },
    )
}

pub async fn delete_property(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    listings::delete_listing(&state.db, &state.media, &user, id).await?;
    Ok(flash::redirect(
        "/properties",
        Some(Flash::new(Level::Danger, "Property deleted.")),
    ))
}
