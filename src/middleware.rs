use axum::{
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Handlers hand back plain `String`s, which axum labels `text/plain`; the
/// browser should treat those as HTML. Anything else, including uploads
/// served as bare `text/plain`, is left alone.
pub async fn html_headers<B>(request: Request<B>, next: Next<B>) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    let is_plain = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(true, |v| v == "text/plain; charset=utf-8");
    if is_plain {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        );
    }

    response
}
