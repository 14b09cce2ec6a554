use axum::{response::Html, routing::get, Router};

const SETUP_PAGE: &str = include_str!("../../static/setup.html");

/// Static progress viewer; all data is pulled by the page from `/api/setup/*`
pub fn viewer_routes() -> Router {
    Router::new().route("/setup", get(setup_page))
}

async fn setup_page() -> Html<&'static str> {
    Html(SETUP_PAGE)
}
