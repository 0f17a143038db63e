//! The single-page dashboard.
//!
//! The page re-queries the JSON API whenever a sidebar input changes, so every
//! interaction recomputes the selected view from the loaded records.

use axum::response::Html;

const DASHBOARD_HTML: &str = include_str!("../assets/dashboard.html");

pub async fn dashboard() -> Html<&'static str> {
    Html(DASHBOARD_HTML)
}
