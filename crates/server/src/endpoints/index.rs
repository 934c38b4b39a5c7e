//! # GET /
//!
//! アップロードUI。

use axum::http::header;
use axum::response::{Html, IntoResponse};

use crate::pages;

/// GET / — アップロードUIを返す。キャッシュさせない。
pub async fn handle_index() -> impl IntoResponse {
    ([(header::CACHE_CONTROL, "no-store")], Html(pages::INDEX_HTML))
}

/// GET /healthz — 死活監視用。
pub async fn handle_health() -> &'static str {
    "ok"
}
