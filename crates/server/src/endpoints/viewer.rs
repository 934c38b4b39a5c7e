//! # GET /v/{id}
//!
//! 動画を全画面背景として再生するビューアページ。

use axum::extract::rejection::PathRejection;
use axum::extract::Path;
use axum::response::Html;
use backdrop_types::UploadId;

use crate::error::AppError;
use crate::pages;

/// GET /v/{id} — ビューアページを返す。
///
/// ストレージには問い合わせない。実際の取得はブラウザが `/raw/{id}` に対して行う。
pub async fn handle_viewer(
    path: Result<Path<String>, PathRejection>,
) -> Result<Html<String>, AppError> {
    let Path(raw_id) = path.map_err(|_| AppError::InvalidId)?;
    let id = UploadId::parse(&raw_id).map_err(|_| AppError::InvalidId)?;
    Ok(Html(pages::viewer_page(&id)))
}
