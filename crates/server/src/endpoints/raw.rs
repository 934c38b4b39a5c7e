//! # GET /raw/{id}
//!
//! 署名付きURLへのリダイレクトによる動画再生。

use std::sync::Arc;

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use backdrop_types::UploadId;

use crate::config::AppState;
use crate::error::AppError;

/// 再生用署名付きURLの有効期限（秒）
pub const PLAYBACK_URL_EXPIRY_SECS: u32 = 600;

/// GET /raw/{id} — 署名付きURLを発行して302でリダイレクトする。
///
/// ストレージ側の失敗は原因を問わず404に集約し、詳細はログにのみ残す。
pub async fn handle_raw(
    State(state): State<Arc<AppState>>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    // UTF-8として解釈できないパスも形式不正として扱う
    let Path(raw_id) = path.map_err(|_| AppError::InvalidId)?;
    let id = UploadId::parse(&raw_id).map_err(|_| AppError::InvalidId)?;

    let signed_url = state
        .store
        .sign(&id.object_key(), PLAYBACK_URL_EXPIRY_SECS)
        .await
        .map_err(|e| {
            tracing::warn!(upload_id = %id, error = %e, "署名付きURLの生成に失敗");
            AppError::NotFound
        })?;

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, signed_url),
            (header::CACHE_CONTROL, "no-store".to_string()),
        ],
    )
        .into_response())
}
