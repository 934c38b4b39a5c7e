//! # POST /upload
//!
//! 動画のアップロードとビューアURL発行。

use std::sync::Arc;

use axum::extract::multipart::{Field, MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use backdrop_types::{UploadId, UploadResponse, VIDEO_CONTENT_TYPE};
use chrono::{SecondsFormat, Utc};

use crate::config::AppState;
use crate::error::AppError;
use crate::storage::ObjectMetadata;

/// ファイルを受け取るmultipartフィールド名
pub const FILE_FIELD: &str = "file";

/// メタデータに保存する元ファイル名の最大文字数
pub const MAX_ORIGINAL_NAME_CHARS: usize = 200;

/// 書き込み後に変更されないオブジェクト向けのCache-Control
pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// ファイル名が無い場合の既定値
const FALLBACK_FILENAME: &str = "video.mp4";

/// 受信済みの動画ファイル。
struct VideoFile {
    filename: String,
    data: Vec<u8>,
}

/// POST /upload — 動画を保存し、ビューアURLを返す。
///
/// 検証は先頭から順に行い、最初の失敗を返す:
/// 1. `file` フィールドが1つだけ存在すること
/// 2. コンテンツタイプが video/mp4 であること（本体の読み込み前に判定）
/// 3. 本体サイズが上限以内であること
pub async fn handle_upload(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    // multipart以外のリクエストもJSONのエラーボディで返す
    let mut multipart = multipart.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let file = read_video_file(&mut multipart, state.config.max_upload_bytes).await?;

    let id = UploadId::generate();
    let key = id.object_key();

    let mut metadata = ObjectMetadata::new();
    metadata.insert(
        "originalname".to_string(),
        truncate_chars(&file.filename, MAX_ORIGINAL_NAME_CHARS),
    );
    metadata.insert(
        "uploadedat".to_string(),
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    );

    state
        .store
        .put(
            &key,
            &file.data,
            VIDEO_CONTENT_TYPE,
            IMMUTABLE_CACHE_CONTROL,
            &metadata,
        )
        .await
        .map_err(|e| {
            tracing::error!(upload_id = %id, error = %e, "動画の保存に失敗");
            AppError::Storage(e.to_string())
        })?;

    tracing::info!(
        upload_id = %id,
        size = file.data.len(),
        original_name = %file.filename,
        "動画を保存しました"
    );

    let url = state.config.viewer_url(&id);
    Ok(Json(UploadResponse { id, url }))
}

/// multipartから `file` フィールドを1つ取り出す。
async fn read_video_file(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<VideoFile, AppError> {
    let mut file: Option<VideoFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if file.is_some() {
            return Err(AppError::MultipleFiles);
        }

        let content_type = field
            .content_type()
            .map(normalize_mime_type)
            .unwrap_or_default()
            .to_string();
        if !content_type.eq_ignore_ascii_case(VIDEO_CONTENT_TYPE) {
            return Err(AppError::UnsupportedType(content_type));
        }

        let filename = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(FALLBACK_FILENAME)
            .to_string();
        let data = read_field_limited(field, max_bytes).await?;

        file = Some(VideoFile { filename, data });
    }

    file.ok_or(AppError::MissingFile)
}

/// フィールド本体をチャンク単位で読み込み、上限を超えた時点で打ち切る。
async fn read_field_limited(mut field: Field<'_>, max_bytes: usize) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        if data.len() + chunk.len() > max_bytes {
            return Err(AppError::PayloadTooLarge { limit: max_bytes });
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

/// multipart読み込みエラーの変換。ボディ上限到達はサイズ超過として扱う。
fn multipart_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit: max_bytes }
    } else {
        AppError::BadRequest(e.body_text())
    }
}

/// MIMEタイプのパラメータを除去する（例: "video/mp4; codecs=avc1" → "video/mp4"）。
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .unwrap_or(content_type)
}

/// 文字単位で先頭 `max_chars` 文字に切り詰める。
fn truncate_chars(value: &str, max_chars: usize) -> String {
    value.chars().take(max_chars).collect()
}
