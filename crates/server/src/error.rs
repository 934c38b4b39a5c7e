//! # Backdrop サーバーエラー型
//!
//! 全エンドポイントで共通のエラー型。レスポンスは `{"error": "..."}` 形式のJSON。

use axum::http::StatusCode;
use axum::Json;
use backdrop_types::ErrorResponse;

/// サーバーエラー型。
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// `file` フィールドが存在しない
    #[error("ファイルが含まれていません")]
    MissingFile,
    /// `file` フィールドが複数存在する
    #[error("ファイルは1つだけ送信してください")]
    MultipleFiles,
    /// video/mp4 以外のコンテンツタイプ
    #[error("MP4 (video/mp4) のみアップロードできます: {0}")]
    UnsupportedType(String),
    /// ファイルサイズ超過
    #[error("ファイルサイズが上限を超えています (上限: {limit} bytes)")]
    PayloadTooLarge { limit: usize },
    /// 識別子の形式が不正
    #[error("不正な識別子です")]
    InvalidId,
    /// その他の不正なリクエスト（multipartのパース失敗等）
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),
    /// 書き込み時のストレージ操作失敗
    #[error("ストレージ操作に失敗: {0}")]
    Storage(String),
    /// 読み出し経路の失敗。原因に関わらずこのバリアントに集約する。
    #[error("動画が見つかりません")]
    NotFound,
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::MissingFile
            | AppError::MultipleFiles
            | AppError::UnsupportedType(_)
            | AppError::InvalidId
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
