//! # Backdrop 共有型定義
//!
//! サーバーとCLIで共有するアップロード識別子とAPIレスポンスの構造体。
//!
//! ## 識別子の規則
//! - 生成: ランダムUUID（ハイフン区切り16進小文字）
//! - 受理: 20文字以上、16進数字とハイフンのみ
//! - ストレージキー: `{id}.mp4`

use std::fmt;

use serde::{Deserialize, Serialize};

/// 受け付けるビデオのMIMEタイプ
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// ストレージキーに付与する拡張子
pub const OBJECT_EXTENSION: &str = ".mp4";

/// 識別子として受理する最小文字数
pub const MIN_ID_LEN: usize = 20;

// ---------------------------------------------------------------------------
// アップロード識別子
// ---------------------------------------------------------------------------

/// 識別子の形式が不正。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("不正な識別子です: {0:?}")]
pub struct InvalidUploadId(pub String);

/// アップロードごとに発行される不透明な識別子。
///
/// 公開URLの参照とストレージキーの起点を兼ねる。発行後は不変。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UploadId(String);

impl UploadId {
    /// 新しい識別子を生成する。
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().hyphenated().to_string())
    }

    /// 外部から受け取った文字列を識別子として検証する。
    ///
    /// 20文字以上かつ16進数字とハイフンのみで構成される場合に受理する。
    /// ストアへの問い合わせは行わない。
    pub fn parse(raw: &str) -> Result<Self, InvalidUploadId> {
        if is_valid_upload_id(raw) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidUploadId(raw.to_string()))
        }
    }

    /// 識別子の文字列表現
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 動画オブジェクトのストレージキー (`{id}.mp4`)
    pub fn object_key(&self) -> String {
        format!("{}{}", self.0, OBJECT_EXTENSION)
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UploadId {
    type Error = InvalidUploadId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if is_valid_upload_id(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidUploadId(value))
        }
    }
}

impl From<UploadId> for String {
    fn from(id: UploadId) -> Self {
        id.0
    }
}

/// 識別子の形式判定。
pub fn is_valid_upload_id(raw: &str) -> bool {
    raw.len() >= MIN_ID_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit() || b == b'-')
}

// ---------------------------------------------------------------------------
// API レスポンス
// ---------------------------------------------------------------------------

/// POST /upload の成功レスポンス。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// 発行された識別子
    pub id: UploadId,
    /// ビューアページの完全URL
    pub url: String,
}

/// エラーレスポンス。全エンドポイント共通。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
