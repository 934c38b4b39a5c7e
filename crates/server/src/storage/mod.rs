//! # オブジェクトストレージ
//!
//! 動画オブジェクトを保存するストレージの抽象インターフェース。
//! S3互換ストレージ実装は `s3` サブモジュールを参照。

pub mod s3;

pub use self::s3::S3ObjectStore;

use std::collections::BTreeMap;

/// オブジェクトに付与するユーザーメタデータ（キー → 値）。
pub type ObjectMetadata = BTreeMap<String, String>;

/// ストレージ操作のエラー。バックエンドのメッセージをそのまま保持する。
/// リトライは行わない。
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 書き込みリクエストの送信に失敗
    #[error("オブジェクトの書き込みに失敗: {0}")]
    Put(String),
    /// 署名付きURLの生成に失敗
    #[error("署名付きURL生成失敗: {0}")]
    Sign(String),
    /// バックエンドが2xx以外を返した
    #[error("ストレージがエラーを返しました: HTTP {status} - {message}")]
    Status { status: u16, message: String },
}

/// オブジェクトストレージの抽象インターフェース。
///
/// ハンドラが必要とする `put` と `sign` のみを公開する。
/// 本番ではS3互換ストレージ（Cloudflare R2, MinIO, AWS S3等）、
/// テストではインメモリ実装を差し込む。
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを書き込む。成功後は `key` で読み出し可能になる。
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError>;

    /// 読み出し用の署名付きURLを生成する。
    ///
    /// オブジェクトの存在確認は行わない。存在しないキーの場合、
    /// 返却したURLへのアクセスがストレージ側で404になる。
    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError>;
}
