//! # S3互換 オブジェクトストレージ実装
//!
//! Cloudflare R2, MinIO, AWS S3 等のS3互換APIを使用する実装。
//! 非AWSプロバイダ向けにパス形式のアドレッシングを使用する。

// rust-s3 0.35 の追加ヘッダは http 0.2 の HeaderMap を受け取る
use http::{header, HeaderMap, HeaderName, HeaderValue};

use super::{ObjectMetadata, ObjectStore, StoreError};
use crate::config::StoreConfig;

/// ユーザーメタデータのヘッダ接頭辞
const METADATA_HEADER_PREFIX: &str = "x-amz-meta-";

/// S3互換ストレージによるObjectStore実装。
pub struct S3ObjectStore {
    bucket: ::s3::Bucket,
}

impl S3ObjectStore {
    /// S3互換バケットからObjectStoreを構築する。
    pub fn new(bucket: ::s3::Bucket) -> Self {
        Self { bucket }
    }

    /// 起動時設定からバケットを初期化する。
    pub fn from_config(config: &StoreConfig) -> anyhow::Result<Self> {
        let region = ::s3::Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let credentials = ::s3::creds::Credentials::new(
            Some(config.access_key_id.as_str()),
            Some(config.secret_access_key.as_str()),
            None,
            None,
            None,
        )?;

        let bucket = ::s3::Bucket::new(&config.bucket, region, credentials)?;
        let bucket = if config.force_path_style {
            bucket.with_path_style()
        } else {
            bucket
        };

        Ok(Self::new(*bucket))
    }
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        let headers = build_put_headers(cache_control, metadata)?;

        let response = self
            .bucket
            .with_extra_headers(headers)
            .map_err(|e| StoreError::Put(e.to_string()))?
            .put_object_with_content_type(key, body, content_type)
            .await
            .map_err(|e| StoreError::Put(e.to_string()))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StoreError::Status {
                status,
                message: String::from_utf8_lossy(response.as_slice()).into_owned(),
            });
        }
        Ok(())
    }

    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError> {
        self.bucket
            .presign_get(key, expiry_secs, None)
            .await
            .map_err(|e| StoreError::Sign(e.to_string()))
    }
}

/// PUTリクエストに付与するヘッダを構築する。
fn build_put_headers(
    cache_control: &str,
    metadata: &ObjectMetadata,
) -> Result<HeaderMap, StoreError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_str(cache_control)
            .map_err(|e| StoreError::Put(format!("Cache-Controlが不正: {e}")))?,
    );

    for (name, value) in metadata {
        let name = HeaderName::from_bytes(format!("{METADATA_HEADER_PREFIX}{name}").as_bytes())
            .map_err(|e| StoreError::Put(format!("メタデータ名が不正: {e}")))?;
        let value = HeaderValue::from_str(&header_safe(value))
            .map_err(|e| StoreError::Put(format!("メタデータ値が不正: {e}")))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

/// HTTPヘッダに載せられない文字（非ASCII・制御文字）を `_` に置換する。
fn header_safe(value: &str) -> String {
    value
        .chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '_' })
        .collect()
}
