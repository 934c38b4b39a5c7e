//! # エンドポイントテスト用共通ヘルパー
//!
//! インメモリのObjectStoreと、実ルーターをローカルポートで起動するユーティリティ。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::config::{AppState, Config, StoreConfig};
use crate::storage::{ObjectMetadata, ObjectStore, StoreError};

/// テスト用の公開ベースURL
pub const TEST_BASE_URL: &str = "https://backdrop.test";

/// インメモリストアに保存されたオブジェクト。
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
    pub cache_control: String,
    pub metadata: ObjectMetadata,
}

/// テスト用のインメモリObjectStore。
/// 書き込まれていないキーへの署名要求はバックエンドエラーとして扱う。
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    sign_calls: Mutex<Vec<(String, u32)>>,
}

impl MemoryStore {
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// `sign` に渡された (key, expiry_secs) の履歴
    pub fn sign_calls(&self) -> Vec<(String, u32)> {
        self.sign_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        key: &str,
        body: &[u8],
        content_type: &str,
        cache_control: &str,
        metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                body: body.to_vec(),
                content_type: content_type.to_string(),
                cache_control: cache_control.to_string(),
                metadata: metadata.clone(),
            },
        );
        Ok(())
    }

    async fn sign(&self, key: &str, expiry_secs: u32) -> Result<String, StoreError> {
        self.sign_calls
            .lock()
            .unwrap()
            .push((key.to_string(), expiry_secs));

        if !self.objects.lock().unwrap().contains_key(key) {
            return Err(StoreError::Sign(format!("NoSuchKey: {key}")));
        }
        Ok(format!(
            "https://storage.test/videos/{key}?X-Amz-Expires={expiry_secs}&X-Amz-Signature=test"
        ))
    }
}

/// 全操作が失敗するObjectStore。
pub struct FailingStore;

#[async_trait::async_trait]
impl ObjectStore for FailingStore {
    async fn put(
        &self,
        _key: &str,
        _body: &[u8],
        _content_type: &str,
        _cache_control: &str,
        _metadata: &ObjectMetadata,
    ) -> Result<(), StoreError> {
        Err(StoreError::Status {
            status: 403,
            message: "AccessDenied".to_string(),
        })
    }

    async fn sign(&self, _key: &str, _expiry_secs: u32) -> Result<String, StoreError> {
        Err(StoreError::Sign("connection refused".to_string()))
    }
}

/// テスト用AppStateを構築する
pub fn test_state(store: Arc<dyn ObjectStore>, max_upload_bytes: usize) -> Arc<AppState> {
    Arc::new(AppState {
        config: Config {
            store: StoreConfig {
                endpoint: "http://localhost:9000".to_string(),
                region: "auto".to_string(),
                access_key_id: "test".to_string(),
                secret_access_key: "test".to_string(),
                bucket: "videos".to_string(),
                force_path_style: true,
            },
            public_base_url: TEST_BASE_URL.to_string(),
            port: 0,
            max_upload_bytes,
        },
        store,
    })
}

/// ルーターを127.0.0.1の空きポートで起動し、ベースURLを返す。
pub async fn start_app(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, crate::app(state)).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    format!("http://127.0.0.1:{port}")
}

/// リダイレクトを追跡しないHTTPクライアント
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// `file` フィールドに指定内容を載せて /upload にPOSTする。
pub async fn post_upload(
    client: &reqwest::Client,
    base: &str,
    data: Vec<u8>,
    content_type: &str,
    filename: &str,
) -> reqwest::Response {
    let part = reqwest::multipart::Part::bytes(data)
        .file_name(filename.to_string())
        .mime_str(content_type)
        .unwrap();
    let form = reqwest::multipart::Form::new().part("file", part);

    client
        .post(format!("{base}/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap()
}
