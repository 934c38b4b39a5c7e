//! # Backdrop サーバー
//!
//! MP4動画を受け取ってS3互換ストレージに保存し、
//! 動画を全画面背景として再生する共有ページのURLを発行する。
//!
//! ## 処理の流れ
//! 1. `POST /upload` で動画を保存し `{id, url}` を返却
//! 2. `GET /v/{id}` のビューアページが `<video>` で `/raw/{id}` を参照
//! 3. `GET /raw/{id}` が10分間有効な署名付きURLへ302リダイレクト
//! 4. ブラウザはストレージから直接ストリーミング

mod config;
mod endpoints;
mod error;
mod pages;
mod storage;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::config::{AppState, Config};
use crate::endpoints::{handle_health, handle_index, handle_raw, handle_upload, handle_viewer};
use crate::storage::S3ObjectStore;

/// multipartの境界やヘッダ分としてボディ上限に上乗せするバイト数
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// ルーターを構築する。
pub(crate) fn app(state: Arc<AppState>) -> axum::Router {
    let body_limit = state
        .config
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    axum::Router::new()
        .route("/", get(handle_index))
        .route(
            "/upload",
            post(handle_upload).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/v/{id}", get(handle_viewer))
        .route("/raw/{id}", get(handle_raw))
        .route("/healthz", get(handle_health))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // .envが無い場合は環境変数のみで起動する
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let config = Config::from_env()?;

    let store = S3ObjectStore::from_config(&config.store)?;
    tracing::info!(
        endpoint = %config.store.endpoint,
        region = %config.store.region,
        bucket = %config.store.bucket,
        "オブジェクトストレージを設定"
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let state = Arc::new(AppState {
        config,
        store: Arc::new(store),
    });

    tracing::info!("Backdropサーバーを {} で起動します", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;

    Ok(())
}
