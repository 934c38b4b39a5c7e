//! # Backdrop CLI
//!
//! コマンドラインからMP4動画をアップロードし、ビューアURLを表示する。
//!
//! ## コマンド
//! - `upload <FILE>` — `POST /upload` に送信してURLを表示
//! - `check <ID>` — 識別子の形式を検証してストレージキーを表示

use std::path::{Path, PathBuf};

use anyhow::Context;
use backdrop_types::{ErrorResponse, UploadId, UploadResponse, VIDEO_CONTENT_TYPE};
use clap::{Parser, Subcommand};

/// 接続先サーバーの既定値
const DEFAULT_SERVER: &str = "http://localhost:10000";

#[derive(Parser)]
#[command(name = "backdrop-cli", about = "Backdrop 動画アップロードCLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// MP4動画をアップロードしてビューアURLを表示する
    Upload {
        /// アップロードするMP4ファイル
        file: PathBuf,
        /// BackdropサーバーのベースURL
        #[arg(long, env = "BACKDROP_SERVER", default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// 識別子の形式を検証し、対応するストレージキーを表示する
    Check {
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Upload { file, server } => {
            let client = reqwest::Client::new();
            let response = upload_file(&client, &server, &file).await?;
            println!("id:  {}", response.id);
            println!("url: {}", response.url);
        }
        Commands::Check { id } => {
            let id = UploadId::parse(&id)?;
            println!("{}", id.object_key());
        }
    }

    Ok(())
}

/// ファイルを `file` フィールドとしてサーバーに送信する。
async fn upload_file(
    client: &reqwest::Client,
    server: &str,
    path: &Path,
) -> anyhow::Result<UploadResponse> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("ファイルの読み込みに失敗: {}", path.display()))?;
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());

    let part = reqwest::multipart::Part::bytes(data)
        .file_name(filename)
        .mime_str(VIDEO_CONTENT_TYPE)?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let url = format!("{}/upload", server.trim_end_matches('/'));
    let response = client
        .post(&url)
        .multipart(form)
        .send()
        .await
        .with_context(|| format!("{url} への送信に失敗"))?;

    let status = response.status();
    let body = response.text().await.context("レスポンス読み取り失敗")?;

    if !status.is_success() {
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error)
            .unwrap_or(body);
        anyhow::bail!("アップロードに失敗しました: HTTP {status} - {message}");
    }

    serde_json::from_str(&body).context("レスポンスのパースに失敗")
}
