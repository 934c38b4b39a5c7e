//! # サーバー設定・共有状態
//!
//! 環境変数からの設定読み込みと共有状態の定義。
//! 設定は起動時に一度だけ読み込み、以後は不変。必須値が欠けていれば起動を中止する。

use std::sync::Arc;

use anyhow::Context;
use backdrop_types::UploadId;

use crate::storage::ObjectStore;

/// PORT未設定時のリッスンポート
pub const DEFAULT_PORT: u16 = 10000;

/// STORE_REGION未設定時のリージョン（Cloudflare R2の既定値）
pub const DEFAULT_REGION: &str = "auto";

/// アップロード上限のデフォルト値（250 MiB）
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 250 * 1024 * 1024;

/// S3互換ストレージの接続設定。
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// エンドポイントURL（例: `https://<account>.r2.cloudflarestorage.com`）
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    /// パス形式のアドレッシング。仮想ホスト形式に非対応のプロバイダ向けに常に有効。
    pub force_path_style: bool,
}

/// サーバー設定。
#[derive(Debug, Clone)]
pub struct Config {
    pub store: StoreConfig,
    /// ビューアURLの組み立てに使う公開ベースURL
    pub public_base_url: String,
    pub port: u16,
    /// アップロード本体の最大バイト数
    pub max_upload_bytes: usize,
}

impl Config {
    /// プロセス環境変数から読み込む。
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意のキー参照関数から読み込む。空文字列は未設定として扱う。
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| anyhow::anyhow!("環境変数 {key} が設定されていません"))
        };

        let store = StoreConfig {
            endpoint: require("STORE_ENDPOINT")?,
            region: get("STORE_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: require("STORE_ACCESS_KEY_ID")?,
            secret_access_key: require("STORE_SECRET_ACCESS_KEY")?,
            bucket: require("STORE_BUCKET")?,
            force_path_style: true,
        };

        let public_base_url = require("PUBLIC_BASE_URL")?
            .trim_end_matches('/')
            .to_string();

        let port = match get("PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("PORTが不正です: {v}"))?,
            None => DEFAULT_PORT,
        };

        let max_upload_bytes = match get("MAX_UPLOAD_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .with_context(|| format!("MAX_UPLOAD_BYTESが不正です: {v}"))?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Self {
            store,
            public_base_url,
            port,
            max_upload_bytes,
        })
    }

    /// 識別子に対応するビューアページの完全URL
    pub fn viewer_url(&self, id: &UploadId) -> String {
        format!("{}/v/{}", self.public_base_url, id)
    }
}

/// サーバーの共有状態。起動時に構築し、全ハンドラで共有する。
pub struct AppState {
    pub config: Config,
    /// オブジェクトストレージ（S3互換等、トレイトで抽象化）
    pub store: Arc<dyn ObjectStore>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("STORE_ENDPOINT", "https://account.r2.cloudflarestorage.com"),
            ("STORE_ACCESS_KEY_ID", "key-id"),
            ("STORE_SECRET_ACCESS_KEY", "secret"),
            ("STORE_BUCKET", "videos"),
            ("PUBLIC_BASE_URL", "https://backdrop.example.com/"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> anyhow::Result<Config> {
        Config::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.store.region, "auto");
        assert_eq!(config.port, 10000);
        assert_eq!(config.max_upload_bytes, 250 * 1024 * 1024);
        assert!(config.store.force_path_style);
        // 末尾のスラッシュは除去される
        assert_eq!(config.public_base_url, "https://backdrop.example.com");
    }

    #[test]
    fn test_overrides() {
        let mut env = full_env();
        env.insert("STORE_REGION", "us-east-1");
        env.insert("PORT", "8080");
        env.insert("MAX_UPLOAD_BYTES", "1024");
        let config = load(&env).unwrap();
        assert_eq!(config.store.region, "us-east-1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_missing_required_value_fails() {
        for key in [
            "STORE_ENDPOINT",
            "STORE_ACCESS_KEY_ID",
            "STORE_SECRET_ACCESS_KEY",
            "STORE_BUCKET",
            "PUBLIC_BASE_URL",
        ] {
            let mut env = full_env();
            env.remove(key);
            let err = load(&env).unwrap_err();
            assert!(err.to_string().contains(key), "{key} の欠落が検出されない");

            // 空文字列も未設定扱い
            env.insert(key, "  ");
            assert!(load(&env).is_err());
        }
    }

    #[test]
    fn test_invalid_port_fails() {
        let mut env = full_env();
        env.insert("PORT", "not-a-port");
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_viewer_url() {
        let config = load(&full_env()).unwrap();
        let id = UploadId::parse("0123456789abcdef-0123").unwrap();
        assert_eq!(
            config.viewer_url(&id),
            "https://backdrop.example.com/v/0123456789abcdef-0123"
        );
    }
}
