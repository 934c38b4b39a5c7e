//! # HTTPエンドポイント
//!
//! - `GET /` — アップロードUI
//! - `POST /upload` — 動画アップロード
//! - `GET /v/{id}` — ビューアページ
//! - `GET /raw/{id}` — 署名付きURLへのリダイレクト
//! - `GET /healthz` — 死活監視

pub mod index;
pub mod raw;
pub mod upload;
pub mod viewer;

#[cfg(test)]
mod test_helpers;


pub use index::{handle_health, handle_index};
pub use raw::handle_raw;
pub use upload::handle_upload;
pub use viewer::handle_viewer;
