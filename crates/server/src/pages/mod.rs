//! # HTMLページ
//!
//! アップロードUIとビューアページのテンプレート。

use backdrop_types::UploadId;

/// アップロードUI
pub const INDEX_HTML: &str = include_str!("index.html");

const VIEWER_TEMPLATE: &str = include_str!("viewer.html");

/// 再生エンドポイントのパス
pub fn raw_path(id: &UploadId) -> String {
    format!("/raw/{id}")
}

/// 識別子に対応するビューアページを描画する。
///
/// 識別子は16進数字とハイフンのみで構成されるため、エスケープは不要。
pub fn viewer_page(id: &UploadId) -> String {
    VIEWER_TEMPLATE.replace("{{RAW_URL}}", &raw_path(id))
}
