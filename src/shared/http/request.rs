use crate::shared::errors::{AppError, AppResult};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Body;

/// フォームボディの最大サイズ（バイト）
pub const MAX_FORM_BYTES: usize = 64 * 1024;

/// `application/x-www-form-urlencoded` のボディを読み取り、キーと値の組に分解する
///
/// # 引数
/// * `body` - リクエストボディ
///
/// # 戻り値
/// デコード済みのキーと値の組、または上限超過・読み取り失敗時はエラー
pub async fn read_form_pairs<B>(body: B) -> AppResult<Vec<(String, String)>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let collected = Limited::new(body, MAX_FORM_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.downcast_ref::<LengthLimitError>().is_some() {
                AppError::PayloadTooLarge(MAX_FORM_BYTES)
            } else {
                AppError::Http(format!("リクエストボディの読み取りに失敗: {e}"))
            }
        })?;

    let bytes = collected.to_bytes();
    Ok(url::form_urlencoded::parse(&bytes)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect())
}

/// パスを`/`で区切った要素に分解する（空要素は除く）
pub fn path_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}
