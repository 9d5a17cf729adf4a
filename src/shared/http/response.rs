use hyper::header::{HeaderValue, CONTENT_TYPE, LOCATION};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// HTMLレスポンスを作成する
pub fn html(status: StatusCode, body: String) -> Response<String> {
    with_content_type(status, body, "text/html; charset=utf-8")
}

/// プレーンテキストのレスポンスを作成する
pub fn text(status: StatusCode, body: impl Into<String>) -> Response<String> {
    with_content_type(status, body.into(), "text/plain; charset=utf-8")
}

/// JSONレスポンスを作成する
///
/// シリアライズに失敗した場合は500のJSONエラーを返す。
pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Response<String> {
    match serde_json::to_string(value) {
        Ok(body) => with_content_type(status, body, "application/json"),
        Err(e) => {
            log::error!("JSONのシリアライズに失敗しました: {e}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "データ形式の変換でエラーが発生しました")
        }
    }
}

/// `{"error": "..."}` 形式のJSONエラーレスポンスを作成する
pub fn json_error(status: StatusCode, message: &str) -> Response<String> {
    let body = serde_json::json!({ "error": message }).to_string();
    with_content_type(status, body, "application/json")
}

/// 302リダイレクトを作成する
pub fn redirect(location: &'static str) -> Response<String> {
    let mut response = Response::new(String::new());
    *response.status_mut() = StatusCode::FOUND;
    response
        .headers_mut()
        .insert(LOCATION, HeaderValue::from_static(location));
    response
}

fn with_content_type(
    status: StatusCode,
    body: String,
    content_type: &'static str,
) -> Response<String> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect() {
        let response = redirect("/");
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[LOCATION], "/");
        assert!(response.body().is_empty());
    }

    #[test]
    fn test_json_error_body() {
        let response = json_error(StatusCode::NOT_FOUND, "見つかりません");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let value: serde_json::Value = serde_json::from_str(response.body()).unwrap();
        assert_eq!(value["error"], "見つかりません");
    }

    #[test]
    fn test_text_content_type() {
        let response = text(StatusCode::INTERNAL_SERVER_ERROR, "削除時にエラーが発生しました");
        assert_eq!(
            response.headers()[CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
