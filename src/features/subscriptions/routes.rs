use super::handlers;
use super::models::SubscriptionForm;
use crate::shared::http::{request, response};
use crate::AppState;
use hyper::body::Body;
use hyper::{Method, Request, Response, StatusCode};

/// リクエストを各ハンドラーに振り分ける
///
/// | メソッドとパス | ハンドラー |
/// |---|---|
/// | GET `/` | 一覧 |
/// | GET/POST `/add` | 追加 |
/// | GET/POST `/edit/{id}` | 編集 |
/// | GET `/delete/{id}` | 削除 |
/// | GET `/api/dashboard` | 一覧データのJSON |
pub async fn route<B>(req: Request<B>, state: &AppState) -> Response<String>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    log::debug!("リクエストを受信: {method} {path}");

    let response = dispatch(req, &method, &path, state).await;

    log::info!("{method} {path} -> {}", response.status().as_u16());
    response
}

async fn dispatch<B>(req: Request<B>, method: &Method, path: &str, state: &AppState) -> Response<String>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let segments = request::path_segments(path);

    match (method, segments.as_slice()) {
        (&Method::GET, []) => handlers::index(state),

        (&Method::GET, ["add"]) => handlers::add_form(),
        (&Method::POST, ["add"]) => match read_form(req).await {
            Ok(form) => handlers::add_submit(state, form),
            Err(res) => res,
        },

        (&Method::GET, ["edit", id]) => match parse_id(id) {
            Some(id) => handlers::edit_form(state, id),
            None => not_found(),
        },
        (&Method::POST, ["edit", id]) => match parse_id(id) {
            Some(id) => match read_form(req).await {
                Ok(form) => handlers::edit_submit(state, id, form),
                Err(res) => res,
            },
            None => not_found(),
        },

        (&Method::GET, ["delete", id]) => match parse_id(id) {
            Some(id) => handlers::delete(state, id),
            None => not_found(),
        },

        (&Method::GET, ["api", "dashboard"]) => handlers::dashboard_json(state),

        (_, [] | ["add"] | ["edit", _] | ["delete", _] | ["api", "dashboard"]) => {
            response::text(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
        }
        _ => not_found(),
    }
}

async fn read_form<B>(req: Request<B>) -> Result<SubscriptionForm, Response<String>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    request::read_form_pairs(req.into_body())
        .await
        .map(SubscriptionForm::from_pairs)
        .map_err(|e| handlers::failure(&e))
}

fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok()
}

fn not_found() -> Response<String> {
    response::text(StatusCode::NOT_FOUND, "Not Found")
}
