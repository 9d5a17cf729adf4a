//! サブスクリプション機能の統合テスト
//!
//! ファイルデータベースと実際のTCP接続を使い、追加から削除までの一連の流れを検証します。

#[cfg(test)]
mod integration_tests {
    use crate::features::subscriptions::{route, SqliteSubscriptionStore};
    use crate::shared::config::{AppConfig, Environment};
    use crate::shared::database::initialize_database;
    use crate::shared::http::serve;
    use crate::AppState;
    use http_body_util::{BodyExt, Full};
    use hyper::body::{Bytes, Incoming};
    use hyper::client::conn::http1;
    use hyper::header::{CONTENT_TYPE, HOST, LOCATION};
    use hyper::{Method, Request, StatusCode};
    use hyper_util::rt::TokioIo;
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    struct TestServer {
        addr: SocketAddr,
        shutdown: Option<oneshot::Sender<()>>,
        _temp_dir: TempDir,
    }

    impl Drop for TestServer {
        fn drop(&mut self) {
            if let Some(tx) = self.shutdown.take() {
                let _ = tx.send(());
            }
        }
    }

    /// テスト用のサーバーを起動する
    async fn start_server(seed_demo_data: bool) -> TestServer {
        let temp_dir = TempDir::new().expect("一時ディレクトリの作成に失敗");
        let config = AppConfig {
            environment: Environment::Development,
            log_level: "debug".to_string(),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 0,
            database_path: temp_dir.path().join("integration.db"),
            timezone: chrono_tz::Asia::Tokyo,
            seed_demo_data,
        };

        let conn = initialize_database(&config).expect("データベースの初期化に失敗");
        let store = SqliteSubscriptionStore::new(conn, config.timezone);
        let state = Arc::new(AppState::new(Box::new(store), config.timezone));

        let listener = TcpListener::bind(config.bind_address()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handler = move |req: Request<Incoming>| {
            let state = Arc::clone(&state);
            async move { route(req, &state).await }
        };
        tokio::spawn(serve(listener, handler, async {
            let _ = rx.await;
        }));

        TestServer {
            addr,
            shutdown: Some(tx),
            _temp_dir: temp_dir,
        }
    }

    /// リクエストを1件送り、ステータス・Locationヘッダー・本文を返す
    async fn send(
        addr: SocketAddr,
        method: Method,
        path: &str,
        form: Option<&str>,
    ) -> (StatusCode, Option<String>, String) {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (mut sender, conn) = http1::handshake(TokioIo::new(stream)).await.unwrap();
        tokio::spawn(async move {
            let _ = conn.await;
        });

        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(HOST, addr.to_string());
        if form.is_some() {
            builder = builder.header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        }
        let req = builder
            .body(Full::new(Bytes::from(form.unwrap_or("").to_string())))
            .unwrap();

        let res = sender.send_request(req).await.unwrap();
        let status = res.status();
        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = res.into_body().collect().await.unwrap().to_bytes();

        (status, location, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_complete_subscription_lifecycle() {
        let server = start_server(false).await;
        let addr = server.addr;

        // 1. 初期状態は空
        let (status, _, body) = send(addr, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("月額合計: <strong>0</strong>"));

        // 2. 追加
        let (status, location, _) = send(
            addr,
            Method::POST,
            "/add",
            Some("name=Spotify&price=149&billing_cycle=Monthly&next_payment_date=2031-05-01"),
        )
        .await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(location.as_deref(), Some("/"));

        let (_, _, body) = send(addr, Method::GET, "/", None).await;
        assert!(body.contains("Spotify"));
        assert!(body.contains("月額合計: <strong>149</strong>"));

        // 3. 編集
        let (status, _, _) = send(
            addr,
            Method::POST,
            "/edit/1",
            Some("name=Spotify+Duo&price=100&billing_cycle=Weekly&next_payment_date=2031-05-01"),
        )
        .await;
        assert_eq!(status, StatusCode::FOUND);

        let (_, _, body) = send(addr, Method::GET, "/", None).await;
        assert!(body.contains("Spotify Duo"));
        assert!(body.contains("月額合計: <strong>400</strong>"));

        // 4. 削除（2回目は404）
        let (status, _, _) = send(addr, Method::GET, "/delete/1", None).await;
        assert_eq!(status, StatusCode::FOUND);
        let (status, _, _) = send(addr, Method::GET, "/delete/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, _, body) = send(addr, Method::GET, "/", None).await;
        assert!(!body.contains("Spotify"));
    }

    #[tokio::test]
    async fn test_seeded_dashboard_total() {
        let server = start_server(true).await;

        let (status, _, body) = send(server.addr, Method::GET, "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        // 270 + 149 + 1680 / 12 + 999
        assert_eq!(value["total_monthly_cost"], 1558);
        assert_eq!(value["entries"].as_array().map(Vec::len), Some(4));
    }

    #[tokio::test]
    async fn test_validation_error_is_shown_over_http() {
        let server = start_server(false).await;

        let (status, _, body) = send(
            server.addr,
            Method::POST,
            "/add",
            Some("name=&price=100&billing_cycle=Monthly&next_payment_date=2031-05-01"),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("サービス名は必須項目です"));
    }
}
