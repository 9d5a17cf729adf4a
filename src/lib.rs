pub mod features;
pub mod shared;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use features::subscriptions::{self, SqliteSubscriptionStore, SubscriptionStore};
use hyper::body::Incoming;
use hyper::Request;
use log::{error, info};
use shared::config::{initialize_logging_system, load_environment_variables, AppConfig};
use shared::database::initialize_database;
use shared::errors::AppResult;
use std::sync::Arc;

/// アプリケーション状態（リクエストごとに共有される）
pub struct AppState {
    pub store: Box<dyn SubscriptionStore>,
    pub timezone: Tz,
}

impl AppState {
    pub fn new(store: Box<dyn SubscriptionStore>, timezone: Tz) -> Self {
        Self { store, timezone }
    }

    /// 設定されたタイムゾーンでの今日の日付
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

/// アプリケーションを起動し、終了要求を受けるまでリクエストを処理する
///
/// # 処理内容
/// 1. .envファイルと環境変数から設定を読み込む
/// 2. ログシステムを初期化
/// 3. データベースを初期化
/// 4. HTTPサーバーを起動
pub async fn run() -> AppResult<()> {
    let env_file = load_environment_variables();
    let config = AppConfig::from_env()?;

    initialize_logging_system(&config);
    env_file.log();
    info!("アプリケーション初期化を開始します...");

    info!("データベースを初期化しています...");
    let conn = initialize_database(&config).map_err(|e| {
        error!("データベースの初期化に失敗しました: {e}");
        e
    })?;
    info!("データベースの初期化が完了しました");

    let store = SqliteSubscriptionStore::new(conn, config.timezone);
    let state = Arc::new(AppState::new(Box::new(store), config.timezone));

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .map_err(|e| {
            error!("ポートのバインドに失敗しました: {} ({e})", config.bind_address());
            e
        })?;

    info!(
        "アプリケーション初期化が完了しました: environment={}, timezone={}",
        config.environment.as_str(),
        config.timezone
    );

    let handler = move |req: Request<Incoming>| {
        let state = Arc::clone(&state);
        async move { subscriptions::route(req, &state).await }
    };

    shared::http::serve(listener, handler, shutdown_signal()).await
}

/// Ctrl-Cを待つ
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("シグナルハンドラーの登録に失敗しました: {e}");
        std::future::pending::<()>().await;
    }
}
