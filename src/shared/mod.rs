/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有データベース接続管理
pub mod database;

/// 共有設定管理
pub mod config;

/// HTTPサーバーとリクエスト・レスポンスの補助
pub mod http;

// 便利な再エクスポート
pub use config::{
    initialize_logging_system, load_environment_variables, AppConfig, Environment,
};
pub use database::{create_tables, initialize_database};
pub use errors::{AppError, AppResult, ErrorSeverity, ValidationError};
