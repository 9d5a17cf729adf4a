use crate::shared::errors::{AppError, AppResult};
use chrono_tz::Tz;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

/// 既定の待ち受けポート
pub const DEFAULT_PORT: u16 = 5000;

/// 既定のタイムゾーン
pub const DEFAULT_TIMEZONE: &str = "Asia/Tokyo";

/// アプリケーションデータを置くディレクトリ名
const APP_DIR_NAME: &str = "subscription-ledger";

/// アプリケーションの実行環境を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// 開発環境
    Development,
    /// プロダクション環境
    Production,
}

impl Environment {
    /// 環境名の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// アプリケーション設定
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// 実行環境
    pub environment: Environment,
    /// ログレベル
    pub log_level: String,
    /// 待ち受けアドレス
    pub host: IpAddr,
    /// 待ち受けポート
    pub port: u16,
    /// SQLiteファイルのパス
    pub database_path: PathBuf,
    /// 「今日」と作成日時の算出に使うタイムゾーン
    pub timezone: Tz,
    /// 起動時にデモデータを投入するか
    pub seed_demo_data: bool,
}

impl AppConfig {
    /// 環境変数から設定を読み込む
    ///
    /// `.env`の読み込みは呼び出し側で先に済ませておくこと。
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を組み立てる
    ///
    /// # 引数
    /// * `lookup` - 変数名から値を返す関数（未設定の場合はNone）
    ///
    /// # 戻り値
    /// 設定、または値が不正な場合は設定エラー
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = get_environment(lookup("ENVIRONMENT").as_deref());

        let log_level = lookup("LOG_LEVEL").unwrap_or_else(|| match environment {
            Environment::Development => "debug".to_string(),
            Environment::Production => "info".to_string(),
        });

        let host = match lookup("HOST") {
            Some(raw) => raw
                .parse::<IpAddr>()
                .map_err(|_| AppError::configuration(format!("HOST の値が不正です: {raw}")))?,
            None => IpAddr::from([127, 0, 0, 1]),
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| AppError::configuration(format!("PORT の値が不正です: {raw}")))?,
            None => DEFAULT_PORT,
        };

        let database_path = lookup("DATABASE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| default_database_path(environment));

        let timezone_name = lookup("TIMEZONE").unwrap_or_else(|| DEFAULT_TIMEZONE.to_string());
        let timezone = timezone_name.parse::<Tz>().map_err(|_| {
            AppError::configuration(format!("TIMEZONE の値が不正です: {timezone_name}"))
        })?;

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                AppError::configuration(format!("SEED_DEMO_DATA の値が不正です: {raw}"))
            })?,
            None => false,
        };

        Ok(Self {
            environment,
            log_level,
            host,
            port,
            database_path,
            timezone,
            seed_demo_data,
        })
    }

    /// 待ち受けソケットアドレス
    pub fn bind_address(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// プロダクション環境かどうかを判定
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

/// 実行環境を判定する
///
/// # 判定ロジック
/// 1. 環境変数 ENVIRONMENT を確認
/// 2. デバッグビルドの場合は Development
/// 3. リリースビルドの場合は Production
pub fn get_environment(env_var: Option<&str>) -> Environment {
    if let Some(value) = env_var {
        let env = match value {
            "production" => Environment::Production,
            _ => Environment::Development,
        };
        log::debug!("環境判定: 環境変数を使用 -> {value} -> {env:?}");
        return env;
    }

    // フォールバック: ビルド設定に基づく判定
    if cfg!(debug_assertions) {
        Environment::Development
    } else {
        Environment::Production
    }
}

/// 環境に応じたデータベースファイル名を取得する
///
/// - 開発環境: "dev_subscriptions.db"
/// - プロダクション環境: "subscriptions.db"
pub fn get_database_filename(env: Environment) -> &'static str {
    match env {
        Environment::Development => "dev_subscriptions.db",
        Environment::Production => "subscriptions.db",
    }
}

/// アプリデータディレクトリ内の既定のデータベースパス
///
/// データディレクトリが取得できない環境ではカレントディレクトリを使う。
fn default_database_path(env: Environment) -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(get_database_filename(env))
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

/// .envファイルの読み込み結果
///
/// 読み込みはロガーの初期化より前に行うため、結果を保持しておき
/// 初期化後に`log`で出力する。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvFileStatus {
    /// 環境に対応するファイルを読み込んだ
    Loaded(&'static str),
    /// 環境固有のファイルがなく、既定の.envを読み込んだ
    FellBack(&'static str),
    /// どのファイルも見つからなかった
    NotFound(&'static str),
}

impl EnvFileStatus {
    /// ログレベルとメッセージ
    pub fn message(&self) -> (log::Level, String) {
        match self {
            EnvFileStatus::Loaded(file) => (log::Level::Info, format!("{file}ファイルを読み込みました")),
            EnvFileStatus::FellBack(file) => (
                log::Level::Warn,
                format!("{file}が見つからないため、デフォルトの.envファイルを読み込みました"),
            ),
            EnvFileStatus::NotFound(file) => (
                log::Level::Warn,
                format!("{file}ファイルが見つかりません。直接設定された環境変数を使用します。"),
            ),
        }
    }

    /// 読み込み結果をログに出力する
    pub fn log(&self) {
        let (level, message) = self.message();
        log::log!(level, "{message}");
    }
}

/// 環境ごとの.envファイル名
fn env_file_for(environment: &str) -> &'static str {
    match environment {
        "production" => ".env.production",
        _ => ".env",
    }
}

/// 環境に応じた.envファイルを読み込む
///
/// 環境固有のファイルがなければ既定の.envを試し、どちらもなければ
/// 直接設定された環境変数だけで動作する。
pub fn load_environment_variables() -> EnvFileStatus {
    let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
    let env_file = env_file_for(&environment);

    if dotenv::from_filename(env_file).is_ok() {
        EnvFileStatus::Loaded(env_file)
    } else if env_file != ".env" && dotenv::dotenv().is_ok() {
        EnvFileStatus::FellBack(env_file)
    } else {
        EnvFileStatus::NotFound(env_file)
    }
}

/// ログシステムを初期化する
///
/// # 処理内容
/// 1. ログレベルを設定
/// 2. env_loggerを初期化
pub fn initialize_logging_system(config: &AppConfig) {
    let log_level = match config.log_level.to_lowercase().as_str() {
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "info" => log::LevelFilter::Info,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .format_timestamp_secs()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::info!(
        "ログシステムを初期化しました: level={}, environment={}",
        config.log_level,
        config.environment.as_str()
    );
}
