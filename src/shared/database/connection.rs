use crate::features::subscriptions::{repository, BillingCycle, NewSubscription};
use crate::shared::config::AppConfig;
use crate::shared::errors::{AppError, AppResult};
use chrono::{Days, NaiveDate, Utc};
use rusqlite::Connection;
use std::path::Path;

/// データベース接続を初期化し、テーブルを作成する
///
/// # 引数
/// * `config` - アプリケーション設定
///
/// # 戻り値
/// データベース接続、または失敗時はエラー
///
/// # 処理内容
/// 1. データベースファイルの親ディレクトリの確保
/// 2. データベース接続の開設
/// 3. テーブル作成
/// 4. 設定されていればデモデータの投入
pub fn initialize_database(config: &AppConfig) -> AppResult<Connection> {
    let database_path = &config.database_path;
    let is_first_run = !database_path.exists();

    ensure_parent_directory(database_path)?;

    let conn = Connection::open(database_path)?;
    create_tables(&conn)?;

    if is_first_run {
        log::info!("新規データベースを作成しました: {:?}", database_path);
    } else {
        log::info!("既存のデータベースを使用します: {:?}", database_path);
    }

    if config.seed_demo_data {
        let today = Utc::now().with_timezone(&config.timezone).date_naive();
        let created_at = Utc::now().with_timezone(&config.timezone).to_rfc3339();
        let inserted = seed_demo_data(&conn, today, &created_at)?;
        if inserted > 0 {
            log::info!("デモデータを{inserted}件投入しました");
        }
    }

    Ok(conn)
}

/// データベースファイルの親ディレクトリを作成する
fn ensure_parent_directory(database_path: &Path) -> AppResult<()> {
    match database_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::configuration(format!("データディレクトリの作成に失敗: {e}"))
            })?;
            log::info!("データディレクトリを作成: {:?}", dir);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// データベーステーブルを作成する
///
/// 何度呼び出しても結果は変わらない。
pub fn create_tables(conn: &Connection) -> AppResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS subscriptions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            billing_cycle TEXT NOT NULL,
            next_payment_date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subscriptions_next_payment_date
         ON subscriptions(next_payment_date)",
        [],
    )?;

    Ok(())
}

/// テーブルが空の場合にデモデータを投入する
///
/// # 戻り値
/// 投入した件数（既にデータがある場合は0）
pub fn seed_demo_data(conn: &Connection, today: NaiveDate, created_at: &str) -> AppResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM subscriptions", [], |row| row.get(0))?;
    if count > 0 {
        log::debug!("既存データがあるためデモデータの投入をスキップします: {count}件");
        return Ok(0);
    }

    let demo = [
        ("Netflix", 270.0, BillingCycle::Monthly, 3),
        ("Spotify", 149.0, BillingCycle::Monthly, 12),
        ("iCloud+", 1680.0, BillingCycle::Yearly, 45),
        ("Adobe Creative Cloud", 999.0, BillingCycle::Monthly, 20),
    ];

    for (name, price, billing_cycle, days_ahead) in demo.iter().cloned() {
        let new_subscription = NewSubscription {
            name: name.to_string(),
            price,
            billing_cycle,
            next_payment_date: today.checked_add_days(Days::new(days_ahead)).unwrap_or(today),
        };
        repository::create(conn, &new_subscription, created_at)?;
    }

    Ok(demo.len())
}
