use super::models::{BillingCycle, NewSubscription, Subscription};
use crate::shared::errors::{AppError, AppResult};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use rusqlite::{params, Connection, Row};
use std::sync::{Mutex, MutexGuard};

/// サブスクリプションの永続化インターフェース
///
/// 台帳の純粋関数はこのトレイトに依存せず、ハンドラーだけが利用する。
pub trait SubscriptionStore: Send + Sync {
    /// IDでサブスクリプションを取得する（存在しない場合は`NotFound`）
    fn get(&self, id: i64) -> AppResult<Subscription>;

    /// すべてのサブスクリプションを登録順に取得する
    fn list(&self) -> AppResult<Vec<Subscription>>;

    /// サブスクリプションを登録し、採番されたidと作成日時を含めて返す
    fn insert(&self, new_subscription: NewSubscription) -> AppResult<Subscription>;

    /// id以外の項目を上書きする（作成日時は変更しない）
    fn update(&self, subscription: &Subscription) -> AppResult<Subscription>;

    /// サブスクリプションを削除する（存在しない場合は`NotFound`）
    fn delete(&self, id: i64) -> AppResult<()>;
}

const SELECT_COLUMNS: &str =
    "SELECT id, name, price, billing_cycle, next_payment_date, created_at FROM subscriptions";

/// SQLiteによる`SubscriptionStore`の実装
pub struct SqliteSubscriptionStore {
    conn: Mutex<Connection>,
    timezone: Tz,
}

impl SqliteSubscriptionStore {
    /// 初期化済みの接続からストアを作成する
    ///
    /// # 引数
    /// * `conn` - テーブル作成済みのデータベース接続
    /// * `timezone` - 作成日時の記録に使うタイムゾーン
    pub fn new(conn: Connection, timezone: Tz) -> Self {
        Self {
            conn: Mutex::new(conn),
            timezone,
        }
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| AppError::concurrency(format!("データベースロックエラー: {e}")))
    }
}

impl SubscriptionStore for SqliteSubscriptionStore {
    fn get(&self, id: i64) -> AppResult<Subscription> {
        let conn = self.lock()?;
        find_by_id(&conn, id)
    }

    fn list(&self) -> AppResult<Vec<Subscription>> {
        let conn = self.lock()?;
        find_all(&conn)
    }

    fn insert(&self, new_subscription: NewSubscription) -> AppResult<Subscription> {
        let now = Utc::now().with_timezone(&self.timezone).to_rfc3339();
        let conn = self.lock()?;
        create(&conn, &new_subscription, &now)
    }

    fn update(&self, subscription: &Subscription) -> AppResult<Subscription> {
        let conn = self.lock()?;
        update(&conn, subscription)
    }

    fn delete(&self, id: i64) -> AppResult<()> {
        let conn = self.lock()?;
        delete(&conn, id)
    }
}

/// サブスクリプションを作成する
///
/// # 引数
/// * `conn` - データベース接続
/// * `new_subscription` - 検証済みの入力
/// * `created_at` - 作成日時（RFC3339）
pub fn create(
    conn: &Connection,
    new_subscription: &NewSubscription,
    created_at: &str,
) -> AppResult<Subscription> {
    conn.execute(
        "INSERT INTO subscriptions (name, price, billing_cycle, next_payment_date, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_subscription.name,
            new_subscription.price,
            new_subscription.billing_cycle.as_str(),
            new_subscription.next_payment_date,
            created_at
        ],
    )?;

    let id = conn.last_insert_rowid();
    log::debug!("サブスクリプションを作成しました: id={id}");
    find_by_id(conn, id)
}

/// IDでサブスクリプションを取得する
pub fn find_by_id(conn: &Connection, id: i64) -> AppResult<Subscription> {
    conn.query_row(
        &format!("{SELECT_COLUMNS} WHERE id = ?1"),
        params![id],
        map_row,
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => not_found(id),
        _ => AppError::Database(e.to_string()),
    })
}

/// サブスクリプション一覧を取得する（登録順）
pub fn find_all(conn: &Connection) -> AppResult<Vec<Subscription>> {
    let mut stmt = conn.prepare(&format!("{SELECT_COLUMNS} ORDER BY id"))?;
    let subscriptions = stmt.query_map([], map_row)?;

    subscriptions
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| AppError::Database(e.to_string()))
}

/// サブスクリプションを更新する
///
/// idと作成日時は書き換えない。
pub fn update(conn: &Connection, subscription: &Subscription) -> AppResult<Subscription> {
    let rows_affected = conn.execute(
        "UPDATE subscriptions
         SET name = ?1, price = ?2, billing_cycle = ?3, next_payment_date = ?4
         WHERE id = ?5",
        params![
            subscription.name,
            subscription.price,
            subscription.billing_cycle.as_str(),
            subscription.next_payment_date,
            subscription.id
        ],
    )?;

    if rows_affected == 0 {
        return Err(not_found(subscription.id));
    }

    find_by_id(conn, subscription.id)
}

/// サブスクリプションを削除する
pub fn delete(conn: &Connection, id: i64) -> AppResult<()> {
    let rows_affected = conn.execute("DELETE FROM subscriptions WHERE id = ?1", params![id])?;

    if rows_affected == 0 {
        return Err(not_found(id));
    }

    log::debug!("サブスクリプションを削除しました: id={id}");
    Ok(())
}

fn map_row(row: &Row<'_>) -> rusqlite::Result<Subscription> {
    let billing_cycle: String = row.get(3)?;
    let next_payment_date: NaiveDate = row.get(4)?;

    Ok(Subscription {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        billing_cycle: BillingCycle::from(billing_cycle.as_str()),
        next_payment_date,
        created_at: row.get(5)?,
    })
}

fn not_found(id: i64) -> AppError {
    AppError::not_found(format!("ID {id} のサブスクリプション"))
}
