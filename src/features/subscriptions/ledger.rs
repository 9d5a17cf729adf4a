//! サブスクリプション台帳
//!
//! フォーム入力の検証、月額合計と残り日数の計算、編集内容の適用を行う。
//! すべて純粋関数で、データベースには触れない。

use super::models::{
    BillingCycle, Dashboard, DashboardEntry, NewSubscription, Subscription, SubscriptionForm,
};
use crate::shared::errors::ValidationError;
use chrono::NaiveDate;

/// サービス名の最大文字数
pub const MAX_NAME_LENGTH: usize = 100;

/// 価格の上限（週払いを月額換算しても合計が有限に収まる範囲）
pub const MAX_PRICE: f64 = 1_000_000_000_000.0;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// フォームの生の値を検証し、新規サブスクリプションに変換する
///
/// # 引数
/// * `name` - サービス名
/// * `price_raw` - 価格（文字列）
/// * `billing_cycle` - 支払いサイクル
/// * `date_raw` - 次回支払日（YYYY-MM-DD）
///
/// # 戻り値
/// 検証済みのサブスクリプション、または最初に見つかった検証エラー
///
/// # 検証順序
/// 1. 未入力の項目
/// 2. 日付の形式
/// 3. 価格
/// 4. サービス名の長さ
pub fn validate_and_parse(
    name: Option<&str>,
    price_raw: Option<&str>,
    billing_cycle: Option<&str>,
    date_raw: Option<&str>,
) -> Result<NewSubscription, ValidationError> {
    let name = required(name, "サービス名")?;
    let price_raw = required(price_raw, "価格")?;
    let billing_cycle = required(billing_cycle, "支払いサイクル")?;
    let date_raw = required(date_raw, "次回支払日")?;

    let next_payment_date = parse_date(date_raw)?;
    let price = parse_price(price_raw)?;

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong {
            max: MAX_NAME_LENGTH,
        });
    }

    Ok(NewSubscription {
        name: name.to_string(),
        price,
        billing_cycle: BillingCycle::from(billing_cycle),
        next_payment_date,
    })
}

/// `SubscriptionForm`をそのまま検証する
pub fn validate_form(form: &SubscriptionForm) -> Result<NewSubscription, ValidationError> {
    validate_and_parse(
        form.name.as_deref(),
        form.price.as_deref(),
        form.billing_cycle.as_deref(),
        form.next_payment_date.as_deref(),
    )
}

/// 一覧表示用のデータを計算する
///
/// 各サブスクリプションに残り日数（期限切れは負数）と月額換算を付け、
/// 月額合計は小数点以下を切り捨てた整数で返す。
pub fn compute_dashboard(subscriptions: &[Subscription], today: NaiveDate) -> Dashboard {
    let entries: Vec<DashboardEntry> = subscriptions
        .iter()
        .map(|sub| DashboardEntry {
            subscription: sub.clone(),
            days_left: days_until(sub.next_payment_date, today),
            monthly_cost: sub.billing_cycle.monthly_equivalent(sub.price),
        })
        .collect();

    let total = entries.iter().fold(0.0, |acc, entry| acc + entry.monthly_cost);

    Dashboard {
        entries,
        total_monthly_cost: total.trunc() as i64,
    }
}

/// 次回支払日までの日数
pub fn days_until(next_payment_date: NaiveDate, today: NaiveDate) -> i64 {
    (next_payment_date - today).num_days()
}

/// 既存のサブスクリプションに編集内容を適用する
///
/// idと作成日時以外のすべての項目を置き換える。検証に失敗した場合は
/// 既存の値には一切手を付けない。
pub fn apply_edit(
    existing: &Subscription,
    name: Option<&str>,
    price_raw: Option<&str>,
    billing_cycle: Option<&str>,
    date_raw: Option<&str>,
) -> Result<Subscription, ValidationError> {
    let parsed = validate_and_parse(name, price_raw, billing_cycle, date_raw)?;

    Ok(Subscription {
        id: existing.id,
        name: parsed.name,
        price: parsed.price,
        billing_cycle: parsed.billing_cycle,
        next_payment_date: parsed.next_payment_date,
        created_at: existing.created_at.clone(),
    })
}

/// 空白のみの入力は未入力として扱う。値そのものは加工せずに返す
fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField { field }),
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 && price <= MAX_PRICE => Ok(price),
        _ => Err(ValidationError::InvalidPrice(raw.to_string())),
    }
}
