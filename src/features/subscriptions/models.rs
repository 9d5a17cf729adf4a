use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use std::fmt;

/// 支払いサイクル
///
/// 認識できない値は`Other`として元の文字列のまま保持し、月額合計には含めない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingCycle {
    Monthly,
    Yearly,
    Weekly,
    Other(String),
}

impl BillingCycle {
    /// フォームの選択肢として表示するサイクル
    pub const CHOICES: [BillingCycle; 3] =
        [BillingCycle::Monthly, BillingCycle::Yearly, BillingCycle::Weekly];

    /// 保存・表示用のラベル
    pub fn as_str(&self) -> &str {
        match self {
            BillingCycle::Monthly => "Monthly",
            BillingCycle::Yearly => "Yearly",
            BillingCycle::Weekly => "Weekly",
            BillingCycle::Other(label) => label,
        }
    }

    /// 価格を月額相当に換算する
    pub fn monthly_equivalent(&self, price: f64) -> f64 {
        match self {
            BillingCycle::Monthly => price,
            BillingCycle::Yearly => price / 12.0,
            BillingCycle::Weekly => price * 4.0,
            BillingCycle::Other(_) => 0.0,
        }
    }
}

impl From<&str> for BillingCycle {
    fn from(label: &str) -> Self {
        match label {
            "Monthly" => BillingCycle::Monthly,
            "Yearly" => BillingCycle::Yearly,
            "Weekly" => BillingCycle::Weekly,
            other => BillingCycle::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BillingCycle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// サブスクリプションデータモデル
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Subscription {
    pub id: i64,
    pub name: String,                 // サービス名、100文字以内
    pub price: f64,                   // 正の数値
    pub billing_cycle: BillingCycle,  // "Monthly" / "Yearly" / "Weekly"
    pub next_payment_date: NaiveDate, // YYYY-MM-DD
    pub created_at: String,           // RFC3339形式
}

/// 検証済みの新規サブスクリプション（idと作成日時はストレージ側で採番する）
#[derive(Debug, Clone, PartialEq)]
pub struct NewSubscription {
    pub name: String,
    pub price: f64,
    pub billing_cycle: BillingCycle,
    pub next_payment_date: NaiveDate,
}

/// 送信されたフォームの生の値
///
/// エラー時に入力内容をフォームへ戻すためにも使う。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionForm {
    pub name: Option<String>,
    pub price: Option<String>,
    pub billing_cycle: Option<String>,
    pub next_payment_date: Option<String>,
}

impl SubscriptionForm {
    /// `application/x-www-form-urlencoded` のキーと値の組から組み立てる
    ///
    /// 未知のキーは無視し、同じキーが複数ある場合は最後の値を採用する。
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "name" => &mut form.name,
                "price" => &mut form.price,
                "billing_cycle" => &mut form.billing_cycle,
                "next_payment_date" => &mut form.next_payment_date,
                _ => continue,
            };
            *slot = Some(value.into());
        }
        form
    }

    /// 既存のサブスクリプションから編集フォームの初期値を作る
    pub fn from_subscription(subscription: &Subscription) -> Self {
        Self {
            name: Some(subscription.name.clone()),
            price: Some(subscription.price.to_string()),
            billing_cycle: Some(subscription.billing_cycle.as_str().to_string()),
            next_payment_date: Some(subscription.next_payment_date.format("%Y-%m-%d").to_string()),
        }
    }
}

/// 一覧表示用に残り日数と月額換算を付加したサブスクリプション
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct DashboardEntry {
    pub subscription: Subscription,
    pub days_left: i64,
    pub monthly_cost: f64,
}

/// 一覧画面のデータ
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Dashboard {
    pub entries: Vec<DashboardEntry>,
    /// 月額合計（小数点以下切り捨て）
    pub total_monthly_cost: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_billing_cycle_labels() {
        assert_eq!(BillingCycle::from("Monthly"), BillingCycle::Monthly);
        assert_eq!(BillingCycle::from("Yearly"), BillingCycle::Yearly);
        assert_eq!(BillingCycle::from("Weekly"), BillingCycle::Weekly);
        // 大文字小文字は区別する
        assert_eq!(
            BillingCycle::from("monthly"),
            BillingCycle::Other("monthly".to_string())
        );
        assert_eq!(BillingCycle::Other("Daily".to_string()).as_str(), "Daily");
    }

    #[test]
    fn test_monthly_equivalent() {
        assert_eq!(BillingCycle::Monthly.monthly_equivalent(270.0), 270.0);
        assert_eq!(BillingCycle::Yearly.monthly_equivalent(1680.0), 140.0);
        assert_eq!(BillingCycle::Weekly.monthly_equivalent(100.0), 400.0);
        assert_eq!(
            BillingCycle::Other("Daily".to_string()).monthly_equivalent(500.0),
            0.0
        );
    }

    #[test]
    fn test_form_from_pairs() {
        let form = SubscriptionForm::from_pairs(vec![
            ("name", "Netflix"),
            ("price", "270"),
            ("csrf", "ignored"),
            ("billing_cycle", "Monthly"),
        ]);

        assert_eq!(form.name.as_deref(), Some("Netflix"));
        assert_eq!(form.price.as_deref(), Some("270"));
        assert_eq!(form.billing_cycle.as_deref(), Some("Monthly"));
        assert!(form.next_payment_date.is_none());
    }

    #[test]
    fn test_billing_cycle_serializes_as_label() {
        let json = serde_json::to_string(&BillingCycle::Yearly).unwrap();
        assert_eq!(json, "\"Yearly\"");
    }
}
