//! サーバーサイドで描画するHTMLページ

use super::models::{BillingCycle, Dashboard, DashboardEntry, SubscriptionForm};

/// フォーム画面の描画に必要な情報
pub struct FormPage<'a> {
    /// 見出し（「サブスクリプションを追加」など）
    pub title: &'a str,
    /// 送信先のパス
    pub action: &'a str,
    /// フォームの初期値
    pub form: &'a SubscriptionForm,
    /// 表示するエラーメッセージ
    pub error: Option<&'a str>,
}

const STYLE: &str = r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            max-width: 880px;
            margin: 2rem auto;
            padding: 0 1rem;
            color: #1f2937;
        }
        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 0.5rem; border-bottom: 1px solid #e5e7eb; }
        .total { font-size: 1.4rem; margin: 1rem 0; }
        .overdue { color: #dc2626; font-weight: bold; }
        .today { color: #d97706; font-weight: bold; }
        .error { color: #dc2626; background: #fee2e2; padding: 0.75rem; border-radius: 0.5rem; }
        label { display: block; margin-top: 1rem; }
        input, select { padding: 0.4rem; width: 100%; max-width: 320px; }
        button { margin-top: 1.5rem; padding: 0.5rem 1.5rem; }
"#;

/// 一覧画面を描画する
pub fn render_index(dashboard: &Dashboard) -> String {
    let rows: String = dashboard.entries.iter().map(render_row).collect();

    let table = if dashboard.entries.is_empty() {
        r#"<p>登録されているサブスクリプションはありません。</p>"#.to_string()
    } else {
        format!(
            r#"<table>
        <thead>
            <tr><th>サービス名</th><th>価格</th><th>支払いサイクル</th><th>次回支払日</th><th>残り日数</th><th></th></tr>
        </thead>
        <tbody>{rows}
        </tbody>
    </table>"#
        )
    };

    layout(
        "サブスクリプション一覧",
        &format!(
            r#"<h1>サブスクリプション一覧</h1>
    <p class="total">月額合計: <strong>{total}</strong></p>
    <p><a href="/add">＋ 新規追加</a></p>
    {table}"#,
            total = dashboard.total_monthly_cost,
        ),
    )
}

fn render_row(entry: &DashboardEntry) -> String {
    let sub = &entry.subscription;
    format!(
        r#"
            <tr>
                <td>{name}</td>
                <td>{price}</td>
                <td>{cycle}</td>
                <td>{date}</td>
                <td>{days}</td>
                <td><a href="/edit/{id}">編集</a> | <a href="/delete/{id}" onclick="return confirm('削除しますか？');">削除</a></td>
            </tr>"#,
        name = escape_html(&sub.name),
        price = sub.price,
        cycle = escape_html(sub.billing_cycle.as_str()),
        date = sub.next_payment_date.format("%Y-%m-%d"),
        days = render_days_left(entry.days_left),
        id = sub.id,
    )
}

fn render_days_left(days_left: i64) -> String {
    match days_left {
        d if d < 0 => format!(r#"<span class="overdue">{}日超過</span>"#, -d),
        0 => r#"<span class="today">今日</span>"#.to_string(),
        d => format!("あと{d}日"),
    }
}

/// 追加・編集フォームを描画する
pub fn render_form(page: &FormPage<'_>) -> String {
    let form = page.form;
    let error = page
        .error
        .map(|msg| format!(r#"<p class="error">{}</p>"#, escape_html(msg)))
        .unwrap_or_default();

    layout(
        page.title,
        &format!(
            r#"<h1>{title}</h1>
    {error}
    <form method="post" action="{action}">
        <label>サービス名
            <input type="text" name="name" maxlength="100" value="{name}">
        </label>
        <label>価格
            <input type="text" name="price" inputmode="decimal" value="{price}">
        </label>
        <label>支払いサイクル
            <select name="billing_cycle">{options}
            </select>
        </label>
        <label>次回支払日
            <input type="date" name="next_payment_date" value="{date}">
        </label>
        <button type="submit">保存</button>
    </form>
    <p><a href="/">一覧に戻る</a></p>"#,
            title = escape_html(page.title),
            action = escape_html(page.action),
            name = escape_html(form.name.as_deref().unwrap_or("")),
            price = escape_html(form.price.as_deref().unwrap_or("")),
            options = render_cycle_options(form.billing_cycle.as_deref()),
            date = escape_html(form.next_payment_date.as_deref().unwrap_or("")),
        ),
    )
}

/// 支払いサイクルの選択肢
///
/// 既存データに選択肢外の値があれば、それも選択済みの項目として残す。
fn render_cycle_options(selected: Option<&str>) -> String {
    let mut options: String = BillingCycle::CHOICES
        .iter()
        .map(|cycle| {
            let label = cycle.as_str();
            let attr = if selected == Some(label) { " selected" } else { "" };
            format!(r#"
                <option value="{label}"{attr}>{label}</option>"#)
        })
        .collect();

    if let Some(other) = selected
        .filter(|s| !s.is_empty())
        .filter(|s| matches!(BillingCycle::from(*s), BillingCycle::Other(_)))
    {
        let other = escape_html(other);
        options.push_str(&format!(r#"
                <option value="{other}" selected>{other}</option>"#));
    }

    options
}

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ja">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - サブスク管理</title>
    <style>{STYLE}</style>
</head>
<body>
    {content}
</body>
</html>"#,
        title = escape_html(title),
    )
}

/// HTMLの特殊文字をエスケープする
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::subscriptions::models::Subscription;
    use chrono::NaiveDate;

    fn entry(name: &str, days_left: i64) -> DashboardEntry {
        DashboardEntry {
            subscription: Subscription {
                id: 5,
                name: name.to_string(),
                price: 270.0,
                billing_cycle: BillingCycle::Monthly,
                next_payment_date: NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(),
                created_at: "2024-01-01T00:00:00+09:00".to_string(),
            },
            days_left,
            monthly_cost: 270.0,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Netflix"), "Netflix");
    }

    #[test]
    fn test_render_index() {
        let dashboard = Dashboard {
            entries: vec![entry("Netflix", 10)],
            total_monthly_cost: 270,
        };

        let html = render_index(&dashboard);
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("月額合計: <strong>270</strong>"));
        assert!(html.contains("Netflix"));
        assert!(html.contains("2024-04-01"));
        assert!(html.contains("あと10日"));
        assert!(html.contains(r#"href="/edit/5""#));
        assert!(html.contains(r#"href="/delete/5""#));
    }

    #[test]
    fn test_render_index_escapes_names() {
        let dashboard = Dashboard {
            entries: vec![entry("<b>Evil</b>", 0)],
            total_monthly_cost: 270,
        };

        let html = render_index(&dashboard);
        assert!(html.contains("&lt;b&gt;Evil&lt;/b&gt;"));
        assert!(!html.contains("<b>Evil</b>"));
    }

    #[test]
    fn test_render_empty_index() {
        let html = render_index(&Dashboard {
            entries: vec![],
            total_monthly_cost: 0,
        });
        assert!(html.contains("登録されているサブスクリプションはありません"));
    }

    #[test]
    fn test_render_days_left() {
        assert!(render_days_left(-5).contains("5日超過"));
        assert!(render_days_left(0).contains("今日"));
        assert_eq!(render_days_left(3), "あと3日");
    }

    #[test]
    fn test_render_form_with_error_and_values() {
        let form = SubscriptionForm {
            name: Some("Spotify".to_string()),
            price: Some("abc".to_string()),
            billing_cycle: Some("Yearly".to_string()),
            next_payment_date: Some("2024-05-01".to_string()),
        };
        let html = render_form(&FormPage {
            title: "サブスクリプションを追加",
            action: "/add",
            form: &form,
            error: Some("価格は正の数値で入力してください: abc"),
        });

        assert!(html.contains(r#"action="/add""#));
        assert!(html.contains(r#"class="error""#));
        assert!(html.contains(r#"value="Spotify""#));
        assert!(html.contains(r#"<option value="Yearly" selected>Yearly</option>"#));
        assert!(html.contains(r#"<option value="Monthly">Monthly</option>"#));
    }

    #[test]
    fn test_render_form_keeps_unknown_cycle() {
        let form = SubscriptionForm {
            billing_cycle: Some("Daily".to_string()),
            ..Default::default()
        };
        let html = render_form(&FormPage {
            title: "編集",
            action: "/edit/1",
            form: &form,
            error: None,
        });

        assert!(html.contains(r#"<option value="Daily" selected>Daily</option>"#));
        assert!(!html.contains(r#"class="error""#));
    }
}
