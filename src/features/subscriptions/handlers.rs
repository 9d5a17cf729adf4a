use super::ledger;
use super::models::SubscriptionForm;
use super::views::{self, FormPage};
use crate::shared::errors::{AppError, ErrorSeverity};
use crate::shared::http::response;
use crate::AppState;
use hyper::{Response, StatusCode};

const ADD_TITLE: &str = "サブスクリプションを追加";
const EDIT_TITLE: &str = "サブスクリプションを編集";

/// 一覧画面
///
/// 全件を取得し、今日の日付で残り日数と月額合計を計算して描画する。
pub fn index(state: &AppState) -> Response<String> {
    match state.store.list() {
        Ok(subscriptions) => {
            let dashboard = ledger::compute_dashboard(&subscriptions, state.today());
            response::html(StatusCode::OK, views::render_index(&dashboard))
        }
        Err(e) => failure(&e),
    }
}

/// 一覧データのJSON
pub fn dashboard_json(state: &AppState) -> Response<String> {
    match state.store.list() {
        Ok(subscriptions) => {
            let dashboard = ledger::compute_dashboard(&subscriptions, state.today());
            response::json(StatusCode::OK, &dashboard)
        }
        Err(e) => {
            log::error!("一覧の取得に失敗しました: {e}");
            response::json_error(e.status_code(), &e.user_message())
        }
    }
}

/// 空の追加フォーム
pub fn add_form() -> Response<String> {
    render_form(ADD_TITLE, "/add", &SubscriptionForm::default(), None)
}

/// 追加フォームの送信
///
/// # 戻り値
/// 成功時は一覧へのリダイレクト、入力エラー時はメッセージ付きのフォーム
pub fn add_submit(state: &AppState, form: SubscriptionForm) -> Response<String> {
    let new_subscription = match ledger::validate_form(&form) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::warn!("入力エラーのため追加を中止しました: {e}");
            return render_form(ADD_TITLE, "/add", &form, Some(&e.to_string()));
        }
    };

    match state.store.insert(new_subscription) {
        Ok(created) => {
            log::info!("サブスクリプションを追加しました: id={}, name={}", created.id, created.name);
            response::redirect("/")
        }
        Err(e) => failure(&e),
    }
}

/// 既存の値を入れた編集フォーム
pub fn edit_form(state: &AppState, id: i64) -> Response<String> {
    match state.store.get(id) {
        Ok(existing) => {
            let form = SubscriptionForm::from_subscription(&existing);
            render_form(EDIT_TITLE, &format!("/edit/{id}"), &form, None)
        }
        Err(e) => failure(&e),
    }
}

/// 編集フォームの送信
pub fn edit_submit(state: &AppState, id: i64, form: SubscriptionForm) -> Response<String> {
    let existing = match state.store.get(id) {
        Ok(existing) => existing,
        Err(e) => return failure(&e),
    };

    let edited = match ledger::apply_edit(
        &existing,
        form.name.as_deref(),
        form.price.as_deref(),
        form.billing_cycle.as_deref(),
        form.next_payment_date.as_deref(),
    ) {
        Ok(edited) => edited,
        Err(e) => {
            log::warn!("入力エラーのため更新を中止しました: id={id}, {e}");
            return render_form(EDIT_TITLE, &format!("/edit/{id}"), &form, Some(&e.to_string()));
        }
    };

    match state.store.update(&edited) {
        Ok(updated) => {
            log::info!("サブスクリプションを更新しました: id={}", updated.id);
            response::redirect("/")
        }
        Err(e) => failure(&e),
    }
}

/// サブスクリプションの削除
///
/// ストレージのエラーは常にここで捕捉し、プレーンテキストで返す。
pub fn delete(state: &AppState, id: i64) -> Response<String> {
    match state.store.delete(id) {
        Ok(()) => {
            log::info!("サブスクリプションを削除しました: id={id}");
            response::redirect("/")
        }
        Err(e @ AppError::NotFound(_)) => failure(&e),
        Err(e) => {
            log::error!("削除に失敗しました: id={id}, {e}");
            response::text(StatusCode::INTERNAL_SERVER_ERROR, "削除時にエラーが発生しました")
        }
    }
}

fn render_form(
    title: &str,
    action: &str,
    form: &SubscriptionForm,
    error: Option<&str>,
) -> Response<String> {
    let page = FormPage {
        title,
        action,
        form,
        error,
    };
    response::html(StatusCode::OK, views::render_form(&page))
}

/// 入力エラー以外の失敗をレスポンスに変換する
pub(crate) fn failure(error: &AppError) -> Response<String> {
    match error.severity() {
        ErrorSeverity::Low => log::debug!("{error}"),
        ErrorSeverity::Medium => log::warn!("リクエストの処理に失敗しました: {error}"),
        ErrorSeverity::High | ErrorSeverity::Critical => {
            log::error!("リクエストの処理に失敗しました: {error}")
        }
    }
    response::text(error.status_code(), error.user_message())
}
