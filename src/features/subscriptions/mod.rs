/// サブスクリプション機能モジュール
///
/// このモジュールは、サブスクリプション管理に関連するすべての機能を提供します：
/// - フォーム入力の検証と変換
/// - 月額合計と次回支払日までの残り日数の計算
/// - サブスクリプションの作成、読み取り、更新、削除
/// - 一覧・追加・編集画面の描画とルーティング
pub mod handlers;
mod integration_tests;
pub mod ledger;
pub mod models;
pub mod repository;
pub mod routes;
pub mod views;

// 公開インターフェース
pub use ledger::{apply_edit, compute_dashboard, validate_and_parse, validate_form};

pub use models::{
    BillingCycle, Dashboard, DashboardEntry, NewSubscription, Subscription, SubscriptionForm,
};

pub use repository::{SqliteSubscriptionStore, SubscriptionStore};

pub use routes::route;
