use hyper::StatusCode;
use thiserror::Error;

/// フォーム入力の検証エラー
///
/// いずれもユーザーが再入力すれば回復できるエラーで、
/// フォームを再表示する際のメッセージとして使われる。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// 必須項目が未入力
    #[error("{field}は必須項目です")]
    MissingField { field: &'static str },

    /// 日付が YYYY-MM-DD 形式ではない
    #[error("日付の形式が正しくありません: {0}")]
    InvalidDate(String),

    /// 価格が正の数値ではない、または上限を超えている
    #[error("価格は1兆以下の正の数値で入力してください: {0}")]
    InvalidPrice(String),

    /// サービス名が長すぎる
    #[error("サービス名は{max}文字以内で入力してください")]
    NameTooLong { max: usize },
}

/// アプリケーション全体で使用される統一エラー型
#[derive(Debug, Error)]
pub enum AppError {
    /// 入力値の検証エラー
    #[error("バリデーションエラー: {0}")]
    Validation(#[from] ValidationError),

    /// リソースが見つからない場合のエラー
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// データベース関連のエラー
    #[error("データベースエラー: {0}")]
    Database(String),

    /// 設定関連のエラー
    #[error("設定エラー: {0}")]
    Configuration(String),

    /// 並行処理関連のエラー
    #[error("並行処理エラー: {0}")]
    Concurrency(String),

    /// HTTPサーバー関連のエラー
    #[error("HTTPエラー: {0}")]
    Http(String),

    /// リクエストボディが上限を超えた
    #[error("リクエストボディが大きすぎます（上限 {0} バイト）")]
    PayloadTooLarge(usize),

    /// I/O関連のエラー
    #[error("I/Oエラー: {0}")]
    Io(#[from] std::io::Error),
}

/// エラーの重要度を表す列挙型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// 低重要度（ユーザー入力エラーなど）
    Low,
    /// 中重要度（I/Oエラーなど）
    Medium,
    /// 高重要度（データベースエラーなど）
    High,
    /// 最重要（起動を継続できない設定エラーなど）
    Critical,
}

impl AppError {
    /// ユーザーに表示するためのメッセージを取得
    ///
    /// 内部の詳細（SQLやファイルパス）はここには含めない。
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Database(_) => "データベース操作でエラーが発生しました".to_string(),
            AppError::Configuration(msg) => format!("設定エラー: {msg}"),
            AppError::Concurrency(_) => "並行処理でエラーが発生しました".to_string(),
            AppError::Http(_) => "通信処理でエラーが発生しました".to_string(),
            AppError::PayloadTooLarge(_) => self.to_string(),
            AppError::Io(_) => "ファイル操作でエラーが発生しました".to_string(),
        }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AppError::Validation(_) => ErrorSeverity::Low,
            AppError::NotFound(_) => ErrorSeverity::Low,
            AppError::Database(_) => ErrorSeverity::High,
            AppError::Configuration(_) => ErrorSeverity::Critical,
            AppError::Concurrency(_) => ErrorSeverity::High,
            AppError::Http(_) => ErrorSeverity::Medium,
            AppError::PayloadTooLarge(_) => ErrorSeverity::Low,
            AppError::Io(_) => ErrorSeverity::Medium,
        }
    }

    /// HTTPレスポンスのステータスコードに対応付ける
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// リソース未発見エラーを作成するヘルパー関数
    ///
    /// # 引数
    /// * `resource` - 見つからなかったリソース名
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        AppError::NotFound(format!("{}が見つかりません", resource.into()))
    }

    /// 設定エラーを作成するヘルパー関数
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        AppError::Configuration(message.into())
    }

    /// 並行処理エラーを作成するヘルパー関数
    pub fn concurrency<S: Into<String>>(message: S) -> Self {
        AppError::Concurrency(message.into())
    }
}

/// rusqlite::ErrorからAppErrorへの変換
impl From<rusqlite::Error> for AppError {
    fn from(error: rusqlite::Error) -> Self {
        AppError::Database(error.to_string())
    }
}

/// Result型のエイリアス（アプリケーション全体で使用）
pub type AppResult<T> = Result<T, AppError>;
