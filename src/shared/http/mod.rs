/// リクエストボディとパスの解析
pub mod request;

/// レスポンス生成ヘルパー
pub mod response;

/// hyperによるHTTPサーバー
pub mod server;

pub use server::serve;
