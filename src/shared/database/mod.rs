/// データベース接続とテーブル作成
pub mod connection;

pub use connection::{create_tables, initialize_database, seed_demo_data};
