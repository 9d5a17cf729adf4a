use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match subscription_ledger_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // ログシステムの初期化前に失敗した場合に備えて標準エラーにも出す
            eprintln!("起動に失敗しました: {e}");
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
