use crate::shared::errors::AppResult;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use tokio::net::{TcpListener, TcpStream};

/// HTTPサーバーを実行する
///
/// 接続ごとにタスクを起動し、`shutdown`が完了するまで接続を受け付け続ける。
/// 個々の接続で発生したエラーはログに記録するだけで、待ち受けは止めない。
///
/// # 引数
/// * `listener` - バインド済みのTCPリスナー
/// * `handler` - リクエストを受け取りレスポンスを返す関数
/// * `shutdown` - 完了したら待ち受けを終了するFuture
pub async fn serve<H, Fut, S>(listener: TcpListener, handler: H, shutdown: S) -> AppResult<()>
where
    H: Fn(Request<Incoming>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Response<String>> + Send + 'static,
    S: Future<Output = ()>,
{
    let addr = listener.local_addr()?;
    log::info!("HTTPサーバーを開始しました: http://{addr}");

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    log::trace!("接続を受け付けました: {peer}");
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        handle_connection(stream, handler).await;
                    });
                }
                Err(e) => {
                    log::error!("接続受け入れエラー: {e}");
                }
            },
            _ = &mut shutdown => {
                log::info!("シャットダウン要求を受け付けました。待ち受けを終了します");
                break;
            }
        }
    }

    Ok(())
}

/// TCP接続を処理する
async fn handle_connection<H, Fut>(stream: TcpStream, handler: H)
where
    H: Fn(Request<Incoming>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response<String>> + Send + 'static,
{
    let io = TokioIo::new(stream);

    let service = service_fn(move |req| {
        let response = handler(req);
        async move { Ok::<_, Infallible>(response.await) }
    });

    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
        log::error!("HTTP接続処理エラー: {err}");
    }
}
