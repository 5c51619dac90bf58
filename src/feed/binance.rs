use crate::errors::Result;
use crate::feed::{FeedStream, MarkPriceFeed};
use async_trait::async_trait;
use futures::{Stream, StreamExt, future};
use std::time::Duration;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::debug;
use url::Url;

pub const BINANCE_FUTURES_WS_ENDPOINT: &str = "wss://fstream.binance.com";

/// Upper bound on the TCP + TLS + upgrade handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// USD-M futures `<symbol>@markPrice@1s` stream.
#[derive(Debug, Clone)]
pub struct BinanceMarkPriceFeed {
    base_url: Url,
    connect_timeout: Duration,
}

impl BinanceMarkPriceFeed {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: CONNECT_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }
}

pub fn mark_price_stream_url(base_url: &Url, symbol: &str) -> Result<Url> {
    let base = base_url.as_str().trim_end_matches('/');
    let url = Url::parse(&format!("{base}/ws/{}@markPrice@1s", symbol.to_lowercase()))?;
    Ok(url)
}

/// Pass items through up to and including the first `Err`, then end.
/// A socket that reported a transport error is unusable afterwards.
pub fn end_after_error<S, T, E>(items: S) -> impl Stream<Item = std::result::Result<T, E>>
where
    S: Stream<Item = std::result::Result<T, E>>,
{
    items.scan(false, |failed, item| {
        let next = if *failed {
            None
        } else {
            *failed = item.is_err();
            Some(item)
        };
        future::ready(next)
    })
}

#[async_trait]
impl MarkPriceFeed for BinanceMarkPriceFeed {
    async fn connect(&self, symbol: &str) -> Result<FeedStream> {
        let url = mark_price_stream_url(&self.base_url, symbol)?;
        debug!(%url, "[FEED] connecting");
        let (ws_stream, _resp) =
            tokio::time::timeout(self.connect_timeout, connect_async(url.as_str())).await??;

        let frames = end_after_error(ws_stream).filter_map(|msg_res| async move {
            match msg_res {
                Ok(Message::Text(txt)) => Some(Ok(txt)),
                Ok(Message::Close(frame)) => {
                    debug!(?frame, "[FEED] close frame received");
                    None
                }
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            }
        });
        Ok(frames.boxed())
    }
}
