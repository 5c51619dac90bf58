use crate::errors::Result;
use crate::feed::SnapshotSource;
use crate::models::PremiumIndex;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

pub const BINANCE_FUTURES_REST_ENDPOINT: &str = "https://fapi.binance.com";

/// `GET /fapi/v1/premiumIndex?symbol=...` poller.
#[derive(Debug, Clone)]
pub struct BinancePremiumIndex {
    client: Client,
    base_url: Url,
}

impl BinancePremiumIndex {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }
}

pub fn premium_index_url(base_url: &Url, symbol: &str) -> Result<Url> {
    let mut url = base_url.join("/fapi/v1/premiumIndex")?;
    url.query_pairs_mut().append_pair("symbol", symbol);
    Ok(url)
}

#[async_trait]
impl SnapshotSource for BinancePremiumIndex {
    async fn fetch(&self, symbol: &str) -> Result<PremiumIndex> {
        let url = premium_index_url(&self.base_url, symbol)?;
        debug!(%url, "[POLL] requesting premium index");
        let response = self.client.get(url).send().await?.error_for_status()?;
        let index = response.json::<PremiumIndex>().await?;
        Ok(index)
    }
}
