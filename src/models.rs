//! Wire payloads from the feed and poll endpoint, and the shapes they are
//! normalized into.

use serde::{Deserialize, Deserializer};

/// Exchange fields arrive as JSON numbers or as numeric strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Numeric value; an empty string counts as zero, junk text as NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) if s.trim().is_empty() => 0.0,
            Numeric::Text(s) => s.trim().parse().unwrap_or(f64::NAN),
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            Numeric::Number(n) => *n != 0.0 && !n.is_nan(),
            Numeric::Text(s) => !s.is_empty(),
        }
    }
}

/// Keeps an explicit `null` apart from a missing key: missing is `None`,
/// `null` is `Some(None)`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// `<symbol>@markPrice@1s` stream event. Only the fields the ticker shows.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkPriceEvent {
    #[serde(rename = "T", default, deserialize_with = "present")]
    pub next_funding_time: Option<Option<Numeric>>,
    #[serde(rename = "s", default, deserialize_with = "present")]
    pub symbol: Option<Option<String>>,
    #[serde(rename = "p", default, deserialize_with = "present")]
    pub mark_price: Option<Option<Numeric>>,
}

/// `GET /fapi/v1/premiumIndex` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumIndex {
    pub next_funding_time: Option<Numeric>,
    pub symbol: Option<String>,
    pub mark_price: Option<Numeric>,
}

/// A source-independent set of field updates; `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarketUpdate {
    pub funding_time: Option<Numeric>,
    pub symbol: Option<String>,
    pub mark_price: Option<Numeric>,
}

impl MarketUpdate {
    pub fn parse_stream(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<MarkPriceEvent>(text).map(Self::from)
    }
}

/// A `null` stream field still counts as an update: numbers read as zero
/// (unknown funding time, zero price) and the symbol as blank.
impl From<MarkPriceEvent> for MarketUpdate {
    fn from(event: MarkPriceEvent) -> Self {
        let zero = || Numeric::Number(0.0);
        Self {
            funding_time: event.next_funding_time.map(|v| v.unwrap_or_else(zero)),
            symbol: event.symbol.map(Option::unwrap_or_default),
            mark_price: event.mark_price.map(|v| v.unwrap_or_else(zero)),
        }
    }
}

/// Poll responses only apply fields that carry a value; `nextFundingTime: 0`
/// (no scheduled funding) and blank strings are skipped.
impl From<PremiumIndex> for MarketUpdate {
    fn from(index: PremiumIndex) -> Self {
        Self {
            funding_time: index.next_funding_time.filter(Numeric::is_truthy),
            symbol: index.symbol.filter(|s| !s.is_empty()),
            mark_price: index.mark_price.filter(Numeric::is_truthy),
        }
    }
}

/// Read-only view of the ticker state handed out to callers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickerSnapshot {
    pub next_funding_ms: Option<i64>,
    pub quote: Option<String>,
    pub last_mark_price: Option<f64>,
}
