//! Output sinks and the renderer that writes formatted values into them.

use crate::format::{self, LocalZone, PLACEHOLDER};
use parking_lot::Mutex;
use std::sync::Arc;

/// Connection state shown by the status indicators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Live,
    Disconnected,
}

impl ConnectionStatus {
    pub fn label(self) -> &'static str {
        match self {
            ConnectionStatus::Live => "Live",
            ConnectionStatus::Disconnected => "Disconnected",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            ConnectionStatus::Live => "#bc13fe",
            ConnectionStatus::Disconnected => "red",
        }
    }
}

/// A place a single line of text is written to.
pub trait TextSink: Send + Sync {
    fn set_text(&self, text: &str);
}

/// Something that reflects the connection status (a coloured dot, a panel).
pub trait StatusIndicator: Send + Sync {
    fn set_status(&self, status: ConnectionStatus);
}

/// Caller-owned outputs. Every target is optional; a missing one is skipped.
#[derive(Clone, Default)]
pub struct DisplayTargets {
    pub funding_time: Option<Arc<dyn TextSink>>,
    pub hours: Option<Arc<dyn TextSink>>,
    pub minutes: Option<Arc<dyn TextSink>>,
    pub seconds: Option<Arc<dyn TextSink>>,
    pub status_dot: Option<Arc<dyn StatusIndicator>>,
    pub status_text: Option<Arc<dyn TextSink>>,
    pub countdown: Option<Arc<dyn StatusIndicator>>,
    pub mark_price: Option<Arc<dyn TextSink>>,
    pub symbol: Option<Arc<dyn TextSink>>,
    pub quote_badge: Option<Arc<dyn TextSink>>,
}

fn write(sink: &Option<Arc<dyn TextSink>>, text: &str) {
    if let Some(sink) = sink {
        sink.set_text(text);
    }
}

/// Writes formatted values into [`DisplayTargets`].
#[derive(Clone, Default)]
pub struct Renderer {
    targets: DisplayTargets,
    zone: LocalZone,
}

impl Renderer {
    pub fn new(targets: DisplayTargets, zone: LocalZone) -> Self {
        Self { targets, zone }
    }

    pub fn funding_time(&self, ms: Option<i64>) {
        if self.targets.funding_time.is_some() {
            write(&self.targets.funding_time, &self.zone.format(ms));
        }
    }

    pub fn countdown(&self, hours: &str, minutes: &str, seconds: &str) {
        write(&self.targets.hours, hours);
        write(&self.targets.minutes, minutes);
        write(&self.targets.seconds, seconds);
    }

    pub fn countdown_unknown(&self) {
        self.countdown(PLACEHOLDER, PLACEHOLDER, PLACEHOLDER);
    }

    pub fn symbol(&self, text: &str, quote: Option<&str>) {
        write(&self.targets.symbol, text);
        write(&self.targets.quote_badge, quote.unwrap_or(PLACEHOLDER));
    }

    pub fn mark_price(&self, price: Option<f64>, quote: Option<&str>) {
        if self.targets.mark_price.is_some() {
            write(&self.targets.mark_price, &format::format_price(price, quote));
        }
    }

    pub fn status(&self, status: ConnectionStatus) {
        for indicator in [&self.targets.status_dot, &self.targets.countdown]
            .into_iter()
            .flatten()
        {
            indicator.set_status(status);
        }
        write(&self.targets.status_text, status.label());
    }
}

/// In-memory text target.
#[derive(Debug, Default)]
pub struct TextCell(Mutex<String>);

impl TextCell {
    pub fn get(&self) -> String {
        self.0.lock().clone()
    }
}

impl TextSink for TextCell {
    fn set_text(&self, text: &str) {
        let mut value = self.0.lock();
        value.clear();
        value.push_str(text);
    }
}

/// In-memory status target.
#[derive(Debug, Default)]
pub struct StatusCell(Mutex<Option<ConnectionStatus>>);

impl StatusCell {
    pub fn get(&self) -> Option<ConnectionStatus> {
        *self.0.lock()
    }
}

impl StatusIndicator for StatusCell {
    fn set_status(&self, status: ConnectionStatus) {
        *self.0.lock() = Some(status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_targets_are_skipped() {
        let renderer = Renderer::default();
        renderer.countdown("01", "02", "03");
        renderer.symbol("BTC/USDT", Some("USDT"));
        renderer.mark_price(Some(1.0), None);
        renderer.status(ConnectionStatus::Live);
        renderer.funding_time(Some(1_700_000_000_000));
    }

    #[test]
    fn status_reaches_every_indicator() {
        let dot = Arc::new(StatusCell::default());
        let panel = Arc::new(StatusCell::default());
        let text = Arc::new(TextCell::default());
        let renderer = Renderer::new(
            DisplayTargets {
                status_dot: Some(dot.clone()),
                countdown: Some(panel.clone()),
                status_text: Some(text.clone()),
                ..Default::default()
            },
            LocalZone::default(),
        );

        renderer.status(ConnectionStatus::Disconnected);
        assert_eq!(dot.get(), Some(ConnectionStatus::Disconnected));
        assert_eq!(panel.get(), Some(ConnectionStatus::Disconnected));
        assert_eq!(text.get(), "Disconnected");

        renderer.status(ConnectionStatus::Live);
        assert_eq!(text.get(), "Live");
        assert_eq!(ConnectionStatus::Live.color(), "#bc13fe");
    }

    #[test]
    fn quote_badge_shows_placeholder_without_quote() {
        let badge = Arc::new(TextCell::default());
        let renderer = Renderer::new(
            DisplayTargets {
                quote_badge: Some(badge.clone()),
                ..Default::default()
            },
            LocalZone::default(),
        );
        renderer.symbol("XYZFOO", None);
        assert_eq!(badge.get(), PLACEHOLDER);
    }
}
