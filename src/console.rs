//! Terminal binding for the ticker displays.

use crate::display::{ConnectionStatus, DisplayTargets, Renderer, StatusCell, TextCell};
use crate::format::{LocalZone, PLACEHOLDER};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// One in-memory cell per display target.
#[derive(Debug, Default)]
pub struct ConsoleBoard {
    pub funding_time: Arc<TextCell>,
    pub hours: Arc<TextCell>,
    pub minutes: Arc<TextCell>,
    pub seconds: Arc<TextCell>,
    pub status_dot: Arc<StatusCell>,
    pub status_text: Arc<TextCell>,
    pub mark_price: Arc<TextCell>,
    pub symbol: Arc<TextCell>,
    pub quote_badge: Arc<TextCell>,
}

fn shown(cell: &TextCell) -> String {
    let text = cell.get();
    if text.is_empty() {
        PLACEHOLDER.to_string()
    } else {
        text
    }
}

impl ConsoleBoard {
    pub fn targets(&self) -> DisplayTargets {
        DisplayTargets {
            funding_time: Some(self.funding_time.clone()),
            hours: Some(self.hours.clone()),
            minutes: Some(self.minutes.clone()),
            seconds: Some(self.seconds.clone()),
            status_dot: Some(self.status_dot.clone()),
            status_text: Some(self.status_text.clone()),
            countdown: None,
            mark_price: Some(self.mark_price.clone()),
            symbol: Some(self.symbol.clone()),
            quote_badge: Some(self.quote_badge.clone()),
        }
    }

    pub fn renderer(&self, zone: LocalZone) -> Renderer {
        Renderer::new(self.targets(), zone)
    }

    /// One-line summary; the status ends with the indicator colour.
    pub fn summary_line(&self) -> String {
        let dot = self
            .status_dot
            .get()
            .map_or(PLACEHOLDER, ConnectionStatus::color);
        format!(
            "{} {} | funding {} in {}:{}:{} | {} [{dot}]",
            shown(&self.symbol),
            shown(&self.mark_price),
            shown(&self.funding_time),
            shown(&self.hours),
            shown(&self.minutes),
            shown(&self.seconds),
            shown(&self.status_text),
        )
    }
}

/// Log the board once per `every` until the runtime shuts down.
pub fn spawn_console_printer(
    board: Arc<ConsoleBoard>,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            info!("[TICKER] {}", board.summary_line());
        }
    })
}
