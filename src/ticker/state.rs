use crate::backoff::Backoff;
use crate::display::{ConnectionStatus, Renderer};
use crate::format::{self, pad2};
use crate::models::{MarketUpdate, TickerSnapshot};
use crate::ticker::countdown::Remaining;
use std::time::Duration;

/// Everything the ticker knows about its symbol. Owned by the ticker loop;
/// each handler borrows it mutably and redraws only what it changed.
#[derive(Debug, Default)]
pub struct TickerState {
    next_funding_ms: Option<i64>,
    quote: Option<String>,
    last_mark_price: Option<f64>,
    backoff: Backoff,
}

impl TickerState {
    pub fn snapshot(&self) -> TickerSnapshot {
        TickerSnapshot {
            next_funding_ms: self.next_funding_ms,
            quote: self.quote.clone(),
            last_mark_price: self.last_mark_price,
        }
    }

    pub fn next_funding_ms(&self) -> Option<i64> {
        self.next_funding_ms
    }

    pub fn reconnect_attempt(&self) -> u32 {
        self.backoff.attempt()
    }

    pub fn on_open(&mut self, renderer: &Renderer) {
        self.backoff.reset();
        renderer.status(ConnectionStatus::Live);
    }

    /// Marks the feed disconnected and returns the delay before reconnecting.
    pub fn on_close(&mut self, renderer: &Renderer) -> Duration {
        renderer.status(ConnectionStatus::Disconnected);
        self.backoff.next_delay()
    }

    pub fn apply_stream_message(
        &mut self,
        text: &str,
        renderer: &Renderer,
    ) -> serde_json::Result<()> {
        let update = MarketUpdate::parse_stream(text)?;
        self.apply(update, renderer);
        Ok(())
    }

    pub fn apply(&mut self, update: MarketUpdate, renderer: &Renderer) {
        if let Some(raw) = update.funding_time {
            self.next_funding_ms = format::to_ms(raw.as_f64()).filter(|ms| *ms != 0);
            renderer.funding_time(self.next_funding_ms);
        }
        if let Some(symbol) = update.symbol {
            let (text, quote) = format::split_symbol(&symbol);
            self.quote = quote.map(str::to_owned);
            renderer.symbol(&text, quote);
            if self.last_mark_price.is_some() {
                renderer.mark_price(self.last_mark_price, quote);
            }
        }
        if let Some(price) = update.mark_price {
            let price = price.as_f64();
            self.last_mark_price = price.is_finite().then_some(price);
            renderer.mark_price(self.last_mark_price, self.quote.as_deref());
        }
    }

    /// Redraw the countdown for `now_ms`. Returns `true` when the funding
    /// boundary had already passed and was moved to the next 8h mark.
    pub fn tick_countdown(&mut self, now_ms: i64, renderer: &Renderer) -> bool {
        let Some(next) = self.next_funding_ms else {
            renderer.countdown_unknown();
            return false;
        };
        let mut remaining = next.saturating_sub(now_ms);
        let rolled_over = remaining <= 0;
        if rolled_over {
            let next = format::next_funding_boundary(now_ms);
            self.next_funding_ms = Some(next);
            renderer.funding_time(self.next_funding_ms);
            remaining = next - now_ms;
        }
        let left = Remaining::from_ms(remaining);
        renderer.countdown(&pad2(left.hours), &pad2(left.minutes), &pad2(left.seconds));
        rolled_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ConsoleBoard;
    use crate::format::{FUNDING_INTERVAL_MS, LocalZone, PLACEHOLDER};
    use crate::models::Numeric;

    fn board() -> (ConsoleBoard, Renderer) {
        let board = ConsoleBoard::default();
        let renderer = board.renderer(LocalZone::default());
        (board, renderer)
    }

    #[test]
    fn stream_message_updates_each_field() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(
                r#"{"T":1700006400000,"s":"BTCUSDT","p":"50000.12"}"#,
                &renderer,
            )
            .expect("valid message");

        assert_eq!(
            state.snapshot(),
            TickerSnapshot {
                next_funding_ms: Some(1_700_006_400_000),
                quote: Some("USDT".into()),
                last_mark_price: Some(50000.12),
            }
        );
        assert_eq!(board.symbol.get(), "BTC/USDT");
        assert_eq!(board.quote_badge.get(), "USDT");
        assert_eq!(board.mark_price.get(), "$50,000.12");
        assert_ne!(board.funding_time.get(), PLACEHOLDER);
    }

    #[test]
    fn funding_in_seconds_is_normalized() {
        let (_board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(r#"{"T":1700006400}"#, &renderer)
            .expect("valid message");
        assert_eq!(state.next_funding_ms(), Some(1_700_006_400_000));
    }

    #[test]
    fn malformed_message_leaves_state_untouched() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(r#"{"p":"10.00"}"#, &renderer)
            .expect("valid message");
        assert!(state.apply_stream_message("{oops", &renderer).is_err());
        assert_eq!(state.snapshot().last_mark_price, Some(10.0));
        assert_eq!(board.mark_price.get(), "10.00");
    }

    #[test]
    fn new_symbol_rerenders_known_price() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state.apply(
            MarketUpdate {
                mark_price: Some(Numeric::Number(43210.5)),
                ..Default::default()
            },
            &renderer,
        );
        assert_eq!(board.mark_price.get(), "43,210.50");

        state.apply(
            MarketUpdate {
                symbol: Some("BTCUSDT".into()),
                ..Default::default()
            },
            &renderer,
        );
        assert_eq!(board.mark_price.get(), "$43,210.50");

        state.apply(
            MarketUpdate {
                symbol: Some("XYZFOO".into()),
                ..Default::default()
            },
            &renderer,
        );
        assert_eq!(board.symbol.get(), "XYZFOO");
        assert_eq!(board.quote_badge.get(), PLACEHOLDER);
        assert_eq!(board.mark_price.get(), "43,210.50");
        assert_eq!(state.snapshot().quote, None);
    }

    #[test]
    fn unparseable_price_clears_it() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(r#"{"p":"n/a"}"#, &renderer)
            .expect("valid json");
        assert_eq!(state.snapshot().last_mark_price, None);
        assert_eq!(board.mark_price.get(), PLACEHOLDER);
    }

    #[test]
    fn countdown_without_funding_time_shows_placeholders() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        assert!(!state.tick_countdown(1_700_000_000_000, &renderer));
        assert_eq!(board.hours.get(), PLACEHOLDER);
        assert_eq!(board.minutes.get(), PLACEHOLDER);
        assert_eq!(board.seconds.get(), PLACEHOLDER);
    }

    #[test]
    fn countdown_renders_remaining_time() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        let now = 1_700_000_000_000;
        state.apply(
            MarketUpdate {
                funding_time: Some(Numeric::Number((now + 2 * 3_600_000 + 5 * 60_000 + 9_500) as f64)),
                ..Default::default()
            },
            &renderer,
        );
        assert!(!state.tick_countdown(now, &renderer));
        assert_eq!(
            (board.hours.get(), board.minutes.get(), board.seconds.get()),
            ("02".to_string(), "05".to_string(), "09".to_string())
        );
    }

    #[test]
    fn passed_boundary_rolls_to_next_eight_hour_mark() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        let boundary = 59_027 * FUNDING_INTERVAL_MS;
        state.apply(
            MarketUpdate {
                funding_time: Some(Numeric::Number((boundary - 10_000) as f64)),
                ..Default::default()
            },
            &renderer,
        );

        let now = boundary + 1_000;
        assert!(state.tick_countdown(now, &renderer));
        assert_eq!(state.next_funding_ms(), Some(boundary + FUNDING_INTERVAL_MS));
        assert_eq!(board.hours.get(), "07");
        assert_eq!(board.minutes.get(), "59");
        assert_eq!(board.seconds.get(), "59");

        assert!(!state.tick_countdown(now + 1_000, &renderer));
    }

    #[test]
    fn null_fields_clear_what_they_name() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(
                r#"{"T":1700006400000,"s":"BTCUSDT","p":"50000.12"}"#,
                &renderer,
            )
            .expect("valid message");
        state
            .apply_stream_message(r#"{"T":null,"s":null,"p":null}"#, &renderer)
            .expect("valid message");

        assert_eq!(
            state.snapshot(),
            TickerSnapshot {
                next_funding_ms: None,
                quote: None,
                last_mark_price: Some(0.0),
            }
        );
        assert_eq!(board.symbol.get(), PLACEHOLDER);
        assert_eq!(board.quote_badge.get(), PLACEHOLDER);
        assert_eq!(board.mark_price.get(), "0.00");
        assert_eq!(board.funding_time.get(), PLACEHOLDER);
    }

    #[test]
    fn extreme_funding_time_is_treated_as_unknown() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state
            .apply_stream_message(r#"{"T":-1e19}"#, &renderer)
            .expect("valid json");
        assert_eq!(state.next_funding_ms(), None);
        assert!(!state.tick_countdown(1_700_000_000_000, &renderer));
        assert_eq!(board.hours.get(), PLACEHOLDER);
        assert_eq!(board.funding_time.get(), PLACEHOLDER);
    }

    #[test]
    fn countdown_survives_far_past_funding_time() {
        let (_board, renderer) = board();
        let mut state = TickerState::default();
        state.apply(
            MarketUpdate {
                funding_time: Some(Numeric::Number(-8.6e12)),
                ..Default::default()
            },
            &renderer,
        );
        let now = 1_700_000_000_000;
        assert!(state.tick_countdown(now, &renderer));
        assert_eq!(state.next_funding_ms(), Some(format::next_funding_boundary(now)));
    }

    #[test]
    fn backoff_resets_when_connection_opens() {
        let (board, renderer) = board();
        let mut state = TickerState::default();
        state.on_close(&renderer);
        state.on_close(&renderer);
        assert_eq!(state.reconnect_attempt(), 2);
        assert_eq!(board.status_text.get(), "Disconnected");

        state.on_open(&renderer);
        assert_eq!(state.reconnect_attempt(), 0);
        assert_eq!(board.status_text.get(), "Live");
    }
}
