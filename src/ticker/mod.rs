//! The ticker widget.
//!
//! A single task owns the [`TickerState`] and multiplexes:
//! • the mark-price stream, reconnecting with backoff when it closes;
//! • the REST poll, on an interval, after funding rollovers and on demand;
//! • a countdown aligned to wall-clock seconds.
//!
//! Callers interact through the returned [`TickerHandle`].

pub mod countdown;
pub mod state;

pub use state::TickerState;

use crate::clock::Clock;
use crate::display::Renderer;
use crate::errors::Result;
use crate::feed::{FeedStream, MarkPriceFeed, SnapshotSource};
use crate::models::{MarketUpdate, PremiumIndex, TickerSnapshot};
use futures::StreamExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{MissedTickBehavior, Sleep};
use tracing::{debug, info, warn};

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct TickerConfig {
    pub symbol: String,
    pub poll_interval: Duration,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// External capabilities the ticker is built on.
#[derive(Clone)]
pub struct TickerIo {
    pub feed: Arc<dyn MarkPriceFeed>,
    pub snapshots: Arc<dyn SnapshotSource>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug)]
enum Command {
    Reconnect,
    Refresh,
}

#[derive(Debug, Clone)]
pub struct TickerHandle {
    commands: mpsc::UnboundedSender<Command>,
    snapshot: watch::Receiver<TickerSnapshot>,
}

impl TickerHandle {
    /// Drop the current stream connection, if any, and open a new one now.
    pub fn reconnect(&self) {
        self.send(Command::Reconnect);
    }

    /// Request an out-of-cycle poll.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn state(&self) -> TickerSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TickerSnapshot> {
        self.snapshot.clone()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            warn!("[TICKER] loop has stopped, command dropped");
        }
    }
}

/// Start the ticker on the current tokio runtime. It runs until the runtime
/// shuts down.
pub fn spawn_ticker(config: TickerConfig, renderer: Renderer, io: TickerIo) -> TickerHandle {
    let (commands_tx, commands_rx) = mpsc::unbounded_channel();
    let (snapshot_tx, snapshot_rx) = watch::channel(TickerSnapshot::default());
    let (poll_tx, poll_rx) = mpsc::unbounded_channel();

    let ticker = Ticker {
        config,
        renderer,
        io,
        state: TickerState::default(),
        snapshot_tx,
        poll_tx,
    };
    tokio::spawn(ticker.run(commands_rx, poll_rx));

    TickerHandle {
        commands: commands_tx,
        snapshot: snapshot_rx,
    }
}

type Connecting = BoxFuture<'static, Result<FeedStream>>;

struct Ticker {
    config: TickerConfig,
    renderer: Renderer,
    io: TickerIo,
    state: TickerState,
    snapshot_tx: watch::Sender<TickerSnapshot>,
    poll_tx: mpsc::UnboundedSender<Result<PremiumIndex>>,
}

impl Ticker {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut polls: mpsc::UnboundedReceiver<Result<PremiumIndex>>,
    ) {
        info!(symbol = %self.config.symbol, "[INIT] ticker starting");

        let mut connection: Option<FeedStream> = None;
        let mut connecting: Option<Connecting> = Some(self.open_connection());
        let mut reconnect_timer: Option<Pin<Box<Sleep>>> = None;
        let mut countdown = countdown::aligned_interval(self.io.clock.now_ms());
        // First tick fires immediately and doubles as the startup refresh.
        let mut poll_timer = tokio::time::interval(self.config.poll_interval);
        poll_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut commands_open = true;

        loop {
            tokio::select! {
                opened = wait_for(&mut connecting) => {
                    connecting = None;
                    match opened {
                        Ok(stream) => {
                            connection = Some(stream);
                            self.state.on_open(&self.renderer);
                            debug!("[FEED] connection open");
                        }
                        Err(e) => {
                            warn!(error = %e, "[FEED] connection attempt failed");
                            reconnect_timer = Some(self.schedule_reconnect());
                        }
                    }
                }
                frame = next_frame(&mut connection) => match frame {
                    Some(Ok(text)) => self.apply_frame(&text),
                    Some(Err(e)) => debug!(error = %e, "[FEED] stream error"),
                    None => {
                        connection = None;
                        reconnect_timer = Some(self.schedule_reconnect());
                    }
                },
                _ = wait_for(&mut reconnect_timer) => {
                    reconnect_timer = None;
                    close_previous(&mut connection);
                    connecting = Some(self.open_connection());
                }
                _ = countdown.tick() => {
                    if self.state.tick_countdown(self.io.clock.now_ms(), &self.renderer) {
                        info!(
                            next_funding_ms = ?self.state.next_funding_ms(),
                            "[COUNTDOWN] funding boundary passed"
                        );
                        self.spawn_poll();
                    }
                    self.publish();
                }
                _ = poll_timer.tick() => self.spawn_poll(),
                Some(result) = polls.recv() => self.apply_poll(result),
                command = commands.recv(), if commands_open => match command {
                    Some(Command::Reconnect) => {
                        info!("[FEED] manual reconnect");
                        reconnect_timer = None;
                        close_previous(&mut connection);
                        connecting = Some(self.open_connection());
                    }
                    Some(Command::Refresh) => self.spawn_poll(),
                    None => commands_open = false,
                },
            }
        }
    }

    fn open_connection(&self) -> Connecting {
        let feed = Arc::clone(&self.io.feed);
        let symbol = self.config.symbol.clone();
        Box::pin(async move { feed.connect(&symbol).await })
    }

    fn schedule_reconnect(&mut self) -> Pin<Box<Sleep>> {
        let delay = self.state.on_close(&self.renderer);
        warn!(
            attempt = self.state.reconnect_attempt(),
            delay_ms = delay.as_millis() as u64,
            "[FEED] disconnected, scheduling reconnect"
        );
        Box::pin(tokio::time::sleep(delay))
    }

    fn apply_frame(&mut self, text: &str) {
        match self.state.apply_stream_message(text, &self.renderer) {
            Ok(()) => self.publish(),
            Err(e) => warn!(error = %e, "[FEED] message parse failed, dropped"),
        }
    }

    fn spawn_poll(&self) {
        let source = Arc::clone(&self.io.snapshots);
        let symbol = self.config.symbol.clone();
        let results = self.poll_tx.clone();
        tokio::spawn(async move {
            let result = source.fetch(&symbol).await;
            let _ = results.send(result);
        });
    }

    fn apply_poll(&mut self, result: Result<PremiumIndex>) {
        match result {
            Ok(index) => {
                self.state.apply(MarketUpdate::from(index), &self.renderer);
                self.publish();
            }
            Err(e) => warn!(error = %e, "[POLL] refresh failed"),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.state.snapshot());
    }
}

fn close_previous(connection: &mut Option<FeedStream>) {
    if connection.take().is_some() {
        debug!("[FEED] closing previous connection");
    }
}

/// Resolve the pending future, or never when there is none.
async fn wait_for<F: Future + Unpin>(pending: &mut Option<F>) -> F::Output {
    match pending.as_mut() {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

async fn next_frame(connection: &mut Option<FeedStream>) -> Option<Result<String>> {
    match connection.as_mut() {
        Some(stream) => stream.next().await,
        None => std::future::pending().await,
    }
}
