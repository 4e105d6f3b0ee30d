use std::time::Duration;

use chrono::{DateTime, Utc};
use itemtrade_engine::{EngineState, TradeEngine};
use itemtrade_models::DriverConfig;
use itemtrade_session::TradeApi;
use serde::Serialize;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Why the driver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverOutcome {
    /// The trade reached a terminal status or was cancelled by the engine.
    Closed,
    /// The engine detected a version desync.
    Aborted,
    /// The trade or the counterpart's idle time exceeded its limit.
    TimedOut,
    /// The cancellation token fired.
    Cancelled,
}

/// Final report of one driven trade.
#[derive(Debug, Clone, Serialize)]
pub struct TradeSummary {
    pub outcome: DriverOutcome,
    pub final_state: String,
    pub counterpart_id: u64,
    pub polls: u64,
    pub counterpart_offered: Vec<u64>,
    pub agent_offered: Vec<u64>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Polls a [`TradeEngine`] on a fixed interval until the trade ends.
///
/// Recoverable poll failures are reported to the observer and retried on
/// the next tick. On timeout or cancellation the remote trade is cancelled
/// on a best-effort basis.
pub struct TradeDriver<A: TradeApi> {
    engine: TradeEngine<A>,
    config: DriverConfig,
    cancel: CancellationToken,
}

impl<A: TradeApi> TradeDriver<A> {
    pub fn new(engine: TradeEngine<A>, config: DriverConfig) -> Self {
        Self {
            engine,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Returns a CancellationToken that can be used to stop the driver.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &TradeEngine<A> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TradeEngine<A> {
        &mut self.engine
    }

    pub fn into_engine(self) -> TradeEngine<A> {
        self.engine
    }

    /// Run until the trade closes, aborts, times out or is cancelled.
    pub async fn run(&mut self) -> TradeSummary {
        let started_at = Utc::now();
        let started = Instant::now();
        let max_trade = Duration::from_secs(self.config.max_trade_seconds);
        let max_gap = Duration::from_secs(self.config.max_action_gap_seconds);
        let mut last_action = started;
        let mut polls = 0u64;

        let mut ticker =
            tokio::time::interval(Duration::from_millis(self.config.poll_interval_ms.max(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let cancel = self.cancel.clone();

        info!(
            counterpart_id = self.engine.counterpart_id(),
            poll_interval_ms = self.config.poll_interval_ms,
            "Trade driver starting"
        );

        let outcome = loop {
            let cancelled = tokio::select! {
                biased;
                _ = cancel.cancelled() => true,
                _ = ticker.tick() => false,
            };
            if cancelled {
                info!("Trade driver cancelled");
                self.cancel_remote().await;
                break DriverOutcome::Cancelled;
            }

            polls += 1;
            match self.engine.poll().await {
                Ok(true) => last_action = Instant::now(),
                Ok(false) => {}
                Err(e) => {
                    self.engine.report_error(&e);
                    if e.is_fatal() {
                        break DriverOutcome::Aborted;
                    }
                }
            }

            if self.engine.state() == EngineState::Closed {
                break DriverOutcome::Closed;
            }
            if started.elapsed() >= max_trade {
                warn!(max_trade_seconds = self.config.max_trade_seconds, "Trade exceeded its time limit");
                self.cancel_remote().await;
                break DriverOutcome::TimedOut;
            }
            if last_action.elapsed() >= max_gap {
                warn!(
                    max_action_gap_seconds = self.config.max_action_gap_seconds,
                    "Counterpart idle for too long"
                );
                self.cancel_remote().await;
                break DriverOutcome::TimedOut;
            }
        };

        let summary = TradeSummary {
            outcome,
            final_state: self.engine.state().to_string(),
            counterpart_id: self.engine.counterpart_id(),
            polls,
            counterpart_offered: self.engine.counterpart_offered().iter().copied().collect(),
            agent_offered: self.engine.agent_offered().iter().copied().collect(),
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            outcome = ?summary.outcome,
            polls,
            elapsed_ms = started.elapsed().as_millis(),
            "Trade driver stopped"
        );
        summary
    }

    async fn cancel_remote(&mut self) {
        if self.engine.state() != EngineState::Active {
            return;
        }
        if let Err(e) = self.engine.cancel_trade().await {
            warn!(error = %e, "Failed to cancel trade");
            self.engine.report_error(&e);
        }
    }
}
