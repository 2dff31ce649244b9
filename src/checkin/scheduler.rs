//! Sequential daily cycles over the wallet list.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tokio::time::Instant;

use crate::blockchain::ledger::Ledger;
use crate::blockchain::wallet::Wallet;
use crate::checkin::executor::CheckinExecutor;
use crate::checkin::outcome::CheckinOutcome;
use crate::config::{ConfigError, ScheduleConfig};
use crate::observability::metrics;

/// Tally of one pass over the wallet list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub processed: usize,
    /// Confirmed or submitted.
    pub checked_in: usize,
    pub already_done: usize,
    /// Insufficient balance or a failed read query.
    pub skipped: usize,
    /// Broadcast failures, reverts, missing receipts and panics.
    pub failed: usize,
    /// Shutdown was requested before every wallet was processed.
    pub interrupted: bool,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn record(&mut self, outcome: &CheckinOutcome) {
        self.processed += 1;
        match outcome {
            CheckinOutcome::Confirmed { .. } | CheckinOutcome::Submitted(_) => self.checked_in += 1,
            CheckinOutcome::AlreadyDone => self.already_done += 1,
            CheckinOutcome::InsufficientBalance { .. } | CheckinOutcome::EstimationFailed(_) => {
                self.skipped += 1
            }
            CheckinOutcome::SubmissionFailed { .. } | CheckinOutcome::Unconfirmed(_) => {
                self.failed += 1
            }
        }
    }

    fn record_panic(&mut self) {
        self.processed += 1;
        self.failed += 1;
    }
}

impl fmt::Display for CycleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} processed: {} checked in, {} already done, {} skipped, {} failed in {:.1}s",
            self.processed,
            self.checked_in,
            self.already_done,
            self.skipped,
            self.failed,
            self.elapsed.as_secs_f64()
        )
    }
}

pub struct WalletScheduler<L> {
    executor: Arc<CheckinExecutor<L>>,
    wallets: Vec<Wallet>,
    schedule: ScheduleConfig,
}

impl<L: Ledger + 'static> WalletScheduler<L> {
    /// Fails with [`ConfigError::NoValidWallets`] when `wallets` is empty.
    pub fn new(
        executor: CheckinExecutor<L>,
        wallets: Vec<Wallet>,
        schedule: ScheduleConfig,
    ) -> Result<Self, ConfigError> {
        if wallets.is_empty() {
            return Err(ConfigError::NoValidWallets);
        }
        metrics::set_wallets(wallets.len());
        Ok(Self {
            executor: Arc::new(executor),
            wallets,
            schedule,
        })
    }

    pub fn wallets(&self) -> &[Wallet] {
        &self.wallets
    }

    /// Process every wallet once, in order.
    ///
    /// Shutdown is checked before each wallet and during the pause between
    /// wallets; an interrupted cycle reports what it got through.
    pub async fn run_cycle(&self, shutdown: &mut broadcast::Receiver<()>) -> CycleReport {
        let started = Instant::now();
        let mut report = CycleReport::default();
        let total = self.wallets.len();

        for (index, wallet) in self.wallets.iter().enumerate() {
            if shutdown_requested(shutdown) {
                report.interrupted = true;
                break;
            }

            tracing::info!(wallet = %wallet.address(), "Processing wallet {}/{}", index + 1, total);
            let executor = Arc::clone(&self.executor);
            let task_wallet = wallet.clone();
            match tokio::spawn(async move { executor.execute(&task_wallet).await }).await {
                Ok(outcome) => {
                    tracing::info!(
                        wallet = %wallet.address(),
                        outcome = outcome.label(),
                        tx_hash = ?outcome.tx_hash(),
                        "Wallet attempt finished"
                    );
                    report.record(&outcome);
                }
                Err(e) => {
                    tracing::error!(
                        wallet = %wallet.address(),
                        error = %e,
                        "Unhandled error in wallet attempt"
                    );
                    report.record_panic();
                }
            }

            if index + 1 < total && pause(self.schedule.wallet_delay(), shutdown).await {
                report.interrupted = true;
                break;
            }
        }

        report.elapsed = started.elapsed();
        metrics::record_cycle(report.elapsed);
        report
    }

    /// Run cycles until shutdown. Returns the number of completed cycles.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) -> u64 {
        let interval = self.schedule.cycle_interval();
        let mut cycles = 0;

        loop {
            let report = self.run_cycle(&mut shutdown).await;
            if report.interrupted {
                tracing::info!(%report, "Cycle interrupted by shutdown");
                return cycles;
            }
            cycles += 1;
            tracing::info!(%report, "Cycle complete");

            let next = chrono::Duration::from_std(interval)
                .ok()
                .and_then(|d| chrono::Local::now().checked_add_signed(d));
            match next {
                Some(next) => tracing::info!(
                    sleep_secs = interval.as_secs(),
                    next_cycle = %next.to_rfc3339_opts(chrono::SecondsFormat::Secs, false),
                    "Sleeping until next cycle"
                ),
                None => {
                    tracing::info!(sleep_secs = interval.as_secs(), "Sleeping until next cycle")
                }
            }
            if pause(interval, &mut shutdown).await {
                tracing::info!("Shutdown requested, leaving scheduler loop");
                return cycles;
            }
        }
    }
}

fn shutdown_requested(shutdown: &mut broadcast::Receiver<()>) -> bool {
    match shutdown.try_recv() {
        Ok(()) | Err(TryRecvError::Lagged(_)) => true,
        Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => false,
    }
}

/// Sleep for `duration` unless shutdown arrives first. Returns `true` when
/// interrupted.
async fn pause(duration: Duration, shutdown: &mut broadcast::Receiver<()>) -> bool {
    // `sleep` saturates durations past the far future instead of overflowing.
    let sleep = tokio::time::sleep(duration);
    tokio::pin!(sleep);

    let interrupted = tokio::select! {
        _ = &mut sleep => return false,
        signal = shutdown.recv() => matches!(signal, Ok(()) | Err(RecvError::Lagged(_))),
    };
    if !interrupted {
        // Nobody left to signal; finish the sleep.
        sleep.await;
    }
    interrupted
}
