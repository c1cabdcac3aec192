use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::stream::{self, StreamExt};
use promoter_core::{format_duration, is_usable, sanitize, Ledger, Outcome, PendingUrl, UrlState};
use serde::Serialize;

use crate::persist::{load_ledger, LedgerWriter, PersistError, RowSink};
use crate::pool::HostWorkerPool;

/// Counters for one export call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportStats {
    /// URLs handed in.
    pub total: usize,
    /// URLs sent to a host.
    pub dispatched: usize,
    /// Rows appended to the ledger file.
    pub written: usize,
    pub rejected: usize,
    pub failed: usize,
    /// Already recorded, repeated within the batch, or unusable.
    pub skipped: usize,
}

/// Final state of one dispatched URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlResult {
    pub url: String,
    pub key: String,
    pub state: UrlState,
    pub outcome: Outcome,
}

/// Stats plus the per-URL results, in completion order.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub stats: ExportStats,
    pub results: Vec<UrlResult>,
    pub elapsed: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
}

/// A ledger opened for one process lifetime.
///
/// The ledger file is read once, in [`ExportSession::open`]. Rejected and
/// failed URLs are remembered in memory for as long as the session lives, so
/// later batches in the same session skip them; a new session only knows what
/// was written to the file and tries them again.
pub struct ExportSession<S = LedgerWriter> {
    ledger: Ledger,
    sink: S,
}

impl ExportSession {
    pub fn open(ledger_path: impl AsRef<Path>) -> Result<Self, ExportError> {
        let path = ledger_path.as_ref();
        let ledger = load_ledger(path)?;
        engine_info!("Loaded {} recorded URLs from {:?}", ledger.len(), path);
        let writer = LedgerWriter::open(path)?;
        Ok(Self::new(ledger, writer))
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.sink.path().to_path_buf()
    }
}

impl<S: RowSink> ExportSession<S> {
    /// Session over an already loaded ledger, writing rows to `sink`.
    pub fn new(ledger: Ledger, sink: S) -> Self {
        Self { ledger, sink }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Dispatch every unrecorded URL to the pool and apply the outcome policy
    /// as answers arrive. Only a failed write aborts the batch.
    pub async fn export(
        &mut self,
        urls: &[String],
        pool: &HostWorkerPool,
    ) -> Result<ExportReport, ExportError> {
        let started = Instant::now();
        let pending = self.ledger.pending(urls);
        let mut stats = ExportStats {
            total: urls.len(),
            dispatched: pending.len(),
            skipped: urls.len() - pending.len(),
            ..ExportStats::default()
        };
        engine_info!(
            "Dispatching {} of {} URLs to {} hosts",
            stats.dispatched,
            stats.total,
            pool.host_count()
        );

        let mut answers = stream::iter(pending)
            .map(|pending: PendingUrl| async move {
                engine_debug!(
                    "{}: {:?} -> {:?}",
                    pending.url,
                    UrlState::Pending,
                    UrlState::Dispatched
                );
                let reply = pool.submit_and_await(&pending.url).await;
                (pending, reply)
            })
            .buffer_unordered(pool.host_count());

        let mut results = Vec::with_capacity(stats.dispatched);
        while let Some((pending, reply)) = answers.next().await {
            let outcome = match Outcome::classify(reply) {
                Outcome::Success(_) if !is_usable(&pending.row_key) => {
                    Outcome::Failed("url has no printable ASCII form".to_string())
                }
                outcome => outcome,
            };
            match &outcome {
                Outcome::Failed(err) => {
                    engine_warn!("Failed to generate promotion for {}: {}", pending.url, err);
                    stats.failed += 1;
                }
                Outcome::Rejected(reason) => {
                    engine_info!("Skipping rejected promotion for {}: {}", pending.url, reason);
                    stats.rejected += 1;
                }
                Outcome::Success(promotion) => {
                    self.sink.append(promotion, &sanitize(&pending.url))?;
                    engine_info!("Generated promotion for {}", pending.url);
                    stats.written += 1;
                }
            }
            self.ledger.record(&pending);
            let state = UrlState::resolved(&outcome);
            debug_assert!(state.is_terminal());
            engine_debug!("{}: {:?} -> {:?}", pending.url, UrlState::Dispatched, state);
            results.push(UrlResult {
                state,
                url: pending.url,
                key: pending.key,
                outcome,
            });
        }

        let elapsed = started.elapsed();
        let retried_later = results
            .iter()
            .filter(|result| !result.state.survives_restart())
            .count();
        if retried_later > 0 {
            engine_info!(
                "{} rejected or failed URLs will be tried again after a restart",
                retried_later
            );
        }
        engine_info!(
            "Processed {} new URLs out of {} total in {}",
            stats.written,
            stats.total,
            format_duration(elapsed)
        );
        Ok(ExportReport {
            stats,
            results,
            elapsed,
        })
    }
}

/// Open the ledger at `ledger_path`, export `urls` through `pool`, and close it.
pub async fn export_batch(
    urls: &[String],
    pool: &HostWorkerPool,
    ledger_path: &Path,
) -> Result<ExportReport, ExportError> {
    let mut session = ExportSession::open(ledger_path)?;
    session.export(urls, pool).await
}
