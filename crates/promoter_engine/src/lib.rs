//! Promoter engine: host worker pool, ledger persistence and batch export.
mod export;
mod persist;
mod pool;
mod processor;
mod queue;
mod types;

pub use export::{export_batch, ExportError, ExportReport, ExportSession, ExportStats, UrlResult};
pub use persist::{
    ensure_output_dir, load_ledger, read_rows, LedgerRow, LedgerWriter, PersistError,
    RowSink, LEDGER_HEADER,
};
pub use pool::{HostWorkerPool, PoolError, PoolSettings};
pub use processor::{CommandProcessor, CommandSettings, Processor};
pub use queue::{QueueClosed, Take, Task, TaskQueue};
pub use types::{Host, HostReply, ProcessError};
