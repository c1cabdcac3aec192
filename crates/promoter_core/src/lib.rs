//! Promoter core: pure URL/text canonicalization and batch bookkeeping.
mod audit;
mod elapsed;
mod filename;
mod input;
mod ledger;
mod normalize;
mod outcome;
mod sanitize;
mod state;

pub use audit::{compare, AuditReport};
pub use elapsed::format_duration;
pub use filename::{label_from_ledger_filename, ledger_filename, LedgerNameError};
pub use input::parse_url_list;
pub use ledger::{Ledger, PendingUrl};
pub use normalize::{is_usable, normalize_opt, normalize_url};
pub use outcome::{Outcome, VETO_PREFIX};
pub use sanitize::sanitize;
pub use state::UrlState;
