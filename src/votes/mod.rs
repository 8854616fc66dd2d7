//! Persisted filename → vote-count ledger.

pub mod ledger;

pub use ledger::{LedgerError, VoteCounts, VoteLedger};
