// src/progress.rs
use crate::error::Error;
use crate::race_id::RaceId;
use crate::store::RaceResultRow;

/// Lightweight progress reporting for a race run.
/// Front ends implement this to show entrants as they are evaluated.
pub trait Progress {
    /// Start of a race; `total` entrants to evaluate.
    fn begin(&mut self, _race_id: &RaceId, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One entrant evaluated (1-based `index`).
    fn entrant_done(&mut self, _index: usize, _row: &RaceResultRow) {}

    /// One entrant could not be evaluated; the run goes on.
    fn entrant_failed(&mut self, _index: usize, _name: &str, _err: &Error) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
