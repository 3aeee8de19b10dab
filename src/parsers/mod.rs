pub mod lcov;

use crate::error::Result;
use crate::model::Snapshot;

/// Every coverage parser implements this trait.
pub trait Parser {
    /// Parse the input bytes into an ordered list of file records.
    fn parse(&self, input: &[u8]) -> Result<Snapshot>;
}
