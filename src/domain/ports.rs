use crate::domain::model::ProcessStats;
use crate::utils::error::{ApplyError, Result};

/// A compiled field transformation. Built once, applied to every record.
pub trait Transformation {
    fn apply(&self, input: &str) -> std::result::Result<String, ApplyError>;
}

/// Drains a record source into a record sink.
pub trait RecordProcessor {
    fn process(&mut self) -> Result<ProcessStats>;
}
