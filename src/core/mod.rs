pub mod actions;
pub mod csv_processor;
pub mod engine;
pub mod json_processor;
pub mod ranges;
pub mod registry;
pub mod sampling;

pub use crate::domain::model::{ActionSpec, JsonRecord, ProcessStats, RangeSpec};
pub use crate::domain::ports::{RecordProcessor, Transformation};
pub use crate::utils::error::Result;
