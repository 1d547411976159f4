//! Order-line change handling (pure domain logic, no storage).
//!
//! The host runtime hands a [`ChangeBatch`] and a [`TriggerContext`] to
//! [`RecordChangePipeline::run`] at each point of a record's write lifecycle
//! (before/after × insert/update/delete). The pipeline validates or
//! recalculates the whole batch in one pass and reports per-record outcomes;
//! persisting them is the host's job.

pub mod batch;
pub mod config;
pub mod lookup;
pub mod pipeline;
pub mod record;
pub mod report;

pub use batch::{ChangeBatch, Operation, Phase, TriggerContext};
pub use config::PipelineConfig;
pub use lookup::OrderLookup;
pub use pipeline::RecordChangePipeline;
pub use record::{LineStatus, OrderLineRecord};
pub use report::{LineRecalculation, OrderTotalChange, PhaseReport, RecordOutcome};
