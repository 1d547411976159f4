use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, Money, OrderId, OrderLineId};

use crate::batch::Phase;
use crate::record::OrderLineRecord;

/// Per-record verdict of one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// Checked (before phases) or recalculated (after phases).
    Valid,
    /// Nothing relevant changed, so the record was left alone.
    Unchanged,
    /// Rejected; sibling records are unaffected.
    Invalid(DomainError),
}

impl RecordOutcome {
    /// Valid or unchanged: the host may keep the record.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, RecordOutcome::Invalid(_))
    }

    pub fn error(&self) -> Option<&DomainError> {
        match self {
            RecordOutcome::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

/// A line whose total was recalculated in an after phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRecalculation {
    /// Position in the batch.
    pub index: usize,
    pub line_id: OrderLineId,
    pub previous: Money,
    pub line_total: Money,
}

/// New aggregate total of an order touched by the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTotalChange {
    pub order_id: OrderId,
    pub previous: Money,
    pub total: Money,
}

/// Everything one [`crate::RecordChangePipeline::run`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseReport {
    /// `None` when the flags resolved to no phase (before delete).
    pub phase: Option<Phase>,
    /// Index-aligned with the batch side the phase worked on.
    pub outcomes: Vec<RecordOutcome>,
    /// Post-phase copies of the records, index-aligned with `outcomes`.
    pub records: Vec<OrderLineRecord>,
    pub recalculated: Vec<LineRecalculation>,
    /// Sorted by order id.
    pub order_totals: Vec<OrderTotalChange>,
}

impl PhaseReport {
    pub(crate) fn empty(phase: Option<Phase>) -> Self {
        Self {
            phase,
            outcomes: Vec::new(),
            records: Vec::new(),
            recalculated: Vec::new(),
            order_totals: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(phase: Phase, n: usize) -> Self {
        Self {
            phase: Some(phase),
            outcomes: Vec::with_capacity(n),
            records: Vec::with_capacity(n),
            recalculated: Vec::new(),
            order_totals: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: OrderLineRecord, outcome: RecordOutcome) {
        self.records.push(record);
        self.outcomes.push(outcome);
    }

    /// Indexes and reasons of rejected records.
    pub fn rejected(&self) -> impl Iterator<Item = (usize, &DomainError)> {
        self.outcomes
            .iter()
            .enumerate()
            .filter_map(|(i, o)| o.error().map(|e| (i, e)))
    }

    /// Records the host may keep, in batch order.
    pub fn accepted_records(&self) -> impl Iterator<Item = &OrderLineRecord> {
        self.records
            .iter()
            .zip(&self.outcomes)
            .filter(|(_, o)| o.is_accepted())
            .map(|(r, _)| r)
    }

    pub fn invalid_count(&self) -> usize {
        self.rejected().count()
    }
}
