//! Change batches and the trigger context that says which phase to run.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use orderdesk_core::{DomainError, DomainResult};

use crate::record::OrderLineRecord;

/// Kind of write the host is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Insert,
    Update,
    Delete,
}

/// Pipeline phase. Exactly one is active per [`crate::RecordChangePipeline::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    BeforeInsert,
    BeforeUpdate,
    AfterInsert,
    AfterUpdate,
    AfterDelete,
}

impl Phase {
    pub fn is_before(self) -> bool {
        matches!(self, Phase::BeforeInsert | Phase::BeforeUpdate)
    }
}

/// Flags the host passes alongside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerContext {
    pub is_before: bool,
    pub is_after: bool,
    pub operation: Operation,
}

impl TriggerContext {
    pub fn before(operation: Operation) -> Self {
        Self {
            is_before: true,
            is_after: false,
            operation,
        }
    }

    pub fn after(operation: Operation) -> Self {
        Self {
            is_before: false,
            is_after: true,
            operation,
        }
    }

    /// Resolve the flags to a phase.
    ///
    /// `Ok(None)` means there is nothing to do (before delete). Setting both
    /// flags or neither is a host bug.
    pub fn phase(&self) -> DomainResult<Option<Phase>> {
        match (self.is_before, self.is_after, self.operation) {
            (true, false, Operation::Insert) => Ok(Some(Phase::BeforeInsert)),
            (true, false, Operation::Update) => Ok(Some(Phase::BeforeUpdate)),
            (true, false, Operation::Delete) => Ok(None),
            (false, true, Operation::Insert) => Ok(Some(Phase::AfterInsert)),
            (false, true, Operation::Update) => Ok(Some(Phase::AfterUpdate)),
            (false, true, Operation::Delete) => Ok(Some(Phase::AfterDelete)),
            _ => Err(DomainError::invariant(
                "trigger context must be exactly one of before/after",
            )),
        }
    }
}

/// Records affected by one write, as before/after snapshots.
///
/// Immutable once built. For updates, `old_records[i]` and `new_records[i]`
/// describe the same record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeBatch {
    new_records: Option<Vec<OrderLineRecord>>,
    old_records: Option<Vec<OrderLineRecord>>,
}

impl ChangeBatch {
    pub fn insert(new_records: Vec<OrderLineRecord>) -> Self {
        Self {
            new_records: Some(new_records),
            old_records: None,
        }
    }

    /// Build an update batch; the two sides must pair up one-to-one and no
    /// persisted line may appear twice.
    pub fn update(
        old_records: Vec<OrderLineRecord>,
        new_records: Vec<OrderLineRecord>,
    ) -> DomainResult<Self> {
        if old_records.len() != new_records.len() {
            return Err(DomainError::invariant(format!(
                "update batch is misaligned ({} old, {} new)",
                old_records.len(),
                new_records.len()
            )));
        }
        if let Some(i) = old_records
            .iter()
            .zip(&new_records)
            .position(|(old, new)| old.id != new.id)
        {
            return Err(DomainError::invariant(format!(
                "update batch pairs different records at index {i}"
            )));
        }
        let mut seen = BTreeSet::new();
        if let Some(id) = old_records
            .iter()
            .filter_map(|r| r.id)
            .find(|id| !seen.insert(*id))
        {
            return Err(DomainError::invariant(format!(
                "update batch pairs line {id} more than once"
            )));
        }
        Ok(Self {
            new_records: Some(new_records),
            old_records: Some(old_records),
        })
    }

    pub fn delete(old_records: Vec<OrderLineRecord>) -> Self {
        Self {
            new_records: None,
            old_records: Some(old_records),
        }
    }

    pub fn new_records(&self) -> Option<&[OrderLineRecord]> {
        self.new_records.as_deref()
    }

    pub fn old_records(&self) -> Option<&[OrderLineRecord]> {
        self.old_records.as_deref()
    }

    pub fn len(&self) -> usize {
        self.new_records
            .as_ref()
            .or(self.old_records.as_ref())
            .map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn require_new(&self, phase: Phase) -> DomainResult<&[OrderLineRecord]> {
        self.new_records()
            .ok_or_else(|| DomainError::invariant(format!("{phase:?} needs new records")))
    }

    pub(crate) fn require_old(&self, phase: Phase) -> DomainResult<&[OrderLineRecord]> {
        self.old_records()
            .ok_or_else(|| DomainError::invariant(format!("{phase:?} needs old records")))
    }

    pub(crate) fn require_pairs(
        &self,
        phase: Phase,
    ) -> DomainResult<(&[OrderLineRecord], &[OrderLineRecord])> {
        Ok((self.require_old(phase)?, self.require_new(phase)?))
    }
}
