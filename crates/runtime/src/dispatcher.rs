//! Write lifecycle around the record change pipeline.
//!
//! ```text
//! insert / update / delete
//!   ↓
//! 1. before phase over the whole batch
//!   ↓
//! 2. persist accepted records (new lines get their ids here)
//!   ↓
//! 3. after phase over the persisted records only
//!   ↓
//! 4. write recalculated line totals and order totals back
//! ```
//!
//! Rejected records are reported by their position in the caller's input.
//! Records rejected before persisting never reach the store; records the
//! after phase rejects are rolled back. A line id appears at most once per
//! call.

use std::collections::BTreeSet;
use std::sync::Arc;

use orderdesk_core::{DomainError, DomainResult, OrderId, OrderLineId, ProductId};
use orderdesk_orders::{
    ChangeBatch, Operation, OrderLineRecord, OrderTotalChange, PhaseReport, PipelineConfig,
    RecordChangePipeline, TriggerContext,
};

use crate::store::InMemoryOrderStore;

/// Outcome of one write as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DmlResult {
    /// Records as stored after the after phase.
    pub saved: Vec<OrderLineRecord>,
    /// Input position and reason of each rejected record.
    pub rejected: Vec<(usize, DomainError)>,
    pub order_totals: Vec<OrderTotalChange>,
}

impl DmlResult {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// New field values for a stored line, addressed by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineChange {
    pub id: OrderLineId,
    pub quantity: Option<i64>,
    pub product_id: Option<ProductId>,
    pub order_id: Option<OrderId>,
}

impl LineChange {
    pub fn quantity(id: OrderLineId, quantity: i64) -> Self {
        Self {
            id,
            quantity: Some(quantity),
            product_id: None,
            order_id: None,
        }
    }

    fn apply_to(&self, stored: &OrderLineRecord) -> OrderLineRecord {
        let mut next = stored.clone();
        if let Some(q) = self.quantity {
            next.quantity = q;
        }
        if let Some(p) = &self.product_id {
            next.product_id = p.clone();
        }
        if let Some(o) = self.order_id {
            next.order_id = o;
        }
        next
    }
}

/// Runs the pipeline at the right lifecycle points for each write.
#[derive(Debug)]
pub struct TriggerDispatcher {
    store: Arc<InMemoryOrderStore>,
    pipeline: RecordChangePipeline<Arc<InMemoryOrderStore>>,
}

impl TriggerDispatcher {
    pub fn new(store: Arc<InMemoryOrderStore>, config: PipelineConfig) -> Self {
        let pipeline = RecordChangePipeline::with_config(store.clone(), config);
        Self { store, pipeline }
    }

    pub fn store(&self) -> &Arc<InMemoryOrderStore> {
        &self.store
    }

    /// Insert new lines.
    ///
    /// Lines normally arrive without an id and get a fresh one. A
    /// caller-supplied id that is already stored, or repeated within the
    /// call, is rejected.
    pub fn insert(&self, records: Vec<OrderLineRecord>) -> DomainResult<DmlResult> {
        let mut result = DmlResult::default();

        let supplied: Vec<OrderLineId> = records.iter().filter_map(|r| r.id).collect();
        let stored = self.store.lines_by_id(&supplied)?;
        let mut claimed: BTreeSet<OrderLineId> = supplied
            .iter()
            .zip(&stored)
            .filter_map(|(id, line)| line.as_ref().map(|_| *id))
            .collect();

        let mut input_pos = Vec::with_capacity(records.len());
        let mut fresh = Vec::with_capacity(records.len());
        for (i, record) in records.into_iter().enumerate() {
            if let Some(id) = record.id {
                if !claimed.insert(id) {
                    result
                        .rejected
                        .push((i, DomainError::validation(format!("line {id} already exists"))));
                    continue;
                }
            }
            input_pos.push(i);
            fresh.push(record);
        }
        if fresh.is_empty() {
            return Ok(result);
        }

        let before = self.pipeline.run(
            &ChangeBatch::insert(fresh),
            TriggerContext::before(Operation::Insert),
        )?;
        result.rejected.extend(collect_rejected(&before, |i| input_pos[i]));

        let (positions, persisted): (Vec<usize>, Vec<OrderLineRecord>) = accepted(&before)
            .map(|(i, r)| {
                let id = r.id.unwrap_or_else(OrderLineId::new);
                (input_pos[i], r.clone().with_id(id))
            })
            .unzip();
        if !persisted.is_empty() {
            self.store.save_lines(&persisted)?;

            let after = self.pipeline.run(
                &ChangeBatch::insert(persisted),
                TriggerContext::after(Operation::Insert),
            )?;
            self.finish(after, &positions, None, &mut result)?;
        }

        result.rejected.sort_by_key(|(i, _)| *i);
        Ok(result)
    }

    /// Apply field changes to stored lines. Each line may be changed once
    /// per call; later changes to the same id are rejected.
    pub fn update(&self, changes: Vec<LineChange>) -> DomainResult<DmlResult> {
        let mut result = DmlResult::default();

        let ids: Vec<OrderLineId> = changes.iter().map(|c| c.id).collect();
        let (input_pos, old): (Vec<usize>, Vec<OrderLineRecord>) =
            self.resolve(&ids, &mut result.rejected)?.into_iter().unzip();
        if old.is_empty() {
            return Ok(result);
        }
        let new = input_pos
            .iter()
            .zip(&old)
            .map(|(i, line)| changes[*i].apply_to(line))
            .collect();

        let batch = ChangeBatch::update(old.clone(), new)?;
        let before = self.pipeline.run(&batch, TriggerContext::before(Operation::Update))?;
        result.rejected.extend(collect_rejected(&before, |i| input_pos[i]));

        let mut positions = Vec::new();
        let mut kept_old = Vec::new();
        let mut kept_new = Vec::new();
        for (i, record) in accepted(&before) {
            positions.push(input_pos[i]);
            kept_old.push(old[i].clone());
            kept_new.push(record.clone());
        }
        if !kept_new.is_empty() {
            self.store.save_lines(&kept_new)?;

            let after = self.pipeline.run(
                &ChangeBatch::update(kept_old.clone(), kept_new)?,
                TriggerContext::after(Operation::Update),
            )?;
            self.finish(after, &positions, Some(kept_old.as_slice()), &mut result)?;
        }

        result.rejected.sort_by_key(|(i, _)| *i);
        Ok(result)
    }

    /// Delete stored lines by id. Unknown and repeated ids are rejected.
    pub fn delete(&self, ids: &[OrderLineId]) -> DomainResult<DmlResult> {
        let mut result = DmlResult::default();

        let old: Vec<OrderLineRecord> = self
            .resolve(ids, &mut result.rejected)?
            .into_iter()
            .map(|(_, line)| line)
            .collect();
        if old.is_empty() {
            return Ok(result);
        }

        let batch = ChangeBatch::delete(old);
        // Before delete resolves to no phase, but the lifecycle still calls it.
        self.pipeline.run(&batch, TriggerContext::before(Operation::Delete))?;

        let removed: Vec<OrderLineId> = batch
            .old_records()
            .unwrap_or_default()
            .iter()
            .filter_map(|r| r.id)
            .collect();
        self.store.remove_lines(&removed)?;

        let after = self.pipeline.run(&batch, TriggerContext::after(Operation::Delete))?;
        self.store.apply_order_totals(&after.order_totals)?;
        result.order_totals = after.order_totals;

        tracing::info!(deleted = removed.len(), rejected = result.rejected.len(), "lines deleted");
        Ok(result)
    }

    /// Stored line for the first occurrence of each id, with its input
    /// position, read under one store lock. Unknown ids and repeats are
    /// pushed onto `rejected`.
    fn resolve(
        &self,
        ids: &[OrderLineId],
        rejected: &mut Vec<(usize, DomainError)>,
    ) -> DomainResult<Vec<(usize, OrderLineRecord)>> {
        let stored = self.store.lines_by_id(ids)?;
        let mut seen = BTreeSet::new();
        let mut found = Vec::with_capacity(ids.len());

        for (i, (id, line)) in ids.iter().zip(stored).enumerate() {
            match line {
                _ if !seen.insert(*id) => rejected.push((
                    i,
                    DomainError::validation(format!("line {id} appears more than once")),
                )),
                Some(line) => found.push((i, line)),
                None => rejected.push((i, DomainError::validation(format!("no stored line {id}")))),
            }
        }
        Ok(found)
    }

    /// Write after-phase results back.
    ///
    /// A record the after phase rejects is rolled back: `previous[i]` is
    /// written again when given (updates), otherwise the record is removed
    /// (inserts). Its change never reaches the order totals.
    fn finish(
        &self,
        after: PhaseReport,
        positions: &[usize],
        previous: Option<&[OrderLineRecord]>,
        result: &mut DmlResult,
    ) -> DomainResult<()> {
        let mut restore = Vec::new();
        let mut undo = Vec::new();
        for (i, err) in after.rejected() {
            match previous {
                Some(previous) => restore.push(previous[i].clone()),
                None => undo.extend(after.records[i].id),
            }
            result.rejected.push((positions[i], err.clone()));
        }
        self.store.remove_lines(&undo)?;
        self.store.save_lines(&restore)?;

        let saved: Vec<OrderLineRecord> = after.accepted_records().cloned().collect();
        self.store.save_lines(&saved)?;
        self.store.apply_order_totals(&after.order_totals)?;

        tracing::info!(
            phase = ?after.phase,
            saved = saved.len(),
            rolled_back = restore.len() + undo.len(),
            orders = after.order_totals.len(),
            "write applied"
        );
        result.saved = saved;
        result.order_totals = after.order_totals;
        Ok(())
    }
}

fn accepted(report: &PhaseReport) -> impl Iterator<Item = (usize, &OrderLineRecord)> {
    report
        .records
        .iter()
        .zip(&report.outcomes)
        .enumerate()
        .filter(|(_, (_, o))| o.is_accepted())
        .map(|(i, (r, _))| (i, r))
}

fn collect_rejected(
    report: &PhaseReport,
    position: impl Fn(usize) -> usize,
) -> Vec<(usize, DomainError)> {
    report
        .rejected()
        .map(|(i, err)| (position(i), err.clone()))
        .collect()
}
