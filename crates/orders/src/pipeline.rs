//! Record change pipeline: before phases validate, after phases recalculate.
//!
//! ```text
//! host write
//!   ↓
//! before phase   (validate, stamp unit price)      → outcomes, records
//!   ↓
//! host persists accepted records
//!   ↓
//! after phase    (line totals, order total deltas) → recalculated, order_totals
//!   ↓
//! host applies recalculated values
//! ```
//!
//! Every phase is one pass over the batch plus at most one
//! [`OrderLookup::products`] and one [`OrderLookup::order_totals`] call, each
//! given the de-duplicated ids of the whole batch. A record that fails
//! validation is marked invalid and its siblings carry on; only a failed
//! lookup fails the run.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use orderdesk_core::{DomainError, DomainResult, Entity, Money, OrderId, OrderLineId, ProductId};
use orderdesk_products::{Product, stock};

use crate::batch::{ChangeBatch, Phase, TriggerContext};
use crate::config::PipelineConfig;
use crate::lookup::OrderLookup;
use crate::record::{LineStatus, OrderLineRecord};
use crate::report::{LineRecalculation, OrderTotalChange, PhaseReport, RecordOutcome};

/// Stateless across runs; each [`RecordChangePipeline::run`] is independent.
#[derive(Debug)]
pub struct RecordChangePipeline<L> {
    lookup: L,
    config: PipelineConfig,
}

impl<L> RecordChangePipeline<L>
where
    L: OrderLookup,
{
    pub fn new(lookup: L) -> Self {
        Self::with_config(lookup, PipelineConfig::default())
    }

    pub fn with_config(lookup: L, config: PipelineConfig) -> Self {
        Self { lookup, config }
    }

    pub fn lookup(&self) -> &L {
        &self.lookup
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    /// Run the phase selected by `ctx` over `batch`.
    pub fn run(&self, batch: &ChangeBatch, ctx: TriggerContext) -> DomainResult<PhaseReport> {
        let Some(phase) = ctx.phase()? else {
            tracing::debug!(operation = ?ctx.operation, "no phase for trigger context");
            return Ok(PhaseReport::empty(None));
        };

        tracing::debug!(?phase, records = batch.len(), "running record change phase");

        let report = match phase {
            Phase::BeforeInsert => self.before_insert(batch.require_new(phase)?)?,
            Phase::BeforeUpdate => {
                let (old, new) = batch.require_pairs(phase)?;
                self.before_update(old, new)?
            }
            Phase::AfterInsert => self.after_insert(batch.require_new(phase)?)?,
            Phase::AfterUpdate => {
                let (old, new) = batch.require_pairs(phase)?;
                self.after_update(old, new)?
            }
            Phase::AfterDelete => self.after_delete(batch.require_old(phase)?)?,
        };

        let rejected = report.invalid_count();
        if rejected > 0 {
            for (index, err) in report.rejected() {
                tracing::debug!(?phase, index, error = %err, "record rejected");
            }
            tracing::warn!(?phase, rejected, records = batch.len(), "records rejected");
        }
        tracing::debug!(
            ?phase,
            recalculated = report.recalculated.len(),
            orders = report.order_totals.len(),
            "record change phase complete"
        );

        Ok(report)
    }

    fn before_insert(&self, new: &[OrderLineRecord]) -> DomainResult<PhaseReport> {
        let products = self.fetch_products(new.iter())?;
        let mut report = PhaseReport::with_capacity(Phase::BeforeInsert, new.len());

        for record in new {
            let mut record = record.clone();
            let needed = record.quantity;
            let outcome = self.check_line(&mut record, &products, needed, false);
            Self::settle(&mut report, record, outcome);
        }

        Ok(report)
    }

    fn before_update(
        &self,
        old: &[OrderLineRecord],
        new: &[OrderLineRecord],
    ) -> DomainResult<PhaseReport> {
        let products = self.fetch_products(
            old.iter()
                .zip(new)
                .filter(|(o, n)| n.pricing_changed(o))
                .map(|(_, n)| n),
        )?;
        let mut report = PhaseReport::with_capacity(Phase::BeforeUpdate, new.len());

        for (old, new) in old.iter().zip(new) {
            let mut record = new.clone();
            if !new.pricing_changed(old) {
                report.push(record, RecordOutcome::Unchanged);
                continue;
            }

            // A different product needs its full quantity; the same product
            // only needs the increase.
            let product_changed = new.product_id != old.product_id;
            let needed = if product_changed {
                new.quantity
            } else {
                new.quantity.saturating_sub(old.quantity)
            };
            let restamp = product_changed && new.unit_price == old.unit_price;

            let outcome = self.check_line(&mut record, &products, needed, restamp);
            Self::settle(&mut report, record, outcome);
        }

        Ok(report)
    }

    fn after_insert(&self, new: &[OrderLineRecord]) -> DomainResult<PhaseReport> {
        let mut report = PhaseReport::with_capacity(Phase::AfterInsert, new.len());
        let mut deltas: BTreeMap<OrderId, i128> = BTreeMap::new();

        for (index, record) in new.iter().enumerate() {
            let mut record = record.clone();
            match Self::recalculate(&record) {
                Ok((line_id, line_total)) => {
                    report.recalculated.push(LineRecalculation {
                        index,
                        line_id,
                        previous: record.line_total(),
                        line_total,
                    });
                    *deltas.entry(record.order_id).or_default() += i128::from(line_total.minor());
                    record.set_line_total(line_total);
                    report.push(record, RecordOutcome::Valid);
                }
                Err(err) => report.push(record, RecordOutcome::Invalid(err)),
            }
        }

        report.order_totals = self.roll_up(deltas)?;
        Ok(report)
    }

    fn after_update(
        &self,
        old: &[OrderLineRecord],
        new: &[OrderLineRecord],
    ) -> DomainResult<PhaseReport> {
        let mut report = PhaseReport::with_capacity(Phase::AfterUpdate, new.len());
        let mut deltas: BTreeMap<OrderId, i128> = BTreeMap::new();

        for (index, (old, new)) in old.iter().zip(new).enumerate() {
            let mut record = new.clone();
            if !new.rollup_changed(old) {
                report.push(record, RecordOutcome::Unchanged);
                continue;
            }

            match Self::recalculate(&record) {
                Ok((line_id, line_total)) => {
                    let previous = old.line_total();
                    report.recalculated.push(LineRecalculation {
                        index,
                        line_id,
                        previous,
                        line_total,
                    });
                    *deltas.entry(old.order_id).or_default() -= i128::from(previous.minor());
                    *deltas.entry(new.order_id).or_default() += i128::from(line_total.minor());
                    record.set_line_total(line_total);
                    report.push(record, RecordOutcome::Valid);
                }
                Err(err) => report.push(record, RecordOutcome::Invalid(err)),
            }
        }

        report.order_totals = self.roll_up(deltas)?;
        Ok(report)
    }

    fn after_delete(&self, old: &[OrderLineRecord]) -> DomainResult<PhaseReport> {
        let mut report = PhaseReport::with_capacity(Phase::AfterDelete, old.len());
        let mut deltas: BTreeMap<OrderId, i128> = BTreeMap::new();

        for record in old {
            if !record.is_persisted() {
                report.push(
                    record.clone(),
                    RecordOutcome::Invalid(DomainError::validation("deleted record has no id")),
                );
                continue;
            }
            *deltas.entry(record.order_id).or_default() -= i128::from(record.line_total().minor());
            report.push(record.clone(), RecordOutcome::Valid);
        }

        report.order_totals = self.roll_up(deltas)?;
        Ok(report)
    }

    /// Field-level checks shared by both before phases. On success the
    /// record carries a unit price; on failure it is left as it was.
    fn check_line(
        &self,
        record: &mut OrderLineRecord,
        products: &HashMap<ProductId, Product>,
        needed: i64,
        restamp: bool,
    ) -> DomainResult<()> {
        if record.quantity <= 0 {
            return Err(DomainError::InvalidQuantity {
                requested: record.quantity,
            });
        }
        let product = products
            .get(&record.product_id)
            .ok_or_else(|| DomainError::product_not_found(&record.product_id))?;
        if self.config.enforce_stock && needed > 0 {
            stock::validate(needed, product.available())?;
        }
        if restamp || record.unit_price.is_none() {
            record.unit_price = Some(product.unit_price);
        }
        Ok(())
    }

    fn settle(report: &mut PhaseReport, mut record: OrderLineRecord, outcome: DomainResult<()>) {
        match outcome {
            Ok(()) => {
                record.mark(LineStatus::Validated);
                report.push(record, RecordOutcome::Valid);
            }
            Err(err) => {
                record.mark(LineStatus::Pending);
                report.push(record, RecordOutcome::Invalid(err));
            }
        }
    }

    fn recalculate(record: &OrderLineRecord) -> DomainResult<(OrderLineId, Money)> {
        let line_id = record
            .id
            .ok_or_else(|| DomainError::validation("record has no id; after phases need persisted records"))?;
        Ok((line_id, record.computed_total()?))
    }

    fn fetch_products<'a>(
        &self,
        records: impl Iterator<Item = &'a OrderLineRecord>,
    ) -> DomainResult<HashMap<ProductId, Product>> {
        let ids: BTreeSet<ProductId> = records.map(|r| r.product_id.clone()).collect();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        self.lookup.products(&ids)
    }

    fn roll_up(&self, deltas: BTreeMap<OrderId, i128>) -> DomainResult<Vec<OrderTotalChange>> {
        if deltas.is_empty() {
            return Ok(Vec::new());
        }
        let ids: BTreeSet<OrderId> = deltas.keys().copied().collect();
        let stored = self.lookup.order_totals(&ids)?;

        Ok(deltas
            .into_iter()
            .map(|(order_id, delta)| {
                let previous = stored.get(&order_id).copied().unwrap_or(Money::ZERO);
                let total = (i128::from(previous.minor()) + delta).clamp(0, i128::from(u64::MAX));
                OrderTotalChange {
                    order_id,
                    previous,
                    // Clamped to the u64 range above.
                    total: Money::from_minor(total as u64),
                }
            })
            .collect())
    }
}
