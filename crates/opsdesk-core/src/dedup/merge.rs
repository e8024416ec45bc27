//! Single-group merge entry points: lease, plan, commit.

use crate::error::Result;
use crate::models::EntityKind;
use crate::storage::database::Database;

use super::lock::MergeLock;
use super::plan::{MergeOutcome, plan_company_merge, plan_customer_merge};

/// Merge one customer group. Validation happens during planning, before any
/// write; the commit is one atomic batch.
pub fn merge_customer_group(
    db: &Database,
    lock: &dyn MergeLock,
    ids: &[String],
    explicit_master_id: Option<&str>,
    operator: &str,
) -> Result<MergeOutcome> {
    let _lease = lock.acquire(ids)?;
    let plan = plan_customer_merge(db, ids, explicit_master_id, operator)?;
    db.commit(plan.batch)?;
    Ok(plan.outcome)
}

/// Merge one company group.
pub fn merge_company_group(
    db: &Database,
    lock: &dyn MergeLock,
    ids: &[String],
    explicit_master_id: Option<&str>,
    operator: &str,
) -> Result<MergeOutcome> {
    let _lease = lock.acquire(ids)?;
    let plan = plan_company_merge(db, ids, explicit_master_id, operator)?;
    db.commit(plan.batch)?;
    Ok(plan.outcome)
}

/// Dispatch by entity kind.
pub fn merge_group(
    db: &Database,
    lock: &dyn MergeLock,
    kind: EntityKind,
    ids: &[String],
    explicit_master_id: Option<&str>,
    operator: &str,
) -> Result<MergeOutcome> {
    match kind {
        EntityKind::Customer => merge_customer_group(db, lock, ids, explicit_master_id, operator),
        EntityKind::Company => merge_company_group(db, lock, ids, explicit_master_id, operator),
    }
}
