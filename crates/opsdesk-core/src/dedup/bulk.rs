//! Bulk orchestration: detect every duplicate group for both entity types,
//! then merge them one by one, capturing per-group failures so one bad group
//! never aborts the run. There is no retry and no checkpoint — an
//! interrupted run leaves committed groups merged, and re-running simply no
//! longer detects them.

use serde::Serialize;
use tracing::{error, info};

use crate::error::Result;
use crate::models::{CompanyRecord, CustomerRecord, EntityKind};
use crate::storage::database::Database;

use super::lock::MergeLock;
use super::matcher::{DuplicateGroup, find_duplicate_groups};
use super::merge::merge_group;

/// Scan the full customer collection and partition it into duplicate groups.
pub fn detect_customers(db: &Database) -> Result<(Vec<CustomerRecord>, Vec<DuplicateGroup>)> {
    let records = db.customers().list_all()?;
    let groups = find_duplicate_groups(&records);
    Ok((records, groups))
}

/// Scan the full company collection and partition it into duplicate groups.
pub fn detect_companies(db: &Database) -> Result<(Vec<CompanyRecord>, Vec<DuplicateGroup>)> {
    let records = db.companies().list_all()?;
    let groups = find_duplicate_groups(&records);
    Ok((records, groups))
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupFailure {
    pub group: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct EntityMergeReport {
    pub merged: usize,
    pub errors: Vec<GroupFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkMergeReport {
    pub customers: EntityMergeReport,
    pub companies: EntityMergeReport,
}

impl BulkMergeReport {
    pub fn total_merged(&self) -> usize {
        self.customers.merged + self.companies.merged
    }
}

/// Merge already-detected groups sequentially with isolated error capture.
pub fn merge_detected_groups(
    db: &Database,
    lock: &dyn MergeLock,
    kind: EntityKind,
    groups: &[DuplicateGroup],
    operator: &str,
) -> EntityMergeReport {
    let mut report = EntityMergeReport::default();

    for group in groups {
        match merge_group(db, lock, kind, &group.member_ids, None, operator) {
            Ok(outcome) => {
                info!(
                    kind = %kind,
                    master = %outcome.master_id,
                    merged = outcome.merged_count,
                    "merged duplicate group"
                );
                report.merged += 1;
            }
            Err(err) => {
                error!(kind = %kind, group = %group.key(), error = %err, "group merge failed");
                report.errors.push(GroupFailure {
                    group: group.key(),
                    error: err.to_string(),
                });
            }
        }
    }

    report
}

/// Merge everything: detection for the two entity types runs concurrently
/// (two independent read-only scans), then every group merges sequentially.
pub fn merge_all(db: &Database, lock: &dyn MergeLock, operator: &str) -> Result<BulkMergeReport> {
    let (customer_detection, company_detection) = std::thread::scope(|scope| {
        let customers = scope.spawn(|| detect_customers(db));
        let companies = detect_companies(db);
        let customers = match customers.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        };
        (customers, companies)
    });
    let (_, customer_groups) = customer_detection?;
    let (_, company_groups) = company_detection?;

    let customers =
        merge_detected_groups(db, lock, EntityKind::Customer, &customer_groups, operator);
    let companies =
        merge_detected_groups(db, lock, EntityKind::Company, &company_groups, operator);

    Ok(BulkMergeReport {
        customers,
        companies,
    })
}
