//! Two-phase group merge.
//!
//! The read phase fetches the group members and every dependent record that
//! must move, then builds a [`MergePlan`]: the merge outcome plus a staged
//! [`WriteBatch`]. Nothing is written until the plan's batch is committed,
//! and the commit is all-or-nothing. The reads are not part of the
//! transaction — a dependent record created between read and commit is
//! missed until the next run (known eventual-consistency race).

use serde::Serialize;

use crate::error::{OpsdeskError, Result};
use crate::models::{CustomerRecord, EntityKind, Link, MergeAudit, Timestamp};
use crate::storage::batch::{Collection, WriteBatch};
use crate::storage::database::Database;
use crate::storage::repositories::Repository;

use super::fields::{merge_company_fields, merge_customer_fields};
use super::master::select_master;

/// What a committed merge did, reported back to the caller.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    pub entity_type: EntityKind,
    pub master_id: String,
    pub merged_count: usize,
    pub deleted_ids: Vec<String>,
}

/// A fully staged merge: commit `batch` to make `outcome` true.
#[derive(Debug)]
pub struct MergePlan {
    pub outcome: MergeOutcome,
    pub batch: WriteBatch,
}

fn free_text_merge_note(master_id: &str, duplicate_id: &str) -> String {
    format!("Record {duplicate_id} was merged into {master_id}")
}

/// The link conflict rule, named so it can be tested in isolation: when both
/// the master and a duplicate carry a Link, the master's existing Link wins
/// and the duplicate's is deleted rather than repointed.
pub fn master_link_wins(master_link: Option<&Link>, duplicate_link: &Link) -> LinkResolution {
    match master_link {
        Some(_) => LinkResolution::DeleteDuplicateLink,
        None => LinkResolution::RepointToMaster {
            company_id: duplicate_link.company_id.clone(),
            customer_id: duplicate_link.customer_id.clone(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkResolution {
    DeleteDuplicateLink,
    RepointToMaster {
        company_id: String,
        customer_id: String,
    },
}

fn fetch_group<R, F>(ids: &[String], fetch: F) -> Result<Vec<R>>
where
    F: Fn(&String) -> Result<Option<R>>,
{
    if ids.len() < 2 {
        return Err(OpsdeskError::Validation(
            "at least two record ids are required for a merge".into(),
        ));
    }

    let mut records = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(record) = fetch(id)? {
            records.push(record);
        }
    }

    if records.len() < 2 {
        return Err(OpsdeskError::TooFewRecords {
            requested: ids.len(),
            found: records.len(),
        });
    }

    Ok(records)
}

/// Build the full plan for one customer group.
pub fn plan_customer_merge(
    db: &Database,
    ids: &[String],
    explicit_master_id: Option<&str>,
    operator: &str,
) -> Result<MergePlan> {
    let customers = db.customers();
    let records = fetch_group(ids, |id| customers.find_by_id(id))?;

    let master = select_master(&records, explicit_master_id)?;
    let master_id = master.id.clone();
    let duplicates: Vec<&CustomerRecord> =
        records.iter().filter(|r| r.id != master_id).collect();

    let now = Timestamp::now();
    let mut merged = merge_customer_fields(master, &duplicates, operator, now);

    let mut batch = WriteBatch::new();
    let dependents = db.dependents();
    let links = db.links();
    let mut master_link = links.find_by_customer_id(&master_id)?;

    for duplicate in &duplicates {
        for mut conversation in dependents.conversations_for_customer(&duplicate.id)? {
            conversation.customer_id = master_id.clone();
            conversation.updated_at = Some(now);
            conversation.merge_note = Some(free_text_merge_note(&master_id, &duplicate.id));
            // Backfill the embedded sender from the master's own fields;
            // an empty master field keeps the duplicate's value.
            if !master.name.is_empty() {
                conversation.sender_name = master.name.clone();
            }
            if !master.email.is_empty() {
                conversation.sender_email = master.email.clone();
            }
            if !master.phone.is_empty() {
                conversation.sender_phone = master.phone.clone();
            }
            batch.put(Collection::Conversations, &conversation.id, &conversation)?;
        }

        for mut case in dependents.cases_for_customer(&duplicate.id)? {
            case.customer_id = master_id.clone();
            case.updated_at = Some(now);
            case.merge_note = Some(free_text_merge_note(&master_id, &duplicate.id));
            batch.put(Collection::Cases, &case.id, &case)?;
        }

        for mut activity in dependents.activities_for_customer(&duplicate.id)? {
            activity.customer_id = master_id.clone();
            activity.updated_at = Some(now);
            batch.put(Collection::Activities, &activity.id, &activity)?;
        }

        if let Some(duplicate_link) = links.find_by_customer_id(&duplicate.id)? {
            match master_link_wins(master_link.as_ref(), &duplicate_link) {
                LinkResolution::DeleteDuplicateLink => {
                    batch.delete(Collection::Links, &duplicate_link.id);
                }
                LinkResolution::RepointToMaster { company_id, .. } => {
                    let mut repointed = duplicate_link;
                    repointed.customer_id = master_id.clone();
                    batch.put(Collection::Links, &repointed.id, &repointed)?;
                    // Keep the denormalized back-reference consistent with
                    // the link that now points at the master.
                    merged.linked_company_id = Some(company_id);
                    master_link = Some(repointed);
                }
            }
        }
    }

    let deleted_ids: Vec<String> = duplicates.iter().map(|d| d.id.clone()).collect();
    batch.put(Collection::Customers, &master_id, &merged)?;
    for id in &deleted_ids {
        batch.delete(Collection::Customers, id);
    }

    let audit = MergeAudit::new(
        EntityKind::Customer,
        &master_id,
        deleted_ids.clone(),
        operator,
        now,
    );
    batch.put(Collection::MergeAudit, &audit.id, &audit)?;

    Ok(MergePlan {
        outcome: MergeOutcome {
            entity_type: EntityKind::Customer,
            master_id,
            merged_count: deleted_ids.len(),
            deleted_ids,
        },
        batch,
    })
}

/// Build the full plan for one company group.
pub fn plan_company_merge(
    db: &Database,
    ids: &[String],
    explicit_master_id: Option<&str>,
    operator: &str,
) -> Result<MergePlan> {
    let companies = db.companies();
    let records = fetch_group(ids, |id| companies.find_by_id(id))?;

    let master = select_master(&records, explicit_master_id)?;
    let master_id = master.id.clone();
    let duplicates: Vec<&crate::models::CompanyRecord> =
        records.iter().filter(|r| r.id != master_id).collect();

    let now = Timestamp::now();
    let merged = merge_company_fields(master, &duplicates, operator, now);

    let mut batch = WriteBatch::new();
    let dependents = db.dependents();
    let links = db.links();
    let mut master_link = links.find_by_company_id(&master_id)?;
    let mut reasserted_back_reference = false;

    for duplicate in &duplicates {
        for mut proforma in dependents.proformas_for_company(&duplicate.id)? {
            proforma.company_id = master_id.clone();
            proforma.updated_at = Some(now);
            batch.put(Collection::Proformas, &proforma.id, &proforma)?;
        }

        for mut contract in dependents.contracts_for_company(&duplicate.id)? {
            contract.company_id = master_id.clone();
            contract.updated_at = Some(now);
            batch.put(Collection::Contracts, &contract.id, &contract)?;
        }

        for mut record in dependents.integration_records_for_company(&duplicate.id)? {
            record.company_id = master_id.clone();
            record.updated_at = Some(now);
            batch.put(Collection::IntegrationRecords, &record.id, &record)?;
        }

        for mut calculation in dependents.pricing_calculations_mentioning(&duplicate.id)? {
            let rewritten = substitute_and_dedup(
                &calculation.linked_companies,
                &duplicate.id,
                &master_id,
            );
            if let Some(linked_companies) = rewritten {
                calculation.linked_companies = linked_companies;
                calculation.updated_at = Some(now);
                batch.put(
                    Collection::PricingCalculations,
                    &calculation.id,
                    &calculation,
                )?;
            }
        }

        if let Some(duplicate_link) = links.find_by_company_id(&duplicate.id)? {
            match master_link_wins(master_link.as_ref(), &duplicate_link) {
                LinkResolution::DeleteDuplicateLink => {
                    batch.delete(Collection::Links, &duplicate_link.id);
                    // Re-assert the surviving customer's back-reference so it
                    // keeps pointing at the master company. Staged once.
                    if !reasserted_back_reference {
                        if let Some(link) = master_link.as_ref() {
                            if let Some(mut customer) =
                                db.customers().find_by_id(&link.customer_id)?
                            {
                                customer.linked_company_id = Some(master_id.clone());
                                batch.put(Collection::Customers, &customer.id, &customer)?;
                                reasserted_back_reference = true;
                            }
                        }
                    }
                }
                LinkResolution::RepointToMaster { .. } => {
                    let mut repointed = duplicate_link;
                    repointed.company_id = master_id.clone();
                    batch.put(Collection::Links, &repointed.id, &repointed)?;
                    master_link = Some(repointed);
                }
            }
        }
    }

    let deleted_ids: Vec<String> = duplicates.iter().map(|d| d.id.clone()).collect();
    batch.put(Collection::Companies, &master_id, &merged)?;
    for id in &deleted_ids {
        batch.delete(Collection::Companies, id);
    }

    let audit = MergeAudit::new(
        EntityKind::Company,
        &master_id,
        deleted_ids.clone(),
        operator,
        now,
    );
    batch.put(Collection::MergeAudit, &audit.id, &audit)?;

    Ok(MergePlan {
        outcome: MergeOutcome {
            entity_type: EntityKind::Company,
            master_id,
            merged_count: deleted_ids.len(),
            deleted_ids,
        },
        batch,
    })
}

/// Replace `from` with `to` in a linked-company list, then de-duplicate
/// keeping first occurrences. Returns `None` when no substitution occurred
/// so untouched calculations are not rewritten.
fn substitute_and_dedup(linked: &[String], from: &str, to: &str) -> Option<Vec<String>> {
    if !linked.iter().any(|id| id == from) {
        return None;
    }

    let mut seen = std::collections::HashSet::new();
    let mut rewritten = Vec::with_capacity(linked.len());
    for id in linked {
        let replacement = if id == from { to.to_string() } else { id.clone() };
        if seen.insert(replacement.clone()) {
            rewritten.push(replacement);
        }
    }
    Some(rewritten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_link_wins_policy() {
        let master_link = Link::new("lnk_m", "cus_m", "com_1");
        let duplicate_link = Link::new("lnk_d", "cus_d", "com_2");

        assert_eq!(
            master_link_wins(Some(&master_link), &duplicate_link),
            LinkResolution::DeleteDuplicateLink
        );
        assert_eq!(
            master_link_wins(None, &duplicate_link),
            LinkResolution::RepointToMaster {
                company_id: "com_2".to_string(),
                customer_id: "cus_d".to_string(),
            }
        );
    }

    #[test]
    fn test_substitute_and_dedup() {
        let linked = vec!["com_a".to_string(), "com_dup".to_string(), "com_b".to_string()];
        assert_eq!(
            substitute_and_dedup(&linked, "com_dup", "com_a"),
            Some(vec!["com_a".to_string(), "com_b".to_string()])
        );

        // No occurrence → no rewrite
        assert_eq!(substitute_and_dedup(&linked, "com_x", "com_a"), None);

        // Order of first occurrences is preserved
        let linked = vec!["com_dup".to_string(), "com_a".to_string()];
        assert_eq!(
            substitute_and_dedup(&linked, "com_dup", "com_m"),
            Some(vec!["com_m".to_string(), "com_a".to_string()])
        );
    }

    #[test]
    fn test_plan_requires_two_existing_records() {
        let db = Database::open_in_memory().unwrap();
        db.customers()
            .save(&CustomerRecord::new("cus_1", "Only One"))
            .unwrap();

        let err = plan_customer_merge(
            &db,
            &["cus_1".to_string(), "cus_ghost".to_string()],
            None,
            "op",
        )
        .unwrap_err();
        assert!(matches!(err, OpsdeskError::TooFewRecords { found: 1, .. }));

        let err = plan_customer_merge(&db, &["cus_1".to_string()], None, "op").unwrap_err();
        assert!(matches!(err, OpsdeskError::Validation(_)));
    }

    #[test]
    fn test_plan_rejects_unknown_explicit_master() {
        let db = Database::open_in_memory().unwrap();
        db.customers().save(&CustomerRecord::new("cus_1", "A")).unwrap();
        db.customers().save(&CustomerRecord::new("cus_2", "B")).unwrap();

        let err = plan_customer_merge(
            &db,
            &["cus_1".to_string(), "cus_2".to_string()],
            Some("cus_9"),
            "op",
        )
        .unwrap_err();
        assert!(matches!(err, OpsdeskError::MasterNotFound(_)));
    }
}
