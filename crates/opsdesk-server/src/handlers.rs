use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};

use opsdesk_core::dedup::{self, DuplicateGroup, NoopMergeLock};
use opsdesk_core::{Database, EntityKind};

use crate::AppState;
use crate::api::{
    ApiError, BulkMergeResponse, CompanyDetection, CustomerDetection, DetectResponse, GroupView,
    MergeRequest, MergeResponse, RecordSummary,
};
use crate::auth::Operator;

fn customer_group_views(
    groups: &[DuplicateGroup],
    records: &[opsdesk_core::CustomerRecord],
) -> Vec<GroupView> {
    let by_id: HashMap<&str, &opsdesk_core::CustomerRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    groups
        .iter()
        .map(|group| GroupView {
            match_type: group.match_type,
            match_value: group.match_value.clone(),
            records: group
                .member_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(|record| RecordSummary::from(*record))
                .collect(),
        })
        .collect()
}

fn company_group_views(
    groups: &[DuplicateGroup],
    records: &[opsdesk_core::CompanyRecord],
) -> Vec<GroupView> {
    let by_id: HashMap<&str, &opsdesk_core::CompanyRecord> =
        records.iter().map(|r| (r.id.as_str(), r)).collect();

    groups
        .iter()
        .map(|group| GroupView {
            match_type: group.match_type,
            match_value: group.match_value.clone(),
            records: group
                .member_ids
                .iter()
                .filter_map(|id| by_id.get(id.as_str()))
                .map(|record| RecordSummary::from(*record))
                .collect(),
        })
        .collect()
}

fn duplicate_record_count(groups: &[DuplicateGroup]) -> usize {
    groups.iter().map(|group| group.member_ids.len()).sum()
}

/// GET /api/v1/duplicates — scan both entity collections (concurrently; the
/// scans are independent and read-only) and report every duplicate group.
pub async fn detect(State(state): State<AppState>) -> Result<Json<DetectResponse>, ApiError> {
    let customer_db: Arc<Database> = state.db.clone();
    let company_db: Arc<Database> = state.db.clone();

    let (customer_scan, company_scan) = tokio::try_join!(
        tokio::task::spawn_blocking(move || dedup::detect_customers(&customer_db)),
        tokio::task::spawn_blocking(move || dedup::detect_companies(&company_db)),
    )
    .map_err(|err| ApiError::task("detection", err))?;

    let (customer_records, customer_groups) =
        customer_scan.map_err(|err| ApiError::from_engine("detection", err))?;
    let (company_records, company_groups) =
        company_scan.map_err(|err| ApiError::from_engine("detection", err))?;

    let customers = CustomerDetection {
        total_customers: customer_records.len(),
        duplicate_count: duplicate_record_count(&customer_groups),
        duplicate_groups: customer_group_views(&customer_groups, &customer_records),
    };
    let companies = CompanyDetection {
        total_companies: company_records.len(),
        duplicate_count: duplicate_record_count(&company_groups),
        duplicate_groups: company_group_views(&company_groups, &company_records),
    };

    let summary = format!(
        "{} duplicate customers in {} groups, {} duplicate companies in {} groups",
        customers.duplicate_count,
        customers.duplicate_groups.len(),
        companies.duplicate_count,
        companies.duplicate_groups.len(),
    );

    Ok(Json(DetectResponse {
        success: true,
        customers,
        companies,
        summary,
    }))
}

/// POST /api/v1/duplicates/merge — either one explicit group or everything.
pub async fn merge(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Json(request): Json<MergeRequest>,
) -> Result<Response, ApiError> {
    match request {
        MergeRequest::All { merge_all } => {
            if !merge_all {
                return Err(ApiError::Validation("mergeAll must be true".into()));
            }

            let db = state.db.clone();
            let operator_id = operator.id.clone();
            let report =
                tokio::task::spawn_blocking(move || dedup::merge_all(&db, &NoopMergeLock, &operator_id))
                    .await
                    .map_err(|err| ApiError::task("bulk merge", err))?
                    .map_err(|err| ApiError::from_engine("bulk merge", err))?;

            Ok(Json(BulkMergeResponse {
                success: true,
                total_merged: report.total_merged(),
                customers: report.customers,
                companies: report.companies,
            })
            .into_response())
        }
        MergeRequest::Single {
            entity_type,
            ids,
            master_id,
        } => {
            if ids.len() < 2 {
                return Err(ApiError::Validation(
                    "at least two record ids are required for a merge".into(),
                ));
            }
            let kind: EntityKind = entity_type
                .parse()
                .map_err(|err: opsdesk_core::OpsdeskError| ApiError::Validation(err.to_string()))?;

            let db = state.db.clone();
            let operator_id = operator.id.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                dedup::merge_group(
                    &db,
                    &NoopMergeLock,
                    kind,
                    &ids,
                    master_id.as_deref(),
                    &operator_id,
                )
            })
            .await
            .map_err(|err| ApiError::task("merge", err))?
            .map_err(|err| ApiError::from_engine("merge", err))?;

            Ok(Json(MergeResponse {
                success: true,
                master_id: outcome.master_id,
                merged_count: outcome.merged_count,
                deleted_ids: outcome.deleted_ids,
            })
            .into_response())
        }
    }
}
