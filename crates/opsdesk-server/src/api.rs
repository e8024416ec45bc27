//! Request/response types and the error-to-status mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use opsdesk_core::dedup::{EntityMergeReport, MatchType};
use opsdesk_core::{CompanyRecord, CustomerRecord, OpsdeskError, Timestamp};

// ─── Detect ─────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub success: bool,
    pub customers: CustomerDetection,
    pub companies: CompanyDetection,
    pub summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetection {
    pub total_customers: usize,
    pub duplicate_groups: Vec<GroupView>,
    pub duplicate_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDetection {
    pub total_companies: usize,
    pub duplicate_groups: Vec<GroupView>,
    pub duplicate_count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupView {
    pub match_type: MatchType,
    pub match_value: String,
    pub records: Vec<RecordSummary>,
}

/// Per-record detail inside a detected group. Customer rows carry
/// `companyName`/`linkedCompanyId`, company rows `contactPerson`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordSummary {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_company_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl From<&CustomerRecord> for RecordSummary {
    fn from(record: &CustomerRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            company_name: Some(record.company_info.name.clone()),
            linked_company_id: record.linked_company_id.clone(),
            contact_person: None,
            created_at: record.created_at,
        }
    }
}

impl From<&CompanyRecord> for RecordSummary {
    fn from(record: &CompanyRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            company_name: None,
            linked_company_id: None,
            contact_person: Some(record.contact_person.clone()),
            created_at: record.created_at,
        }
    }
}

// ─── Merge ──────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum MergeRequest {
    All {
        #[serde(rename = "mergeAll")]
        merge_all: bool,
    },
    Single {
        #[serde(rename = "type")]
        entity_type: String,
        ids: Vec<String>,
        #[serde(rename = "masterId", default)]
        master_id: Option<String>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeResponse {
    pub success: bool,
    pub master_id: String,
    pub merged_count: usize,
    pub deleted_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkMergeResponse {
    pub success: bool,
    pub customers: EntityMergeReport,
    pub companies: EntityMergeReport,
    pub total_merged: usize,
}

// ─── Errors ─────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("missing or invalid bearer token")]
    Unauthorized,

    #[error("{message}: {details}")]
    Internal { message: String, details: String },
}

impl ApiError {
    /// Classify an engine error: caller mistakes become 400s, everything
    /// else is reported as a generic failure and logged server-side.
    pub fn from_engine(action: &str, err: OpsdeskError) -> Self {
        if err.is_validation() {
            ApiError::Validation(err.to_string())
        } else {
            tracing::error!(action, error = %err, "engine operation failed");
            ApiError::Internal {
                message: format!("{action} failed"),
                details: err.to_string(),
            }
        }
    }

    pub fn task(action: &str, err: tokio::task::JoinError) -> Self {
        tracing::error!(action, error = %err, "blocking task failed");
        ApiError::Internal {
            message: format!("{action} failed"),
            details: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "missing or invalid bearer token" })),
            )
                .into_response(),
            ApiError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message, "details": details })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_request_shapes_deserialize() {
        let all: MergeRequest = serde_json::from_str(r#"{"mergeAll": true}"#).unwrap();
        assert!(matches!(all, MergeRequest::All { merge_all: true }));

        let single: MergeRequest = serde_json::from_str(
            r#"{"type": "customer", "ids": ["a", "b"], "masterId": "a"}"#,
        )
        .unwrap();
        match single {
            MergeRequest::Single {
                entity_type,
                ids,
                master_id,
            } => {
                assert_eq!(entity_type, "customer");
                assert_eq!(ids.len(), 2);
                assert_eq!(master_id.as_deref(), Some("a"));
            }
            MergeRequest::All { .. } => panic!("parsed as mergeAll"),
        }

        let no_master: MergeRequest =
            serde_json::from_str(r#"{"type": "company", "ids": ["x", "y"]}"#).unwrap();
        assert!(matches!(
            no_master,
            MergeRequest::Single { master_id: None, .. }
        ));
    }

    #[test]
    fn test_engine_error_classification() {
        let validation = ApiError::from_engine(
            "merge",
            OpsdeskError::Validation("too few ids".into()),
        );
        assert!(matches!(validation, ApiError::Validation(_)));

        let commit_failure = OpsdeskError::Io(std::io::Error::other("disk failed"));
        let internal = ApiError::from_engine("merge", commit_failure);
        match internal {
            ApiError::Internal { message, details } => {
                assert_eq!(message, "merge failed");
                assert!(details.contains("disk failed"));
            }
            other => panic!("expected internal error, got {other:?}"),
        }
    }
}
