use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EntityKind;
use super::coerce::Timestamp;

/// One row per committed merge, written in the same batch as the merge
/// itself so the audit trail cannot drift from the data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeAudit {
    pub id: String,
    pub entity_type: EntityKind,
    pub master_id: String,
    pub merged_ids: Vec<String>,
    pub merged_by: String,
    pub merged_at: Timestamp,
}

impl MergeAudit {
    pub fn new(
        entity_type: EntityKind,
        master_id: impl Into<String>,
        merged_ids: Vec<String>,
        merged_by: impl Into<String>,
        merged_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            entity_type,
            master_id: master_id.into(),
            merged_ids,
            merged_by: merged_by.into(),
            merged_at,
        }
    }
}
