use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::Timestamp;

/// A company document. `notes` is stored either as a bare scalar or a list
/// depending on which generation of the console wrote it; keep the raw value
/// here and coerce through `to_note_list` at merge time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub contact_person: String,

    #[serde(default)]
    pub contact_email: String,

    #[serde(default)]
    pub contact_phone: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub website: String,

    #[serde(default)]
    pub tax_office: String,

    #[serde(default)]
    pub tax_number: String,

    #[serde(default)]
    pub total_projects: i64,

    #[serde(default)]
    pub total_revenue: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub merged_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged_by: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CompanyRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            contact_person: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            website: String::new(),
            tax_office: String::new(),
            tax_number: String::new(),
            total_projects: 0,
            total_revenue: 0.0,
            notes: None,
            created_at: Some(Timestamp::now()),
            merged_ids: Vec::new(),
            merged_at: None,
            merged_by: None,
            extra: Map::new(),
        }
    }

    pub fn created_epoch_millis(&self) -> i64 {
        self.created_at.map(|t| t.epoch_millis()).unwrap_or(0)
    }
}
