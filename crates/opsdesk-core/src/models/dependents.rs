//! Records outside the entity collections that reference an entity by id.
//! Migration rewrites their foreign keys when a duplicate is folded into a
//! master; every type keeps a flattened `extra` map so the rewrite preserves
//! whatever else the owning module stored on the document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::Timestamp;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,

    #[serde(default)]
    pub customer_id: String,

    #[serde(default)]
    pub sender_name: String,

    #[serde(default)]
    pub sender_email: String,

    #[serde(default)]
    pub sender_phone: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_note: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    pub id: String,

    #[serde(default)]
    pub customer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge_note: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: String,

    #[serde(default)]
    pub customer_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proforma {
    pub id: String,

    #[serde(default)]
    pub company_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub id: String,

    #[serde(default)]
    pub company_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Record mirrored from an external integration; repointed like the other
/// company dependents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationRecord {
    pub id: String,

    #[serde(default)]
    pub company_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A pricing calculation references companies as a list rather than a single
/// foreign key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingCalculation {
    pub id: String,

    #[serde(default)]
    pub linked_companies: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
