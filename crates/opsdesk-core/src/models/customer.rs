use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::Timestamp;

/// A CRM customer document. Field names follow the store's camelCase wire
/// format; unknown fields are preserved through `extra` so a merge rewrite
/// never drops data the engine does not model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerRecord {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub company_info: CompanyInfo,

    #[serde(default)]
    pub tax_info: TaxInfo,

    #[serde(default)]
    pub stats: CustomerStats,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_company_id: Option<String>,

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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub position: String,

    #[serde(default)]
    pub website: String,

    #[serde(default)]
    pub address: String,

    #[serde(default)]
    pub city: String,

    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxInfo {
    #[serde(default)]
    pub office: String,

    #[serde(default)]
    pub number: String,
}

/// Aggregate counters kept denormalized on the customer document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    #[serde(default)]
    pub total_conversations: i64,

    #[serde(default)]
    pub total_cases: i64,

    #[serde(default)]
    pub cases_won: i64,

    #[serde(default)]
    pub cases_lost: i64,

    #[serde(default)]
    pub cases_open: i64,

    #[serde(default)]
    pub total_value: f64,
}

impl CustomerRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            company_info: CompanyInfo::default(),
            tax_info: TaxInfo::default(),
            stats: CustomerStats::default(),
            linked_company_id: None,
            created_at: Some(Timestamp::now()),
            merged_ids: Vec::new(),
            merged_at: None,
            merged_by: None,
            extra: Map::new(),
        }
    }

    /// Creation time in epoch milliseconds; missing timestamps count as
    /// epoch 0 (oldest) for master selection.
    pub fn created_epoch_millis(&self) -> i64 {
        self.created_at.map(|t| t.epoch_millis()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_json_roundtrip_preserves_unknown_fields() {
        let doc = json!({
            "id": "cus_1",
            "name": "Ali Veli",
            "email": "ali@example.com",
            "companyInfo": {"name": "Acme", "city": "Istanbul"},
            "stats": {"totalConversations": 3, "totalValue": 1500.0},
            "leadSource": "trade-fair",
            "createdAt": 1_685_620_800
        });

        let record: CustomerRecord = serde_json::from_value(doc).unwrap();
        assert_eq!(record.name, "Ali Veli");
        assert_eq!(record.company_info.name, "Acme");
        assert_eq!(record.stats.total_conversations, 3);
        assert_eq!(record.created_epoch_millis(), 1_685_620_800_000);

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["leadSource"], "trade-fair");
    }

    #[test]
    fn test_missing_created_at_counts_as_epoch_zero() {
        let record: CustomerRecord = serde_json::from_value(json!({"id": "cus_2"})).unwrap();
        assert_eq!(record.created_epoch_millis(), 0);
    }
}
