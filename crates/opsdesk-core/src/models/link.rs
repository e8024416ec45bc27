use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::coerce::Timestamp;

/// Standalone association between one customer and one company. Not owned by
/// either side; created and deleted independently. At most one per side is
/// the observed invariant, but the store does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: String,

    pub customer_id: String,

    pub company_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Link {
    pub fn new(
        id: impl Into<String>,
        customer_id: impl Into<String>,
        company_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            customer_id: customer_id.into(),
            company_id: company_id.into(),
            created_at: Some(Timestamp::now()),
            extra: Map::new(),
        }
    }
}
