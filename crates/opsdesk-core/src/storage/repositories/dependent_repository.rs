use rusqlite::params;

use crate::error::Result;
use crate::models::{
    Activity, CaseRecord, Contract, Conversation, IntegrationRecord, PricingCalculation, Proforma,
};
use crate::storage::batch::Collection;
use crate::storage::database::Database;

use super::fetch_by_field;

/// Read access to every collection that references an entity by id. The
/// migrator fetches through these accessors during the read phase and stages
/// the rewrites into the merge batch.
pub struct DependentRepository<'a> {
    db: &'a Database,
}

impl<'a> DependentRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    // ─── Customer dependents ────────────────────────────────

    pub fn conversations_for_customer(&self, customer_id: &str) -> Result<Vec<Conversation>> {
        fetch_by_field(self.db, Collection::Conversations, "customerId", customer_id)
    }

    pub fn cases_for_customer(&self, customer_id: &str) -> Result<Vec<CaseRecord>> {
        fetch_by_field(self.db, Collection::Cases, "customerId", customer_id)
    }

    pub fn activities_for_customer(&self, customer_id: &str) -> Result<Vec<Activity>> {
        fetch_by_field(self.db, Collection::Activities, "customerId", customer_id)
    }

    // ─── Company dependents ─────────────────────────────────

    pub fn proformas_for_company(&self, company_id: &str) -> Result<Vec<Proforma>> {
        fetch_by_field(self.db, Collection::Proformas, "companyId", company_id)
    }

    pub fn contracts_for_company(&self, company_id: &str) -> Result<Vec<Contract>> {
        fetch_by_field(self.db, Collection::Contracts, "companyId", company_id)
    }

    pub fn integration_records_for_company(
        &self,
        company_id: &str,
    ) -> Result<Vec<IntegrationRecord>> {
        fetch_by_field(self.db, Collection::IntegrationRecords, "companyId", company_id)
    }

    /// Pricing calculations whose `linkedCompanies` list mentions the id.
    pub fn pricing_calculations_mentioning(
        &self,
        company_id: &str,
    ) -> Result<Vec<PricingCalculation>> {
        let conn = self.db.lock();
        let mut stmt = conn.prepare(
            "SELECT doc FROM pricing_calculations
             WHERE EXISTS (
                 SELECT 1 FROM json_each(json_extract(doc, '$.linkedCompanies'))
                 WHERE json_each.value = ?1
             )
             ORDER BY rowid",
        )?;
        let rows = stmt.query_map(params![company_id], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_customer_dependent_lookups() {
        let db = Database::open_in_memory().unwrap();
        db.put_raw(
            Collection::Conversations,
            "cnv_1",
            &json!({"id": "cnv_1", "customerId": "cus_1", "senderName": "Ali"}),
        )
        .unwrap();
        db.put_raw(
            Collection::Conversations,
            "cnv_2",
            &json!({"id": "cnv_2", "customerId": "cus_2"}),
        )
        .unwrap();
        db.put_raw(
            Collection::Cases,
            "cse_1",
            &json!({"id": "cse_1", "customerId": "cus_1"}),
        )
        .unwrap();

        let repo = db.dependents();
        let conversations = repo.conversations_for_customer("cus_1").unwrap();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0].sender_name, "Ali");

        assert_eq!(repo.cases_for_customer("cus_1").unwrap().len(), 1);
        assert!(repo.activities_for_customer("cus_1").unwrap().is_empty());
    }

    #[test]
    fn test_pricing_calculations_mentioning() {
        let db = Database::open_in_memory().unwrap();
        db.put_raw(
            Collection::PricingCalculations,
            "prc_1",
            &json!({"id": "prc_1", "linkedCompanies": ["com_1", "com_2"]}),
        )
        .unwrap();
        db.put_raw(
            Collection::PricingCalculations,
            "prc_2",
            &json!({"id": "prc_2", "linkedCompanies": ["com_3"]}),
        )
        .unwrap();

        let repo = db.dependents();
        let hits = repo.pricing_calculations_mentioning("com_2").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "prc_1");
        assert!(repo.pricing_calculations_mentioning("com_9").unwrap().is_empty());
    }
}
