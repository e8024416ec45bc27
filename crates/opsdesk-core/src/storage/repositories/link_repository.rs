use crate::error::Result;
use crate::models::Link;
use crate::storage::batch::Collection;
use crate::storage::database::Database;

use super::{Repository, delete_by_id, fetch_all, fetch_by_field, fetch_one};

/// Typed accessors over the standalone customer↔company association records.
/// At most one link per side is the observed invariant; it is not enforced,
/// so the finders return the first match in collection order.
pub struct LinkRepository<'a> {
    db: &'a Database,
}

impl<'a> LinkRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn find_by_customer_id(&self, customer_id: &str) -> Result<Option<Link>> {
        let mut links: Vec<Link> =
            fetch_by_field(self.db, Collection::Links, "customerId", customer_id)?;
        Ok(if links.is_empty() {
            None
        } else {
            Some(links.remove(0))
        })
    }

    pub fn find_by_company_id(&self, company_id: &str) -> Result<Option<Link>> {
        let mut links: Vec<Link> =
            fetch_by_field(self.db, Collection::Links, "companyId", company_id)?;
        Ok(if links.is_empty() {
            None
        } else {
            Some(links.remove(0))
        })
    }

    pub fn list_all(&self) -> Result<Vec<Link>> {
        fetch_all(self.db, Collection::Links)
    }
}

impl Repository for LinkRepository<'_> {
    type Entity = Link;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        fetch_one(self.db, Collection::Links, id)
    }

    fn save(&self, link: &Self::Entity) -> Result<()> {
        let doc = serde_json::to_value(link)?;
        self.db.put_raw(Collection::Links, &link.id, &doc)
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        delete_by_id(self.db, Collection::Links, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_either_side() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.links();

        repo.save(&Link::new("lnk_1", "cus_1", "com_1")).unwrap();
        repo.save(&Link::new("lnk_2", "cus_2", "com_2")).unwrap();

        let by_customer = repo.find_by_customer_id("cus_2").unwrap().unwrap();
        assert_eq!(by_customer.id, "lnk_2");

        let by_company = repo.find_by_company_id("com_1").unwrap().unwrap();
        assert_eq!(by_company.id, "lnk_1");

        assert!(repo.find_by_customer_id("cus_9").unwrap().is_none());
    }

    #[test]
    fn test_duplicate_sides_return_first_in_collection_order() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.links();

        repo.save(&Link::new("lnk_a", "cus_1", "com_1")).unwrap();
        repo.save(&Link::new("lnk_b", "cus_1", "com_2")).unwrap();

        let found = repo.find_by_customer_id("cus_1").unwrap().unwrap();
        assert_eq!(found.id, "lnk_a");
    }
}
