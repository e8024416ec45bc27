use crate::error::Result;
use crate::models::CustomerRecord;
use crate::storage::batch::Collection;
use crate::storage::database::Database;

use super::{Repository, delete_by_id, fetch_all, fetch_one};

pub struct CustomerRepository<'a> {
    db: &'a Database,
}

impl<'a> CustomerRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every customer in collection order.
    pub fn list_all(&self) -> Result<Vec<CustomerRecord>> {
        fetch_all(self.db, Collection::Customers)
    }

    pub fn count(&self) -> Result<usize> {
        self.db.count(Collection::Customers)
    }
}

impl Repository for CustomerRepository<'_> {
    type Entity = CustomerRecord;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        fetch_one(self.db, Collection::Customers, id)
    }

    fn save(&self, record: &Self::Entity) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.db.put_raw(Collection::Customers, &record.id, &doc)
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        delete_by_id(self.db, Collection::Customers, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_find_delete() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.customers();

        let record = CustomerRecord::new("cus_1", "Ali Veli");
        repo.save(&record).unwrap();

        let found = repo.find_by_id(&"cus_1".to_string()).unwrap().unwrap();
        assert_eq!(found.name, "Ali Veli");

        assert!(repo.delete(&"cus_1".to_string()).unwrap());
        assert!(repo.find_by_id(&"cus_1".to_string()).unwrap().is_none());
        assert!(!repo.delete(&"cus_1".to_string()).unwrap());
    }

    #[test]
    fn test_list_all_preserves_insertion_order() {
        let db = Database::open_in_memory().unwrap();
        let repo = db.customers();

        for id in ["cus_c", "cus_a", "cus_b"] {
            repo.save(&CustomerRecord::new(id, id)).unwrap();
        }

        let ids: Vec<String> = repo.list_all().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["cus_c", "cus_a", "cus_b"]);
    }
}
