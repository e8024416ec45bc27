use crate::error::Result;
use crate::models::CompanyRecord;
use crate::storage::batch::Collection;
use crate::storage::database::Database;

use super::{Repository, delete_by_id, fetch_all, fetch_one};

pub struct CompanyRepository<'a> {
    db: &'a Database,
}

impl<'a> CompanyRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Every company in collection order.
    pub fn list_all(&self) -> Result<Vec<CompanyRecord>> {
        fetch_all(self.db, Collection::Companies)
    }

    pub fn count(&self) -> Result<usize> {
        self.db.count(Collection::Companies)
    }
}

impl Repository for CompanyRepository<'_> {
    type Entity = CompanyRecord;
    type Id = String;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>> {
        fetch_one(self.db, Collection::Companies, id)
    }

    fn save(&self, record: &Self::Entity) -> Result<()> {
        let doc = serde_json::to_value(record)?;
        self.db.put_raw(Collection::Companies, &record.id, &doc)
    }

    fn delete(&self, id: &Self::Id) -> Result<bool> {
        delete_by_id(self.db, Collection::Companies, id)
    }
}
