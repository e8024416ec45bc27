use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, params};
use serde_json::Value;

use crate::error::Result;
use crate::storage::batch::{BatchOp, Collection, WriteBatch};
use crate::storage::repositories::{
    AuditRepository, CompanyRepository, CustomerRepository, DependentRepository, LinkRepository,
};

/// SQLite-backed document store. One table per collection, documents kept as
/// JSON text with expression indexes over the foreign-key-like fields. The
/// store exposes get/query primitives plus an atomic batched write.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    /// Create all tables if they don't exist.
    fn init_schema(&self) -> Result<()> {
        let conn = self.lock();

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        for collection in Collection::ALL {
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id  TEXT PRIMARY KEY,
                    doc TEXT NOT NULL
                );",
                table = collection.table()
            ))?;
        }

        // Expression indexes for the reference fields the migrator queries.
        conn.execute_batch(
            "
            CREATE INDEX IF NOT EXISTS idx_conversations_customer
                ON conversations(json_extract(doc, '$.customerId'));
            CREATE INDEX IF NOT EXISTS idx_cases_customer
                ON cases(json_extract(doc, '$.customerId'));
            CREATE INDEX IF NOT EXISTS idx_activities_customer
                ON activities(json_extract(doc, '$.customerId'));
            CREATE INDEX IF NOT EXISTS idx_proformas_company
                ON proformas(json_extract(doc, '$.companyId'));
            CREATE INDEX IF NOT EXISTS idx_contracts_company
                ON contracts(json_extract(doc, '$.companyId'));
            CREATE INDEX IF NOT EXISTS idx_integration_records_company
                ON integration_records(json_extract(doc, '$.companyId'));
            CREATE INDEX IF NOT EXISTS idx_links_customer
                ON links(json_extract(doc, '$.customerId'));
            CREATE INDEX IF NOT EXISTS idx_links_company
                ON links(json_extract(doc, '$.companyId'));
            ",
        )?;

        Ok(())
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ─── Raw document access ────────────────────────────────

    /// Fetch one raw document.
    pub fn get_raw(&self, collection: Collection, id: &str) -> Result<Option<Value>> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!(
            "SELECT doc FROM {} WHERE id = ?1",
            collection.table()
        ))?;
        let doc = stmt
            .query_row(params![id], |row| row.get::<_, String>(0))
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match doc {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace one raw document outside any batch (seeding, plain
    /// CRUD from other console modules).
    pub fn put_raw(&self, collection: Collection, id: &str, doc: &Value) -> Result<()> {
        let conn = self.lock();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (id, doc) VALUES (?1, ?2)",
                collection.table()
            ),
            params![id, doc.to_string()],
        )?;
        Ok(())
    }

    /// Count documents in a collection.
    pub fn count(&self, collection: Collection) -> Result<usize> {
        let conn = self.lock();
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", collection.table()),
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    // ─── Batch commit ───────────────────────────────────────

    /// Apply every staged op inside one transaction. On any failure the
    /// transaction rolls back and no op is visible.
    pub fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        for op in batch.ops() {
            match op {
                BatchOp::Put {
                    collection,
                    id,
                    doc,
                } => {
                    tx.execute(
                        &format!(
                            "INSERT OR REPLACE INTO {} (id, doc) VALUES (?1, ?2)",
                            collection.table()
                        ),
                        params![id, doc.to_string()],
                    )?;
                }
                BatchOp::Delete { collection, id } => {
                    tx.execute(
                        &format!("DELETE FROM {} WHERE id = ?1", collection.table()),
                        params![id],
                    )?;
                }
            }
        }

        tx.commit()?;
        Ok(())
    }

    // ─── Typed repositories ─────────────────────────────────

    pub fn customers(&self) -> CustomerRepository<'_> {
        CustomerRepository::new(self)
    }

    pub fn companies(&self) -> CompanyRepository<'_> {
        CompanyRepository::new(self)
    }

    pub fn links(&self) -> LinkRepository<'_> {
        LinkRepository::new(self)
    }

    pub fn dependents(&self) -> DependentRepository<'_> {
        DependentRepository::new(self)
    }

    pub fn audit(&self) -> AuditRepository<'_> {
        AuditRepository::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.count(Collection::Customers).unwrap(), 0);
    }

    #[test]
    fn test_put_and_get_raw() {
        let db = Database::open_in_memory().unwrap();
        let doc = json!({"id": "cus_1", "name": "Ayşe"});
        db.put_raw(Collection::Customers, "cus_1", &doc).unwrap();

        let loaded = db.get_raw(Collection::Customers, "cus_1").unwrap().unwrap();
        assert_eq!(loaded["name"], "Ayşe");
        assert!(db.get_raw(Collection::Customers, "missing").unwrap().is_none());
    }

    #[test]
    fn test_commit_applies_all_ops() {
        let db = Database::open_in_memory().unwrap();
        db.put_raw(Collection::Customers, "cus_old", &json!({"id": "cus_old"}))
            .unwrap();

        let mut batch = WriteBatch::new();
        batch
            .put(Collection::Customers, "cus_new", &json!({"id": "cus_new"}))
            .unwrap();
        batch.delete(Collection::Customers, "cus_old");
        batch
            .put(Collection::Links, "lnk_1", &json!({"id": "lnk_1"}))
            .unwrap();
        db.commit(batch).unwrap();

        assert!(db.get_raw(Collection::Customers, "cus_new").unwrap().is_some());
        assert!(db.get_raw(Collection::Customers, "cus_old").unwrap().is_none());
        assert_eq!(db.count(Collection::Links).unwrap(), 1);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("opsdesk.db");
        {
            let db = Database::open(&path).unwrap();
            db.put_raw(Collection::Companies, "com_1", &json!({"id": "com_1"}))
                .unwrap();
        }
        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.count(Collection::Companies).unwrap(), 1);
    }
}
