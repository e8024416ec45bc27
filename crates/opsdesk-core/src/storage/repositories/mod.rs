mod audit_repository;
mod company_repository;
mod customer_repository;
mod dependent_repository;
mod link_repository;

pub use audit_repository::AuditRepository;
pub use company_repository::CompanyRepository;
pub use customer_repository::CustomerRepository;
pub use dependent_repository::DependentRepository;
pub use link_repository::LinkRepository;

use rusqlite::params;
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::storage::batch::Collection;
use crate::storage::database::Database;

pub trait Repository {
    type Entity;
    type Id;

    fn find_by_id(&self, id: &Self::Id) -> Result<Option<Self::Entity>>;
    fn save(&self, entity: &Self::Entity) -> Result<()>;
    fn delete(&self, id: &Self::Id) -> Result<bool>;
}

// ─── Shared query helpers ───────────────────────────────────

pub(crate) fn fetch_one<T: DeserializeOwned>(
    db: &Database,
    collection: Collection,
    id: &str,
) -> Result<Option<T>> {
    match db.get_raw(collection, id)? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// All documents of a collection in collection order (insertion order; the
/// matcher's grouping depends on this being stable).
pub(crate) fn fetch_all<T: DeserializeOwned>(db: &Database, collection: Collection) -> Result<Vec<T>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(&format!(
        "SELECT doc FROM {} ORDER BY rowid",
        collection.table()
    ))?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(serde_json::from_str(&row?)?);
    }
    Ok(records)
}

pub(crate) fn fetch_by_field<T: DeserializeOwned>(
    db: &Database,
    collection: Collection,
    field: &str,
    value: &str,
) -> Result<Vec<T>> {
    let conn = db.lock();
    let mut stmt = conn.prepare(&format!(
        "SELECT doc FROM {table} WHERE json_extract(doc, '$.{field}') = ?1 ORDER BY rowid",
        table = collection.table()
    ))?;
    let rows = stmt.query_map(params![value], |row| row.get::<_, String>(0))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(serde_json::from_str(&row?)?);
    }
    Ok(records)
}

pub(crate) fn delete_by_id(db: &Database, collection: Collection, id: &str) -> Result<bool> {
    let conn = db.lock();
    let deleted = conn.execute(
        &format!("DELETE FROM {} WHERE id = ?1", collection.table()),
        params![id],
    )?;
    Ok(deleted > 0)
}
