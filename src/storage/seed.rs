//! Reference data seeding for groups, curricula and science areas

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::record::RefEntry;

/// Reference rows to upsert, usually taken from the `[seed]` config section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub groups: Vec<RefEntry>,
    #[serde(default)]
    pub curricula: Vec<RefEntry>,
    #[serde(default)]
    pub sciences: Vec<RefEntry>,
}

impl SeedData {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.curricula.is_empty() && self.sciences.is_empty()
    }
}

/// Upsert all reference rows in one transaction.
///
/// Rows are updated in place rather than replaced, so students pointing at
/// them keep a valid reference.
pub fn seed_reference_data(conn: &mut Connection, data: &SeedData) -> Result<usize> {
    let tx = conn.transaction()?;
    let mut written = 0;

    for (table, rows) in [
        ("groups", &data.groups),
        ("curricula", &data.curricula),
        ("sciences", &data.sciences),
    ] {
        let sql = format!(
            "INSERT INTO {table} (id, name) VALUES (?1, ?2) \
             ON CONFLICT(id) DO UPDATE SET name = excluded.name"
        );
        let mut stmt = tx.prepare(&sql)?;
        for row in rows {
            written += stmt.execute(params![row.id, row.name])?;
        }
    }

    tx.commit()?;
    tracing::debug!("Seeded {} reference rows", written);
    Ok(written)
}
