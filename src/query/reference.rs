//! Reference table listings (groups, curricula, science areas)

use rusqlite::Connection;

use crate::Result;
use crate::record::RefEntry;

/// Lookup tables a student points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTable {
    Groups,
    Curricula,
    Sciences,
}

impl RefTable {
    /// Table name in the store
    pub fn as_str(&self) -> &'static str {
        match self {
            RefTable::Groups => "groups",
            RefTable::Curricula => "curricula",
            RefTable::Sciences => "sciences",
        }
    }
}

impl std::fmt::Display for RefTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// All rows of a reference table ordered by name, then id
pub fn list_reference(conn: &Connection, table: RefTable) -> Result<Vec<RefEntry>> {
    let sql = format!("SELECT id, name FROM {} ORDER BY name, id", table.as_str());
    let mut stmt = conn.prepare(&sql)?;

    let entries = stmt
        .query_map([], |row| {
            Ok(RefEntry {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::seeded_gateway;

    #[test]
    fn test_sorted_by_name() {
        let (_dir, gateway) = seeded_gateway();

        let sciences = gateway
            .with_connection(|conn| list_reference(conn, RefTable::Sciences))
            .unwrap();
        assert_eq!(sciences, vec![RefEntry::new(20, "Bio"), RefEntry::new(10, "Math")]);

        let groups = gateway
            .with_connection(|conn| list_reference(conn, RefTable::Groups))
            .unwrap();
        assert_eq!(groups.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1, 2]);
    }
}
