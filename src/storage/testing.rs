//! Test fixtures: a schema-initialised database in a temp directory

use tempfile::TempDir;

use super::{SeedData, StoreConfig, StoreGateway};
use crate::record::RefEntry;

/// Groups {1:"A", 2:"B"}, curriculum {1:"Year 1"}, sciences {10:"Math", 20:"Bio"}
pub fn sample_seed() -> SeedData {
    SeedData {
        groups: vec![RefEntry::new(1, "A"), RefEntry::new(2, "B")],
        curricula: vec![RefEntry::new(1, "Year 1")],
        sciences: vec![RefEntry::new(10, "Math"), RefEntry::new(20, "Bio")],
    }
}

/// Fresh seeded store. Keep the `TempDir` alive for as long as the gateway is used.
pub fn seeded_gateway() -> (TempDir, StoreGateway) {
    let dir = tempfile::tempdir().unwrap();
    let gateway = StoreGateway::new(
        StoreConfig::new(dir.path().join("roster.db")).with_create_if_missing(true),
    );
    gateway.initialize_schema().unwrap();
    gateway.seed(&sample_seed()).unwrap();
    (dir, gateway)
}

/// Insert a student row directly, bypassing the service layer
pub fn insert_student(gateway: &StoreGateway, name: &str, group_id: i64, science_id: i64) -> i64 {
    gateway
        .with_connection(|conn| {
            conn.execute(
                "INSERT INTO students (name, group_id, curriculum_id, science_id) VALUES (?1, ?2, 1, ?3)",
                rusqlite::params![name, group_id, science_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .unwrap()
}
