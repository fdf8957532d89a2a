//! Record types
//!
//! Students reference three read-only lookup tables:
//! - `groups`: study group
//! - `curricula`: curriculum year
//! - `sciences`: science area
//!
//! Statistics are derived from these rows on every request and never stored.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Longest accepted student name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// A student row joined with the display names of its references.
///
/// Display names are `None` when the referenced row does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: i64,
    pub name: String,
    pub group_id: i64,
    pub curriculum_id: i64,
    pub science_id: i64,
    pub group_name: Option<String>,
    pub curriculum_name: Option<String>,
    pub science_name: Option<String>,
}

/// Fields required to create a student
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStudent {
    pub name: String,
    pub group_id: i64,
    pub curriculum_id: i64,
    pub science_id: i64,
}

impl NewStudent {
    pub fn new(name: impl Into<String>, group_id: i64, curriculum_id: i64, science_id: i64) -> Self {
        Self {
            name: name.into(),
            group_id,
            curriculum_id,
            science_id,
        }
    }

    /// Trim the name and check it is usable.
    ///
    /// Returns the cleaned record; the store is never touched here.
    pub fn validated(self) -> crate::Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "student name must not be empty".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(crate::Error::InvalidArgument(format!(
                "student name must be at most {} characters",
                MAX_NAME_LEN
            )));
        }
        Ok(Self {
            name: name.to_string(),
            ..self
        })
    }
}

/// A row of a reference table (group, curriculum or science area)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefEntry {
    pub id: i64,
    pub name: String,
}

impl RefEntry {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Number of students attached to one reference row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCount {
    pub id: i64,
    pub name: String,
    pub count: u64,
}

/// Student counts computed from one consistent read of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub total: u64,
    /// One bucket per existing group, including empty ones, ordered by id
    pub by_group: Vec<BucketCount>,
    /// One bucket per existing science area, including empty ones, ordered by id
    pub by_science: Vec<BucketCount>,
}

impl StatisticsSnapshot {
    /// Group counts keyed by display name.
    ///
    /// Rows sharing a display name are summed under that name.
    pub fn by_group_name(&self) -> BTreeMap<String, u64> {
        fold_by_name(&self.by_group)
    }

    /// Science-area counts keyed by display name.
    pub fn by_science_name(&self) -> BTreeMap<String, u64> {
        fold_by_name(&self.by_science)
    }
}

fn fold_by_name(buckets: &[BucketCount]) -> BTreeMap<String, u64> {
    let mut map = BTreeMap::new();
    for bucket in buckets {
        *map.entry(bucket.name.clone()).or_insert(0) += bucket.count;
    }
    map
}

impl std::fmt::Display for StatisticsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Student Statistics:")?;
        writeln!(f, "  Total: {}", self.total)?;
        writeln!(f, "  By group:")?;
        for bucket in &self.by_group {
            writeln!(f, "    {}: {}", bucket.name, bucket.count)?;
        }
        writeln!(f, "  By science area:")?;
        for bucket in &self.by_science {
            writeln!(f, "    {}: {}", bucket.name, bucket.count)?;
        }
        Ok(())
    }
}
