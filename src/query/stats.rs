//! Aggregate statistics over students
//!
//! The total and both grouped counts are read inside one transaction, so the
//! three numbers always describe the same snapshot of the store.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::Result;
use crate::record::{BucketCount, StatisticsSnapshot};

/// Dimension a student count is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dimension {
    Group,
    Science,
}

impl Dimension {
    fn sql(&self) -> &'static str {
        match self {
            Dimension::Group => {
                "SELECT g.id, g.name, COUNT(s.id) FROM groups g \
                 LEFT JOIN students s ON s.group_id = g.id \
                 GROUP BY g.id, g.name ORDER BY g.id"
            }
            Dimension::Science => {
                "SELECT sc.id, sc.name, COUNT(s.id) FROM sciences sc \
                 LEFT JOIN students s ON s.science_id = sc.id \
                 GROUP BY sc.id, sc.name ORDER BY sc.id"
            }
        }
    }
}

/// Compute a fresh statistics snapshot. Nothing is cached.
pub fn compute_statistics(conn: &mut Connection) -> Result<StatisticsSnapshot> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Deferred)?;

    let total: i64 = tx.query_row("SELECT COUNT(id) FROM students", [], |row| row.get(0))?;
    let by_group = count_by(&tx, Dimension::Group)?;
    let by_science = count_by(&tx, Dimension::Science)?;

    tx.commit()?;

    Ok(StatisticsSnapshot {
        total: total as u64,
        by_group,
        by_science,
    })
}

fn count_by(tx: &Transaction<'_>, dimension: Dimension) -> Result<Vec<BucketCount>> {
    let mut stmt = tx.prepare(dimension.sql())?;
    let buckets = stmt
        .query_map([], |row| {
            let count: i64 = row.get(2)?;
            Ok(BucketCount {
                id: row.get(0)?,
                name: row.get(1)?,
                count: count as u64,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    tracing::debug!(?dimension, buckets = buckets.len(), "Counted students");
    Ok(buckets)
}
