//! Student listing query
//!
//! Filters start from "match all rows" and each present filter ANDs one
//! equality predicate on its foreign key. Filters are independent, so any
//! combination narrows to the intersection of the individual matches.

use rusqlite::{Connection, params_from_iter};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::record::StudentRecord;

const BASE_SELECT: &str = "SELECT s.id, s.name, s.group_id, s.curriculum_id, s.science_id, \
g.name AS group_name, c.name AS curriculum_name, sc.name AS science_name \
FROM students s \
LEFT JOIN groups g ON s.group_id = g.id \
LEFT JOIN curricula c ON s.curriculum_id = c.id \
LEFT JOIN sciences sc ON s.science_id = sc.id";

/// Optional equality constraints on a student's references
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentFilter {
    pub group_id: Option<i64>,
    pub science_id: Option<i64>,
}

impl StudentFilter {
    /// Matches every student
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_group(mut self, group_id: i64) -> Self {
        self.group_id = Some(group_id);
        self
    }

    pub fn with_science(mut self, science_id: i64) -> Self {
        self.science_id = Some(science_id);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.group_id.is_none() && self.science_id.is_none()
    }
}

/// Builds the SQL and positional parameters for a student listing
pub struct StudentQuery;

impl StudentQuery {
    pub fn build(filter: &StudentFilter) -> (String, Vec<i64>) {
        let mut sql = String::from(BASE_SELECT);
        let mut values = Vec::new();

        sql.push_str(" WHERE 1 = 1");

        let predicates = [("s.group_id", filter.group_id), ("s.science_id", filter.science_id)];
        for (column, value) in predicates {
            if let Some(v) = value {
                values.push(v);
                sql.push_str(&format!(" AND {} = ?{}", column, values.len()));
            }
        }

        sql.push_str(" ORDER BY s.id ASC");
        (sql, values)
    }
}

/// List students matching `filter`, ordered by id ascending.
///
/// Students whose references do not resolve are still returned, with the
/// corresponding display name set to `None`.
pub fn list_students(conn: &Connection, filter: &StudentFilter) -> Result<Vec<StudentRecord>> {
    let (sql, values) = StudentQuery::build(filter);
    tracing::debug!(?filter, "Listing students: {}", sql);

    let mut stmt = conn.prepare(&sql)?;
    let students = stmt
        .query_map(params_from_iter(values), row_to_student)?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    Ok(students)
}

fn row_to_student(row: &rusqlite::Row) -> rusqlite::Result<StudentRecord> {
    Ok(StudentRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        group_id: row.get(2)?,
        curriculum_id: row.get(3)?,
        science_id: row.get(4)?,
        group_name: row.get(5)?,
        curriculum_name: row.get(6)?,
        science_name: row.get(7)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::{insert_student, seeded_gateway};

    #[test]
    fn test_build_without_filters() {
        let (sql, values) = StudentQuery::build(&StudentFilter::all());
        assert!(sql.ends_with("WHERE 1 = 1 ORDER BY s.id ASC"));
        assert!(values.is_empty());
    }

    #[test]
    fn test_build_numbers_parameters_in_order() {
        let (sql, values) = StudentQuery::build(&StudentFilter::all().with_group(2).with_science(10));
        assert!(sql.contains("AND s.group_id = ?1 AND s.science_id = ?2"));
        assert_eq!(values, vec![2, 10]);

        let (sql, values) = StudentQuery::build(&StudentFilter::all().with_science(20));
        assert!(sql.contains("AND s.science_id = ?1"));
        assert!(!sql.contains("s.group_id = ?"));
        assert_eq!(values, vec![20]);
    }

    #[test]
    fn test_filters_compose_as_intersection() {
        let (_dir, gateway) = seeded_gateway();
        insert_student(&gateway, "Ann", 1, 10);
        insert_student(&gateway, "Bo", 2, 10);
        insert_student(&gateway, "Cy", 1, 20);

        let names = |filter: StudentFilter| -> Vec<String> {
            gateway
                .with_connection(|conn| list_students(conn, &filter))
                .unwrap()
                .into_iter()
                .map(|s| s.name)
                .collect()
        };

        assert_eq!(names(StudentFilter::all()), vec!["Ann", "Bo", "Cy"]);
        assert_eq!(names(StudentFilter::all().with_group(1)), vec!["Ann", "Cy"]);
        assert_eq!(names(StudentFilter::all().with_science(10)), vec!["Ann", "Bo"]);
        assert_eq!(names(StudentFilter::all().with_group(1).with_science(10)), vec!["Ann"]);
        assert!(names(StudentFilter::all().with_group(2).with_science(20)).is_empty());
    }

    #[test]
    fn test_ordered_by_id_with_joined_names() {
        let (_dir, gateway) = seeded_gateway();
        let first = insert_student(&gateway, "Zed", 2, 20);
        let second = insert_student(&gateway, "Amy", 1, 10);

        let students = gateway
            .with_connection(|conn| list_students(conn, &StudentFilter::all()))
            .unwrap();

        assert_eq!(students.iter().map(|s| s.id).collect::<Vec<_>>(), vec![first, second]);
        assert_eq!(students[0].group_name.as_deref(), Some("B"));
        assert_eq!(students[0].science_name.as_deref(), Some("Bio"));
        assert_eq!(students[1].curriculum_name.as_deref(), Some("Year 1"));
    }

    #[test]
    fn test_orphaned_reference_is_kept() {
        let (_dir, gateway) = seeded_gateway();
        gateway
            .with_connection(|conn| {
                conn.execute_batch(
                    "PRAGMA foreign_keys = OFF;
                     INSERT INTO students (name, group_id, curriculum_id, science_id)
                     VALUES ('Orphan', 99, 1, 10);",
                )?;
                Ok(())
            })
            .unwrap();

        let students = gateway
            .with_connection(|conn| list_students(conn, &StudentFilter::all()))
            .unwrap();

        assert_eq!(students.len(), 1);
        assert_eq!(students[0].group_id, 99);
        assert_eq!(students[0].group_name, None);
        assert_eq!(students[0].science_name.as_deref(), Some("Math"));
    }
}
