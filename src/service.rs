//! Record service - create/read/delete orchestration
//!
//! Every operation runs on its own scoped connection from the
//! [`StoreGateway`]. Mutations are single statements wrapped in a transaction:
//! either the row effect is committed or nothing is visible.

use rusqlite::{Connection, TransactionBehavior, params};

use crate::query::{self, RefTable, StudentFilter};
use crate::record::{NewStudent, RefEntry, StatisticsSnapshot, StudentRecord};
use crate::storage::StoreGateway;
use crate::{Error, Result};

/// Entry point for all student and reference operations
#[derive(Debug, Clone)]
pub struct RecordService {
    gateway: StoreGateway,
}

impl RecordService {
    pub fn new(gateway: StoreGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &StoreGateway {
        &self.gateway
    }

    // ========== Blocking API ==========

    /// Students matching `filter`, ordered by id
    pub fn list_students(&self, filter: StudentFilter) -> Result<Vec<StudentRecord>> {
        self.gateway
            .with_connection(|conn| query::list_students(conn, &filter))
    }

    /// Validate and insert a student, returning the assigned id.
    ///
    /// A blank name is rejected before a connection is opened.
    pub fn create_student(&self, student: NewStudent) -> Result<i64> {
        let student = student.validated()?;
        self.gateway
            .with_connection(|conn| insert_student(conn, &student))
    }

    /// Hard-delete a student. Fails with `NotFound` when no row has this id.
    pub fn delete_student(&self, id: i64) -> Result<()> {
        self.gateway.with_connection(|conn| remove_student(conn, id))
    }

    pub fn statistics(&self) -> Result<StatisticsSnapshot> {
        self.gateway.with_connection(query::compute_statistics)
    }

    pub fn list_groups(&self) -> Result<Vec<RefEntry>> {
        self.list_reference(RefTable::Groups)
    }

    pub fn list_curricula(&self) -> Result<Vec<RefEntry>> {
        self.list_reference(RefTable::Curricula)
    }

    pub fn list_sciences(&self) -> Result<Vec<RefEntry>> {
        self.list_reference(RefTable::Sciences)
    }

    pub fn list_reference(&self, table: RefTable) -> Result<Vec<RefEntry>> {
        self.gateway
            .with_connection(|conn| query::list_reference(conn, table))
    }

    // ========== Async API (store calls on the blocking pool) ==========

    pub async fn list_students_async(&self, filter: StudentFilter) -> Result<Vec<StudentRecord>> {
        self.gateway
            .with_connection_async(move |conn| query::list_students(conn, &filter))
            .await
    }

    pub async fn create_student_async(&self, student: NewStudent) -> Result<i64> {
        let student = student.validated()?;
        self.gateway
            .with_connection_async(move |conn| insert_student(conn, &student))
            .await
    }

    pub async fn delete_student_async(&self, id: i64) -> Result<()> {
        self.gateway
            .with_connection_async(move |conn| remove_student(conn, id))
            .await
    }

    pub async fn statistics_async(&self) -> Result<StatisticsSnapshot> {
        self.gateway
            .with_connection_async(query::compute_statistics)
            .await
    }

    pub async fn list_reference_async(&self, table: RefTable) -> Result<Vec<RefEntry>> {
        self.gateway
            .with_connection_async(move |conn| query::list_reference(conn, table))
            .await
    }
}

fn insert_student(conn: &mut Connection, student: &NewStudent) -> Result<i64> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    tx.execute(
        "INSERT INTO students (name, group_id, curriculum_id, science_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            student.name,
            student.group_id,
            student.curriculum_id,
            student.science_id,
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;

    tracing::info!(id, group_id = student.group_id, science_id = student.science_id, "Created student");
    Ok(id)
}

fn remove_student(conn: &mut Connection, id: i64) -> Result<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let affected = tx.execute("DELETE FROM students WHERE id = ?1", [id])?;
    if affected == 0 {
        // Dropping the transaction rolls it back.
        return Err(Error::NotFound(id));
    }
    tx.commit()?;

    tracing::info!(id, "Deleted student");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::seeded_gateway;

    fn count_students(service: &RecordService) -> i64 {
        service
            .gateway()
            .with_connection(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?))
            .unwrap()
    }

    #[test]
    fn test_create_then_list_once() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);

        let id = service.create_student(NewStudent::new("Ann", 1, 1, 10)).unwrap();

        let matching = service
            .list_students(StudentFilter::all().with_group(1).with_science(10))
            .unwrap();
        assert_eq!(matching.iter().filter(|s| s.id == id).count(), 1);
        assert_eq!(matching[0].name, "Ann");
        assert_eq!(matching[0].group_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_blank_name_rejected_before_store() {
        let dir = tempfile::tempdir().unwrap();
        // The database file does not exist: reaching the store would be StoreUnavailable.
        let service = RecordService::new(StoreGateway::open(&dir.path().join("absent.db")));

        let err = service.create_student(NewStudent::new(" \t", 1, 1, 10)).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_unknown_reference_rolls_back() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);

        let err = service.create_student(NewStudent::new("Ghost", 7, 1, 10)).unwrap_err();
        assert!(matches!(err, Error::Store(_)));
        assert_eq!(count_students(&service), 0);
    }

    #[test]
    fn test_delete_missing_is_not_found_and_repeatable() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);
        service.create_student(NewStudent::new("Ann", 1, 1, 10)).unwrap();

        for _ in 0..2 {
            let err = service.delete_student(999).unwrap_err();
            assert!(matches!(err, Error::NotFound(999)));
            assert_eq!(count_students(&service), 1);
        }
    }

    #[test]
    fn test_delete_decrements_buckets() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);
        let ann = service.create_student(NewStudent::new("Ann", 1, 1, 10)).unwrap();
        service.create_student(NewStudent::new("Bo", 2, 1, 10)).unwrap();

        let before = service.statistics().unwrap();
        service.delete_student(ann).unwrap();
        let after = service.statistics().unwrap();

        assert_eq!(after.total, before.total - 1);
        assert_eq!(after.by_group_name()["A"], before.by_group_name()["A"] - 1);
        assert_eq!(after.by_group_name()["B"], before.by_group_name()["B"]);
        assert_eq!(after.by_science_name()["Math"], before.by_science_name()["Math"] - 1);
        assert!(service.list_students(StudentFilter::all()).unwrap().iter().all(|s| s.id != ann));
    }

    #[test]
    fn test_delete_does_not_cascade_to_references() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);
        let id = service.create_student(NewStudent::new("Ann", 1, 1, 10)).unwrap();

        service.delete_student(id).unwrap();

        assert_eq!(service.list_groups().unwrap().len(), 2);
        assert_eq!(service.list_curricula().unwrap().len(), 1);
        assert_eq!(service.list_sciences().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_async_twins_match_blocking() {
        let (_dir, gateway) = seeded_gateway();
        let service = RecordService::new(gateway);

        let id = service
            .create_student_async(NewStudent::new("Ann", 2, 1, 20))
            .await
            .unwrap();
        let students = service.list_students_async(StudentFilter::all().with_group(2)).await.unwrap();
        assert_eq!(students.len(), 1);
        assert_eq!(students[0].id, id);

        let stats = service.statistics_async().await.unwrap();
        assert_eq!(stats.total, 1);

        service.delete_student_async(id).await.unwrap();
        let err = service.delete_student_async(id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let groups = service.list_reference_async(RefTable::Groups).await.unwrap();
        assert_eq!(groups.len(), 2);
    }
}
