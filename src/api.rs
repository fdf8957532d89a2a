//! HTTP request/response shapes shared by the server and the client.
//!
//! Student and reference rows travel as [`StudentRecord`] and [`RefEntry`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, de};

use crate::query::StudentFilter;
use crate::record::{BucketCount, NewStudent, StatisticsSnapshot};

pub use crate::record::{RefEntry, StudentRecord};

/// Query string of `GET /students`.
///
/// Empty values (`?group_id=`) mean "no filter", like absent ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentsQuery {
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub group_id: Option<i64>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub science_id: Option<i64>,
}

impl From<StudentsQuery> for StudentFilter {
    fn from(value: StudentsQuery) -> Self {
        Self {
            group_id: value.group_id,
            science_id: value.science_id,
        }
    }
}

impl From<StudentFilter> for StudentsQuery {
    fn from(value: StudentFilter) -> Self {
        Self {
            group_id: value.group_id,
            science_id: value.science_id,
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<i64>()
            .map(Some)
            .map_err(|_| de::Error::custom(format!("expected an integer id, got `{}`", s))),
    }
}

/// Body of `POST /students`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub group_id: i64,
    pub curriculum_id: i64,
    pub science_id: i64,
}

impl From<CreateStudentRequest> for NewStudent {
    fn from(value: CreateStudentRequest) -> Self {
        NewStudent::new(value.name, value.group_id, value.curriculum_id, value.science_id)
    }
}

impl From<NewStudent> for CreateStudentRequest {
    fn from(value: NewStudent) -> Self {
        Self {
            name: value.name,
            group_id: value.group_id,
            curriculum_id: value.curriculum_id,
            science_id: value.science_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: i64,
    pub message: String,
}

/// Body of `GET /statistics`.
///
/// `by_group`/`by_science` are keyed by display name; `groups`/`sciences`
/// carry the same counts per id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total: u64,
    pub by_group: BTreeMap<String, u64>,
    pub by_science: BTreeMap<String, u64>,
    #[serde(default)]
    pub groups: Vec<BucketCount>,
    #[serde(default)]
    pub sciences: Vec<BucketCount>,
}

impl From<StatisticsSnapshot> for StatisticsResponse {
    fn from(value: StatisticsSnapshot) -> Self {
        Self {
            total: value.total,
            by_group: value.by_group_name(),
            by_science: value.by_science_name(),
            groups: value.by_group,
            sciences: value.by_science,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error payload for every non-2xx response.
///
/// `error` is the stable classification; `detail` is optional diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_students_query_empty_values_are_absent() {
        let q: StudentsQuery = serde_json::from_str(r#"{"group_id": "", "science_id": " 10 "}"#).unwrap();
        assert_eq!(q.group_id, None);
        assert_eq!(q.science_id, Some(10));

        let q: StudentsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(StudentFilter::from(q), StudentFilter::all());
    }

    #[test]
    fn test_students_query_rejects_non_integer() {
        let err = serde_json::from_str::<StudentsQuery>(r#"{"group_id": "abc"}"#).unwrap_err();
        assert!(err.to_string().contains("expected an integer id"));
    }

    #[test]
    fn test_statistics_response_from_snapshot() {
        let snapshot = StatisticsSnapshot {
            total: 2,
            by_group: vec![
                BucketCount { id: 1, name: "A".into(), count: 1 },
                BucketCount { id: 2, name: "B".into(), count: 1 },
            ],
            by_science: vec![
                BucketCount { id: 10, name: "Math".into(), count: 2 },
                BucketCount { id: 20, name: "Bio".into(), count: 0 },
            ],
        };

        let response = StatisticsResponse::from(snapshot);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["total"], 2);
        assert_eq!(json["by_group"]["A"], 1);
        assert_eq!(json["by_science"]["Bio"], 0);
        assert_eq!(json["sciences"][0]["id"], 10);
    }

    #[test]
    fn test_error_body_omits_missing_detail() {
        let body = ErrorBody {
            error: "not_found".into(),
            message: "Student not found: 3".into(),
            detail: None,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(!json.contains("detail"));
    }
}
