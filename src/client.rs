//! HTTP client for the Roster API.
//!
//! This is the only surface front-ends (the CLI, a desktop UI) need; it never
//! touches the store directly.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::api::{
    CreateStudentRequest, CreatedResponse, DeletedResponse, ErrorBody, RefEntry,
    StatisticsResponse, StudentRecord, StudentsQuery,
};
use crate::query::StudentFilter;
use crate::record::NewStudent;

/// Default request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors seen by API callers, classified from the HTTP status
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid request: {0}")]
    InvalidArgument(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, kind: String, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Typed client for one Roster server
#[derive(Debug, Clone)]
pub struct RosterClient {
    client: Client,
    base_url: String,
}

impl RosterClient {
    /// Create a new client for the given server URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;

        // Ensure base URL doesn't have trailing slash
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    /// Get the base URL for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Students matching `filter`, ordered by id
    pub async fn list_students(&self, filter: StudentFilter) -> Result<Vec<StudentRecord>, ClientError> {
        let query = StudentsQuery::from(filter);
        tracing::debug!(?query, "GET /students");
        let resp = self
            .client
            .get(self.url("/students"))
            .query(&query)
            .send()
            .await?;
        decode_response(resp).await
    }

    /// Students matching `filter` whose name contains `text`, ignoring case.
    ///
    /// Blank text returns every student matching `filter`.
    pub async fn search_students(
        &self,
        filter: StudentFilter,
        text: &str,
    ) -> Result<Vec<StudentRecord>, ClientError> {
        let students = self.list_students(filter).await?;
        Ok(filter_by_name(students, text))
    }

    /// Create a student and return its id
    pub async fn create_student(&self, student: NewStudent) -> Result<i64, ClientError> {
        let body = CreateStudentRequest::from(student);
        let resp = self
            .client
            .post(self.url("/students"))
            .json(&body)
            .send()
            .await?;
        let created: CreatedResponse = decode_response(resp).await?;
        Ok(created.id)
    }

    pub async fn delete_student(&self, id: i64) -> Result<(), ClientError> {
        let resp = self
            .client
            .delete(self.url(&format!("/students/{}", id)))
            .send()
            .await?;
        let _: DeletedResponse = decode_response(resp).await?;
        Ok(())
    }

    pub async fn statistics(&self) -> Result<StatisticsResponse, ClientError> {
        self.get("/statistics").await
    }

    pub async fn groups(&self) -> Result<Vec<RefEntry>, ClientError> {
        self.get("/groups").await
    }

    pub async fn curricula(&self) -> Result<Vec<RefEntry>, ClientError> {
        self.get("/curricula").await
    }

    pub async fn sciences(&self) -> Result<Vec<RefEntry>, ClientError> {
        self.get("/sciences").await
    }

    async fn get<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
    {
        let resp = self.client.get(self.url(path)).send().await?;
        decode_response(resp).await
    }
}

async fn decode_response<T>(resp: Response) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()));
    }

    let text = resp
        .text()
        .await
        .unwrap_or_else(|err| format!("response body error: {err}"));
    let (kind, message) = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => (body.error, body.message),
        Err(_) => ("unknown".to_string(), text),
    };

    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(message)),
        _ if status.is_client_error() => Err(ClientError::InvalidArgument(message)),
        _ => Err(ClientError::Server {
            status: status.as_u16(),
            kind,
            message,
        }),
    }
}

fn filter_by_name(students: Vec<StudentRecord>, text: &str) -> Vec<StudentRecord> {
    let needle = text.trim().to_lowercase();
    if needle.is_empty() {
        return students;
    }
    students
        .into_iter()
        .filter(|s| s.name.to_lowercase().contains(&needle))
        .collect()
}
