use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use std::sync::Arc;

use crate::Error;
use crate::api::{
    CreateStudentRequest, CreatedResponse, DeletedResponse, HealthResponse, RefEntry,
    StatisticsResponse, StudentRecord, StudentsQuery,
};
use crate::query::RefTable;
use crate::server::AppState;
use crate::server::error::ApiError;

type ApiResult<T> = Result<Json<T>, ApiError>;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn list_students(
    State(state): State<Arc<AppState>>,
    params: Result<Query<StudentsQuery>, QueryRejection>,
) -> ApiResult<Vec<StudentRecord>> {
    let Query(params) = params.map_err(|e| state.reject(Error::InvalidArgument(e.body_text())))?;

    let students = state
        .service
        .list_students_async(params.into())
        .await
        .map_err(|e| state.reject(e))?;

    tracing::debug!(?params, count = students.len(), "Listed students");
    Ok(Json(students))
}

pub async fn create_student(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(request) = body.map_err(|e| state.reject(Error::InvalidArgument(e.body_text())))?;

    let id = state
        .service
        .create_student_async(request.into())
        .await
        .map_err(|e| state.reject(e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Student created successfully".to_string(),
        }),
    ))
}

pub async fn delete_student(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<DeletedResponse> {
    let Path(id) = id.map_err(|e| state.reject(Error::InvalidArgument(e.body_text())))?;

    state
        .service
        .delete_student_async(id)
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(DeletedResponse {
        id,
        message: "Student deleted successfully".to_string(),
    }))
}

pub async fn statistics(State(state): State<Arc<AppState>>) -> ApiResult<StatisticsResponse> {
    let snapshot = state
        .service
        .statistics_async()
        .await
        .map_err(|e| state.reject(e))?;

    Ok(Json(snapshot.into()))
}

pub async fn list_groups(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RefEntry>> {
    list_reference(&state, RefTable::Groups).await
}

pub async fn list_curricula(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RefEntry>> {
    list_reference(&state, RefTable::Curricula).await
}

pub async fn list_sciences(State(state): State<Arc<AppState>>) -> ApiResult<Vec<RefEntry>> {
    list_reference(&state, RefTable::Sciences).await
}

async fn list_reference(state: &AppState, table: RefTable) -> ApiResult<Vec<RefEntry>> {
    let entries = state
        .service
        .list_reference_async(table)
        .await
        .map_err(|e| state.reject(e))?;
    Ok(Json(entries))
}
