//! Generic CRUD controller.
//!
//! Folders, tags and notes expose the same five endpoints with the same
//! status codes and error shapes. [`Resource`] captures what differs between
//! them (body validation, list filtering, store calls, delete cascades) and
//! the handlers below are written once against it.

use async_trait::async_trait;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::info;
use uuid::Uuid;

use noteful_core::{Repositories, Result};

use crate::{error::ApiError, validation::path_id, AppState};

/// One collection served by the generic controller.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Path segment under `/api`, e.g. `folders`.
    const COLLECTION: &'static str;
    /// Singular name used in conflict messages, e.g. `folder`.
    const ENTITY: &'static str;

    type Entity: Serialize + Send;
    /// Raw request body, before validation.
    type Body: DeserializeOwned + Send;
    /// Validated write payload.
    type Draft: Send + Sync;
    /// Raw query string of the list endpoint.
    type Query: DeserializeOwned + Send;
    type Filter: Send + Sync;

    fn validate(body: Self::Body) -> std::result::Result<Self::Draft, ApiError>;

    fn filter(query: Self::Query) -> std::result::Result<Self::Filter, ApiError>;

    fn id_of(entity: &Self::Entity) -> Uuid;

    async fn list(repos: &Repositories, filter: &Self::Filter) -> Result<Vec<Self::Entity>>;

    async fn fetch(repos: &Repositories, id: Uuid) -> Result<Option<Self::Entity>>;

    async fn insert(repos: &Repositories, draft: &Self::Draft) -> Result<Self::Entity>;

    async fn replace(
        repos: &Repositories,
        id: Uuid,
        draft: &Self::Draft,
    ) -> Result<Option<Self::Entity>>;

    /// Delete by id, including any cleanup of records that reference it.
    /// Deleting an absent id is not an error.
    async fn remove(repos: &Repositories, id: Uuid) -> Result<()>;
}

/// The five CRUD routes of `R`, relative to its collection path.
pub fn resource_routes<R: Resource>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", get(get_one::<R>).put(update::<R>).delete(remove::<R>))
}

pub async fn list<R: Resource>(
    State(state): State<AppState>,
    query: std::result::Result<Query<R::Query>, QueryRejection>,
) -> std::result::Result<Json<Vec<R::Entity>>, ApiError> {
    let Query(query) = query?;
    let filter = R::filter(query)?;
    let items = R::list(&state.repos, &filter).await?;
    Ok(Json(items))
}

pub async fn get_one<R: Resource>(
    State(state): State<AppState>,
    raw_id: std::result::Result<Path<String>, PathRejection>,
) -> std::result::Result<Json<R::Entity>, ApiError> {
    let Path(raw_id) = raw_id?;
    let id = path_id(&raw_id)?;
    R::fetch(&state.repos, id)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound { id: Some(id) })
}

pub async fn create<R: Resource>(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    body: std::result::Result<Json<R::Body>, JsonRejection>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let draft = R::validate(body)?;

    let entity = R::insert(&state.repos, &draft)
        .await
        .map_err(|e| ApiError::from_write(R::ENTITY, e))?;
    let id = R::id_of(&entity);

    info!(
        subsystem = "api",
        component = R::COLLECTION,
        op = "create",
        id = %id,
        "Created {}", R::ENTITY
    );

    let location = format!("{}/{}", uri.path().trim_end_matches('/'), id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(entity),
    ))
}

pub async fn update<R: Resource>(
    State(state): State<AppState>,
    raw_id: std::result::Result<Path<String>, PathRejection>,
    body: std::result::Result<Json<R::Body>, JsonRejection>,
) -> std::result::Result<Json<R::Entity>, ApiError> {
    let Path(raw_id) = raw_id?;
    let id = path_id(&raw_id)?;
    let Json(body) = body?;
    let draft = R::validate(body)?;

    let entity = R::replace(&state.repos, id, &draft)
        .await
        .map_err(|e| ApiError::from_write(R::ENTITY, e))?
        .ok_or(ApiError::NotFound { id: Some(id) })?;

    info!(
        subsystem = "api",
        component = R::COLLECTION,
        op = "update",
        id = %id,
        "Updated {}", R::ENTITY
    );
    Ok(Json(entity))
}

pub async fn remove<R: Resource>(
    State(state): State<AppState>,
    raw_id: std::result::Result<Path<String>, PathRejection>,
) -> std::result::Result<StatusCode, ApiError> {
    let Path(raw_id) = raw_id?;
    let id = path_id(&raw_id)?;
    R::remove(&state.repos, id).await?;

    info!(
        subsystem = "api",
        component = R::COLLECTION,
        op = "delete",
        id = %id,
        "Deleted {}", R::ENTITY
    );
    Ok(StatusCode::NO_CONTENT)
}
