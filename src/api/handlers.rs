use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::logic;
use crate::model::{
    Alias, AuditEntry, ClientDetail, EdgeWithEndpoints, Entity, EntityDetail, Id, NewEntity,
    SceneWithMembers, Scores, ShortlistDetail,
};
use crate::store::traits::{Store, StoreError};

pub type AppState<S> = Arc<S>;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: &str) -> Self {
        Self {
            error: message.to_string(),
        }
    }
}

/// Map a store failure onto the HTTP surface: 409 for uniqueness
/// conflicts, 404 for missing rows, 400 for referential payload
/// problems, 500 otherwise.
pub(crate) fn store_error(err: StoreError) -> ApiError {
    let status = match &err {
        StoreError::Conflict(_) => StatusCode::CONFLICT,
        StoreError::NotFound(_) => StatusCode::NOT_FOUND,
        StoreError::Invalid(_) => StatusCode::BAD_REQUEST,
        StoreError::Database(_) | StoreError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("store error: {}", err);
        return (status, Json(ErrorResponse::new("Internal server error")));
    }
    (status, Json(ErrorResponse::new(&err.to_string())))
}

pub(crate) fn bad_request(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/entities - all entities, newest first.
pub async fn list_entities<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<Entity>>, ApiError> {
    let entities = store.list_entities().await.map_err(store_error)?;
    Ok(Json(entities))
}

/// GET /api/entities/:id - entity with aliases and scores.
pub async fn get_entity<S: Store>(
    State(store): State<AppState<S>>,
    Path(id): Path<Id>,
) -> Result<Json<EntityDetail>, ApiError> {
    match store.get_entity(&id).await.map_err(store_error)? {
        Some(detail) => Ok(Json(detail)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Entity not found")),
        )),
    }
}

/// POST /api/entities - create an entity with optional aliases.
///
/// The slug is always derived from the cleaned name; a `slug` field in
/// the payload is ignored. Rejected with 409 when the name normalizes
/// onto an existing entity or alias name, or when the slug is taken.
pub async fn create_entity<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(payload): RequestJson<NewEntity>,
) -> Result<(StatusCode, Json<EntityDetail>), ApiError> {
    let payload = logic::clean_entity_payload(payload).map_err(|e| bad_request(&e.to_string()))?;

    let slug = logic::slugify(&payload.name);
    if slug.is_empty() {
        return Err(bad_request("name must contain at least one letter or digit"));
    }

    let known = store.list_known_names().await.map_err(store_error)?;
    let taken = logic::taken_names(known.iter().map(String::as_str));
    if logic::collides(&payload.name, &taken) {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::new("An entity with this name already exists")),
        ));
    }
    for alias in &payload.aliases {
        if logic::collides(&alias.name, &taken) {
            return Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse::new(&format!(
                    "Alias '{}' collides with an existing name",
                    alias.name
                ))),
            ));
        }
    }

    let aliases = logic::elect_primary(payload.aliases.clone());
    let entity = Entity::from_payload(payload, slug);
    let alias_rows: Vec<Alias> = aliases
        .into_iter()
        .map(|a| Alias::new(entity.id.clone(), a.name, a.primary))
        .collect();

    let detail = store
        .create_entity(entity, alias_rows)
        .await
        .map_err(store_error)?;

    log::info!(
        "created entity '{}' ({}) with {} aliases",
        detail.entity.name,
        detail.entity.slug,
        detail.aliases.len()
    );

    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(Debug, Deserialize)]
pub struct SlugCheckQuery {
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SlugCheckResponse {
    pub name: String,
    pub slug: String,
    pub available: bool,
}

/// GET /api/entities/slug-check?name=... - backs the creation dialog's
/// debounced uniqueness probe.
pub async fn slug_check<S: Store>(
    State(store): State<AppState<S>>,
    Query(query): Query<SlugCheckQuery>,
) -> Result<Json<SlugCheckResponse>, ApiError> {
    let slug = logic::slugify(&query.name);
    if slug.is_empty() {
        return Err(bad_request("name must contain at least one letter or digit"));
    }
    let exists = store.slug_exists(&slug).await.map_err(store_error)?;
    Ok(Json(SlugCheckResponse {
        name: query.name,
        slug,
        available: !exists,
    }))
}

/// POST /api/scores/recompute - rebuild every score row from the
/// current edge set and return the refreshed records.
pub async fn recompute_scores<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<Scores>>, ApiError> {
    let entities = store.list_entities().await.map_err(store_error)?;
    let edges = store.list_all_edges().await.map_err(store_error)?;

    let scores = logic::recompute_scores(&entities, &edges);
    store
        .upsert_scores(scores.clone())
        .await
        .map_err(store_error)?;

    log::info!("recomputed scores for {} entities", scores.len());
    Ok(Json(scores))
}

/// Full dump of every table, mirroring the original debug page.
#[derive(Debug, Serialize)]
pub struct DebugSnapshot {
    pub entities: Vec<EntityDetail>,
    pub scenes: Vec<SceneWithMembers>,
    pub edges: Vec<EdgeWithEndpoints>,
    pub clients: Vec<ClientDetail>,
    pub shortlists: Vec<ShortlistDetail>,
    pub audit_logs: Vec<AuditEntry>,
}

/// GET /api/debug/snapshot
pub async fn debug_snapshot<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<DebugSnapshot>, ApiError> {
    let mut entities = Vec::new();
    for entity in store.list_entities().await.map_err(store_error)? {
        if let Some(detail) = store.get_entity(&entity.id).await.map_err(store_error)? {
            entities.push(detail);
        }
    }

    Ok(Json(DebugSnapshot {
        entities,
        scenes: store.list_scenes().await.map_err(store_error)?,
        edges: store.list_edges(i64::MAX).await.map_err(store_error)?,
        clients: store.list_clients().await.map_err(store_error)?,
        shortlists: store.list_shortlists().await.map_err(store_error)?,
        audit_logs: store.list_audit_log().await.map_err(store_error)?,
    }))
}
