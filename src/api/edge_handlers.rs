use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Json as RequestJson,
};
use serde::Deserialize;

use crate::api::handlers::{bad_request, store_error, ApiError, AppState};
use crate::model::{Edge, EdgeWithEndpoints, NewEdge};
use crate::store::traits::Store;

/// Row cap applied when the query string gives none, matching the
/// original listing page.
const DEFAULT_EDGE_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct EdgeListQuery {
    pub limit: Option<i64>,
}

/// GET /api/edges - newest first, endpoints embedded.
pub async fn list_edges<S: Store>(
    State(store): State<AppState<S>>,
    Query(query): Query<EdgeListQuery>,
) -> Result<Json<Vec<EdgeWithEndpoints>>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_EDGE_LIMIT);
    if limit <= 0 {
        return Err(bad_request("limit must be positive"));
    }
    let edges = store.list_edges(limit).await.map_err(store_error)?;
    Ok(Json(edges))
}

/// POST /api/edges - create a directed edge between two entities.
pub async fn create_edge<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(payload): RequestJson<NewEdge>,
) -> Result<(StatusCode, Json<Edge>), ApiError> {
    if payload.kind.trim().is_empty() {
        return Err(bad_request("type must not be empty"));
    }
    if let Some(weight) = payload.weight {
        if !weight.is_finite() {
            return Err(bad_request("weight must be a finite number"));
        }
    }

    let edge = Edge::from_payload(payload);
    let edge = store.create_edge(edge).await.map_err(store_error)?;

    log::info!(
        "created edge {} -[{}]-> {}",
        edge.source_id,
        edge.kind,
        edge.target_id
    );
    Ok((StatusCode::CREATED, Json(edge)))
}
