use axum::{extract::State, http::StatusCode, response::Json, Json as RequestJson};
use itertools::Itertools;

use crate::api::handlers::{bad_request, store_error, ApiError, AppState};
use crate::model::{NewScene, Scene, SceneMember, SceneWithMembers};
use crate::store::traits::Store;

/// GET /api/scenes - newest first, member entities resolved.
pub async fn list_scenes<S: Store>(
    State(store): State<AppState<S>>,
) -> Result<Json<Vec<SceneWithMembers>>, ApiError> {
    let scenes = store.list_scenes().await.map_err(store_error)?;
    Ok(Json(scenes))
}

/// POST /api/scenes - create a scene with an optional member list.
pub async fn create_scene<S: Store>(
    State(store): State<AppState<S>>,
    RequestJson(payload): RequestJson<NewScene>,
) -> Result<(StatusCode, Json<SceneWithMembers>), ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(bad_request("name must not be empty"));
    }

    // One membership row per entity; a repeated entity keeps its first role.
    let members = payload
        .members
        .into_iter()
        .unique_by(|m| m.entity_id.clone())
        .collect::<Vec<_>>();

    let scene = Scene::new(name, payload.description);
    let member_rows: Vec<SceneMember> = members
        .into_iter()
        .map(|m| SceneMember {
            scene_id: scene.id.clone(),
            entity_id: m.entity_id,
            role: m.role,
        })
        .collect();

    let created = store
        .create_scene(scene, member_rows)
        .await
        .map_err(store_error)?;

    log::info!(
        "created scene '{}' with {} members",
        created.scene.name,
        created.members.len()
    );
    Ok((StatusCode::CREATED, Json(created)))
}
