use crate::model::{generate_id, EntityRef, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Named grouping of entities, each membership carrying an optional role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: Id,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Scene {
    pub fn new(name: String, description: Option<String>) -> Self {
        Self {
            id: generate_id(),
            name,
            description,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMember {
    pub scene_id: Id,
    pub entity_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewScene {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub members: Vec<NewSceneMember>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSceneMember {
    pub entity_id: Id,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Scene with member entities resolved for listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneWithMembers {
    #[serde(flatten)]
    pub scene: Scene,
    pub members: Vec<SceneMemberDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneMemberDetail {
    pub entity: EntityRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
