use crate::model::{generate_id, Archetype, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Id,
    pub name: String,
    pub slug: String,
    pub archetype: Archetype,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    /// Build a new entity from a validated payload. The slug is derived
    /// once here from the cleaned payload and never recomputed.
    pub fn from_payload(payload: NewEntity, slug: String) -> Self {
        let now = Utc::now();
        Self {
            id: generate_id(),
            name: payload.name,
            slug,
            archetype: payload.archetype,
            role: payload.role,
            location: payload.location,
            description: payload.description,
            image_url: payload.image_url,
            links: payload.links,
            profile: payload.profile,
            tags: payload.tags,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Creation payload. The field set is fixed: unknown keys are rejected,
/// matching the strict schema the browser client validates against.
/// `slug` is accepted for compatibility but always recomputed server-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEntity {
    pub name: String,
    pub archetype: Archetype,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<serde_json::Value>,
    #[serde(default)]
    pub aliases: Vec<NewAlias>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    pub id: Id,
    pub entity_id: Id,
    pub name: String,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

impl Alias {
    pub fn new(entity_id: Id, name: String, is_primary: bool) -> Self {
        Self {
            id: generate_id(),
            entity_id,
            name,
            is_primary,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlias {
    pub name: String,
    #[serde(default)]
    pub primary: bool,
}

/// Computed has-one score record per entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub entity_id: Id,
    pub momentum: f64,
    pub centrality: f64,
    pub computed_at: DateTime<Utc>,
}

impl Scores {
    /// Zeroed scores written alongside a freshly created entity.
    pub fn initial(entity_id: Id) -> Self {
        Self {
            entity_id,
            momentum: 0.0,
            centrality: 0.0,
            computed_at: Utc::now(),
        }
    }
}

/// Entity together with its aliases and score record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    #[serde(flatten)]
    pub entity: Entity,
    pub aliases: Vec<Alias>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scores: Option<Scores>,
}

/// Abbreviated entity reference embedded in edge and scene listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: Id,
    pub name: String,
    pub slug: String,
    pub archetype: Archetype,
}

impl From<&Entity> for EntityRef {
    fn from(entity: &Entity) -> Self {
        Self {
            id: entity.id.clone(),
            name: entity.name.clone(),
            slug: entity.slug.clone(),
            archetype: entity.archetype,
        }
    }
}
