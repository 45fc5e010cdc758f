use crate::model::{generate_id, EntityRef, Id};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Directed, typed, optionally weighted and dated relationship
/// between two entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: Id,
    pub source_id: Id,
    pub target_id: Id,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Edge {
    pub fn from_payload(payload: NewEdge) -> Self {
        Self {
            id: generate_id(),
            source_id: payload.source_id,
            target_id: payload.target_id,
            kind: payload.kind,
            weight: payload.weight,
            date: payload.date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewEdge {
    pub source_id: Id,
    pub target_id: Id,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

/// Edge with its endpoint entities embedded, as the edge listing shows
/// them. Endpoints are optional so a dangling reference renders as
/// unknown instead of failing the whole listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeWithEndpoints {
    #[serde(flatten)]
    pub edge: Edge,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<EntityRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityRef>,
}
