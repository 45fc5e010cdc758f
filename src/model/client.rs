use crate::model::{generate_id, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Id,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl Client {
    pub fn new(name: String) -> Self {
        Self {
            id: generate_id(),
            name,
            created_at: Utc::now(),
        }
    }
}

/// Key/value preference row attached to a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPreference {
    pub client_id: Id,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shortlist {
    pub id: Id,
    pub client_id: Id,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

impl Shortlist {
    pub fn new(client_id: Id, title: String) -> Self {
        Self {
            id: generate_id(),
            client_id,
            title,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistEntry {
    pub shortlist_id: Id,
    pub entity_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

/// Client with its preference rows and shortlists, as the debug
/// snapshot renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub preferences: Vec<ClientPreference>,
    pub shortlists: Vec<Shortlist>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortlistDetail {
    #[serde(flatten)]
    pub shortlist: Shortlist,
    pub entries: Vec<ShortlistEntry>,
}
