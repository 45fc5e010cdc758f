use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type Id = String;

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Enumerated entity category. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Person,
    Group,
    Venue,
    Organization,
    Media,
    Event,
    Artifact,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Archetype::Person => "person",
            Archetype::Group => "group",
            Archetype::Venue => "venue",
            Archetype::Organization => "organization",
            Archetype::Media => "media",
            Archetype::Event => "event",
            Archetype::Artifact => "artifact",
        }
    }

    /// Parse the lowercase database representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "person" => Some(Archetype::Person),
            "group" => Some(Archetype::Group),
            "venue" => Some(Archetype::Venue),
            "organization" => Some(Archetype::Organization),
            "media" => Some(Archetype::Media),
            "event" => Some(Archetype::Event),
            "artifact" => Some(Archetype::Artifact),
            _ => None,
        }
    }
}
