use crate::model::{
    Alias, AuditEntry, Client, ClientDetail, ClientPreference, Edge, EdgeWithEndpoints, Entity,
    EntityDetail, Id, Scene, SceneMember, SceneWithMembers, Scores, Shortlist, ShortlistDetail,
    ShortlistEntry,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Uniqueness violation, maps to 409.
    #[error("{0}")]
    Conflict(String),
    /// Missing resource, maps to 404.
    #[error("{0}")]
    NotFound(String),
    /// Referential problem in the payload (e.g. unknown edge endpoint),
    /// maps to 400.
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait::async_trait]
pub trait EntityStore: Send + Sync {
    /// All entities, newest-first.
    async fn list_entities(&self) -> StoreResult<Vec<Entity>>;
    async fn get_entity(&self, id: &Id) -> StoreResult<Option<EntityDetail>>;
    async fn slug_exists(&self, slug: &str) -> StoreResult<bool>;
    /// Every name already claimed, entity names and alias names alike.
    /// Raw values; normalization happens in the caller.
    async fn list_known_names(&self) -> StoreResult<Vec<String>>;
    /// Insert the entity, its aliases, a zeroed score row, and an audit
    /// entry in a single transaction. `Conflict` on a duplicate slug.
    async fn create_entity(&self, entity: Entity, aliases: Vec<Alias>)
        -> StoreResult<EntityDetail>;
}

#[async_trait::async_trait]
pub trait ScoreStore: Send + Sync {
    async fn upsert_scores(&self, scores: Vec<Scores>) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait EdgeStore: Send + Sync {
    /// Newest-first, endpoints embedded, capped at `limit` rows.
    async fn list_edges(&self, limit: i64) -> StoreResult<Vec<EdgeWithEndpoints>>;
    /// The full edge set, for score recomputation.
    async fn list_all_edges(&self) -> StoreResult<Vec<Edge>>;
    /// `Invalid` when either endpoint entity does not exist.
    async fn create_edge(&self, edge: Edge) -> StoreResult<Edge>;
}

#[async_trait::async_trait]
pub trait SceneStore: Send + Sync {
    /// Newest-first, member entity refs resolved.
    async fn list_scenes(&self) -> StoreResult<Vec<SceneWithMembers>>;
    /// `Invalid` when a member entity does not exist.
    async fn create_scene(
        &self,
        scene: Scene,
        members: Vec<SceneMember>,
    ) -> StoreResult<SceneWithMembers>;
}

#[async_trait::async_trait]
pub trait ClientStore: Send + Sync {
    async fn list_clients(&self) -> StoreResult<Vec<ClientDetail>>;
    async fn list_shortlists(&self) -> StoreResult<Vec<ShortlistDetail>>;
    async fn create_client(
        &self,
        client: Client,
        preferences: Vec<ClientPreference>,
    ) -> StoreResult<Client>;
    async fn create_shortlist(
        &self,
        shortlist: Shortlist,
        entries: Vec<ShortlistEntry>,
    ) -> StoreResult<Shortlist>;
}

#[async_trait::async_trait]
pub trait AuditStore: Send + Sync {
    /// Newest-first, every create operation leaves one row.
    async fn list_audit_log(&self) -> StoreResult<Vec<AuditEntry>>;
}

pub trait Store:
    EntityStore + ScoreStore + EdgeStore + SceneStore + ClientStore + AuditStore + Send + Sync
{
}
