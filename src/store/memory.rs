use crate::model::{
    Alias, AuditEntry, Client, ClientDetail, ClientPreference, Edge, EdgeWithEndpoints, Entity,
    EntityDetail, EntityRef, Id, Scene, SceneMember, SceneMemberDetail, SceneWithMembers, Scores,
    Shortlist, ShortlistDetail, ShortlistEntry,
};
use crate::store::traits::{
    AuditStore, ClientStore, EdgeStore, EntityStore, SceneStore, ScoreStore, Store, StoreError,
    StoreResult,
};
use parking_lot::RwLock;
use serde_json::json;
use std::collections::HashMap;

/// In-memory store used by the test suite and by `SCENEDB_STORE=memory`.
///
/// Rows live in vectors in insertion order; newest-first listings walk
/// them in reverse, so ties on identical timestamps stay deterministic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    entities: Vec<Entity>,
    aliases: HashMap<Id, Vec<Alias>>,
    scores: HashMap<Id, Scores>,
    edges: Vec<Edge>,
    scenes: Vec<Scene>,
    scene_members: HashMap<Id, Vec<SceneMember>>,
    clients: Vec<Client>,
    preferences: HashMap<Id, Vec<ClientPreference>>,
    shortlists: Vec<Shortlist>,
    shortlist_entries: HashMap<Id, Vec<ShortlistEntry>>,
    audit: Vec<AuditEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn entity_ref(&self, id: &Id) -> Option<EntityRef> {
        self.entities.iter().find(|e| &e.id == id).map(EntityRef::from)
    }

    fn detail(&self, entity: &Entity) -> EntityDetail {
        EntityDetail {
            entity: entity.clone(),
            aliases: self.aliases.get(&entity.id).cloned().unwrap_or_default(),
            scores: self.scores.get(&entity.id).cloned(),
        }
    }
}

#[async_trait::async_trait]
impl EntityStore for MemoryStore {
    async fn list_entities(&self) -> StoreResult<Vec<Entity>> {
        let inner = self.inner.read();
        Ok(inner.entities.iter().rev().cloned().collect())
    }

    async fn get_entity(&self, id: &Id) -> StoreResult<Option<EntityDetail>> {
        let inner = self.inner.read();
        Ok(inner
            .entities
            .iter()
            .find(|e| &e.id == id)
            .map(|e| inner.detail(e)))
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let inner = self.inner.read();
        Ok(inner.entities.iter().any(|e| e.slug == slug))
    }

    async fn list_known_names(&self) -> StoreResult<Vec<String>> {
        let inner = self.inner.read();
        let mut names: Vec<String> = inner.entities.iter().map(|e| e.name.clone()).collect();
        names.extend(
            inner
                .aliases
                .values()
                .flatten()
                .map(|a| a.name.clone()),
        );
        Ok(names)
    }

    async fn create_entity(
        &self,
        entity: Entity,
        aliases: Vec<Alias>,
    ) -> StoreResult<EntityDetail> {
        let mut inner = self.inner.write();
        if inner.entities.iter().any(|e| e.slug == entity.slug) {
            return Err(StoreError::Conflict(format!(
                "slug '{}' is already taken",
                entity.slug
            )));
        }

        let scores = Scores::initial(entity.id.clone());
        inner.audit.push(AuditEntry::new(
            "create",
            "entity",
            entity.id.clone(),
            Some(json!({ "name": entity.name, "slug": entity.slug })),
        ));
        inner.scores.insert(entity.id.clone(), scores.clone());
        inner.aliases.insert(entity.id.clone(), aliases.clone());
        inner.entities.push(entity.clone());

        Ok(EntityDetail {
            entity,
            aliases,
            scores: Some(scores),
        })
    }
}

#[async_trait::async_trait]
impl ScoreStore for MemoryStore {
    async fn upsert_scores(&self, scores: Vec<Scores>) -> StoreResult<()> {
        let mut inner = self.inner.write();
        for score in scores {
            inner.scores.insert(score.entity_id.clone(), score);
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl EdgeStore for MemoryStore {
    async fn list_edges(&self, limit: i64) -> StoreResult<Vec<EdgeWithEndpoints>> {
        let inner = self.inner.read();
        Ok(inner
            .edges
            .iter()
            .rev()
            .take(limit.max(0) as usize)
            .map(|edge| EdgeWithEndpoints {
                edge: edge.clone(),
                source: inner.entity_ref(&edge.source_id),
                target: inner.entity_ref(&edge.target_id),
            })
            .collect())
    }

    async fn list_all_edges(&self) -> StoreResult<Vec<Edge>> {
        Ok(self.inner.read().edges.clone())
    }

    async fn create_edge(&self, edge: Edge) -> StoreResult<Edge> {
        let mut inner = self.inner.write();
        for endpoint in [&edge.source_id, &edge.target_id] {
            if inner.entity_ref(endpoint).is_none() {
                return Err(StoreError::Invalid(format!(
                    "unknown entity '{}'",
                    endpoint
                )));
            }
        }
        inner.audit.push(AuditEntry::new(
            "create",
            "edge",
            edge.id.clone(),
            Some(json!({ "type": edge.kind })),
        ));
        inner.edges.push(edge.clone());
        Ok(edge)
    }
}

#[async_trait::async_trait]
impl SceneStore for MemoryStore {
    async fn list_scenes(&self) -> StoreResult<Vec<SceneWithMembers>> {
        let inner = self.inner.read();
        Ok(inner
            .scenes
            .iter()
            .rev()
            .map(|scene| SceneWithMembers {
                scene: scene.clone(),
                members: inner
                    .scene_members
                    .get(&scene.id)
                    .into_iter()
                    .flatten()
                    .filter_map(|m| {
                        inner.entity_ref(&m.entity_id).map(|entity| SceneMemberDetail {
                            entity,
                            role: m.role.clone(),
                        })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn create_scene(
        &self,
        scene: Scene,
        members: Vec<SceneMember>,
    ) -> StoreResult<SceneWithMembers> {
        let mut inner = self.inner.write();
        let mut details = Vec::with_capacity(members.len());
        for member in &members {
            match inner.entity_ref(&member.entity_id) {
                Some(entity) => details.push(SceneMemberDetail {
                    entity,
                    role: member.role.clone(),
                }),
                None => {
                    return Err(StoreError::Invalid(format!(
                        "unknown entity '{}'",
                        member.entity_id
                    )))
                }
            }
        }
        inner.audit.push(AuditEntry::new(
            "create",
            "scene",
            scene.id.clone(),
            Some(json!({ "name": scene.name })),
        ));
        inner.scene_members.insert(scene.id.clone(), members);
        inner.scenes.push(scene.clone());
        Ok(SceneWithMembers {
            scene,
            members: details,
        })
    }
}

#[async_trait::async_trait]
impl ClientStore for MemoryStore {
    async fn list_clients(&self) -> StoreResult<Vec<ClientDetail>> {
        let inner = self.inner.read();
        Ok(inner
            .clients
            .iter()
            .rev()
            .map(|client| ClientDetail {
                client: client.clone(),
                preferences: inner.preferences.get(&client.id).cloned().unwrap_or_default(),
                shortlists: inner
                    .shortlists
                    .iter()
                    .filter(|s| s.client_id == client.id)
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    async fn list_shortlists(&self) -> StoreResult<Vec<ShortlistDetail>> {
        let inner = self.inner.read();
        Ok(inner
            .shortlists
            .iter()
            .rev()
            .map(|shortlist| ShortlistDetail {
                shortlist: shortlist.clone(),
                entries: inner
                    .shortlist_entries
                    .get(&shortlist.id)
                    .cloned()
                    .unwrap_or_default(),
            })
            .collect())
    }

    async fn create_client(
        &self,
        client: Client,
        preferences: Vec<ClientPreference>,
    ) -> StoreResult<Client> {
        let mut inner = self.inner.write();
        inner.audit.push(AuditEntry::new(
            "create",
            "client",
            client.id.clone(),
            Some(json!({ "name": client.name })),
        ));
        inner.preferences.insert(client.id.clone(), preferences);
        inner.clients.push(client.clone());
        Ok(client)
    }

    async fn create_shortlist(
        &self,
        shortlist: Shortlist,
        entries: Vec<ShortlistEntry>,
    ) -> StoreResult<Shortlist> {
        let mut inner = self.inner.write();
        inner.audit.push(AuditEntry::new(
            "create",
            "shortlist",
            shortlist.id.clone(),
            Some(json!({ "title": shortlist.title })),
        ));
        inner
            .shortlist_entries
            .insert(shortlist.id.clone(), entries);
        inner.shortlists.push(shortlist.clone());
        Ok(shortlist)
    }
}

#[async_trait::async_trait]
impl AuditStore for MemoryStore {
    async fn list_audit_log(&self) -> StoreResult<Vec<AuditEntry>> {
        Ok(self.inner.read().audit.iter().rev().cloned().collect())
    }
}

impl Store for MemoryStore {}
