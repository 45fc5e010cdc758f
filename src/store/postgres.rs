use anyhow::Context;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::collections::HashMap;

use crate::model::{
    Alias, Archetype, AuditEntry, Client, ClientDetail, ClientPreference, Edge, EdgeWithEndpoints,
    Entity, EntityDetail, EntityRef, Id, Scene, SceneMember, SceneMemberDetail, SceneWithMembers,
    Scores, Shortlist, ShortlistDetail, ShortlistEntry,
};
use crate::store::traits::{
    AuditStore, ClientStore, EdgeStore, EntityStore, SceneStore, ScoreStore, Store, StoreError,
    StoreResult,
};

const MIGRATION_SQL: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL.
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Run the schema statements embedded from `migrations/`. Every
    /// statement is `IF NOT EXISTS`, so this is safe on restart.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        let without_comments: String = MIGRATION_SQL
            .lines()
            .filter(|line| !line.trim_start().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n");

        for statement in without_comments.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to run migration statement: {}", statement))?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn archetype_from_str(s: &str) -> StoreResult<Archetype> {
    Archetype::parse(s)
        .ok_or_else(|| StoreError::Other(anyhow::anyhow!("unknown archetype '{}' in database", s)))
}

fn entity_from_row(row: &PgRow) -> StoreResult<Entity> {
    Ok(Entity {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        archetype: archetype_from_str(row.get("archetype"))?,
        role: row.get("role"),
        location: row.get("location"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        links: row.get("links"),
        profile: row.get("profile"),
        tags: row.get("tags"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn alias_from_row(row: &PgRow) -> Alias {
    Alias {
        id: row.get("id"),
        entity_id: row.get("entity_id"),
        name: row.get("name"),
        is_primary: row.get("is_primary"),
        created_at: row.get("created_at"),
    }
}

fn scores_from_row(row: &PgRow) -> Scores {
    Scores {
        entity_id: row.get("entity_id"),
        momentum: row.get("momentum"),
        centrality: row.get("centrality"),
        computed_at: row.get("computed_at"),
    }
}

/// Read one LEFT-JOINed entity ref from prefixed columns, None when the
/// join found nothing.
fn entity_ref_from_row(row: &PgRow, prefix: &str) -> StoreResult<Option<EntityRef>> {
    let id: Option<Id> = row.get(format!("{}_id", prefix).as_str());
    let Some(id) = id else {
        return Ok(None);
    };
    let archetype: String = row.get(format!("{}_archetype", prefix).as_str());
    Ok(Some(EntityRef {
        id,
        name: row.get(format!("{}_name", prefix).as_str()),
        slug: row.get(format!("{}_slug", prefix).as_str()),
        archetype: archetype_from_str(&archetype)?,
    }))
}

fn conflict_on_unique(err: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return StoreError::Conflict(message.to_string());
        }
    }
    StoreError::Database(err)
}

fn invalid_on_fk(err: sqlx::Error, message: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return StoreError::Invalid(message.to_string());
        }
    }
    StoreError::Database(err)
}

const ENTITY_COLUMNS: &str =
    "id, name, slug, archetype, role, location, description, image_url, links, profile, tags, created_at, updated_at";

#[async_trait::async_trait]
impl EntityStore for PostgresStore {
    async fn list_entities(&self) -> StoreResult<Vec<Entity>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM entities ORDER BY created_at DESC",
            ENTITY_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(entity_from_row).collect()
    }

    async fn get_entity(&self, id: &Id) -> StoreResult<Option<EntityDetail>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM entities WHERE id = $1",
            ENTITY_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let entity = entity_from_row(&row)?;

        let alias_rows = sqlx::query(
            "SELECT id, entity_id, name, is_primary, created_at
             FROM entity_aliases WHERE entity_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let score_row = sqlx::query(
            "SELECT entity_id, momentum, centrality, computed_at
             FROM entity_scores WHERE entity_id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(Some(EntityDetail {
            entity,
            aliases: alias_rows.iter().map(alias_from_row).collect(),
            scores: score_row.as_ref().map(scores_from_row),
        }))
    }

    async fn slug_exists(&self, slug: &str) -> StoreResult<bool> {
        let row = sqlx::query("SELECT 1 AS present FROM entities WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn list_known_names(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT name FROM entities UNION ALL SELECT name FROM entity_aliases",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn create_entity(
        &self,
        entity: Entity,
        aliases: Vec<Alias>,
    ) -> StoreResult<EntityDetail> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO entities
                 (id, name, slug, archetype, role, location, description, image_url,
                  links, profile, tags, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(&entity.id)
        .bind(&entity.name)
        .bind(&entity.slug)
        .bind(entity.archetype.as_str())
        .bind(&entity.role)
        .bind(&entity.location)
        .bind(&entity.description)
        .bind(&entity.image_url)
        .bind(&entity.links)
        .bind(&entity.profile)
        .bind(&entity.tags)
        .bind(entity.created_at)
        .bind(entity.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| conflict_on_unique(e, "That name/slug is already taken"))?;

        for alias in &aliases {
            sqlx::query(
                "INSERT INTO entity_aliases (id, entity_id, name, is_primary, created_at)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&alias.id)
            .bind(&alias.entity_id)
            .bind(&alias.name)
            .bind(alias.is_primary)
            .bind(alias.created_at)
            .execute(&mut *tx)
            .await?;
        }

        let scores = Scores::initial(entity.id.clone());
        sqlx::query(
            "INSERT INTO entity_scores (entity_id, momentum, centrality, computed_at)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(&scores.entity_id)
        .bind(scores.momentum)
        .bind(scores.centrality)
        .bind(scores.computed_at)
        .execute(&mut *tx)
        .await?;

        let audit = AuditEntry::new(
            "create",
            "entity",
            entity.id.clone(),
            Some(serde_json::json!({ "name": entity.name, "slug": entity.slug })),
        );
        insert_audit(&mut tx, &audit).await?;

        tx.commit().await?;

        Ok(EntityDetail {
            entity,
            aliases,
            scores: Some(scores),
        })
    }
}

async fn insert_audit(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    entry: &AuditEntry,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO audit_logs (id, action, subject, subject_id, detail, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&entry.id)
    .bind(&entry.action)
    .bind(&entry.subject)
    .bind(&entry.subject_id)
    .bind(&entry.detail)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

#[async_trait::async_trait]
impl ScoreStore for PostgresStore {
    async fn upsert_scores(&self, scores: Vec<Scores>) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        for score in &scores {
            sqlx::query(
                "INSERT INTO entity_scores (entity_id, momentum, centrality, computed_at)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT (entity_id) DO UPDATE SET
                     momentum = EXCLUDED.momentum,
                     centrality = EXCLUDED.centrality,
                     computed_at = EXCLUDED.computed_at",
            )
            .bind(&score.entity_id)
            .bind(score.momentum)
            .bind(score.centrality)
            .bind(score.computed_at)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl EdgeStore for PostgresStore {
    async fn list_edges(&self, limit: i64) -> StoreResult<Vec<EdgeWithEndpoints>> {
        let rows = sqlx::query(
            "SELECT e.id, e.source_id, e.target_id, e.type, e.weight, e.date, e.created_at,
                    s.id AS source_ref_id, s.name AS source_ref_name,
                    s.slug AS source_ref_slug, s.archetype AS source_ref_archetype,
                    t.id AS target_ref_id, t.name AS target_ref_name,
                    t.slug AS target_ref_slug, t.archetype AS target_ref_archetype
             FROM edges e
             LEFT JOIN entities s ON s.id = e.source_id
             LEFT JOIN entities t ON t.id = e.target_id
             ORDER BY e.created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                Ok(EdgeWithEndpoints {
                    edge: Edge {
                        id: row.get("id"),
                        source_id: row.get("source_id"),
                        target_id: row.get("target_id"),
                        kind: row.get("type"),
                        weight: row.get("weight"),
                        date: row.get("date"),
                        created_at: row.get("created_at"),
                    },
                    source: entity_ref_from_row(row, "source_ref")?,
                    target: entity_ref_from_row(row, "target_ref")?,
                })
            })
            .collect()
    }

    async fn list_all_edges(&self) -> StoreResult<Vec<Edge>> {
        let rows = sqlx::query(
            "SELECT id, source_id, target_id, type, weight, date, created_at FROM edges",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| Edge {
                id: row.get("id"),
                source_id: row.get("source_id"),
                target_id: row.get("target_id"),
                kind: row.get("type"),
                weight: row.get("weight"),
                date: row.get("date"),
                created_at: row.get("created_at"),
            })
            .collect())
    }

    async fn create_edge(&self, edge: Edge) -> StoreResult<Edge> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO edges (id, source_id, target_id, type, weight, date, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(&edge.id)
        .bind(&edge.source_id)
        .bind(&edge.target_id)
        .bind(&edge.kind)
        .bind(edge.weight)
        .bind(edge.date)
        .bind(edge.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| invalid_on_fk(e, "source or target entity does not exist"))?;

        let audit = AuditEntry::new(
            "create",
            "edge",
            edge.id.clone(),
            Some(serde_json::json!({ "type": edge.kind })),
        );
        insert_audit(&mut tx, &audit).await?;

        tx.commit().await?;
        Ok(edge)
    }
}

#[async_trait::async_trait]
impl SceneStore for PostgresStore {
    async fn list_scenes(&self) -> StoreResult<Vec<SceneWithMembers>> {
        let scene_rows = sqlx::query(
            "SELECT id, name, description, created_at FROM scenes ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let member_rows = sqlx::query(
            "SELECT se.scene_id, se.role,
                    e.id AS member_ref_id, e.name AS member_ref_name,
                    e.slug AS member_ref_slug, e.archetype AS member_ref_archetype
             FROM scene_entities se
             JOIN entities e ON e.id = se.entity_id",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut members_by_scene: HashMap<Id, Vec<SceneMemberDetail>> = HashMap::new();
        for row in &member_rows {
            let scene_id: Id = row.get("scene_id");
            let Some(entity) = entity_ref_from_row(row, "member_ref")? else {
                continue;
            };
            members_by_scene
                .entry(scene_id)
                .or_default()
                .push(SceneMemberDetail {
                    entity,
                    role: row.get("role"),
                });
        }

        Ok(scene_rows
            .iter()
            .map(|row| {
                let scene = Scene {
                    id: row.get("id"),
                    name: row.get("name"),
                    description: row.get("description"),
                    created_at: row.get("created_at"),
                };
                let members = members_by_scene.remove(&scene.id).unwrap_or_default();
                SceneWithMembers { scene, members }
            })
            .collect())
    }

    async fn create_scene(
        &self,
        scene: Scene,
        members: Vec<SceneMember>,
    ) -> StoreResult<SceneWithMembers> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO scenes (id, name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&scene.id)
        .bind(&scene.name)
        .bind(&scene.description)
        .bind(scene.created_at)
        .execute(&mut *tx)
        .await?;

        for member in &members {
            sqlx::query(
                "INSERT INTO scene_entities (scene_id, entity_id, role) VALUES ($1, $2, $3)",
            )
            .bind(&member.scene_id)
            .bind(&member.entity_id)
            .bind(&member.role)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                invalid_on_fk(
                    e,
                    &format!("unknown entity '{}'", member.entity_id),
                )
            })?;
        }

        let audit = AuditEntry::new(
            "create",
            "scene",
            scene.id.clone(),
            Some(serde_json::json!({ "name": scene.name })),
        );
        insert_audit(&mut tx, &audit).await?;

        tx.commit().await?;

        // Re-read through the listing path so the response carries
        // resolved member refs.
        let mut details = Vec::with_capacity(members.len());
        for member in &members {
            let row = sqlx::query(
                "SELECT id AS member_ref_id, name AS member_ref_name,
                        slug AS member_ref_slug, archetype AS member_ref_archetype
                 FROM entities WHERE id = $1",
            )
            .bind(&member.entity_id)
            .fetch_optional(&self.pool)
            .await?;
            if let Some(row) = row {
                if let Some(entity) = entity_ref_from_row(&row, "member_ref")? {
                    details.push(SceneMemberDetail {
                        entity,
                        role: member.role.clone(),
                    });
                }
            }
        }

        Ok(SceneWithMembers {
            scene,
            members: details,
        })
    }
}

#[async_trait::async_trait]
impl ClientStore for PostgresStore {
    async fn list_clients(&self) -> StoreResult<Vec<ClientDetail>> {
        let client_rows =
            sqlx::query("SELECT id, name, created_at FROM clients ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        let preference_rows =
            sqlx::query("SELECT client_id, key, value FROM client_preferences")
                .fetch_all(&self.pool)
                .await?;

        let shortlist_rows = sqlx::query(
            "SELECT id, client_id, title, created_at FROM shortlists ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut preferences: HashMap<Id, Vec<ClientPreference>> = HashMap::new();
        for row in &preference_rows {
            let pref = ClientPreference {
                client_id: row.get("client_id"),
                key: row.get("key"),
                value: row.get("value"),
            };
            preferences.entry(pref.client_id.clone()).or_default().push(pref);
        }

        let mut shortlists: HashMap<Id, Vec<Shortlist>> = HashMap::new();
        for row in &shortlist_rows {
            let shortlist = Shortlist {
                id: row.get("id"),
                client_id: row.get("client_id"),
                title: row.get("title"),
                created_at: row.get("created_at"),
            };
            shortlists
                .entry(shortlist.client_id.clone())
                .or_default()
                .push(shortlist);
        }

        Ok(client_rows
            .iter()
            .map(|row| {
                let client = Client {
                    id: row.get("id"),
                    name: row.get("name"),
                    created_at: row.get("created_at"),
                };
                ClientDetail {
                    preferences: preferences.remove(&client.id).unwrap_or_default(),
                    shortlists: shortlists.remove(&client.id).unwrap_or_default(),
                    client,
                }
            })
            .collect())
    }

    async fn list_shortlists(&self) -> StoreResult<Vec<ShortlistDetail>> {
        let shortlist_rows = sqlx::query(
            "SELECT id, client_id, title, created_at FROM shortlists ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let entry_rows = sqlx::query(
            "SELECT shortlist_id, entity_id, position FROM shortlist_entities ORDER BY position",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut entries: HashMap<Id, Vec<ShortlistEntry>> = HashMap::new();
        for row in &entry_rows {
            let entry = ShortlistEntry {
                shortlist_id: row.get("shortlist_id"),
                entity_id: row.get("entity_id"),
                position: row.get("position"),
            };
            entries
                .entry(entry.shortlist_id.clone())
                .or_default()
                .push(entry);
        }

        Ok(shortlist_rows
            .iter()
            .map(|row| {
                let shortlist = Shortlist {
                    id: row.get("id"),
                    client_id: row.get("client_id"),
                    title: row.get("title"),
                    created_at: row.get("created_at"),
                };
                ShortlistDetail {
                    entries: entries.remove(&shortlist.id).unwrap_or_default(),
                    shortlist,
                }
            })
            .collect())
    }

    async fn create_client(
        &self,
        client: Client,
        preferences: Vec<ClientPreference>,
    ) -> StoreResult<Client> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO clients (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(&client.id)
            .bind(&client.name)
            .bind(client.created_at)
            .execute(&mut *tx)
            .await?;

        for pref in &preferences {
            sqlx::query(
                "INSERT INTO client_preferences (client_id, key, value) VALUES ($1, $2, $3)",
            )
            .bind(&pref.client_id)
            .bind(&pref.key)
            .bind(&pref.value)
            .execute(&mut *tx)
            .await?;
        }

        let audit = AuditEntry::new(
            "create",
            "client",
            client.id.clone(),
            Some(serde_json::json!({ "name": client.name })),
        );
        insert_audit(&mut tx, &audit).await?;

        tx.commit().await?;
        Ok(client)
    }

    async fn create_shortlist(
        &self,
        shortlist: Shortlist,
        entries: Vec<ShortlistEntry>,
    ) -> StoreResult<Shortlist> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO shortlists (id, client_id, title, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(&shortlist.id)
        .bind(&shortlist.client_id)
        .bind(&shortlist.title)
        .bind(shortlist.created_at)
        .execute(&mut *tx)
        .await?;

        for entry in &entries {
            sqlx::query(
                "INSERT INTO shortlist_entities (shortlist_id, entity_id, position)
                 VALUES ($1, $2, $3)",
            )
            .bind(&entry.shortlist_id)
            .bind(&entry.entity_id)
            .bind(entry.position)
            .execute(&mut *tx)
            .await
            .map_err(|e| invalid_on_fk(e, &format!("unknown entity '{}'", entry.entity_id)))?;
        }

        let audit = AuditEntry::new(
            "create",
            "shortlist",
            shortlist.id.clone(),
            Some(serde_json::json!({ "title": shortlist.title })),
        );
        insert_audit(&mut tx, &audit).await?;

        tx.commit().await?;
        Ok(shortlist)
    }
}

#[async_trait::async_trait]
impl AuditStore for PostgresStore {
    async fn list_audit_log(&self) -> StoreResult<Vec<AuditEntry>> {
        let rows = sqlx::query(
            "SELECT id, action, subject, subject_id, detail, created_at
             FROM audit_logs ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| AuditEntry {
                id: row.get("id"),
                action: row.get("action"),
                subject: row.get("subject"),
                subject_id: row.get("subject_id"),
                detail: row.get("detail"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

impl Store for PostgresStore {}
