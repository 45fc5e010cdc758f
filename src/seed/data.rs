use crate::logic;
use crate::model::{
    Alias, Archetype, Client, ClientPreference, Edge, Entity, NewAlias, NewEdge, NewEntity, Scene,
    SceneMember, Shortlist, ShortlistEntry,
};
use crate::store::traits::Store;
use anyhow::Result;
use chrono::{Duration, Utc};

fn entity_payload(name: &str, archetype: Archetype) -> NewEntity {
    NewEntity {
        name: name.to_string(),
        archetype,
        role: None,
        slug: None,
        location: None,
        description: None,
        tags: Vec::new(),
        image_url: None,
        links: None,
        profile: None,
        aliases: Vec::new(),
    }
}

async fn seed_entity<S: Store>(store: &S, payload: NewEntity) -> Result<Entity> {
    let payload = logic::clean_entity_payload(payload)?;
    let slug = logic::slugify(&payload.name);
    let aliases = logic::elect_primary(payload.aliases.clone());
    let entity = Entity::from_payload(payload, slug);
    let alias_rows: Vec<Alias> = aliases
        .into_iter()
        .map(|a| Alias::new(entity.id.clone(), a.name, a.primary))
        .collect();
    let detail = store.create_entity(entity, alias_rows).await?;
    Ok(detail.entity)
}

/// Load a small demonstration graph. Skipped when entities already exist.
pub async fn load_seed_data<S: Store>(store: &S) -> Result<()> {
    if !store.list_entities().await?.is_empty() {
        log::info!("seed data skipped, store is not empty");
        return Ok(());
    }

    // Entities
    let mut bjork = entity_payload("Björk", Archetype::Person);
    bjork.role = Some("Musician".to_string());
    bjork.location = Some("Reykjavík".to_string());
    bjork.tags = vec!["experimental".to_string(), "icelandic".to_string()];
    bjork.aliases = vec![NewAlias {
        name: "Björk Guðmundsdóttir".to_string(),
        primary: true,
    }];
    let bjork = seed_entity(store, bjork).await?;

    let mut harpa = entity_payload("Harpa Concert Hall", Archetype::Venue);
    harpa.location = Some("Reykjavík".to_string());
    harpa.tags = vec!["concert-hall".to_string()];
    harpa.profile = Some(serde_json::json!({ "capacity": "1800" }));
    let harpa = seed_entity(store, harpa).await?;

    let mut kex = entity_payload("Kex Hostel", Archetype::Venue);
    kex.location = Some("Reykjavík".to_string());
    kex.tags = vec!["bar".to_string(), "intimate".to_string()];
    let kex = seed_entity(store, kex).await?;

    let mut airwaves = entity_payload("Iceland Airwaves", Archetype::Event);
    airwaves.tags = vec!["festival".to_string()];
    airwaves.links =
        Some(serde_json::json!({ "website": "https://icelandairwaves.is" }));
    let airwaves = seed_entity(store, airwaves).await?;

    let mut vok = entity_payload("Vök", Archetype::Group);
    vok.role = Some("Band".to_string());
    vok.tags = vec!["electronic".to_string(), "icelandic".to_string()];
    let vok = seed_entity(store, vok).await?;

    let label = seed_entity(
        store,
        entity_payload("Smekkleysa", Archetype::Organization),
    )
    .await?;

    // Edges
    let today = Utc::now().date_naive();
    let edges = vec![
        NewEdge {
            source_id: bjork.id.clone(),
            target_id: harpa.id.clone(),
            kind: "performed_at".to_string(),
            weight: Some(1.0),
            date: Some(today - Duration::days(20)),
        },
        NewEdge {
            source_id: vok.id.clone(),
            target_id: kex.id.clone(),
            kind: "performed_at".to_string(),
            weight: Some(0.6),
            date: Some(today - Duration::days(45)),
        },
        NewEdge {
            source_id: vok.id.clone(),
            target_id: airwaves.id.clone(),
            kind: "performed_at".to_string(),
            weight: Some(0.9),
            date: Some(today - Duration::days(300)),
        },
        NewEdge {
            source_id: bjork.id.clone(),
            target_id: label.id.clone(),
            kind: "signed_with".to_string(),
            weight: None,
            date: None,
        },
    ];
    for payload in edges {
        store.create_edge(Edge::from_payload(payload)).await?;
    }

    // Scene with member roles
    let scene = Scene::new(
        "Reykjavík Indie".to_string(),
        Some("Downtown indie and electronic circuit".to_string()),
    );
    let members = vec![
        SceneMember {
            scene_id: scene.id.clone(),
            entity_id: bjork.id.clone(),
            role: Some("figurehead".to_string()),
        },
        SceneMember {
            scene_id: scene.id.clone(),
            entity_id: vok.id.clone(),
            role: Some("act".to_string()),
        },
        SceneMember {
            scene_id: scene.id.clone(),
            entity_id: kex.id.clone(),
            role: Some("venue".to_string()),
        },
    ];
    store.create_scene(scene, members).await?;

    // Client with a shortlist
    let client = Client::new("Northbound Agency".to_string());
    let preferences = vec![
        ClientPreference {
            client_id: client.id.clone(),
            key: "genre".to_string(),
            value: "indie".to_string(),
        },
        ClientPreference {
            client_id: client.id.clone(),
            key: "region".to_string(),
            value: "is".to_string(),
        },
    ];
    let client = store.create_client(client, preferences).await?;

    let shortlist = Shortlist::new(client.id.clone(), "Winter bookings".to_string());
    let entries = vec![
        ShortlistEntry {
            shortlist_id: shortlist.id.clone(),
            entity_id: vok.id.clone(),
            position: Some(1),
        },
        ShortlistEntry {
            shortlist_id: shortlist.id.clone(),
            entity_id: bjork.id.clone(),
            position: Some(2),
        },
    ];
    store.create_shortlist(shortlist, entries).await?;

    // Give the demo graph fresh scores
    let entities = store.list_entities().await?;
    let all_edges = store.list_all_edges().await?;
    store
        .upsert_scores(logic::recompute_scores(&entities, &all_edges))
        .await?;

    log::info!("seed data loaded: {} entities", entities.len());
    Ok(())
}
