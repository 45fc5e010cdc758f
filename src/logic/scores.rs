use crate::model::{Edge, Entity, Id, Scores};
use chrono::{Duration, NaiveDate, Utc};
use itertools::Itertools;
use std::collections::HashMap;

/// Edges younger than this feed an entity's momentum.
const MOMENTUM_WINDOW_DAYS: i64 = 180;

/// Weight applied to an edge with no explicit weight.
const DEFAULT_EDGE_WEIGHT: f64 = 1.0;

/// Recompute the score record for every entity from the current edge set.
///
/// Centrality is plain degree centrality: distinct neighbors over `n - 1`
/// (zero for a graph with fewer than two entities). Momentum sums the
/// weights of incident edges dated inside the recency window; undated
/// edges contribute nothing.
pub fn recompute_scores(entities: &[Entity], edges: &[Edge]) -> Vec<Scores> {
    let now = Utc::now();
    let cutoff: NaiveDate = (now - Duration::days(MOMENTUM_WINDOW_DAYS)).date_naive();

    let mut neighbors: HashMap<&Id, Vec<&Id>> = HashMap::new();
    let mut momentum: HashMap<&Id, f64> = HashMap::new();

    for edge in edges {
        neighbors.entry(&edge.source_id).or_default().push(&edge.target_id);
        neighbors.entry(&edge.target_id).or_default().push(&edge.source_id);

        if let Some(date) = edge.date {
            if date >= cutoff {
                let weight = edge.weight.unwrap_or(DEFAULT_EDGE_WEIGHT);
                *momentum.entry(&edge.source_id).or_default() += weight;
                *momentum.entry(&edge.target_id).or_default() += weight;
            }
        }
    }

    let denominator = entities.len().saturating_sub(1) as f64;

    entities
        .iter()
        .map(|entity| {
            let degree = neighbors
                .get(&entity.id)
                .map(|n| n.iter().unique().count())
                .unwrap_or(0);
            let centrality = if denominator > 0.0 {
                degree as f64 / denominator
            } else {
                0.0
            };
            Scores {
                entity_id: entity.id.clone(),
                momentum: momentum.get(&entity.id).copied().unwrap_or(0.0),
                centrality,
                computed_at: now,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Archetype, NewEntity};

    fn entity(name: &str) -> Entity {
        let payload = NewEntity {
            name: name.to_string(),
            archetype: Archetype::Person,
            role: None,
            slug: None,
            location: None,
            description: None,
            tags: Vec::new(),
            image_url: None,
            links: None,
            profile: None,
            aliases: Vec::new(),
        };
        Entity::from_payload(payload, crate::logic::slugify(name))
    }

    fn edge(source: &Entity, target: &Entity, days_ago: i64, weight: Option<f64>) -> Edge {
        Edge {
            id: crate::model::generate_id(),
            source_id: source.id.clone(),
            target_id: target.id.clone(),
            kind: "collaborated_with".to_string(),
            weight,
            date: Some((Utc::now() - Duration::days(days_ago)).date_naive()),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn isolated_entities_score_zero() {
        let entities = vec![entity("A"), entity("B"), entity("C")];
        let scores = recompute_scores(&entities, &[]);
        assert_eq!(scores.len(), 3);
        assert!(scores.iter().all(|s| s.centrality == 0.0 && s.momentum == 0.0));
    }

    #[test]
    fn degree_centrality_counts_distinct_neighbors() {
        let a = entity("A");
        let b = entity("B");
        let c = entity("C");
        // Two parallel edges A->B must not double-count B as a neighbor.
        let edges = vec![
            edge(&a, &b, 10, None),
            edge(&a, &b, 20, None),
            edge(&a, &c, 30, None),
        ];
        let entities = vec![a.clone(), b, c];
        let scores = recompute_scores(&entities, &edges);
        let a_score = scores.iter().find(|s| s.entity_id == a.id).unwrap();
        assert_eq!(a_score.centrality, 1.0); // 2 neighbors / (3 - 1)
    }

    #[test]
    fn momentum_only_counts_recent_edges() {
        let a = entity("A");
        let b = entity("B");
        let edges = vec![
            edge(&a, &b, 30, Some(2.0)),  // inside window
            edge(&a, &b, 400, Some(9.0)), // outside window
        ];
        let entities = vec![a.clone(), b];
        let scores = recompute_scores(&entities, &edges);
        let a_score = scores.iter().find(|s| s.entity_id == a.id).unwrap();
        assert_eq!(a_score.momentum, 2.0);
    }

    #[test]
    fn undated_edges_still_feed_centrality() {
        let a = entity("A");
        let b = entity("B");
        let edges = vec![Edge {
            id: crate::model::generate_id(),
            source_id: a.id.clone(),
            target_id: b.id.clone(),
            kind: "knows".to_string(),
            weight: None,
            date: None,
            created_at: Utc::now(),
        }];
        let entities = vec![a.clone(), b];
        let scores = recompute_scores(&entities, &edges);
        let a_score = scores.iter().find(|s| s.entity_id == a.id).unwrap();
        assert_eq!(a_score.centrality, 1.0);
        assert_eq!(a_score.momentum, 0.0);
    }
}
