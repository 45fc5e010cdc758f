use crate::model::{NewAlias, NewEntity};
use itertools::Itertools;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("image_url must be a valid http(s) URL")]
    BadImageUrl,
    #[error("links must be an object of platform -> URL strings")]
    BadLinksShape,
    #[error("link for '{0}' is not a valid http(s) URL")]
    BadLinkUrl(String),
    #[error("profile must be a JSON object")]
    BadProfileShape,
    #[error("alias names must not be empty")]
    EmptyAlias,
}

/// Absolute http/https URLs only, anything else is rejected.
fn is_valid_url(candidate: &str) -> bool {
    match Url::parse(candidate) {
        Ok(url) => matches!(url.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Validate and clean a creation payload in place: trim the name, fold
/// tags to lowercase and deduplicate them, drop empty link/alias noise,
/// and check every URL-bearing field. Returns the cleaned payload.
pub fn clean_entity_payload(mut payload: NewEntity) -> Result<NewEntity, ValidationError> {
    payload.name = payload.name.trim().to_string();
    if payload.name.is_empty() {
        return Err(ValidationError::EmptyName);
    }

    payload.tags = payload
        .tags
        .iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .unique()
        .collect();

    if let Some(image_url) = payload.image_url.take() {
        let trimmed = image_url.trim();
        if !trimmed.is_empty() {
            if !is_valid_url(trimmed) {
                return Err(ValidationError::BadImageUrl);
            }
            payload.image_url = Some(trimmed.to_string());
        }
    }

    if let Some(links) = payload.links.take() {
        let keep = {
            let map = links.as_object().ok_or(ValidationError::BadLinksShape)?;
            for (platform, value) in map {
                let url = value.as_str().ok_or(ValidationError::BadLinksShape)?;
                if !is_valid_url(url) {
                    return Err(ValidationError::BadLinkUrl(platform.clone()));
                }
            }
            !map.is_empty()
        };
        if keep {
            payload.links = Some(links);
        }
    }

    if let Some(profile) = payload.profile.take() {
        let keep = !profile
            .as_object()
            .ok_or(ValidationError::BadProfileShape)?
            .is_empty();
        if keep {
            payload.profile = Some(profile);
        }
    }

    for alias in &mut payload.aliases {
        alias.name = alias.name.trim().to_string();
        if alias.name.is_empty() {
            return Err(ValidationError::EmptyAlias);
        }
    }

    Ok(payload)
}

/// Primary-alias election: at most one alias may be primary. When
/// several are requested, the first flagged one wins and the rest are
/// forced to false. Order is preserved.
pub fn elect_primary(aliases: Vec<NewAlias>) -> Vec<NewAlias> {
    let mut primary_seen = false;
    aliases
        .into_iter()
        .map(|mut alias| {
            if alias.primary {
                if primary_seen {
                    alias.primary = false;
                } else {
                    primary_seen = true;
                }
            }
            alias
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Archetype;
    use serde_json::json;

    fn payload(name: &str) -> NewEntity {
        NewEntity {
            name: name.to_string(),
            archetype: Archetype::Venue,
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

    #[test]
    fn rejects_blank_name() {
        assert_eq!(
            clean_entity_payload(payload("   ")),
            Err(ValidationError::EmptyName)
        );
    }

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let mut p = payload("Kex");
        p.tags = vec![
            " Techno ".to_string(),
            "techno".to_string(),
            "".to_string(),
            "Jazz".to_string(),
        ];
        let cleaned = clean_entity_payload(p).unwrap();
        assert_eq!(cleaned.tags, vec!["techno", "jazz"]);
    }

    #[test]
    fn rejects_bad_link_urls() {
        let mut p = payload("Kex");
        p.links = Some(json!({"instagram": "not a url"}));
        assert_eq!(
            clean_entity_payload(p),
            Err(ValidationError::BadLinkUrl("instagram".to_string()))
        );

        let mut p = payload("Kex");
        p.links = Some(json!({"ftp": "ftp://example.com"}));
        assert!(clean_entity_payload(p).is_err());

        let mut p = payload("Kex");
        p.links = Some(json!({"site": "https://example.com/kex"}));
        assert!(clean_entity_payload(p).is_ok());
    }

    #[test]
    fn rejects_non_object_links_and_profile() {
        let mut p = payload("Kex");
        p.links = Some(json!(["https://example.com"]));
        assert_eq!(clean_entity_payload(p), Err(ValidationError::BadLinksShape));

        let mut p = payload("Kex");
        p.profile = Some(json!("capacity: 700"));
        assert_eq!(
            clean_entity_payload(p),
            Err(ValidationError::BadProfileShape)
        );
    }

    #[test]
    fn blank_image_url_is_dropped_bad_one_rejected() {
        let mut p = payload("Kex");
        p.image_url = Some("  ".to_string());
        assert_eq!(clean_entity_payload(p).unwrap().image_url, None);

        let mut p = payload("Kex");
        p.image_url = Some("javascript:alert(1)".to_string());
        assert_eq!(clean_entity_payload(p), Err(ValidationError::BadImageUrl));
    }

    #[test]
    fn first_primary_alias_wins() {
        let aliases = vec![
            NewAlias {
                name: "KX".to_string(),
                primary: false,
            },
            NewAlias {
                name: "The Kex".to_string(),
                primary: true,
            },
            NewAlias {
                name: "Kexland".to_string(),
                primary: true,
            },
        ];
        let elected = elect_primary(aliases);
        let flags: Vec<bool> = elected.iter().map(|a| a.primary).collect();
        assert_eq!(flags, vec![false, true, false]);
        assert_eq!(elected.iter().filter(|a| a.primary).count(), 1);
    }

    #[test]
    fn no_primary_requested_elects_none() {
        let aliases = vec![NewAlias {
            name: "KX".to_string(),
            primary: false,
        }];
        assert!(elect_primary(aliases).iter().all(|a| !a.primary));
    }
}
