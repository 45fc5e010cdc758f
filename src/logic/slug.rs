/// Derive a URL-safe slug from an entity name.
///
/// Lowercase, quote characters stripped, every run of non-alphanumeric
/// characters collapsed to a single hyphen, leading/trailing hyphens
/// trimmed. Applying the function to its own output is a no-op.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;

    for ch in lowered.chars() {
        if matches!(ch, '\'' | '\u{2019}' | '"') {
            continue;
        }
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_hyphenates() {
        assert_eq!(slugify("Harpa Concert Hall"), "harpa-concert-hall");
    }

    #[test]
    fn strips_quotes_without_splitting_words() {
        assert_eq!(slugify("Kalli's Bar"), "kallis-bar");
        assert_eq!(slugify("Kalli\u{2019}s \"Bar\""), "kallis-bar");
    }

    #[test]
    fn collapses_punctuation_runs() {
        assert_eq!(slugify("Dead & Company (live)"), "dead-company-live");
        assert_eq!(slugify("a -- b"), "a-b");
    }

    #[test]
    fn trims_edge_hyphens() {
        assert_eq!(slugify("  --Hotel Borg--  "), "hotel-borg");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn idempotent_on_slugified_input() {
        for name in ["Harpa Concert Hall", "Kalli's Bar", "x121 (club)", "  --a--  "] {
            let once = slugify(name);
            assert_eq!(slugify(&once), once);
        }
    }

    #[test]
    fn non_ascii_letters_become_separators() {
        // Only [a-z0-9] survive; everything else is a separator.
        assert_eq!(slugify("Björk"), "bj-rk");
    }
}
