use std::collections::HashSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a display name for duplicate comparison: NFD decomposition
/// with combining marks dropped (so "Björk" and "Bjork" collide),
/// lowercased, whitespace runs collapsed to single spaces, trimmed.
pub fn normalize_name(name: &str) -> String {
    let stripped: String = name.nfd().filter(|c| !is_combining_mark(*c)).collect();
    let lowered = stripped.to_lowercase();

    let mut out = String::with_capacity(lowered.len());
    for word in lowered.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Build the set of normalized names already taken by entities or aliases.
pub fn taken_names<'a, I>(existing: I) -> HashSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    existing
        .into_iter()
        .map(normalize_name)
        .filter(|n| !n.is_empty())
        .collect()
}

/// True when `candidate` normalizes onto a member of `taken`.
pub fn collides(candidate: &str, taken: &HashSet<String>) -> bool {
    let normalized = normalize_name(candidate);
    !normalized.is_empty() && taken.contains(&normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_fold_and_whitespace_collapse() {
        assert_eq!(normalize_name("  Hotel   BORG  "), "hotel borg");
        assert_eq!(normalize_name("Hotel\tBorg\n"), "hotel borg");
    }

    #[test]
    fn strips_diacritics() {
        assert_eq!(normalize_name("Björk"), "bjork");
        assert_eq!(normalize_name("Café Flóra"), "cafe flora");
        assert_eq!(normalize_name("Sigur Rós"), "sigur ros");
    }

    #[test]
    fn detects_normalized_collisions() {
        let taken = taken_names(["Björk", "Hotel Borg", "Kex Hostel"]);
        assert!(collides("BJORK", &taken));
        assert!(collides("  hotel    borg ", &taken));
        assert!(!collides("Harpa", &taken));
    }

    #[test]
    fn empty_names_never_collide() {
        let taken = taken_names(["", "   "]);
        assert!(taken.is_empty());
        assert!(!collides("", &taken));
    }
}
