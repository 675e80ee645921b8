use std::cmp::Ordering;

use unaccent::unaccent;

use crate::clients::entities::Track;

/// Sort key approximating a locale-aware collator.
///
/// Levels are compared in order: letters ignoring case and accents,
/// then accents (unaccented first), then case (lowercase first).
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: String,
    accents: String,
    uppercase: Vec<bool>,
}

impl CollationKey {
    pub fn new(name: &str) -> Self {
        CollationKey {
            base: unaccent(name).to_lowercase(),
            accents: name.to_lowercase(),
            uppercase: name.chars().map(char::is_uppercase).collect(),
        }
    }
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    CollationKey::new(a).cmp(&CollationKey::new(b))
}

/// Stable sort by primary artist name.
///
/// Tracks without a primary artist do not take part in the comparison and keep
/// their positions; the other tracks are sorted among the remaining positions.
pub fn sort_by_primary_artist(tracks: Vec<Track>) -> Vec<Track> {
    let mut slots: Vec<Option<Track>> = Vec::with_capacity(tracks.len());
    let mut named = Vec::new();
    for track in tracks {
        if track.primary_artist().is_some() {
            slots.push(None);
            named.push(track);
        } else {
            slots.push(Some(track));
        }
    }

    named.sort_by_cached_key(|track| {
        CollationKey::new(track.primary_artist().unwrap_or_default())
    });

    let mut named = named.into_iter();
    slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| named.next()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::entities::Artist;

    fn track(title: &str, artist: Option<&str>) -> Track {
        Track {
            video_id: Some(format!("v-{title}")),
            set_video_id: Some(format!("s-{title}")),
            title: title.into(),
            artists: artist.map(Artist::named).into_iter().collect(),
            album: None,
            duration: None,
        }
    }

    fn titles(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.title.as_str()).collect()
    }

    #[test]
    fn test_sorts_by_primary_artist() {
        let sorted = sort_by_primary_artist(vec![
            track("B", Some("Zeta")),
            track("A", Some("Alpha")),
        ]);
        assert_eq!(titles(&sorted), ["A", "B"]);
    }

    #[test]
    fn test_only_first_artist_counts() {
        let mut first = track("first", Some("Beta"));
        first.artists.push(Artist::named("Alpha"));
        let second = track("second", Some("Alpha"));

        let sorted = sort_by_primary_artist(vec![first, second]);
        assert_eq!(titles(&sorted), ["second", "first"]);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let sorted = sort_by_primary_artist(vec![
            track("3", Some("Same")),
            track("1", Some("Other")),
            track("2", Some("Same")),
            track("4", Some("Same")),
        ]);
        assert_eq!(titles(&sorted), ["1", "3", "2", "4"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = sort_by_primary_artist(vec![
            track("c", Some("charlie")),
            track("x", None),
            track("a", Some("Álvaro")),
            track("b", Some("bravo")),
            track("a2", Some("alvaro")),
        ]);
        let twice = sort_by_primary_artist(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_tracks_without_artist_stay_in_place() {
        let mut nameless = track("nameless", None);
        nameless.artists.push(Artist { name: None, id: None });

        let sorted = sort_by_primary_artist(vec![
            track("z", Some("Zeta")),
            track("none", None),
            nameless,
            track("a", Some("Alpha")),
        ]);
        assert_eq!(titles(&sorted), ["a", "none", "nameless", "z"]);
    }

    #[test]
    fn test_compare_names_ignores_case_at_first_level() {
        assert_eq!(compare_names("alpha", "Beta"), Ordering::Less);
        assert_eq!(compare_names("Zeta", "alpha"), Ordering::Greater);
    }

    #[test]
    fn test_compare_names_accents() {
        assert_eq!(compare_names("Émile", "Frank"), Ordering::Less);
        assert_eq!(compare_names("Eddie", "Émile"), Ordering::Less);
        assert_eq!(compare_names("emile", "émile"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_lowercase_first() {
        assert_eq!(compare_names("abba", "ABBA"), Ordering::Less);
        assert_eq!(compare_names("ABBA", "ABBA"), Ordering::Equal);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort_by_primary_artist(Vec::new()).is_empty());
    }
}
