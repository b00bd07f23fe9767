//! Snapshot data structures.
//!
//! A [`Snapshot`] is an immutable view of the upstream source at one point in
//! time. It is built once by the parser and replaced atomically in the cache;
//! it is never mutated in place.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A structured view of the upstream source content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Snapshot {
    /// Game version tag (e.g. "OB50"), empty when the source omits it
    pub version: String,

    /// Current and upcoming events, in source order
    pub events: Vec<Event>,

    /// Playable characters, in source order
    pub characters: Vec<Character>,

    /// When this snapshot was fetched
    pub fetched_at: DateTime<Utc>,

    /// Hash of the normalized raw content this snapshot was parsed from
    pub source_fingerprint: String,
}

/// An in-game event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Event {
    /// Source-provided id, or derived from the title when absent
    pub id: String,

    /// Event title
    pub title: String,

    /// Event start, when the source provides one
    #[serde(default)]
    pub starts_at: Option<String>,

    /// Event end, when the source provides one
    #[serde(default)]
    pub ends_at: Option<String>,

    /// Event description
    #[serde(default)]
    pub description: String,
}

impl Event {
    /// Derive a stable id from a title for sources that provide none.
    ///
    /// Lowercases and collapses non-alphanumeric runs into single dashes.
    pub fn id_from_title(title: &str) -> String {
        let mut id = String::with_capacity(title.len());
        let mut last_dash = true;
        for c in title.chars() {
            if c.is_alphanumeric() {
                id.extend(c.to_lowercase());
                last_dash = false;
            } else if !last_dash {
                id.push('-');
                last_dash = true;
            }
        }
        while id.ends_with('-') {
            id.pop();
        }
        id
    }
}

/// A playable character and its ability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Character {
    /// Source-provided id, or derived from the name when absent
    pub id: String,

    /// Character name
    pub name: String,

    /// Ability name and description as one displayable string
    pub ability_text: String,

    /// Reference to a character image, when the source provides one
    #[serde(default)]
    pub image_ref: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_title() {
        assert_eq!(
            Event::id_from_title("Free Fire x NARUTO SHIPPUDEN Chapter 2"),
            "free-fire-x-naruto-shippuden-chapter-2"
        );
        assert_eq!(Event::id_from_title("  OB50!! Update  "), "ob50-update");
        assert_eq!(Event::id_from_title(""), "");
    }
}
