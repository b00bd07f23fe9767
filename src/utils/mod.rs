// src/utils/mod.rs

//! Utility functions and helpers.

use sha2::{Digest, Sha256};

/// Collapse all whitespace runs into single spaces.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute the content fingerprint: sha256 of the whitespace-normalized
/// content, hex-encoded.
///
/// Whitespace normalization keeps cosmetic reformatting of the source page
/// from registering as a content change.
pub fn fingerprint(raw: &str) -> String {
    let normalized = normalize_whitespace(raw);
    let digest = Sha256::digest(normalized.as_bytes());
    hex::encode(digest)
}

/// Split a message into chunks no longer than `max_length` characters.
///
/// Splits on line boundaries where possible so formatting survives; a single
/// line longer than the limit is split on whitespace, and an unbreakable run
/// is hard-cut at the limit.
pub fn split_message(message: &str, max_length: usize) -> Vec<String> {
    if message.chars().count() <= max_length {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in message.split('\n') {
        let line_len = line.chars().count();
        if char_len(&current) + line_len + 1 > max_length && !current.is_empty() {
            chunks.push(current.trim_end().to_string());
            current.clear();
        }

        if line_len > max_length {
            for word in line.split(' ') {
                let word = hard_cut(word, max_length);
                if !current.is_empty()
                    && char_len(&current) + word.chars().count() + 1 > max_length
                {
                    chunks.push(current.trim_end().to_string());
                    current.clear();
                }
                current.push_str(&word);
                current.push(' ');
            }
            // Terminate the oversized line
            let trimmed = current.trim_end().to_string();
            current = trimmed;
            current.push('\n');
        } else {
            current.push_str(line);
            current.push('\n');
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Truncate a single word to `max_length` characters, marking the cut.
fn hard_cut(word: &str, max_length: usize) -> String {
    if word.chars().count() <= max_length {
        return word.to_string();
    }
    let kept: String = word.chars().take(max_length.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\tb   c "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }

    #[test]
    fn test_fingerprint_whitespace_insensitive() {
        assert_eq!(fingerprint("a  b\nc"), fingerprint("a b c"));
        assert_ne!(fingerprint("a b c"), fingerprint("a b d"));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("OB50 patch"), fingerprint("OB50 patch"));
    }

    #[test]
    fn test_split_short_message_is_single_chunk() {
        let chunks = split_message("hello", 4096);
        assert_eq!(chunks, vec!["hello".to_string()]);
    }

    #[test]
    fn test_split_respects_line_boundaries() {
        let message = "line one\nline two\nline three";
        let chunks = split_message(message, 12);
        assert!(chunks.iter().all(|c| c.chars().count() <= 12));
        assert!(chunks[0].contains("line one"));
    }

    #[test]
    fn test_split_handles_oversized_word() {
        let message = "x".repeat(40);
        let chunks = split_message(&message, 16);
        assert!(chunks.iter().all(|c| c.chars().count() <= 16));
        assert!(chunks[0].ends_with("..."));
    }
}
