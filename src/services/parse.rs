// src/services/parse.rs

//! Content parser.
//!
//! Turns raw source content into a [`Snapshot`]. The primary source is the
//! official site (HTML); the fallback API answers JSON. Parsing is defensive:
//! a missing field becomes an empty default, and only empty or unrecognizable
//! content fails the whole parse.

use chrono::{DateTime, Utc};
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use crate::error::ParseError;
use crate::models::{Character, Event, Snapshot};
use crate::services::fetch::RawContent;
use crate::utils::fingerprint;

/// Selectors for event titles on the official site, tried in order.
const EVENT_SELECTORS: &[&str] = &[
    r#"[class*="event"] h3"#,
    r#"[class*="event"] .title"#,
    r#"[class*="news"] h3"#,
    r#"[class*="banner"] h3"#,
];

/// Selectors for character cards on the official site, tried in order.
const CHARACTER_SELECTORS: &[&str] = &[
    r#"[class*="character"] h3"#,
    r#"[class*="character"] .name"#,
];

/// Parse raw content into a snapshot stamped with `fetched_at`.
pub fn parse_snapshot(
    raw: &RawContent,
    fetched_at: DateTime<Utc>,
) -> std::result::Result<Snapshot, ParseError> {
    let trimmed = raw.body.trim();
    if trimmed.is_empty() {
        return Err(ParseError::MalformedContent(format!(
            "empty response body from {}",
            raw.source
        )));
    }

    let source_fingerprint = fingerprint(&raw.body);

    let (version, events, characters) = if trimmed.starts_with('{') {
        parse_json(trimmed)?
    } else if trimmed.contains('<') {
        parse_html(&raw.body)
    } else {
        return Err(ParseError::MalformedContent(format!(
            "unrecognizable content from {}",
            raw.source
        )));
    };

    Ok(Snapshot {
        version,
        events,
        characters,
        fetched_at,
        source_fingerprint,
    })
}

/// Parse the fallback API payload.
///
/// Expected shape (all fields optional):
/// `{"version": "...", "events": [...], "characters": [...]}`.
fn parse_json(body: &str) -> std::result::Result<(String, Vec<Event>, Vec<Character>), ParseError> {
    let root: Value = serde_json::from_str(body)
        .map_err(|e| ParseError::MalformedContent(format!("invalid JSON: {e}")))?;
    let root = root
        .as_object()
        .ok_or_else(|| ParseError::MalformedContent("JSON root is not an object".to_string()))?;

    let version = root
        .get("version")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let events = root
        .get("events")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(json_event).collect())
        .unwrap_or_default();

    let characters = root
        .get("characters")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(json_character).collect())
        .unwrap_or_default();

    Ok((version, events, characters))
}

fn json_event(value: &Value) -> Option<Event> {
    let obj = value.as_object()?;
    let title = obj
        .get("title")
        .or_else(|| obj.get("name"))
        .and_then(Value::as_str)?
        .trim()
        .to_string();
    if title.is_empty() {
        return None;
    }

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Event::id_from_title(&title));

    Some(Event {
        id,
        title,
        starts_at: obj
            .get("start_date")
            .and_then(Value::as_str)
            .map(str::to_string),
        ends_at: obj
            .get("end_date")
            .and_then(Value::as_str)
            .map(str::to_string),
        description: obj
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn json_character(value: &Value) -> Option<Character> {
    let obj = value.as_object()?;
    let name = obj.get("name").and_then(Value::as_str)?.trim().to_string();
    if name.is_empty() {
        return None;
    }

    let ability_name = obj
        .get("ability_name")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let ability_description = obj
        .get("ability_description")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let ability_text = match (ability_name.is_empty(), ability_description.is_empty()) {
        (false, false) => format!("{ability_name}: {ability_description}"),
        (false, true) => ability_name.to_string(),
        _ => ability_description.to_string(),
    };

    Some(Character {
        id: obj
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| Event::id_from_title(&name)),
        name,
        ability_text,
        image_ref: obj
            .get("image")
            .and_then(Value::as_str)
            .map(str::to_string),
    })
}

/// Extract what the official page exposes.
///
/// The page layout shifts between campaigns, so every extraction here is
/// best-effort; anything not found is an empty default.
fn parse_html(body: &str) -> (String, Vec<Event>, Vec<Character>) {
    let document = Html::parse_document(body);

    let version = extract_version(body);
    let events = extract_html_events(&document);
    let characters = extract_html_characters(&document);

    (version, events, characters)
}

fn extract_version(body: &str) -> String {
    // Patch tags look like "OB50"
    static PATTERN: &str = r"\bOB\d{1,3}\b";
    Regex::new(PATTERN)
        .ok()
        .and_then(|re| re.find(body))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

fn extract_html_events(document: &Html) -> Vec<Event> {
    let date_range = Regex::new(r"(\d{2}/\d{2}/\d{4})\s*[-~]\s*(\d{2}/\d{2}/\d{4})").ok();

    let mut events = Vec::new();
    for selector_str in EVENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text: String = element.text().collect();
            let title = crate::utils::normalize_whitespace(&text);
            if title.is_empty() {
                continue;
            }
            let id = Event::id_from_title(&title);
            if events.iter().any(|e: &Event| e.id == id) {
                continue;
            }

            let (starts_at, ends_at) = date_range
                .as_ref()
                .and_then(|re| re.captures(&text))
                .map(|caps| (Some(caps[1].to_string()), Some(caps[2].to_string())))
                .unwrap_or((None, None));

            events.push(Event {
                id,
                title,
                starts_at,
                ends_at,
                description: String::new(),
            });
        }
        if !events.is_empty() {
            break;
        }
    }
    events
}

fn extract_html_characters(document: &Html) -> Vec<Character> {
    let mut characters = Vec::new();
    for selector_str in CHARACTER_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text: String = element.text().collect();
            let name = crate::utils::normalize_whitespace(&text);
            if name.is_empty() {
                continue;
            }
            let id = Event::id_from_title(&name);
            if characters.iter().any(|c: &Character| c.id == id) {
                continue;
            }
            characters.push(Character {
                id,
                name,
                ability_text: String::new(),
                image_ref: None,
            });
        }
        if !characters.is_empty() {
            break;
        }
    }
    characters
}
