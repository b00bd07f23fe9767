// src/bot/commands.rs

//! Command text builders.
//!
//! Formats the current [`Snapshot`] into user-facing messages. The messaging
//! platform transport lives outside this crate; collaborators call
//! [`respond`] and send the returned chunks with HTML markup enabled.

use crate::models::{BotConfig, Snapshot};
use crate::services::DataService;
use crate::utils::split_message;

/// A user command the bot answers with snapshot data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Updates,
    Events,
    Characters,
    Version,
}

impl Command {
    /// Parse a command token (leading slash optional, aliases included).
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().trim_start_matches('/').to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "updates" => Some(Self::Updates),
            "events" => Some(Self::Events),
            "characters" | "abilities" => Some(Self::Characters),
            "version" => Some(Self::Version),
            _ => None,
        }
    }
}

/// Answer a command, reading through the data service.
///
/// Returns message chunks no longer than the configured limit. Fetch and
/// parse failures never reach the user: with a populated cache the previous
/// snapshot is shown, and only a true cold-start failure produces the
/// "temporarily unavailable" text.
pub async fn respond(
    service: &DataService,
    config: &BotConfig,
    command: Command,
    user_name: &str,
) -> Vec<String> {
    let text = match command {
        Command::Start => start_message(&config.name, user_name),
        Command::Help => help_message(&config.name),
        data_command => match service.latest().await {
            Ok(snapshot) => match data_command {
                Command::Updates => format_updates(&snapshot),
                Command::Events => format_events(&snapshot),
                Command::Characters => format_characters(&snapshot),
                Command::Version => format_version(&snapshot),
                Command::Start | Command::Help => unreachable!(),
            },
            Err(error) => {
                log::warn!("command {:?} served unavailable message: {}", command, error);
                unavailable_message()
            }
        },
    };

    split_message(&text, config.max_message_length)
}

/// Welcome message for `/start`.
pub fn start_message(bot_name: &str, user_name: &str) -> String {
    format!(
        "🔥 <b>Welcome to {bot_name}, {user_name}!</b>\n\n\
         🎮 Get the latest Free Fire updates, events, and character info!\n\n\
         <b>Available Commands:</b>\n\
         • /updates - Latest game updates and version info\n\
         • /events - Current and upcoming events\n\
         • /characters - Character information and abilities\n\
         • /version - Current game version\n\
         • /help - Show this help message"
    )
}

/// Help message for `/help`.
pub fn help_message(bot_name: &str) -> String {
    format!(
        "🔥 <b>{bot_name} - Help</b>\n\n\
         <b>/start</b> - Welcome message and quick start\n\
         <b>/updates</b> - Latest updates and version info\n\
         <b>/events</b> - Current and upcoming events\n\
         <b>/characters</b> - Character information and abilities\n\
         <b>/version</b> - Current game version\n\
         <b>/help</b> - Show this help message\n\n\
         <b>Aliases:</b> /abilities - same as /characters"
    )
}

/// Fallback text when no data has ever been fetched.
pub fn unavailable_message() -> String {
    "⚠️ Free Fire data is temporarily unavailable. Please try again later!".to_string()
}

/// Message body for `/updates`.
pub fn format_updates(snapshot: &Snapshot) -> String {
    let mut text = String::from("🔥 <b>Latest Free Fire Updates</b>\n\n");

    if !snapshot.version.is_empty() {
        text.push_str(&format!("📦 <b>Current Version:</b> {}\n\n", snapshot.version));
    }

    if snapshot.events.is_empty() {
        text.push_str("No update news right now - check back soon!");
    } else {
        for event in &snapshot.events {
            text.push_str(&format!("• <b>{}</b>\n", event.title));
            if let Some(window) = event_window(event) {
                text.push_str(&format!("  🗓 {window}\n"));
            }
            if !event.description.is_empty() {
                text.push_str(&format!("  {}\n", event.description));
            }
        }
    }

    text.push_str(&format!("\n<i>Fetched {}</i>", snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")));
    text
}

/// Message body for `/events`.
pub fn format_events(snapshot: &Snapshot) -> String {
    let mut text = String::from("🎉 <b>Current Free Fire Events</b>\n\n");

    if snapshot.events.is_empty() {
        text.push_str("No active events right now - check back soon!");
        return text;
    }

    for (index, event) in snapshot.events.iter().enumerate() {
        text.push_str(&format!("{}. <b>{}</b>\n", index + 1, event.title));
        if let Some(window) = event_window(event) {
            text.push_str(&format!("   🗓 {window}\n"));
        }
        if !event.description.is_empty() {
            text.push_str(&format!("   {}\n", event.description));
        }
        text.push('\n');
    }
    text.trim_end().to_string()
}

/// Message body for `/characters`.
pub fn format_characters(snapshot: &Snapshot) -> String {
    let mut text = String::from("🧙 <b>Free Fire Characters</b>\n\n");

    if snapshot.characters.is_empty() {
        text.push_str("No character data available right now.");
        return text;
    }

    for character in &snapshot.characters {
        text.push_str(&format!("• <b>{}</b>", character.name));
        if !character.ability_text.is_empty() {
            text.push_str(&format!(" - {}", character.ability_text));
        }
        text.push('\n');
    }
    text.trim_end().to_string()
}

/// Message body for `/version`.
pub fn format_version(snapshot: &Snapshot) -> String {
    let version = if snapshot.version.is_empty() {
        "unknown"
    } else {
        &snapshot.version
    };
    format!(
        "📦 <b>Free Fire Version:</b> {}\n<i>Checked {}</i>",
        version,
        snapshot.fetched_at.format("%Y-%m-%d %H:%M UTC")
    )
}

fn event_window(event: &crate::models::Event) -> Option<String> {
    match (&event.starts_at, &event.ends_at) {
        (Some(start), Some(end)) => Some(format!("{start} - {end}")),
        (Some(start), None) => Some(format!("from {start}")),
        (None, Some(end)) => Some(format!("until {end}")),
        (None, None) => None,
    }
}
