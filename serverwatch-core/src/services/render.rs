//! Turns a [`StatusReport`] into the payload shown in the channel.
//!
//! Pure apart from [`render`], which stamps the current UTC time.

use chrono::{DateTime, Utc};

use serverwatch_common::models::{
    ColorTag, DiscordColor, DiscordEmbed, DiscordEmbedFooter, DisplayPayload, StatusRecord,
    StatusReport,
};

pub const NOT_FOUND_TITLE: &str = "⚠️ Server Not Found";
pub const FETCH_ERROR_TITLE: &str = "❌ API Error";

pub fn render(report: &StatusReport) -> DisplayPayload {
    render_at(report, Utc::now())
}

pub fn render_at(report: &StatusReport, now: DateTime<Utc>) -> DisplayPayload {
    match report {
        StatusReport::Online(record) => render_record(record, now),
        StatusReport::NotFound => DisplayPayload {
            color_tag: ColorTag::Warn,
            short_text: "⚠️ Server status unavailable.".to_string(),
            embed: DiscordEmbed {
                title: Some(NOT_FOUND_TITLE.to_string()),
                description: Some("The API returned no server results.".to_string()),
                color: Some(DiscordColor::ORANGE),
                timestamp: Some(now),
                ..DiscordEmbed::default()
            },
        },
        StatusReport::FetchError(diagnostic) => DisplayPayload {
            color_tag: ColorTag::Error,
            short_text: "❌ Status update failed.".to_string(),
            embed: DiscordEmbed {
                title: Some(FETCH_ERROR_TITLE.to_string()),
                description: Some(format!(
                    "Failed to retrieve server data. Details: {diagnostic}"
                )),
                color: Some(DiscordColor::RED),
                timestamp: Some(now),
                ..DiscordEmbed::default()
            },
        },
    }
}

fn render_record(record: &StatusRecord, now: DateTime<Utc>) -> DisplayPayload {
    let online = record.players > 0;
    let (color_tag, color, status) = if online {
        (ColorTag::Ok, DiscordColor::GREEN, "Online")
    } else {
        (ColorTag::Warn, DiscordColor::LIGHT_GREY, "Offline")
    };

    let embed = DiscordEmbed {
        title: Some(format!("🎮 {}", record.name)),
        description: Some(format!("**Status:** {status}")),
        color: Some(color),
        footer: Some(DiscordEmbedFooter {
            text: format!("Last Updated: {} UTC", now.format("%H:%M:%S")),
        }),
        timestamp: Some(now),
        ..DiscordEmbed::default()
    }
    .inline_field("Players", format!("{} / {}", record.players, record.max_players))
    .inline_field("Address", record.address.clone())
    .inline_field("Secure", if record.secure { "✅ Yes" } else { "❌ No" });

    DisplayPayload {
        color_tag,
        short_text: format!("Current Player Count: **{}**", record.players),
        embed,
    }
}
