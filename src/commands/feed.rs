use std::fmt::Display;

use andiamo_api::ApiClient;
use andiamo_core::feed::Feed;
use andiamo_core::Role;
use anyhow::Result;
use chrono::{Local, TimeZone};
use owo_colors::OwoColorize;

use crate::context::{parse_day, AppContext};
use crate::render::{format_date_label, render_event, render_week_strip};
use crate::utils::tui;

pub async fn run(ctx: &AppContext, date: Option<String>) -> Result<()> {
    let Some(client) = ctx.gated_client(Role::User)? else {
        return Ok(());
    };

    match ctx.config.zone()? {
        Some(tz) => show(&client, tz, date.as_deref()).await,
        None => show(&client, Local, date.as_deref()).await,
    }
}

async fn show<Tz: TimeZone>(client: &ApiClient, zone: Tz, date: Option<&str>) -> Result<()>
where
    Tz::Offset: Display,
{
    let mut feed = load_feed(client, zone).await;
    let today = feed.today();

    if let Some(value) = date {
        feed.select_date(parse_day(value, today)?);
    }

    println!("{}\n", "Actualités".bold());
    println!("{}\n", render_week_strip(&feed.week_strip(today), feed.selected()));

    let Some(selected) = feed.selected() else {
        println!("{}", "No events found".dimmed());
        return Ok(());
    };

    println!("{}", format_date_label(selected, today).bold());

    let visible = feed.visible_events();
    if visible.is_empty() {
        println!("  {}", "No events on this day".dimmed());
    }
    for event in visible {
        println!("{}", render_event(event, feed.zone()));
    }

    Ok(())
}

/// Fetch the event list once into a feed, telling the user when it failed.
pub async fn load_feed<Tz: TimeZone>(client: &ApiClient, zone: Tz) -> Feed<Tz> {
    let (feed, error) = tui::with_spinner("Loading events", client.load_feed(zone)).await;

    if let Some(e) = error {
        eprintln!("{}", format!("Could not load events: {e}").red());
    }
    feed
}
