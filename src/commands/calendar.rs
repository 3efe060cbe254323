use std::fmt::Display;

use andiamo_api::ApiClient;
use andiamo_core::Role;
use anyhow::Result;
use chrono::{Local, TimeZone};
use owo_colors::OwoColorize;

use crate::commands::feed::load_feed;
use crate::context::AppContext;
use crate::render::{render_date_group, render_month};

pub async fn run(ctx: &AppContext, all: bool) -> Result<()> {
    let Some(client) = ctx.gated_client(Role::User)? else {
        return Ok(());
    };

    match ctx.config.zone()? {
        Some(tz) => show(&client, tz, all).await,
        None => show(&client, Local, all).await,
    }
}

async fn show<Tz: TimeZone>(client: &ApiClient, zone: Tz, all: bool) -> Result<()>
where
    Tz::Offset: Display,
{
    let feed = load_feed(client, zone).await;
    let today = feed.today();

    println!("{}", "Upcoming".bold());

    let upcoming = feed.upcoming(today);
    if upcoming.is_empty() {
        println!("  {}", "No upcoming events".dimmed());
    }
    for group in upcoming {
        println!();
        for line in render_date_group(group, today, feed.zone()) {
            println!("{line}");
        }
    }

    if all && !feed.is_empty() {
        for month in feed.grouped().values() {
            println!("\n{}", render_month(month, today, feed.zone()));
        }
    }

    Ok(())
}
