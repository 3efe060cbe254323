use std::fmt::Display;

use andiamo_api::ApiClient;
use anyhow::{Context, Result};
use chrono::{Local, TimeZone};
use owo_colors::OwoColorize;

use crate::context::AppContext;
use crate::render::{render_event_details, Render};
use crate::utils::tui;

pub async fn event(ctx: &AppContext, id: i64) -> Result<()> {
    let client = ctx.client_with_stored_token()?;

    match ctx.config.zone()? {
        Some(tz) => show_event(&client, tz, id).await,
        None => show_event(&client, Local, id).await,
    }
}

/// There is no single-event endpoint; the event is picked from the full list.
async fn show_event<Tz: TimeZone>(client: &ApiClient, zone: Tz, id: i64) -> Result<()>
where
    Tz::Offset: Display,
{
    let events = tui::with_spinner("Loading event", client.events_in(&zone))
        .await
        .context("Failed to load events")?;

    let event = events
        .iter()
        .find(|e| e.id == id)
        .with_context(|| format!("Event {id} not found"))?;

    println!("{}", render_event_details(event, &zone));
    Ok(())
}

pub async fn categories(ctx: &AppContext) -> Result<()> {
    let client = ctx.client_with_stored_token()?;
    let categories = tui::with_spinner("Loading categories", client.list_categories())
        .await
        .context("Failed to load categories")?;

    if categories.is_empty() {
        println!("{}", "No categories".dimmed());
    }
    for category in &categories {
        println!("{}", category.render());
    }

    Ok(())
}

pub async fn lieux(ctx: &AppContext, category_id: i64) -> Result<()> {
    let client = ctx.client_with_stored_token()?;
    let lieux = tui::with_spinner("Loading venues", client.lieux_by_category(category_id))
        .await
        .with_context(|| format!("Failed to load venues for category {category_id}"))?;

    if lieux.is_empty() {
        println!("{}", "No venues in this category".dimmed());
    }
    for lieu in &lieux {
        println!("{}", lieu.render());
    }

    Ok(())
}

pub async fn lieu(ctx: &AppContext, id: i64) -> Result<()> {
    let client = ctx.client_with_stored_token()?;
    let lieu = tui::with_spinner("Loading venue", client.get_lieu(id))
        .await
        .with_context(|| format!("Failed to load venue {id}"))?;

    println!("{}", lieu.nom.bold());
    if !lieu.adresse.is_empty() {
        println!("{}", lieu.adresse);
    }
    if let Some(category) = &lieu.category {
        println!("{}", format!("Category: {}", category.name).dimmed());
    }

    Ok(())
}
