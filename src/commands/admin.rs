use std::fmt::Display;

use andiamo_api::ApiClient;
use andiamo_core::forms::{CategoryDraft, EventDraft, LieuDraft};
use andiamo_core::user::UserStats;
use andiamo_core::{EventRecord, Role, User};
use anyhow::{Context, Result};
use chrono::{Local, TimeZone, Utc};
use clap::Subcommand;
use dialoguer::Select;
use owo_colors::OwoColorize;

use crate::context::AppContext;
use crate::render::{render_event_with_date, Render};
use crate::utils::prompt::{confirm, value_or_prompt};
use crate::utils::tui;

#[derive(Subcommand)]
pub enum AdminCommand {
    /// Show event and user counts
    Stats,
    /// List all events
    Events {
        /// Print the events as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create an event
    AddEvent {
        /// Event name
        name: Option<String>,

        /// Date/time (e.g. "2025-03-20T20:00")
        #[arg(short, long)]
        date: Option<String>,

        /// Venue id
        #[arg(short, long)]
        lieu: Option<i64>,

        #[arg(long, default_value = "")]
        description: String,

        /// Image URL or base64 payload
        #[arg(long, default_value = "")]
        image: String,
    },
    /// Edit an event; unspecified fields keep their value
    EditEvent {
        id: i64,

        #[arg(long)]
        name: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        lieu: Option<i64>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },
    /// Delete an event
    DeleteEvent {
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// List all users
    Users,
    /// Switch a user between USER and ADMIN
    ToggleRole {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a user
    DeleteUser {
        id: i64,

        #[arg(short, long)]
        yes: bool,
    },
    /// Create a category
    AddCategory {
        name: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },
    /// Create a venue
    AddLieu {
        nom: Option<String>,

        #[arg(short, long)]
        adresse: Option<String>,

        /// Category id (asked interactively when omitted)
        #[arg(short, long)]
        category: Option<i64>,

        #[arg(long)]
        image: Option<String>,
    },
}

pub async fn run(ctx: &AppContext, command: AdminCommand) -> Result<()> {
    let Some(client) = ctx.gated_client(Role::Admin)? else {
        return Ok(());
    };

    match command {
        AdminCommand::Stats => stats(&client).await,
        AdminCommand::Events { json } => match ctx.config.zone()? {
            Some(tz) => list_events(&client, tz, json).await,
            None => list_events(&client, Local, json).await,
        },
        AdminCommand::AddEvent {
            name,
            date,
            lieu,
            description,
            image,
        } => {
            let name = value_or_prompt(name, "Event name")?;
            let date = value_or_prompt(date, "Date (YYYY-MM-DDTHH:MM)")?;
            let date = ctx.parse_datetime(&date)?;
            let draft = EventDraft::create(&name, &description, &image, date, lieu, Utc::now())?;

            tui::with_spinner("Creating event", client.create_event(&draft))
                .await
                .context("Failed to create event")?;
            println!("{} {}", "Created".green(), draft.name);
            Ok(())
        }
        AdminCommand::EditEvent {
            id,
            name,
            date,
            lieu,
            description,
            image,
        } => {
            let existing = find_event(&client, id).await?;
            let date = match date {
                Some(value) => ctx.parse_datetime(&value)?,
                None => ctx.parse_datetime(existing.date.as_deref().unwrap_or_default())?,
            };
            let draft = EventDraft::update(
                name.as_deref().unwrap_or(&existing.name),
                description
                    .as_deref()
                    .unwrap_or(existing.description.as_deref().unwrap_or_default()),
                image.as_deref().unwrap_or(existing.image.as_deref().unwrap_or_default()),
                date,
                lieu.or(existing.lieu.as_ref().map(|l| l.id)),
                Utc::now(),
            )?;

            tui::with_spinner("Updating event", client.update_event(id, &draft))
                .await
                .context("Failed to update event")?;
            println!("{} {}", "Updated".yellow(), draft.name);
            Ok(())
        }
        AdminCommand::DeleteEvent { id, yes } => {
            let existing = find_event(&client, id).await?;
            if !confirm(format!("Delete event \"{}\"?", existing.name), yes)? {
                return Ok(());
            }

            tui::with_spinner("Deleting event", client.delete_event(id))
                .await
                .context("Failed to delete event")?;
            println!("{} {}", "Deleted".red(), existing.name);
            Ok(())
        }
        AdminCommand::Users => list_users(&client).await,
        AdminCommand::ToggleRole { id, yes } => {
            let user = find_user(&client, id).await?;
            let new_role = user.role.toggled();
            let prompt = format!(
                "Change {}'s role from {} to {}?",
                user.display_name(),
                user.role,
                new_role
            );
            if !confirm(prompt, yes)? {
                return Ok(());
            }

            tui::with_spinner("Updating role", client.update_user_role(id, new_role))
                .await
                .context("Failed to update user role")?;
            println!("{} is now {}", user.display_name().bold(), new_role.render());
            Ok(())
        }
        AdminCommand::DeleteUser { id, yes } => {
            let user = find_user(&client, id).await?;
            let prompt = format!(
                "Delete {}? This action cannot be undone.",
                user.display_name()
            );
            if !confirm(prompt, yes)? {
                return Ok(());
            }

            tui::with_spinner("Deleting user", client.delete_user(id))
                .await
                .context("Failed to delete user")?;
            println!("{} {}", "Deleted".red(), user.display_name());
            Ok(())
        }
        AdminCommand::AddCategory { name, image } => {
            let name = value_or_prompt(name, "Category name")?;
            let draft = CategoryDraft::new(&name, image)?;

            tui::with_spinner("Creating category", client.create_category(&draft))
                .await
                .context("Failed to create category")?;
            println!("{} {}", "Created".green(), draft.name);
            Ok(())
        }
        AdminCommand::AddLieu {
            nom,
            adresse,
            category,
            image,
        } => {
            let nom = value_or_prompt(nom, "Venue name")?;
            let adresse = value_or_prompt(adresse, "Address")?;
            let category = match category {
                Some(id) => Some(id),
                None => pick_category(&client).await?,
            };
            let draft = LieuDraft::new(&nom, &adresse, image, category)?;

            tui::with_spinner("Creating venue", client.create_lieu(&draft))
                .await
                .context("Failed to create venue")?;
            println!("{} {}", "Created".green(), draft.nom);
            Ok(())
        }
    }
}

async fn stats(client: &ApiClient) -> Result<()> {
    let event_count = tui::with_spinner("Counting events", client.event_count())
        .await
        .context("Failed to fetch event count")?;
    let users = tui::with_spinner("Loading users", client.list_users())
        .await
        .context("Failed to load users")?;

    println!("{} events", event_count.bold());
    println!("{}", UserStats::from_users(&users).render());
    Ok(())
}

async fn list_events<Tz: TimeZone>(client: &ApiClient, zone: Tz, json: bool) -> Result<()>
where
    Tz::Offset: Display,
{
    let events = tui::with_spinner("Loading events", client.events_in(&zone))
        .await
        .context("Failed to load events")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events".dimmed());
    }
    for event in &events {
        println!("{}", render_event_with_date(event, &zone));
    }
    Ok(())
}

async fn list_users(client: &ApiClient) -> Result<()> {
    let users = tui::with_spinner("Loading users", client.list_users())
        .await
        .context("Failed to load users")?;

    println!("{}\n", UserStats::from_users(&users).render());
    for user in &users {
        println!("{}", user.render());
    }
    Ok(())
}

/// There is no single-event endpoint; look the id up in the full list.
async fn find_event(client: &ApiClient, id: i64) -> Result<EventRecord> {
    let events = tui::with_spinner("Loading events", client.list_events())
        .await
        .context("Failed to load events")?;

    events
        .into_iter()
        .find(|e| e.id == id)
        .with_context(|| format!("Event {id} not found"))
}

async fn find_user(client: &ApiClient, id: i64) -> Result<User> {
    let users = tui::with_spinner("Loading users", client.list_users())
        .await
        .context("Failed to load users")?;

    users
        .into_iter()
        .find(|u| u.id == id)
        .with_context(|| format!("User {id} not found"))
}

async fn pick_category(client: &ApiClient) -> Result<Option<i64>> {
    let categories = tui::with_spinner("Loading categories", client.list_categories())
        .await
        .context("Failed to load categories")?;

    if categories.is_empty() {
        return Ok(None);
    }

    let names: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
    let index = Select::new()
        .with_prompt("Category")
        .items(&names)
        .default(0)
        .interact()
        .context("Failed to read selection")?;

    Ok(categories.get(index).map(|c| c.id))
}
