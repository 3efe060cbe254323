mod commands;
mod context;
mod render;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::admin::AdminCommand;
use context::AppContext;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "andiamo")]
#[command(about = "Browse events and venues, and manage the andiamo catalogue")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and remember the session
    Login {
        email: Option<String>,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in account
    Whoami,
    /// Events of one day, with a two-week day picker
    Feed {
        /// Day to show (YYYY-MM-DD, "today" or "tomorrow"); defaults to the first event's day
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Upcoming event days
    Calendar {
        /// Also list every month with events
        #[arg(short, long)]
        all: bool,
    },
    /// Show one event in full
    Event {
        id: i64,
    },
    /// List categories
    Categories,
    /// List venues of a category
    Lieux {
        category_id: i64,
    },
    /// Show one venue
    Lieu {
        id: i64,
    },
    /// Administration (ADMIN accounts only)
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut ctx = AppContext::load()?;

    match cli.command {
        Commands::Login { email } => commands::auth::login(&mut ctx, email).await,
        Commands::Register { name, email } => commands::auth::register(&ctx, name, email).await,
        Commands::Logout => commands::auth::logout(&mut ctx),
        Commands::Whoami => commands::auth::whoami(&ctx),
        Commands::Feed { date } => commands::feed::run(&ctx, date).await,
        Commands::Calendar { all } => commands::calendar::run(&ctx, all).await,
        Commands::Event { id } => commands::browse::event(&ctx, id).await,
        Commands::Categories => commands::browse::categories(&ctx).await,
        Commands::Lieux { category_id } => commands::browse::lieux(&ctx, category_id).await,
        Commands::Lieu { id } => commands::browse::lieu(&ctx, id).await,
        Commands::Admin { command } => commands::admin::run(&ctx, command).await,
    }
}
