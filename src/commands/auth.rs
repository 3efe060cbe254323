use andiamo_core::forms::{LoginForm, RegisterForm};
use andiamo_core::session::{clear_session, store_login, Profile, TOKEN_KEY};
use andiamo_core::Role;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::context::AppContext;
use crate::render::Render;
use crate::utils::prompt::{prompt_password, value_or_prompt};
use crate::utils::tui;

pub async fn login(ctx: &mut AppContext, email: Option<String>) -> Result<()> {
    let email = value_or_prompt(email, "Email")?;
    let password = prompt_password("Password")?;
    let form = LoginForm::new(&email, &password)?;

    let client = ctx.client()?;
    let response = tui::with_spinner("Signing in", client.login(&form))
        .await
        .context("Login failed")?;

    store_login(&mut ctx.store, &response)?;

    println!(
        "Logged in as {} ({})",
        response.user.email.bold(),
        response.user.role.render()
    );
    match response.user.role {
        Role::Admin => println!("Manage the catalogue with `andiamo admin`."),
        Role::User => println!("See what's on with `andiamo feed`."),
    }

    Ok(())
}

pub async fn register(ctx: &AppContext, name: Option<String>, email: Option<String>) -> Result<()> {
    let name = value_or_prompt(name, "Name")?;
    let email = value_or_prompt(email, "Email")?;
    let password = prompt_password("Password")?;
    let confirm = prompt_password("Confirm password")?;
    let form = RegisterForm::new(&name, &email, &password, &confirm)?;

    let client = ctx.client()?;
    tui::with_spinner("Creating account", client.register(&form))
        .await
        .context("Registration failed")?;

    println!("{}", "Your account has been created.".green());
    println!("Sign in with `andiamo login {}`.", form.email);

    Ok(())
}

pub fn logout(ctx: &mut AppContext) -> Result<()> {
    if ctx.store.get(TOKEN_KEY).is_none() {
        println!("{}", "Not logged in".dimmed());
        return Ok(());
    }

    clear_session(&mut ctx.store)?;
    println!("Logged out.");
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    let profile = Profile::from_store(&ctx.store);

    match (&profile.email, profile.role) {
        (Some(email), Some(role)) => {
            println!("{} {}", email.bold(), role.render());
            if let Some(id) = profile.user_id {
                println!("{}", format!("user #{id}").dimmed());
            }
        }
        _ => println!("{}", "Not logged in".dimmed()),
    }

    println!("{}", format!("session: {}", ctx.store.path().display()).dimmed());
    Ok(())
}
