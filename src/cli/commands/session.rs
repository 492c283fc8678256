//! Login, onboarding and profile commands

use std::io::{self, BufRead, Write};

use crate::cli::ProfileArgs;
use crate::config::{Config, StoreMode};
use crate::models::{ProfilePatch, Session, SetupForm};
use crate::services::{AuthError, View, hash_password};
use crate::state::AppState;

pub(crate) fn read_line(prompt: &str) -> anyhow::Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Config file created. Edit config.toml and run again.");
    } else {
        println!("config.toml already exists, leaving it untouched.");
    }
    Ok(())
}

pub async fn cmd_login(
    state: &AppState,
    username: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_line("Password: ")?,
    };

    let session = match state.gate.login(username, &password).await {
        Ok(session) => session,
        Err(AuthError::InvalidCredentials) => {
            anyhow::bail!("Invalid username or password");
        }
        Err(e) => return Err(e.into()),
    };

    println!("✓ Logged in as {}", session.user.username);

    if !state.gate.is_setup_complete().await? {
        println!();
        println!("Finish setup before managing hives:");
        println!("  hivekeep setup --business-name \"...\" --contact-info \"...\"");
    }
    Ok(())
}

pub async fn cmd_logout(state: &AppState) -> anyhow::Result<()> {
    state.gate.logout().await?;
    println!("✓ Logged out");
    Ok(())
}

pub async fn cmd_whoami(state: &AppState) -> anyhow::Result<()> {
    let Some(session) = state.gate.current_session().await? else {
        println!("Not logged in.");
        return Ok(());
    };
    let session = match state.gate.refresh(&session).await {
        Ok(session) => session,
        Err(AuthError::SessionExpired) => {
            anyhow::bail!("Session expired. Run `hivekeep login <username>` again")
        }
        Err(e) => return Err(e.into()),
    };

    print_profile(&session);
    println!(
        "Setup:         {}",
        if state.gate.is_setup_complete().await? {
            "complete"
        } else {
            "pending"
        }
    );
    Ok(())
}

pub async fn cmd_setup(
    state: &AppState,
    business_name: String,
    contact_info: String,
) -> anyhow::Result<()> {
    let session = state.require(View::Setup).await?;
    let form = SetupForm {
        business_name,
        contact_info,
    };

    let updated = state.gate.complete_setup(&session, form).await?;
    persist_account(state, &updated)?;

    println!("✓ Setup complete for {}", updated.user.username);
    Ok(())
}

pub async fn cmd_profile(state: &AppState, args: ProfileArgs) -> anyhow::Result<()> {
    let session = state.require(View::Protected).await?;
    let patch = profile_patch(&session, args);

    if patch == ProfilePatch::default() {
        print_profile(&session);
        return Ok(());
    }

    let updated = state.gate.update_profile(&session, patch).await?;
    persist_account(state, &updated)?;

    println!("✓ Profile updated");
    println!();
    print_profile(&updated);
    Ok(())
}

pub fn cmd_hash_password(config: &Config, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => p,
        None => read_line("Password: ")?,
    };
    if password.is_empty() {
        anyhow::bail!("Password cannot be empty");
    }

    let hash = hash_password(&password, &config.security)?;
    println!("{hash}");
    Ok(())
}

fn profile_patch(session: &Session, args: ProfileArgs) -> ProfilePatch {
    let touches_display = args.custom_message.is_some()
        || args.footer_text.is_some()
        || args.show_farm_info.is_some()
        || args.show_owner_contact.is_some()
        || args.show_beehive_history.is_some()
        || args.show_health_status.is_some();

    let qr_display = touches_display.then(|| {
        let mut display = session.user.qr_display.clone();
        if let Some(message) = args.custom_message {
            display.custom_message = Some(message).filter(|m| !m.is_empty());
        }
        if let Some(footer) = args.footer_text {
            display.footer_text = Some(footer).filter(|f| !f.is_empty());
        }
        if let Some(show) = args.show_farm_info {
            display.show_farm_info = show;
        }
        if let Some(show) = args.show_owner_contact {
            display.show_owner_contact = show;
        }
        if let Some(show) = args.show_beehive_history {
            display.show_beehive_history = show;
        }
        if let Some(show) = args.show_health_status {
            display.show_health_status = show;
        }
        display
    });

    ProfilePatch {
        email: args.email,
        business_name: args.business_name,
        contact_info: args.contact_info,
        qr_display,
    }
}

/// Local accounts keep their profile in config.toml so it outlives logout.
fn persist_account(state: &AppState, session: &Session) -> anyhow::Result<()> {
    if state.config.store.mode != StoreMode::Local {
        return Ok(());
    }

    let mut config = state.config.clone();
    config.account.email.clone_from(&session.user.email);
    config.account.business_name.clone_from(&session.user.business_name);
    config.account.contact_info.clone_from(&session.user.contact_info);
    config.save()
}

fn print_profile(session: &Session) {
    let user = &session.user;
    let display = &user.qr_display;
    let yes_no = |b: bool| if b { "Yes" } else { "No" };

    println!("User:          {} (ID: {})", user.username, user.id);
    println!("Email:         {}", user.email);
    println!(
        "Business:      {}",
        user.business_name.as_deref().unwrap_or("-")
    );
    println!(
        "Contact:       {}",
        user.contact_info.as_deref().unwrap_or("-")
    );
    println!("QR page:");
    println!("  Farm info:       {}", yes_no(display.show_farm_info));
    println!("  Owner contact:   {}", yes_no(display.show_owner_contact));
    println!("  Hive history:    {}", yes_no(display.show_beehive_history));
    println!("  Health status:   {}", yes_no(display.show_health_status));
    if let Some(message) = &display.custom_message {
        println!("  Message:         {message}");
    }
    if let Some(footer) = &display.footer_text {
        println!("  Footer:          {footer}");
    }
}
