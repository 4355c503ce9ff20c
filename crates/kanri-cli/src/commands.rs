use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Subcommand;

use kanri_api::admin::{Admin, ProfileImage};
use kanri_core::pagination::{Pagination, PAGE_SIZES};
use kanri_core::theme::ThemeMode;
use kanri_runtime::appearance::watch_system_appearance;
use kanri_runtime::forms::{AdminForm, LoginForm, PasswordForm, ProfileForm};
use kanri_runtime::navigator::Rendered;
use kanri_runtime::Runtime;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the session token
    Logout,
    /// Show who the stored token belongs to
    Whoami,
    /// Inspect or change the color theme
    Theme {
        #[command(subcommand)]
        action: ThemeAction,
    },
    /// Manage admin accounts
    Admins {
        #[command(subcommand)]
        action: AdminsAction,
    },
    /// Update your own profile or password
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Resolve a dashboard path and show what would render
    Open { path: String },
}

#[derive(Debug, Subcommand)]
pub enum ThemeAction {
    Show,
    /// light, dark or system
    Set { mode: ThemeMode },
    Toggle,
    /// Follow OS color-scheme changes until interrupted
    Watch,
}

#[derive(Debug, Subcommand)]
pub enum AdminsAction {
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = 10)]
        size: u32,
    },
    Update {
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    Delete { id: String },
}

#[derive(Debug, Subcommand)]
pub enum SettingsAction {
    Profile {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Avatar image, at most 5MB
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Password {
        #[arg(long)]
        current: String,
        #[arg(long)]
        new: String,
        #[arg(long)]
        confirm: String,
    },
}

pub async fn run(rt: &Runtime, command: Command) -> Result<()> {
    match command {
        Command::Login { email, password } => {
            let rendered = rt.login(LoginForm { email, password }).await?;
            print_rendered(&rendered);
        }
        Command::Logout => {
            let rendered = rt.logout()?;
            print_rendered(&rendered);
        }
        Command::Whoami => whoami(rt),
        Command::Theme { action } => theme(rt, action).await?,
        Command::Admins { action } => admins(rt, action).await?,
        Command::Settings { action } => settings(rt, action).await?,
        Command::Open { path } => print_rendered(&rt.navigate(&path)),
    }
    Ok(())
}

/// Enter a protected page, or fail the way the guard would.
fn enter(rt: &Runtime, path: &str) -> Result<()> {
    if rt.navigate(path).redirected {
        bail!("not signed in, run `kanri login` first");
    }
    Ok(())
}

fn whoami(rt: &Runtime) {
    let session = rt.session();
    if !session.is_authenticated() {
        println!("Not signed in");
        return;
    }
    let Some(identity) = session.identity() else {
        println!("Signed in (token claims unreadable)");
        return;
    };

    println!("name:  {}", identity.name.as_deref().unwrap_or("-"));
    println!("email: {}", identity.email.as_deref().unwrap_or("-"));
    println!("id:    {}", identity.subject.as_deref().unwrap_or("-"));
    if identity.is_super_admin {
        println!("role:  Super Admin");
    } else if !identity.roles.is_empty() {
        println!("role:  {}", identity.roles.join(", "));
    }
    if let Some(exp) = identity.expires_at {
        let note = if identity.is_expired(Utc::now()) { " (expired)" } else { "" };
        println!("expires: {exp}{note}");
    }
}

async fn theme(rt: &Runtime, action: ThemeAction) -> Result<()> {
    let store = rt.theme();
    let state = match action {
        ThemeAction::Show => store.state(),
        ThemeAction::Set { mode } => store.set_theme(mode)?,
        ThemeAction::Toggle => store.toggle_theme()?,
        ThemeAction::Watch => {
            let period = Duration::from_secs(rt.config().appearance.poll_interval_secs);
            let watcher = Arc::new(rt.appearance_watcher());
            println!("Watching system appearance every {}s, Ctrl-C to stop", period.as_secs());
            tokio::select! {
                _ = watch_system_appearance(watcher, period, |state| {
                    println!("theme: {} (mode {})", state.current, state.mode);
                }) => {}
                signal = tokio::signal::ctrl_c() => {
                    signal.context("failed to listen for Ctrl-C")?;
                }
            }
            store.state()
        }
    };
    println!("theme: {} (mode {})", state.current, state.mode);
    Ok(())
}

async fn admins(rt: &Runtime, action: AdminsAction) -> Result<()> {
    enter(rt, "/dashboard/admins")?;
    let api = rt.admin();

    match action {
        AdminsAction::List { page, size } => {
            if !PAGE_SIZES.contains(&size) {
                bail!("page size must be one of {PAGE_SIZES:?}");
            }
            let result = api.list(page.max(1), size).await?;
            let pagination = Pagination::new(page, size, result.pagination.total_items);
            print!("{}", admin_table(&result.admins));
            println!("{}", pagination.summary());
        }
        AdminsAction::Update { id, name, email } => {
            let form = AdminForm { name, email };
            let errors = form.validate();
            if !errors.is_empty() {
                bail!("{errors}");
            }
            api.update(&id, &form.into_update()).await?;
        }
        AdminsAction::Delete { id } => {
            api.delete(&id).await?;
        }
    }
    Ok(())
}

async fn settings(rt: &Runtime, action: SettingsAction) -> Result<()> {
    enter(rt, "/dashboard/settings")?;
    let api = rt.admin();

    match action {
        SettingsAction::Profile { name, email, image } => {
            let image = image.as_deref().map(load_image).transpose()?;
            let form = ProfileForm { name, email, image };
            let errors = form.validate();
            if !errors.is_empty() {
                bail!("{errors}");
            }
            api.update_profile(form.into_update()).await?;
        }
        SettingsAction::Password {
            current,
            new,
            confirm,
        } => {
            let form = PasswordForm {
                current_password: current,
                new_password: new,
                confirm_password: confirm,
            };
            let errors = form.validate();
            if !errors.is_empty() {
                bail!("{errors}");
            }
            api.change_password(&form.into_change()).await?;
        }
    }
    Ok(())
}

fn print_rendered(rendered: &Rendered) {
    let note = if rendered.redirected { " (redirected)" } else { "" };
    println!(
        "{} [{} layout] at {}{note}",
        rendered.page.title(),
        rendered.layout.as_str(),
        rendered.path
    );
}

fn admin_table(admins: &[Admin]) -> String {
    if admins.is_empty() {
        return "No admins found\n".to_string();
    }
    let mut out = format!("   {:<24} {:<32} {:<12} {}\n", "NAME", "EMAIL", "ROLE", "ID");
    for admin in admins {
        out.push_str(&format!(
            "{}  {:<24} {:<32} {:<12} {}\n",
            admin.initial(),
            admin.name,
            admin.email,
            admin.role_label(),
            admin.id
        ));
    }
    out
}

fn load_image(path: &Path) -> Result<ProfileImage> {
    let bytes = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("profile")
        .to_string();
    Ok(ProfileImage {
        file_name,
        bytes,
        mime: image_mime(path).map(str::to_string),
    })
}

fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
