use std::path::PathBuf;

use clap::{Parser, Subcommand};
use warden::guard::RoleRequirement;
use warden::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "login-probe", about = "Sign in, out, and test route gates against a Warden API")]
struct Cli {
    /// Overrides WARDEN_API_BASE_URL.
    #[arg(long)]
    base_url: Option<String>,

    /// Overrides WARDEN_STORAGE_DIR. Without either, nothing is remembered
    /// between runs.
    #[arg(long)]
    storage_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the restored session.
    Status,
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    /// Evaluate a route gate for the current session.
    Gate {
        /// `super_admin`, `organization_admin`, or empty.
        #[arg(long, default_value = "")]
        role: RoleRequirement,
        #[arg(long)]
        fallback: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), WardenError> {
    warden::telemetry::init()?;
    let cli = Cli::parse();

    let mut config = WardenConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.api_base_url = base_url;
    }
    if let Some(dir) = cli.storage_dir {
        config.storage_dir = Some(dir);
    }

    let client = WardenClient::from_config(config)?;
    if let Some(outcome) = client.start().await {
        tracing::info!(?outcome, "stored session checked");
    }

    match cli.command {
        Command::Status => print_status(&client)?,
        Command::Login { email, password } => {
            let user = client.login(&email, &password).await?;
            println!("signed in as {} ({})", user.email, user.id);
            println!("continue to {}", client.config().landing_path);
        }
        Command::Logout => {
            client.logout().await;
            println!("signed out");
        }
        Command::Gate { role, fallback } => {
            let mut gate = client.gate().require(role);
            gate.fallback_path = fallback;
            let mut guard = client.guard(gate, |path: &str| println!("redirect → {path}"));
            match guard.evaluate(&client.view()) {
                Decision::RenderChildren => println!("render"),
                Decision::RenderNothing => println!("render nothing"),
                Decision::Redirect(_) => {}
            }
        }
    }
    Ok(())
}

fn print_status(client: &WardenClient) -> Result<(), WardenError> {
    let view = client.view();
    match &view.user {
        Some(user) => {
            println!("signed in as {} ({})", user.email, user.id);
            for role in [Role::SuperAdmin, Role::OrganizationAdmin] {
                println!("  {role}: {}", has_role(role, user));
            }
        }
        None => println!("signed out"),
    }

    let stored = client.persisted()?;
    println!(
        "  stored record: {}",
        if stored.is_empty() { "none" } else { "present" }
    );
    Ok(())
}
