use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use tasklane::auth::{issue_token, random_alphanumeric};
use tasklane::config::ServerConfig;
use tasklane::server::{AppState, create_router};
use tasklane::store::{SqliteStore, Store, transact};

const JWT_SECRET_LENGTH: usize = 64;

#[cfg(unix)]
fn set_restrictive_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!("Failed to set permissions on {}: {e}", path.display());
    }
}

fn write_secret_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content)?;

    #[cfg(unix)]
    set_restrictive_permissions(path);

    Ok(())
}

#[derive(Parser)]
#[command(name = "tasklane")]
#[command(about = "A self-hostable task server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Start the server
    Serve {
        /// TOML configuration file
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Host to bind to, overrides the configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to, overrides the configuration
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database and files, overrides the configuration
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AdminCommands {
    /// Initialize the server (create database, admin token and link share secret)
    Init {
        /// Data directory for the database and files
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Skip interactive prompts
        #[arg(long)]
        non_interactive: bool,
    },
}

fn run_init(data_dir: PathBuf, non_interactive: bool) -> anyhow::Result<()> {
    let config = ServerConfig {
        data_dir,
        ..Default::default()
    };
    fs::create_dir_all(&config.data_dir)?;

    let store = SqliteStore::new(config.db_path())?;
    store.initialize()?;

    let token_file = config.data_dir.join(".admin_token");

    if store.session()?.has_admin_token()? {
        bail!(
            "Server already initialized. Admin token exists at: {}",
            token_file.display()
        );
    }

    let (_, raw_token) = transact(&store, |s| issue_token(s, true, None, None))?;
    write_secret_file(&token_file, &raw_token)?;

    let secret_file = config.jwt_secret_path();
    if !secret_file.exists() {
        write_secret_file(&secret_file, &random_alphanumeric(JWT_SECRET_LENGTH))?;
    }

    println!();
    println!("========================================");
    println!("Admin token (save this, it won't be shown again):");
    println!();
    println!("  {raw_token}");
    println!();
    println!("Token also written to: {}", token_file.display());
    println!("========================================");
    println!();

    if !non_interactive {
        create_default_user_prompt(&store)?;
    }

    Ok(())
}

fn create_default_user_prompt(store: &SqliteStore) -> anyhow::Result<()> {
    let create_user = inquire::Confirm::new("Would you like to create a default user?")
        .with_default(false)
        .prompt()?;

    if !create_user {
        return Ok(());
    }

    let username = inquire::Text::new("Username:")
        .with_validator(|input: &str| {
            if input.trim().is_empty() {
                Err("Username cannot be empty".into())
            } else if input.contains(char::is_whitespace) {
                Err("Username cannot contain whitespace".into())
            } else {
                Ok(inquire::validator::Validation::Valid)
            }
        })
        .prompt()?;

    let email = inquire::Text::new("Email (optional):").prompt()?;

    let raw_token = transact(store, |s| {
        let user = s.create_user(username.trim(), email.trim())?;
        let (_, raw_token) = issue_token(s, false, Some(user.id), None)?;
        Ok(raw_token)
    })?;

    println!();
    println!("========================================");
    println!("Created user '{username}' with token:");
    println!();
    println!("  {raw_token}");
    println!();
    println!("========================================");
    println!();

    Ok(())
}

fn load_config(
    path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::load(&path)?,
        None => ServerConfig::default(),
    };
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("tasklane=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Admin { command } => match command {
            AdminCommands::Init {
                data_dir,
                non_interactive,
            } => {
                run_init(data_dir, non_interactive)?;
            }
        },
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
        } => {
            let config = load_config(config, host, port, data_dir)?;

            let store = SqliteStore::new(config.db_path())?;
            store.initialize()?;
            if !store.session()?.has_admin_token()? {
                bail!(
                    "Server not initialized. Run 'tasklane admin init' first to create the database and admin token."
                );
            }

            let jwt_secret = config.resolve_jwt_secret()?;
            let state = Arc::new(AppState::new(Arc::new(store), &config, jwt_secret));

            let app = create_router(state);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
