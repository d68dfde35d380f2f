use anyhow::{Context, Result, bail};
use std::io::BufRead;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use admin::{AdminConfig, AppState, create_router};

const USAGE: &str = "usage: admin [serve | hash-password [PASSWORD]]";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None | Some("serve") => serve().await,
        Some("hash-password") => hash_password(args.next()),
        Some(other) => bail!("unknown command {}\n{}", other, USAGE),
    }
}

async fn serve() -> Result<()> {
    info!("Starting admin service");

    let config = AdminConfig::load()?;
    let state = AppState::from_config(&config)?;

    let app = create_router(state);

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    info!("Admin service listening on {}", config.server.bind);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Print the Argon2 hash to put in `auth.password_hash`
fn hash_password(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin()
                .lock()
                .read_line(&mut line)
                .context("Failed to read password from stdin")?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };

    if let Err(message) = auth::validation::validate_password(&password) {
        bail!(message);
    }

    let hash = auth::hash_password(&password)?;
    println!("{}", hash);

    Ok(())
}
