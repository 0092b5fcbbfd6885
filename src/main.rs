use clap::Parser;
use eatsease_swipe::{cli, config, error, logging, session};
use eatsease_swipe::{HttpProfileService, ProfileService};
use cli::{Cli, Commands, ScriptStep};
use config::Config;
use error::{Result, SwipeError};
use std::sync::Arc;
use std::time::Duration;

fn connect(config: &Config) -> Result<(Arc<dyn ProfileService>, String)> {
    let credentials = config.credentials()?;
    let service = HttpProfileService::new(&config.base_url, credentials.token, config.timeout())?;
    Ok((Arc::new(service), credentials.username))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Swipe { offline } => {
            println!("🍜 eatsease - swipe\n");
            let settings = config.engine_settings()?;

            if offline {
                let service = session::demo_service(4, Duration::ZERO);
                session::run_interactive(service, "demo", settings).await?;
            } else {
                let (service, user) = connect(&config)?;
                let result = session::run_interactive(service.clone(), &user, settings).await;
                session::handle_expiry(service.as_ref(), result).await?;
            }
        }

        Commands::Simulate { script, page_size, latency_ms } => {
            println!("🍜 eatsease - simulation\n");
            let steps = ScriptStep::parse_script(&script).map_err(SwipeError::Config)?;
            session::run_simulation(&steps, page_size.max(1), Duration::from_millis(latency_ms)).await?;
        }

        Commands::Liked => {
            let (service, user) = connect(&config)?;
            let result = session::run_liked(service.clone(), &user, config.engine_settings()?).await;
            session::handle_expiry(service.as_ref(), result).await?;
        }

        Commands::Unlike { title } => {
            let (service, user) = connect(&config)?;
            let result =
                session::run_unlike(service.clone(), &user, config.engine_settings()?, &title).await;
            session::handle_expiry(service.as_ref(), result).await?;
        }

        Commands::Config { set_token, set_username, set_base_url, show } => {
            let mut config = config;
            let changed = set_token.is_some() || set_username.is_some() || set_base_url.is_some();

            if let Some(token) = set_token {
                config.token = Some(token);
                println!("✔ Token saved");
            }
            if let Some(username) = set_username {
                println!("✔ Username set to {}", username);
                config.username = Some(username);
            }
            if let Some(url) = set_base_url {
                // reject unusable URLs before they reach the config file
                HttpProfileService::new(&url, "", config.timeout())?;
                println!("✔ Base URL set to {}", url);
                config.base_url = url;
            }
            if changed {
                config.save()?;
            }

            if show || !changed {
                println!("Settings:");
                println!("  Base URL: {}", config.base_url);
                println!("  Username: {}", config.username.as_deref().unwrap_or("(not set)"));
                println!("  Token: {}", if config.token.is_some() { "set" } else { "not set" });
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Like cap: {}", config.like_cap);
                println!(
                    "  Swipe: commit at {:.0}% / hint at {:.0}% of {}px, exit {}ms",
                    config.gesture.commit_threshold * 100.0,
                    config.gesture.tentative_threshold * 100.0,
                    config.gesture.screen_width,
                    config.gesture.exit_duration_ms
                );
            }
        }
    }

    Ok(())
}
