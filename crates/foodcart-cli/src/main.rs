mod orders;
mod places;

use clap::{CommandFactory, Parser, Subcommand};
use foodcart_core::AppConfig;
use foodcart_geocoder::GeocoderClient;
use tracing_subscriber::EnvFilter;

use crate::orders::OrdersCommands;
use crate::places::PlacesCommands;

#[derive(Debug, Parser)]
#[command(name = "foodcart")]
#[command(about = "Match delivery orders to restaurants that can fulfil them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Inspect and fill the geocode cache
    Places {
        #[command(subcommand)]
        command: PlacesCommands,
    },
    /// Match orders against restaurant menus
    Orders {
        #[command(subcommand)]
        command: OrdersCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the database is reachable
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = foodcart_core::load_app_config()?;
    init_tracing(&config)?;

    match cli.command {
        Some(Commands::Db { command }) => {
            let pool = foodcart_db::connect_pool_from_config(&config).await?;
            match command {
                DbCommands::Ping => {
                    foodcart_db::ping(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = foodcart_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        Some(Commands::Places { command }) => places::run_places(&config, command).await?,
        Some(Commands::Orders { command }) => orders::run_orders(&config, command).await?,
        None => Cli::command().print_help()?,
    }

    Ok(())
}

/// `RUST_LOG` wins when set; otherwise `FOODCART_LOG_LEVEL` is used. Logs go
/// to stderr so `--json` output on stdout stays machine-readable.
fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

/// Build the provider client from config.
///
/// # Errors
///
/// Returns an error if `YANDEX_GEOCODER_API_KEY` is unset or the client
/// cannot be constructed.
pub(crate) fn geocoder_client(config: &AppConfig) -> anyhow::Result<GeocoderClient> {
    let Some(api_key) = config.geocoder_api_key.as_deref() else {
        anyhow::bail!("YANDEX_GEOCODER_API_KEY is not set; it is required to geocode addresses");
    };
    Ok(GeocoderClient::with_base_url(
        api_key,
        config.geocoder_timeout_secs,
        &config.geocoder_user_agent,
        &config.geocoder_base_url,
    )?)
}
