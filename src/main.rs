//! tally entry point.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tally::{
    load_payments, Bot, Config, ConfigError, MemoryStore, MongoStore, QueryEngine, TelegramApi,
};

/// tally: Telegram bot aggregating payment records stored in MongoDB.
#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Bot token provided by BotFather
    #[arg(short, long, global = true, env = "TELEGRAM_BOT_TOKEN")]
    token: Option<String>,

    /// MongoDB host
    #[arg(long, global = true)]
    host: Option<String>,

    /// MongoDB port
    #[arg(long, global = true)]
    port: Option<u16>,

    /// Name of the backend database
    #[arg(long, global = true)]
    db: Option<String>,

    /// Name of the payment collection
    #[arg(long, global = true)]
    collection: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the bot (default behavior)
    Serve,
    /// Run one command against the store and print the reply
    Ask {
        /// Command text, e.g. "/sum groceries 2024-01-01 2024-01-31"
        text: String,
        /// Dry run: answer from a JSON payment file instead of MongoDB
        #[arg(long, value_name = "FILE")]
        memory: Option<String>,
    },
    /// Populate the collection from a JSON payment file
    Seed {
        /// Path to a JSON array of payments
        file: String,
        /// Keep existing documents instead of dropping the collection first
        #[arg(long)]
        keep: bool,
    },
}

#[tokio::main]
async fn main() -> tally::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    match args.command {
        Some(Command::Ask { text, memory }) => {
            let reply = match memory {
                Some(file) => {
                    let store = MemoryStore::new(load_payments(&file)?);
                    QueryEngine::new(store).handle(&text).await
                }
                None => {
                    let store = MongoStore::connect(&config.mongo).await?;
                    QueryEngine::new(store).handle(&text).await
                }
            };
            println!("{reply}");
            Ok(())
        }
        Some(Command::Seed { file, keep }) => {
            let payments = load_payments(&file)?;
            let store = MongoStore::connect(&config.mongo).await?;
            let inserted = store.seed(&payments, keep).await?;
            tracing::info!(file, keep, inserted, "collection seeded");
            Ok(())
        }
        Some(Command::Serve) | None => serve(&args, config).await,
    }
}

async fn serve(args: &Args, config: Config) -> tally::Result<()> {
    let token = args
        .token
        .clone()
        .or_else(|| config.telegram.token.clone())
        .ok_or_else(|| ConfigError::MissingField("telegram.token".to_string()))?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        mongo = %config.mongo.uri(),
        "starting tally"
    );

    let store = MongoStore::connect(&config.mongo).await?;
    let engine = QueryEngine::new(store);
    let api = TelegramApi::new(&token, config.telegram.poll_timeout_secs)?;
    Bot::new(api, engine, config.telegram.poll_timeout_secs)
        .run()
        .await
}


fn load_config(args: &Args) -> tally::Result<Config> {
    let mut config = if let Some(path) = &args.config {
        Config::from_file(path)?
    } else {
        Config::load()?
    };

    if let Some(host) = &args.host {
        config.mongo.host = host.clone();
    }
    if let Some(port) = args.port {
        config.mongo.port = port;
    }
    if let Some(db) = &args.db {
        config.mongo.database = db.clone();
    }
    if let Some(collection) = &args.collection {
        config.mongo.collection = collection.clone();
    }
    Ok(config)
}
