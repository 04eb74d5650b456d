use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use vitrin_application::{Collaborators, Orchestrator};
use vitrin_core::messaging::MessagingTransport;
use vitrin_infrastructure::{
    HttpContentGenerator, HttpImageFetcher, HttpIntentResolver, MemorySessionStore,
    RestCommerceClient, TelegramTransport, TomlSettingsRepository,
};

mod telegram;

#[derive(Parser)]
#[command(name = "vitrin")]
#[command(about = "Vitrin - conversational catalog authoring over Telegram", long_about = None)]
struct Cli {
    /// Path to the settings file (defaults to the per-user config dir)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log at info instead of warn
    #[arg(short, long)]
    verbose: bool,

    /// Log at debug, suppressing HTTP client noise
    #[arg(long)]
    debug: bool,
}

/// Credentials and endpoints, all taken from the environment so the
/// settings file never carries secrets.
struct Env {
    bot_token: String,
    commerce_url: String,
    commerce_key: String,
    commerce_secret: String,
    generator_url: String,
    generator_key: String,
    intent_url: String,
    intent_key: String,
}

impl Env {
    fn load() -> Result<Self> {
        Ok(Self {
            bot_token: required("VITRIN_TELEGRAM_TOKEN")?,
            commerce_url: required("VITRIN_COMMERCE_URL")?,
            commerce_key: required("VITRIN_COMMERCE_KEY")?,
            commerce_secret: required("VITRIN_COMMERCE_SECRET")?,
            generator_url: required("VITRIN_GENERATOR_URL")?,
            generator_key: required("VITRIN_GENERATOR_KEY")?,
            intent_url: required("VITRIN_INTENT_URL")?,
            intent_key: required("VITRIN_INTENT_KEY")?,
        })
    }
}

fn required(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("{name} is not set"))
}

fn init_tracing(cli: &Cli) {
    // --debug > --verbose > RUST_LOG env > default "warn". HTTP internals
    // are held at warn on the debug level so the dialogue stays readable.
    let filter = if cli.debug {
        EnvFilter::new("debug,hyper=warn,h2=warn,reqwest=warn,rustls=warn")
    } else if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    let env = Env::load()?;

    let settings_path = match cli.settings {
        Some(path) => path,
        None => TomlSettingsRepository::default_path()
            .context("could not resolve the default settings path")?,
    };
    tracing::info!(path = %settings_path.display(), "using settings file");

    let transport = Arc::new(TelegramTransport::new(&env.bot_token));
    let collaborators = Collaborators {
        commerce: Arc::new(RestCommerceClient::new(
            env.commerce_url,
            env.commerce_key,
            env.commerce_secret,
        )),
        generator: Arc::new(HttpContentGenerator::new(
            env.generator_url,
            env.generator_key,
        )),
        messaging: transport.clone(),
        settings: Arc::new(TomlSettingsRepository::new(settings_path)),
        fetcher: Arc::new(HttpImageFetcher::new()),
    };
    let orchestrator = Orchestrator::new(
        Arc::new(MemorySessionStore::default()),
        Arc::new(HttpIntentResolver::new(env.intent_url, env.intent_key)),
        collaborators,
    );

    tracing::info!("polling for updates");
    run(orchestrator, transport, telegram::Poller::new(&env.bot_token)).await
}

async fn run(
    orchestrator: Orchestrator,
    transport: Arc<TelegramTransport>,
    mut poller: telegram::Poller,
) -> Result<()> {
    loop {
        let updates = match poller.poll().await {
            Ok(updates) => updates,
            Err(err) => {
                tracing::warn!(error = %err, "polling failed, backing off");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            let Some(message) = update.message else {
                continue;
            };
            let chat_id = message.chat.id.to_string();

            let images = match poller.download_photo(&message.photo).await {
                Ok(image) => image.into_iter().collect(),
                Err(err) => {
                    tracing::warn!(error = %err, "photo download failed");
                    send(&transport, &chat_id, "I couldn't download that photo, please resend it.")
                        .await;
                    continue;
                }
            };

            let text = message.text.or(message.caption);
            let input = match telegram::parse_turn(text, images) {
                Ok(input) => input,
                Err(usage) => {
                    send(&transport, &chat_id, &usage).await;
                    continue;
                }
            };

            match orchestrator.handle_turn(&chat_id, input).await {
                Ok(reply) => send(&transport, &chat_id, &reply.text).await,
                Err(err) => {
                    tracing::error!(error = %err, chat_id, "turn aborted");
                    send(
                        &transport,
                        &chat_id,
                        "Something went wrong on my side and nothing was saved. Please try again in a moment.",
                    )
                    .await;
                }
            }
        }
    }
}

async fn send(transport: &TelegramTransport, chat_id: &str, text: &str) {
    if let Err(err) = transport.send_text(chat_id, text).await {
        tracing::warn!(error = %err, chat_id, "reply delivery failed");
    }
}
