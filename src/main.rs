#![allow(missing_docs)]

//! Rapport binary: interactive chat, profile reset, prompt inspection.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use rapport::config::{runtime_paths, RapportConfig};
use rapport::credentials::CredentialResolver;
use rapport::intake;
use rapport::logging;
use rapport::profile::{Profile, ProfileError, ProfileStore};
use rapport::providers::openrouter::OpenRouterProvider;
use rapport::session::{SessionError, SessionManager};
use rapport::storage::{JsonFileStore, StorageProvider};
use rapport::style::derive_prompt;
use rapport::ui::{
    CommandSpeechSink, InteractivePrompt, TerminalPresenter, TerminalPrompt,
};

#[derive(Parser)]
#[command(name = "rapport", about = "A chat assistant that adapts to you", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session (default).
    Chat,
    /// Clear the stored communication-style profile.
    Reset,
    /// Print the system prompt derived from the stored profile.
    Prompt,
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` values participate in config/env resolution like the shell env.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => run_chat().await,
        Command::Reset => run_reset().await,
        Command::Prompt => run_prompt().await,
    }
}

/// Interactive chat: resolve credential, ensure a profile, then loop.
async fn run_chat() -> Result<()> {
    let paths = runtime_paths()?;
    let _logging = logging::init_chat(&paths.logs_dir)?;
    let config = RapportConfig::load().context("failed to load configuration")?;
    info!(model = %config.api.model, "rapport starting");

    let storage: Arc<dyn StorageProvider> = Arc::new(JsonFileStore::open(&paths.store_file));
    let prompt = TerminalPrompt::new();

    let resolver = CredentialResolver::new(Arc::clone(&storage), config.api.config_url.clone());
    let credential = resolver.resolve(&prompt).await.ok_or_else(|| {
        anyhow::anyhow!(SessionError::CredentialUnavailable)
            .context("an OpenRouter API key is required to chat; get one at https://openrouter.ai/")
    })?;

    let profile_store = ProfileStore::new(Arc::clone(&storage));
    let profile = match profile_store.load().await? {
        Some(profile) => {
            debug!("existing profile loaded");
            profile
        }
        None => collect_profile(&profile_store, &prompt).await?,
    };

    let provider = Arc::new(OpenRouterProvider::new(
        config.api.completion_url.clone(),
        config.api.model.clone(),
        credential,
    ));
    let presenter = Arc::new(TerminalPresenter::new());
    let speech = Arc::new(CommandSpeechSink::new(config.speech.command.clone()));
    let session = SessionManager::new(provider, presenter, speech, Some(profile));

    println!("Type a message, or /tts to toggle speech, /reset to start over, /quit to leave.");
    session.welcome();

    loop {
        let line = match prompt.ask("> ").await {
            Ok(line) => line,
            // EOF (ctrl-d) ends the session like /quit.
            Err(_) => break,
        };

        match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/tts" => {
                session.toggle_tts();
            }
            "/reset" => {
                let confirm = prompt
                    .ask(
                        "Start over? This clears your communication profile and chat history. (y/N) ",
                    )
                    .await
                    .unwrap_or_default();
                if confirm.trim().eq_ignore_ascii_case("y") {
                    profile_store.clear().await?;
                    session.reset();
                    let fresh = collect_profile(&profile_store, &prompt).await?;
                    session.set_profile(Some(fresh));
                    session.welcome();
                }
            }
            message => {
                // Failures already rendered an apology; log and keep going.
                if let Err(e) = session.send_message(message).await {
                    debug!(error = %e, "send failed");
                }
            }
        }
    }

    info!("rapport shutting down");
    Ok(())
}

/// Run the questionnaire until a complete answer set is saved.
async fn collect_profile(
    store: &ProfileStore,
    prompt: &dyn InteractivePrompt,
) -> Result<Profile> {
    println!("Four quick questions so I can match how you like to talk.");
    loop {
        let answers = intake::collect(prompt).await?;
        match store.save(answers).await {
            Ok(profile) => return Ok(profile),
            Err(ProfileError::Incomplete(missing)) => {
                println!("Please answer all questions before continuing (missing: {missing}).");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// `rapport reset`: clear the stored profile.
async fn run_reset() -> Result<()> {
    logging::init_cli();
    let paths = runtime_paths()?;
    let storage: Arc<dyn StorageProvider> = Arc::new(JsonFileStore::open(&paths.store_file));
    ProfileStore::new(storage).clear().await?;
    println!("Profile cleared.");
    Ok(())
}

/// `rapport prompt`: print the derived system prompt.
async fn run_prompt() -> Result<()> {
    logging::init_cli();
    let paths = runtime_paths()?;
    let storage: Arc<dyn StorageProvider> = Arc::new(JsonFileStore::open(&paths.store_file));
    let profile = ProfileStore::new(storage).load().await?;
    println!("{}", derive_prompt(profile.as_ref()));
    Ok(())
}
