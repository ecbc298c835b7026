use std::error::Error;
use std::sync::Arc;

use quizbot::commands::BotCommand;
use quizbot::config::{Config, Webhook};
use quizbot::conversation::Conversations;
use quizbot::definition::QuizDefinition;
use quizbot::health;
use quizbot::machine::ConversationStateMachine;
use quizbot::schema::schema;
use quizbot::storage::{InMemoryQuizStore, InMemorySessionStore};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::webhooks::{self, Options};
use teloxide::utils::command::BotCommands;
use tracing::{error, info};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) -> Result<(), Box<dyn Error>> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(level)?)
        .json()
        .with_span_events(FmtSpan::ENTER)
        .log_internal_errors(true)
        .with_line_number(true)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    // teloxide reports through `log`.
    LogTracer::init()?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    init_tracing(&config.log_level)?;

    let definition = match &config.quiz_file {
        Some(path) => QuizDefinition::load(path)?,
        None => QuizDefinition::default(),
    };
    info!(questions = definition.len(), "quiz definition loaded");

    let mut conversations = Conversations::new(
        ConversationStateMachine::new(Arc::new(definition)),
        InMemorySessionStore::new(),
        InMemoryQuizStore::new(),
    );
    if let Some(limit) = config.rate_limit {
        info!(?limit, "rate limiting enabled");
        conversations = conversations.with_rate_limit(limit);
    }
    let conversations = Arc::new(conversations);

    let health_addr = config.health_addr;
    tokio::spawn(async move {
        if let Err(err) = health::serve(health_addr).await {
            error!(%err, "liveness probe stopped");
        }
    });

    let bot = Bot::new(config.token);
    bot.set_my_commands(BotCommand::bot_commands()).await?;
    info!("Starting bot...");

    let mut dispatcher = Dispatcher::builder(bot.clone(), schema())
        .dependencies(dptree::deps![conversations])
        .enable_ctrlc_handler()
        .build();

    match config.webhook {
        Some(Webhook { url, addr }) => {
            let listener = webhooks::axum(bot, Options::new(addr, url)).await?;
            dispatcher
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        }
        None => dispatcher.dispatch().await,
    }

    Ok(())
}
