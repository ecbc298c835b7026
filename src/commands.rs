use std::sync::Arc;

use teloxide::{prelude::Requester, types::Message, utils::command::BotCommands, Bot};
use tracing::instrument;

use crate::conversation::InboundEvent;
use crate::machine::{Command, WELCOME};
use crate::schema::{deliver, user_id};
use crate::{BotConversations, HandlerResult};

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum BotCommand {
    #[command(description = "show the welcome message.")]
    Start,
    #[command(description = "display this text.")]
    Help,
    #[command(description = "create a new quiz.")]
    Create,
    #[command(description = "take the quiz.")]
    Quiz,
    #[command(description = "abandon what you are doing.")]
    Cancel,
    #[command(description = "show the last quiz you created.")]
    MyQuiz,
}

impl BotCommand {
    /// The state machine command behind this bot command, if any.
    pub fn flow(&self) -> Option<Command> {
        match self {
            BotCommand::Create => Some(Command::Create),
            BotCommand::Quiz => Some(Command::StartQuiz),
            BotCommand::Cancel => Some(Command::Cancel),
            BotCommand::Start | BotCommand::Help | BotCommand::MyQuiz => None,
        }
    }
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, BotCommand::descriptions().to_string())
        .await?;
    Ok(())
}

pub(crate) async fn start(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, WELCOME).await?;
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, conversations))]
pub(crate) async fn my_quiz(
    bot: Bot,
    msg: Message,
    conversations: Arc<BotConversations>,
) -> HandlerResult {
    let Some(user) = user_id(&msg) else {
        return Ok(());
    };
    let reply = conversations.saved_quiz(user).await;
    deliver(&bot, msg.chat.id, vec![reply]).await
}

#[instrument(level = "info", skip(bot, msg, conversations))]
pub(crate) async fn flow(
    bot: Bot,
    msg: Message,
    cmd: BotCommand,
    conversations: Arc<BotConversations>,
) -> HandlerResult {
    let (Some(user), Some(command)) = (user_id(&msg), cmd.flow()) else {
        tracing::debug!("command without a sender or a flow");
        return Ok(());
    };
    let replies = conversations
        .handle(InboundEvent::command(user, command))
        .await;
    deliver(&bot, msg.chat.id, replies).await
}
