use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::GetChatId, UpdateFilterExt, UpdateHandler},
    dptree,
    payloads::SendMessageSetters,
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, Update},
    Bot,
};
use tracing::{info, instrument, warn};

use crate::{
    commands::{self, BotCommand},
    conversation::InboundEvent,
    keyboard::choices_keyboard,
    reply::{ChoiceData, Reply},
    state::UserId,
    BotConversations, HandlerResult,
};

pub fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<BotCommand, _>()
        .branch(case![BotCommand::Help].endpoint(commands::help))
        .branch(case![BotCommand::Start].endpoint(commands::start))
        .branch(case![BotCommand::MyQuiz].endpoint(commands::my_quiz))
        .endpoint(commands::flow);

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .endpoint(receive_text);

    dptree::entry()
        .branch(message_handler)
        .branch(Update::filter_callback_query().endpoint(receive_choice))
}

pub(crate) fn user_id(msg: &Message) -> Option<UserId> {
    msg.from.as_ref().map(|user| user.id.0)
}

/// Sends replies in order, attaching buttons to those that offer choices.
pub(crate) async fn deliver(bot: &Bot, chat_id: ChatId, replies: Vec<Reply>) -> HandlerResult {
    for reply in replies {
        if reply.choices.is_empty() {
            bot.send_message(chat_id, reply.text).await?;
        } else {
            bot.send_message(chat_id, reply.text)
                .reply_markup(choices_keyboard(&reply.choices))
                .await?;
        }
    }
    Ok(())
}

#[instrument(level = "info", skip(bot, msg, conversations), fields(chat = msg.chat.id.0))]
async fn receive_text(
    bot: Bot,
    msg: Message,
    conversations: Arc<BotConversations>,
) -> HandlerResult {
    let Some(user) = user_id(&msg) else {
        return Ok(());
    };
    match msg.text() {
        Some(text) => {
            let replies = conversations.handle(InboundEvent::text(user, text)).await;
            deliver(&bot, msg.chat.id, replies).await
        }
        None => {
            info!("non-text message ignored");
            bot.send_message(msg.chat.id, "Please, send a text message.")
                .await?;
            Ok(())
        }
    }
}

#[instrument(level = "info", skip(bot, q, conversations), fields(user = q.from.id.0))]
async fn receive_choice(
    bot: Bot,
    q: CallbackQuery,
    conversations: Arc<BotConversations>,
) -> HandlerResult {
    bot.answer_callback_query(&q.id).await?;

    let Some(chat_id) = q.chat_id() else {
        warn!("callback query without a chat");
        return Ok(());
    };
    let choice = match q.data.as_deref().map(str::parse::<ChoiceData>) {
        Some(Ok(choice)) => choice,
        other => {
            warn!(?other, "unexpected callback data");
            return Ok(());
        }
    };

    if let Some(message) = &q.message {
        bot.edit_message_reply_markup(chat_id, message.id()).await?;
    }

    let replies = conversations
        .handle(InboundEvent::choice(q.from.id.0, choice))
        .await;
    deliver(&bot, chat_id, replies).await
}
