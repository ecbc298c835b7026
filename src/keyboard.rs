use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::reply::ChoiceButton;

/// One button per row; the callback data is `tag:question`.
pub(crate) fn choices_keyboard(choices: &[ChoiceButton]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = choices
        .iter()
        .map(|choice| {
            vec![InlineKeyboardButton::callback(
                choice.label.clone(),
                choice.data.to_string(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}
