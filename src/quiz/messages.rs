//! User-facing message copy
//!
//! Every field can be overridden from the `messages` section of the quiz
//! document. The defaults are the Moscow Zoo guardianship quiz texts.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotMessages {
    /// Sent on `/start`, before the first question
    pub greeting: String,
    /// Reply to `/help`
    pub help: String,
    /// Result text template with `{key}` and `{description}` placeholders
    pub result: String,
    /// Follow-up sent after a determined result
    pub help_prompt: String,
    /// Sent when no result entry matched any answer
    pub undetermined: String,
}

impl Default for BotMessages {
    fn default() -> Self {
        Self {
            greeting: "Привет! Добро пожаловать в викторину Московского зоопарка. Давайте начнём!"
                .to_string(),
            help: "Программа опеки Московского зоопарка позволяет вам помочь животным, \
                   взяв их под опеку. Узнайте больше на официальном сайте Зоопарка!"
                .to_string(),
            result: "Ваше тотемное животное — {key}!\n\n{description}".to_string(),
            help_prompt: "Хотите узнать больше о программе опеки? Нажмите /help".to_string(),
            undetermined: "Не удалось определить животное. Попробуйте ещё раз! /start".to_string(),
        }
    }
}

impl BotMessages {
    pub fn render_result(&self, key: &str, description: &str) -> String {
        self.result
            .replace("{key}", key)
            .replace("{description}", description)
    }
}
