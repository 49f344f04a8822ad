//! NLU intent service.
//!
//! The resolver turns free text into the raw values of the slots the bot
//! recognized. Lowercasing, fallback, and dedup happen in
//! [`crate::extract`].

use async_trait::async_trait;
use aws_sdk_lexruntimev2::Client;
use aws_sdk_lexruntimev2::error::DisplayErrorContext;
use aws_sdk_lexruntimev2::types::Interpretation;

use crate::error::IntentError;

/// Resolves free text into candidate label values.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Interpreted slot values, in interpretation order.
    async fn resolve(&self, text: &str) -> Result<Vec<String>, IntentError>;
}

/// Resolver backed by a conversational bot's text recognition.
pub struct LexResolver {
    client: Client,
    bot_id: String,
    bot_alias_id: String,
    locale_id: String,
    session_id: String,
}

impl LexResolver {
    pub fn new(
        client: Client,
        bot_id: impl Into<String>,
        bot_alias_id: impl Into<String>,
        locale_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            client,
            bot_id: bot_id.into(),
            bot_alias_id: bot_alias_id.into(),
            locale_id: locale_id.into(),
            session_id: session_id.into(),
        }
    }
}

#[async_trait]
impl IntentResolver for LexResolver {
    async fn resolve(&self, text: &str) -> Result<Vec<String>, IntentError> {
        let output = self
            .client
            .recognize_text()
            .bot_id(&self.bot_id)
            .bot_alias_id(&self.bot_alias_id)
            .locale_id(&self.locale_id)
            .session_id(&self.session_id)
            .text(text)
            .send()
            .await
            .map_err(|e| IntentError(DisplayErrorContext(&e).to_string()))?;

        Ok(slot_values(output.interpretations()))
    }
}

/// Walk every interpretation and collect resolved slot values.
///
/// Slots inside one interpretation are visited in name order so the result
/// does not depend on map iteration order. Unfilled slots are skipped.
fn slot_values(interpretations: &[Interpretation]) -> Vec<String> {
    let mut values = Vec::new();

    for interpretation in interpretations {
        let Some(slots) = interpretation.intent().and_then(|intent| intent.slots()) else {
            continue;
        };

        let mut names: Vec<&String> = slots.keys().collect();
        names.sort();

        for name in names {
            let value = slots
                .get(name)
                .and_then(|slot| slot.value())
                .map(|value| value.interpreted_value());

            if let Some(value) = value.filter(|v| !v.is_empty()) {
                values.push(value.to_string());
            }
        }
    }

    values
}
