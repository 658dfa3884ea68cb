use anyhow::{Result, anyhow};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use tinsel_db::models::ElfRow;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const MODEL: &str = "gpt-3.5-turbo";
const MAX_TOKENS: u32 = 300;
const TEMPERATURE: f32 = 0.8;

/// Generates the elf's reply to a letter. One chat-completion call when an
/// API key is configured; canned North Pole replies otherwise or on any
/// failure. No retry, no streaming.
pub struct ElfReplier {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

// Minimal chat-completions wire types — only the fields this client sends
// and reads.

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

impl ElfReplier {
    pub fn new(api_key: Option<String>, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url,
        }
    }

    pub fn from_env() -> Self {
        Self::new(
            std::env::var("OPENAI_API_KEY").ok(),
            std::env::var("OPENAI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into()),
        )
    }

    pub async fn reply(&self, elf: &ElfRow, kid_name: &str, letter: &str) -> String {
        let Some(api_key) = &self.api_key else {
            return canned_reply(kid_name, &elf.name);
        };

        match self.complete(api_key, elf, kid_name, letter).await {
            Ok(text) => text,
            Err(err) => {
                warn!("elf reply generation failed: {:#}", err);
                error_fallback(kid_name, &elf.name)
            }
        }
    }

    async fn complete(
        &self,
        api_key: &str,
        elf: &ElfRow,
        kid_name: &str,
        letter: &str,
    ) -> Result<String> {
        let prompt = build_prompt(elf, kid_name, letter);
        let request = ChatCompletionRequest {
            model: MODEL,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response: ChatCompletionResponse = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| anyhow!("completion returned no choices"))
    }
}

fn build_prompt(elf: &ElfRow, kid_name: &str, letter: &str) -> String {
    format!(
        "You are {name}, a friendly and magical elf at the North Pole. Your job is \
         \"{job}\" and your personality is: \"{personality}\".\n\n\
         A child named {kid_name} has written you this letter:\n\"{letter}\"\n\n\
         Write a warm, magical, fun, age-appropriate response (2-3 short paragraphs). \
         Be encouraging and positive. Mention things about life at the North Pole, your \
         job, Santa, reindeer, or the workshop. Sign off as {name}. Use 2-3 holiday emojis.",
        name = elf.name,
        job = elf.job,
        personality = elf.personality,
    )
}

/// Used when no API key is configured.
fn canned_reply(kid_name: &str, elf_name: &str) -> String {
    let templates = [
        format!(
            "Oh my jingle bells, {kid_name}! Thank you so much for your wonderful letter! \
             Life at the North Pole is so magical right now - we're busy making toys and \
             singing carols! I love being your elf friend. Keep being amazing! 🎄❄️ \
             Your friend forever, {elf_name}"
        ),
        format!(
            "Dear {kid_name}! Your letter made all the elves do a happy dance! We love \
             hearing from you! The reindeer say hi too - especially Rudolph! Santa showed \
             me your letter and he's so proud of you! ⭐🦌 Warmly, {elf_name}"
        ),
        format!(
            "What a lovely letter, {kid_name}! I read it to all my elf friends and they \
             think you're wonderful! We're working hard making presents and thinking of \
             all the nice children like you! Keep spreading joy and kindness! 🎁✨ \
             Love, {elf_name}"
        ),
    ];

    let mut rng = rand::rng();
    let pick = rng.random_range(0..templates.len());
    templates[pick].clone()
}

/// Used when the completion call fails.
fn error_fallback(kid_name: &str, elf_name: &str) -> String {
    format!(
        "Dear {kid_name}! Thank you for your wonderful letter! I loved reading every \
         word. Life at the North Pole is so exciting right now - we're all getting ready \
         for the big day! Santa says hi, and the reindeer are practicing their flying. \
         Keep being amazing! 🎄⭐ Your elf friend, {elf_name}"
    )
}
