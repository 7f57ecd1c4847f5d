//! Answer generator (LLM) abstraction
//!
//! Synthesizes the final natural-language reply from a question plus zero
//! or more retrieved FAQ records. The grounded prompt instructs the model
//! to answer ONLY from the supplied context and to decline explicitly when
//! no context item addresses the question. The fallback prompt requires an
//! explicit general-knowledge disclaimer.

use crate::config::GenerationConfig;
use crate::errors::{FaqError, Result};
use crate::records::FaqRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Trait for answer synthesis
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// Generate a grounded answer from the question and retrieved contexts
    async fn generate(&self, question: &str, contexts: &[FaqRecord]) -> Result<String>;

    /// Generate an ungrounded fallback answer (general knowledge, with a
    /// mandatory disclaimer)
    async fn generate_fallback(&self, question: &str) -> Result<String>;
}

/// Build the grounded RAG prompt.
///
/// Each context is embedded as a numbered block with the base question and
/// answer, followed by the strict grounding instruction.
pub fn build_grounded_prompt(question: &str, contexts: &[FaqRecord]) -> String {
    let mut context_text = String::new();
    for (i, context) in contexts.iter().enumerate() {
        context_text.push_str(&format!("\n--- КОНТЕКСТ {} ---\n", i + 1));
        context_text.push_str(&format!("Вопрос из базы: {}\n", context.question));
        context_text.push_str(&format!("Ответ из базы: {}\n", context.answer));
    }

    format!(
        "Ты — профессиональный, вежливый и дружелюбный ИИ-ассистент университета.\n\
         Твоя задача — кратко ответить на вопрос пользователя.\n\
         \n\
         Отвечай, используя ТОЛЬКО приведённый ниже Контекст.\n\
         Не придумывай ничего от себя.\n\
         Если ни один фрагмент Контекста не отвечает на вопрос, прямо скажи,\n\
         что не нашёл ответа, и не пытайся угадывать.\n\
         \n\
         ---\n\
         {}\n\
         ---\n\
         \n\
         ВОПРОС ПОЛЬЗОВАТЕЛЯ:\n\
         {}\n\
         ---\n\
         \n\
         ОТВЕТ АССИСТЕНТА:",
        context_text, question
    )
}

/// Build the ungrounded fallback prompt
pub fn build_fallback_prompt(question: &str) -> String {
    format!(
        "Ты — полезный ИИ-ассистент университета.\n\
         В базе знаний не нашлось подходящего контекста для этого вопроса.\n\
         Ответь, опираясь на общие знания, и ОБЯЗАТЕЛЬНО начни ответ с\n\
         предупреждения, что информация не из официальной базы университета\n\
         и её стоит перепроверить.\n\
         \n\
         ---\n\
         ВОПРОС ПОЛЬЗОВАТЕЛЯ:\n\
         {}\n\
         ---\n\
         \n\
         ОТВЕТ АССИСТЕНТА (С ПРЕДУПРЕЖДЕНИЕМ):",
        question
    )
}

/// HTTP generator client for OpenAI-compatible chat-completions endpoints
pub struct HttpGenerator {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

impl HttpGenerator {
    /// Create a new HTTP generator from configuration
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FaqError::Internal {
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
        })
    }

    /// Send a single-message chat completion and return the reply text
    async fn call_llm(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        metrics::counter!("campusfaq_generation_requests_total").increment(1);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                metrics::counter!("campusfaq_generation_errors_total").increment(1);
                FaqError::Generation {
                    message: format!("LLM API request failed: {}", e),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            metrics::counter!("campusfaq_generation_errors_total").increment(1);
            return Err(FaqError::Generation {
                message: format!("LLM API error {}: {}", status, body),
            });
        }

        let chat_response: ChatResponse =
            response.json().await.map_err(|e| FaqError::Generation {
                message: format!("Failed to parse LLM response: {}", e),
            })?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| FaqError::Generation {
                message: "Empty response from LLM".to_string(),
            })
    }
}

#[async_trait]
impl AnswerGenerator for HttpGenerator {
    async fn generate(&self, question: &str, contexts: &[FaqRecord]) -> Result<String> {
        self.call_llm(build_grounded_prompt(question, contexts)).await
    }

    async fn generate_fallback(&self, question: &str) -> Result<String> {
        self.call_llm(build_fallback_prompt(question)).await
    }
}

/// Create an answer generator based on configuration
pub fn create_generator(config: &GenerationConfig) -> Result<Arc<dyn AnswerGenerator>> {
    Ok(Arc::new(HttpGenerator::new(config)?))
}
