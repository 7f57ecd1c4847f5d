//! Dialogue Orchestrator
//!
//! The per-turn state machine. Two states (`Idle`,
//! `AwaitingClarification`), one input event (a user turn), fully
//! deterministic given the retrieval outcome:
//!
//! 1. A pending topic from a previous clarification turn is merged into
//!    the effective query and consumed exactly once.
//! 2. Short idle-state queries are expanded before embedding; the
//!    expansion never reaches the user or the answer generator.
//! 3. Non-empty retrieval -> grounded generation (Plan A). Empty
//!    retrieval -> the deployment's fallback policy: ask for
//!    clarification (Plan C) or generate ungrounded (Plan B).
//!
//! Every turn yields some reply text; no failure propagates to the caller.
//! Session mutations are applied only after all external calls complete,
//! so an abandoned turn leaves the session unchanged.

use crate::pipeline::RetrievalPipeline;
use crate::session::ConversationSession;
use campusfaq_common::config::DialogueConfig;
use campusfaq_common::generation::AnswerGenerator;
use campusfaq_common::records::FaqRecord;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Template prefix for short-query expansion (retrieval only)
const EXPANSION_PREFIX: &str = "Вопрос по теме:";

/// Reply when generation fails but retrieval found something
const DEGRADED_REPLY_PREFIX: &str = "(API Ошибка) Вот что я нашел:";

/// Reply when fallback generation fails outright
const APOLOGY_REPLY: &str =
    "Извините, сервис сейчас перегружен. Пожалуйста, повторите вопрос чуть позже.";

/// Policy for turns where retrieval finds no grounding.
///
/// The two behaviors are mutually exclusive interpretations of the same
/// empty-result condition; a deployment picks one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Plan C: ask the user to narrow the topic, remember it for the next
    /// turn
    Clarify,
    /// Plan B: answer from general knowledge with a disclaimer
    Generate,
}

impl FallbackPolicy {
    /// Parse the deployment flag; unknown values fall back to `Clarify`
    pub fn from_config(value: &str) -> Self {
        match value {
            "generate" => FallbackPolicy::Generate,
            "clarify" => FallbackPolicy::Clarify,
            other => {
                warn!(policy = other, "Unknown fallback policy, using clarify");
                FallbackPolicy::Clarify
            }
        }
    }
}

/// Which response strategy a turn resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Plan A: grounded generation from retrieved context
    Grounded,
    /// Plan B: ungrounded fallback generation
    Fallback,
    /// Plan C: clarification request
    Clarification,
}

/// The reply produced by one turn
#[derive(Debug, Clone)]
pub struct TurnReply {
    pub text: String,
    pub plan: Plan,
}

/// Orchestrates one conversation turn at a time.
///
/// Holds only injected collaborators and configuration; all mutable state
/// lives in the `ConversationSession` owned by the caller, so one
/// orchestrator serves any number of independent conversations
/// concurrently.
pub struct DialogueOrchestrator {
    pipeline: RetrievalPipeline,
    generator: Arc<dyn AnswerGenerator>,
    policy: FallbackPolicy,
    min_query_tokens: usize,
}

impl DialogueOrchestrator {
    pub fn new(
        pipeline: RetrievalPipeline,
        generator: Arc<dyn AnswerGenerator>,
        config: &DialogueConfig,
    ) -> Self {
        Self {
            pipeline,
            generator,
            policy: FallbackPolicy::from_config(&config.fallback_policy),
            min_query_tokens: config.min_query_tokens,
        }
    }

    /// Process one user turn.
    ///
    /// Always returns a reply; retrieval and generation failures degrade
    /// instead of surfacing.
    #[instrument(skip(self, session, input), fields(session_id = %session.id))]
    pub async fn handle_turn(
        &self,
        session: &mut ConversationSession,
        input: &str,
    ) -> TurnReply {
        let started = Instant::now();
        metrics::counter!("campusfaq_turns_total").increment(1);

        let pending = session.pending_topic.clone();
        let effective_query = match &pending {
            // The clarification is consumed exactly once, whatever this
            // turn's outcome turns out to be.
            Some(topic) => format!("{} {}", input, topic),
            None => self.expand_short_query(input),
        };

        let contexts = match self.pipeline.retrieve(&effective_query).await {
            Ok(contexts) => contexts,
            Err(e) if e.is_retrieval_failure() => {
                warn!(error = %e, "Retrieval service failed, treating turn as ungrounded");
                metrics::counter!("campusfaq_retrieval_failures_total").increment(1);
                Vec::new()
            }
            Err(e) => {
                error!(error = %e, "Unexpected retrieval error, treating turn as ungrounded");
                metrics::counter!("campusfaq_retrieval_failures_total").increment(1);
                Vec::new()
            }
        };

        // The generator always gets the original user text, never the
        // expanded or merged query.
        let (reply, next_pending) = if contexts.is_empty() {
            self.ungrounded_reply(input).await
        } else {
            (self.grounded_reply(input, &contexts).await, None)
        };

        // Side effects only after every await has completed: a dropped
        // turn must not leave a half-applied session behind.
        session.pending_topic = next_pending;
        session.push_user(input);
        session.push_assistant(&reply.text);

        match reply.plan {
            Plan::Grounded => {
                metrics::counter!("campusfaq_plan_grounded_total").increment(1)
            }
            Plan::Fallback => {
                metrics::counter!("campusfaq_plan_fallback_total").increment(1)
            }
            Plan::Clarification => {
                metrics::counter!("campusfaq_plan_clarification_total").increment(1)
            }
        }
        metrics::histogram!("campusfaq_turn_duration_seconds")
            .record(started.elapsed().as_secs_f64());

        info!(plan = ?reply.plan, "Turn finished");
        reply
    }

    /// Plan A: grounded generation, degrading to the best retrieved answer
    /// when the generator fails
    async fn grounded_reply(&self, question: &str, contexts: &[FaqRecord]) -> TurnReply {
        match self.generator.generate(question, contexts).await {
            Ok(text) => TurnReply {
                text,
                plan: Plan::Grounded,
            },
            Err(e) => {
                warn!(error = %e, "Generation failed, returning best retrieved answer");
                TurnReply {
                    text: format!("{} {}", DEGRADED_REPLY_PREFIX, contexts[0].answer),
                    plan: Plan::Grounded,
                }
            }
        }
    }

    /// Empty-result handling per deployment policy
    async fn ungrounded_reply(&self, input: &str) -> (TurnReply, Option<String>) {
        match self.policy {
            FallbackPolicy::Clarify => {
                let reply = TurnReply {
                    text: clarification_text(input),
                    plan: Plan::Clarification,
                };
                (reply, Some(input.to_string()))
            }
            FallbackPolicy::Generate => {
                let text = match self.generator.generate_fallback(input).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Fallback generation failed, returning apology");
                        APOLOGY_REPLY.to_string()
                    }
                };
                (
                    TurnReply {
                        text,
                        plan: Plan::Fallback,
                    },
                    None,
                )
            }
        }
    }

    /// Expansion gives the embedding space more signal on very short
    /// queries; it affects only what gets embedded.
    fn expand_short_query(&self, input: &str) -> String {
        if input.split_whitespace().count() < self.min_query_tokens {
            format!("{} {}", EXPANSION_PREFIX, input)
        } else {
            input.to_string()
        }
    }
}

/// Templated clarification prompt echoing the user's raw input
fn clarification_text(input: &str) -> String {
    format!(
        "Я вижу, вас интересует тема: **'{}'**. \n\n\
         Не могли бы вы уточнить, что именно вы хотите узнать?",
        input
    )
}
