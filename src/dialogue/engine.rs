//! DialogueEngine — the per-session question/answer state machine.
//!
//! One call per inbound message: record (and validate) the answer to the
//! previous question, then either re-prompt, ask the next question, or run
//! the terminal step (score, thank-you, sink dispatch, session removal).

use std::sync::Arc;

use chrono::Utc;

use crate::catalog::{QUESTION_COUNT, QuestionCatalog};
use crate::dialogue::session::{Session, SessionStore};
use crate::dialogue::validate::validate_field;
use crate::lead::FieldKey;
use crate::scoring;
use crate::sinks::LeadSink;

/// Budget-tier remarks appended before the thank-you message.
const REMARK_LOW: &str = "Don't worry, we've got great solutions for any budget!";
const REMARK_MID: &str = "That's a smart budget! We'll make sure you get the best value.";
const REMARK_HIGH: &str = "Awesome! You're looking for premium solutions—we've got you covered.";

/// Budget-tier remark for a recorded budget. Recorded budgets are all
/// digits, so a failed parse means the value exceeds `u128` and still lands
/// in the top tier; only a non-numeric value yields no remark.
fn budget_remark(budget: &str) -> Option<&'static str> {
    match budget.parse::<u128>() {
        Ok(n) if n < 5_000 => Some(REMARK_LOW),
        Ok(n) if n < 15_000 => Some(REMARK_MID),
        Ok(_) => Some(REMARK_HIGH),
        Err(_) if !budget.is_empty() && budget.bytes().all(|b| b.is_ascii_digit()) => {
            Some(REMARK_HIGH)
        }
        Err(_) => None,
    }
}

/// Response to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub response: String,
    pub options: Vec<String>,
}

impl EngineReply {
    fn text(response: String) -> Self {
        Self {
            response,
            options: Vec::new(),
        }
    }
}

/// Drives every session through the fixed question sequence.
pub struct DialogueEngine {
    store: Arc<SessionStore>,
    catalog: Arc<QuestionCatalog>,
    sink: Arc<dyn LeadSink>,
}

impl DialogueEngine {
    pub fn new(
        store: Arc<SessionStore>,
        catalog: Arc<QuestionCatalog>,
        sink: Arc<dyn LeadSink>,
    ) -> Self {
        Self {
            store,
            catalog,
            sink,
        }
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Process one message for `session_id`.
    ///
    /// The per-session mutex is held for the whole call, so messages for the
    /// same id are serialized; other sessions are unaffected.
    pub async fn handle_message(
        &self,
        session_id: &str,
        lang: &str,
        user_input: &str,
    ) -> EngineReply {
        let handle = self.store.resolve(session_id, lang).await;
        let mut session = handle.lock().await;
        // Language may switch mid-conversation; already-asked text stays as
        // it was rendered.
        session.lang = lang.to_string();
        session.last_seen = Utc::now();

        let step = session.step;

        // Record the answer to the previous question. Normalization (budget)
        // replaces the raw input for both the record and the echo below.
        let mut input_echo = user_input.to_string();
        if step >= 1 && step <= FieldKey::ORDER.len() {
            let key = FieldKey::ORDER[step - 1];
            match validate_field(key, user_input, &session.draft) {
                Ok(value) => {
                    input_echo = value.clone();
                    session.draft.set(key, value);
                    session.retry_pending = false;
                }
                Err(err) => {
                    session.retry_pending = true;
                    return EngineReply::text(err.prompt().to_string());
                }
            }
        }

        if step < QUESTION_COUNT {
            self.next_question(&mut session, step, &input_echo)
        } else {
            self.finalize(session_id, &mut session).await
        }
    }

    /// Ask the next question, or re-ask the current one on a pending retry.
    fn next_question(&self, session: &mut Session, step: usize, input_echo: &str) -> EngineReply {
        let entry = self.catalog.entry(&session.lang);

        if session.retry_pending {
            // Re-ask the question for the field being retried. Service
            // options are attached only on the first ask, not here.
            return EngineReply::text(entry.questions[step.saturating_sub(1)].clone());
        }

        let reply = if FieldKey::ORDER[step] == FieldKey::Service {
            let name = session.draft.get(FieldKey::Name).unwrap_or_default();
            let industry = session.draft.get(FieldKey::Industry).unwrap_or_default();
            EngineReply {
                response: format!(
                    "Thanks {name}, {industry} is a booming industry! Let's get your {input_echo} needs sorted.\n{}",
                    entry.questions[step]
                ),
                options: entry.service_options.clone(),
            }
        } else {
            EngineReply::text(entry.questions[step].clone())
        };

        session.step += 1;
        reply
    }

    /// Terminal step: runs exactly once, on the call that supplied the 7th
    /// field. Scores the lead, composes the closing message, removes the
    /// session, and dispatches the sinks. Sink failures are logged and never
    /// surface here.
    async fn finalize(&self, session_id: &str, session: &mut Session) -> EngineReply {
        let score = scoring::score_lead(&session.draft);

        let mut response = String::new();
        if let Some(remark) = session.draft.get(FieldKey::Budget).and_then(budget_remark) {
            response.push('\n');
            response.push_str(remark);
        }

        let name = session.draft.get(FieldKey::Name).unwrap_or_default();
        let email = session.draft.get(FieldKey::Email).unwrap_or_default();
        response.push('\n');
        response.push_str(&self.catalog.thank_you(&session.lang, name, email));

        // The session is gone before any sink runs; a slow or failing sink
        // cannot resurrect it, and a completed session is non-resumable.
        self.store.remove(session_id).await;

        let Some(lead) = session.draft.clone().into_lead(score, Utc::now()) else {
            tracing::error!(session_id, "Terminal step reached with incomplete draft");
            return EngineReply::text(response);
        };

        tracing::info!(
            session_id,
            lead_score = lead.lead_score,
            email = %lead.email,
            "Lead captured"
        );
        self.sink.deliver(lead).await.log();

        EngineReply::text(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;
    use crate::lead::Lead;
    use crate::sinks::{DeliveryReport, SinkOutcome};
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    /// Sink stub that records delivered leads.
    #[derive(Default)]
    struct RecordingSink {
        delivered: Mutex<Vec<Lead>>,
    }

    #[async_trait]
    impl LeadSink for RecordingSink {
        async fn deliver(&self, lead: Lead) -> DeliveryReport {
            self.delivered.lock().await.push(lead);
            DeliveryReport {
                outcomes: vec![SinkOutcome {
                    sink: "recording",
                    result: Ok(()),
                }],
            }
        }
    }

    fn engine() -> (DialogueEngine, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let engine = DialogueEngine::new(
            Arc::new(SessionStore::new()),
            Arc::new(QuestionCatalog::builtin().unwrap()),
            Arc::clone(&sink) as Arc<dyn LeadSink>,
        );
        (engine, sink)
    }

    async fn say(engine: &DialogueEngine, sid: &str, msg: &str) -> EngineReply {
        engine.handle_message(sid, "en", msg).await
    }

    #[tokio::test]
    async fn first_message_asks_the_name_question() {
        let (engine, _) = engine();
        let reply = say(&engine, "s", "hi").await;
        assert_eq!(reply.response, "What's your name?");
        assert!(reply.options.is_empty());
    }

    #[tokio::test]
    async fn service_question_gets_acknowledgement_and_options() {
        let (engine, _) = engine();
        say(&engine, "s", "hi").await;
        say(&engine, "s", "Alex").await;
        say(&engine, "s", "tech").await;
        let reply = say(&engine, "s", "120000").await;

        assert!(reply.response.contains("Thanks Alex, tech is a booming industry!"));
        assert!(reply.response.contains("Which service are you looking for?"));
        assert_eq!(
            reply.options,
            ["Website", "Mobile App", "SEO", "Branding", "Marketing"]
        );
    }

    #[tokio::test]
    async fn acknowledgement_echoes_the_normalized_budget() {
        let (engine, _) = engine();
        say(&engine, "s", "hi").await;
        say(&engine, "s", "Alex").await;
        say(&engine, "s", "tech").await;
        let reply = say(&engine, "s", "$12,000").await;
        assert!(reply.response.contains("your 12000 needs sorted"));
    }

    #[tokio::test]
    async fn invalid_email_is_retried_without_advancing() {
        let (engine, _) = engine();
        for msg in ["hi", "Alex", "tech", "10000", "Website"] {
            say(&engine, "s", msg).await;
        }

        // Step is now 5 (email just asked). Repeated bad input re-prompts
        // identically and records nothing.
        let first = say(&engine, "s", "not-an-email").await;
        let second = say(&engine, "s", "still wrong").await;
        assert_eq!(first.response, FieldError::Email.prompt());
        assert_eq!(first, second);
        assert!(first.options.is_empty());

        let handle = engine.session_store().resolve("s", "en").await;
        let session = handle.lock().await;
        assert_eq!(session.step, 5);
        assert!(session.draft.get(FieldKey::Email).is_none());
        assert!(session.retry_pending);
        drop(session);

        // A valid answer recovers and moves on to the country question.
        let reply = say(&engine, "s", "a@b.com").await;
        assert_eq!(reply.response, "Which country are you from?");
    }

    #[tokio::test]
    async fn invalid_budget_is_rejected_with_fixed_prompt() {
        let (engine, _) = engine();
        say(&engine, "s", "hi").await;
        say(&engine, "s", "Alex").await;
        say(&engine, "s", "tech").await;

        let reply = say(&engine, "s", "abc").await;
        assert_eq!(reply.response, FieldError::Budget.prompt());

        let handle = engine.session_store().resolve("s", "en").await;
        assert!(handle.lock().await.draft.get(FieldKey::Budget).is_none());
    }

    #[tokio::test]
    async fn invalid_phone_is_rejected_against_recorded_country() {
        let (engine, _) = engine();
        for msg in ["hi", "Alex", "tech", "10000", "Website", "a@b.com", "US"] {
            say(&engine, "s", msg).await;
        }
        let reply = say(&engine, "s", "12").await;
        assert_eq!(reply.response, FieldError::Phone.prompt());
        assert!(engine.session_store().contains("s").await);
    }

    #[tokio::test]
    async fn full_run_scores_dispatches_and_removes_session() {
        let (engine, sink) = engine();
        for msg in ["hi", "Alex", "tech", "120000", "Website", "a@b.com", "US"] {
            say(&engine, "s", msg).await;
        }
        let reply = say(&engine, "s", "+14155552671").await;

        assert!(reply.response.contains("Alex"));
        assert!(reply.response.contains("a@b.com"));
        assert!(reply.response.contains(REMARK_HIGH));
        assert!(reply.options.is_empty());

        let delivered = sink.delivered.lock().await;
        assert_eq!(delivered.len(), 1);
        let lead = &delivered[0];
        assert_eq!(lead.lead_score, 100);
        assert_eq!(lead.name, "Alex");
        assert_eq!(lead.budget, "120000");
        assert_eq!(lead.phone, "+14155552671");
        drop(delivered);

        assert!(!engine.session_store().contains("s").await);
    }

    #[tokio::test]
    async fn low_budget_gets_reassurance_remark() {
        let (engine, _) = engine();
        for msg in ["hi", "Alex", "tech", "4000", "SEO", "a@b.com", "US"] {
            say(&engine, "s", msg).await;
        }
        let reply = say(&engine, "s", "+14155552671").await;
        assert!(reply.response.contains(REMARK_LOW));
    }

    #[tokio::test]
    async fn mid_budget_gets_smart_budget_remark() {
        let (engine, _) = engine();
        for msg in ["hi", "Alex", "tech", "9000", "SEO", "a@b.com", "US"] {
            say(&engine, "s", msg).await;
        }
        let reply = say(&engine, "s", "+14155552671").await;
        assert!(reply.response.contains(REMARK_MID));
    }

    #[tokio::test]
    async fn budget_beyond_machine_integers_still_gets_premium_remark() {
        let (engine, _) = engine();
        // 30 digits, far past what any fixed-width integer holds.
        for msg in ["hi", "Alex", "tech", "999999999999999999999999999999", "SEO", "a@b.com", "US"] {
            say(&engine, "s", msg).await;
        }
        let reply = say(&engine, "s", "+14155552671").await;
        assert!(reply.response.contains(REMARK_HIGH));
    }

    #[tokio::test]
    async fn language_switch_mid_session_renders_later_questions() {
        let (engine, _) = engine();
        engine.handle_message("s", "en", "hi").await;
        engine.handle_message("s", "en", "Alex").await;
        let reply = engine.handle_message("s", "hi", "tech").await;

        // Third question (budget) now comes from the Hindi table.
        let catalog = QuestionCatalog::builtin().unwrap();
        assert_eq!(reply.response, catalog.entry("hi").questions[2]);

        // Collected fields are unaffected by the switch.
        let handle = engine.session_store().resolve("s", "hi").await;
        let session = handle.lock().await;
        assert_eq!(session.draft.get(FieldKey::Name), Some("Alex"));
        assert_eq!(session.draft.get(FieldKey::Industry), Some("tech"));
    }

    #[tokio::test]
    async fn unknown_language_falls_back_to_english() {
        let (engine, _) = engine();
        let reply = engine.handle_message("s", "xx", "hi").await;
        assert_eq!(reply.response, "What's your name?");
    }

    #[tokio::test]
    async fn completed_session_id_starts_over() {
        let (engine, sink) = engine();
        for msg in [
            "hi",
            "Alex",
            "tech",
            "120000",
            "Website",
            "a@b.com",
            "US",
            "+14155552671",
        ] {
            say(&engine, "s", msg).await;
        }
        assert_eq!(sink.delivered.lock().await.len(), 1);

        // Reusing the id is a brand-new conversation, not a resume.
        let reply = say(&engine, "s", "hello again").await;
        assert_eq!(reply.response, "What's your name?");
    }

    #[tokio::test]
    async fn concurrent_sessions_are_independent() {
        let (engine, _) = engine();
        say(&engine, "a", "hi").await;
        say(&engine, "a", "Alex").await;

        let reply = say(&engine, "b", "hi").await;
        assert_eq!(reply.response, "What's your name?");

        let handle = engine.session_store().resolve("b", "en").await;
        assert!(handle.lock().await.draft.get(FieldKey::Name).is_none());
    }
}
