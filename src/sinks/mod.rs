//! Terminal side effects for completed leads.
//!
//! The engine hands a completed `Lead` to a single `LeadSink`; the standard
//! implementation is `LeadDispatcher`, which fans out to durable storage,
//! the notification emails, and the CRM upsert. Every destination gets an
//! explicit outcome that is logged, never propagated to the chat caller.

pub mod crm;
pub mod email;

pub use crm::CrmClient;
pub use email::EmailNotifier;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::SinkError;
use crate::lead::Lead;
use crate::store::LeadStore;

/// One destination's outcome for one lead.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: &'static str,
    pub result: Result<(), SinkError>,
}

/// Aggregated outcomes for one delivery.
#[derive(Debug)]
pub struct DeliveryReport {
    pub outcomes: Vec<SinkOutcome>,
}

impl DeliveryReport {
    pub fn all_ok(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    /// Log every outcome. Failures are warnings; they have no caller to
    /// propagate to.
    pub fn log(&self) {
        for outcome in &self.outcomes {
            match &outcome.result {
                Ok(()) => tracing::info!(sink = outcome.sink, "Lead delivered"),
                Err(e) => tracing::warn!(sink = outcome.sink, "Lead delivery failed: {e}"),
            }
        }
    }
}

/// Anything that acts on a completed lead.
#[async_trait]
pub trait LeadSink: Send + Sync {
    /// Dispatch a completed lead. Per-destination failures are reported in
    /// the outcome, never returned as an error.
    async fn deliver(&self, lead: Lead) -> DeliveryReport;
}

/// Fans a completed lead out to storage, email, and the CRM.
///
/// Each destination call is bounded by `timeout` and a failing destination
/// never affects the others. Email and CRM are optional; storage always
/// runs.
pub struct LeadDispatcher {
    store: Arc<dyn LeadStore>,
    email: Option<EmailNotifier>,
    crm: Option<CrmClient>,
    timeout: Duration,
}

impl LeadDispatcher {
    pub fn new(
        store: Arc<dyn LeadStore>,
        email: Option<EmailNotifier>,
        crm: Option<CrmClient>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            email,
            crm,
            timeout,
        }
    }

    async fn bounded<F>(&self, sink: &'static str, call: F) -> SinkOutcome
    where
        F: std::future::Future<Output = Result<(), SinkError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => SinkOutcome { sink, result },
            Err(_) => SinkOutcome {
                sink,
                result: Err(SinkError::Timeout { sink }),
            },
        }
    }
}

#[async_trait]
impl LeadSink for LeadDispatcher {
    async fn deliver(&self, lead: Lead) -> DeliveryReport {
        let mut outcomes = Vec::new();

        outcomes.push(
            self.bounded("storage", async {
                self.store.append(&lead).await.map_err(SinkError::from)
            })
            .await,
        );

        if let Some(email) = &self.email {
            outcomes.push(self.bounded("email", email.notify(&lead)).await);
        }

        if let Some(crm) = &self.crm {
            outcomes.push(self.bounded("crm", crm.upsert_contact(&lead)).await);
        }

        DeliveryReport { outcomes }
    }
}
