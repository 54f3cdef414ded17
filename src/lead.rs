//! Lead record types — the seven collected fields, partially filled during a
//! conversation (`LeadDraft`) and completed with a score at the terminal step
//! (`Lead`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Keys of the seven collected fields, in question order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Name,
    Industry,
    Budget,
    Service,
    Email,
    Country,
    Phone,
}

impl FieldKey {
    /// Question order. The session `step` indexes into this list.
    pub const ORDER: [FieldKey; 7] = [
        FieldKey::Name,
        FieldKey::Industry,
        FieldKey::Budget,
        FieldKey::Service,
        FieldKey::Email,
        FieldKey::Country,
        FieldKey::Phone,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Industry => "industry",
            Self::Budget => "budget",
            Self::Service => "service",
            Self::Email => "email",
            Self::Country => "country",
            Self::Phone => "phone",
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Answers collected so far, one field per completed step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadDraft {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub budget: Option<String>,
    pub service: Option<String>,
    pub email: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
}

impl LeadDraft {
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        match key {
            FieldKey::Name => self.name.as_deref(),
            FieldKey::Industry => self.industry.as_deref(),
            FieldKey::Budget => self.budget.as_deref(),
            FieldKey::Service => self.service.as_deref(),
            FieldKey::Email => self.email.as_deref(),
            FieldKey::Country => self.country.as_deref(),
            FieldKey::Phone => self.phone.as_deref(),
        }
    }

    pub fn set(&mut self, key: FieldKey, value: String) {
        let slot = match key {
            FieldKey::Name => &mut self.name,
            FieldKey::Industry => &mut self.industry,
            FieldKey::Budget => &mut self.budget,
            FieldKey::Service => &mut self.service,
            FieldKey::Email => &mut self.email,
            FieldKey::Country => &mut self.country,
            FieldKey::Phone => &mut self.phone,
        };
        *slot = Some(value);
    }

    /// All seven fields have been recorded.
    pub fn is_complete(&self) -> bool {
        FieldKey::ORDER.iter().all(|key| self.get(*key).is_some())
    }

    /// Seal the draft into a completed `Lead`. `None` while any field is
    /// still missing.
    pub fn into_lead(self, lead_score: u32, timestamp: DateTime<Utc>) -> Option<Lead> {
        Some(Lead {
            name: self.name?,
            industry: self.industry?,
            budget: self.budget?,
            service: self.service?,
            email: self.email?,
            country: self.country?,
            phone: self.phone?,
            lead_score,
            timestamp,
        })
    }
}

/// A completed lead: all seven answers plus the computed score and the
/// capture time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub name: String,
    pub industry: String,
    pub budget: String,
    pub service: String,
    pub email: String,
    pub country: String,
    pub phone: String,
    pub lead_score: u32,
    pub timestamp: DateTime<Utc>,
}

impl Lead {
    /// The capture time in the tabular storage format.
    pub fn timestamp_str(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    /// Row view for tabular storage. Column order is fixed:
    /// name, industry, budget, service, email, country, phone, lead_score,
    /// timestamp.
    pub fn to_row(&self) -> [String; 9] {
        [
            self.name.clone(),
            self.industry.clone(),
            self.budget.clone(),
            self.service.clone(),
            self.email.clone(),
            self.country.clone(),
            self.phone.clone(),
            self.lead_score.to_string(),
            self.timestamp_str(),
        ]
    }

    /// Property map sent to the CRM on upsert.
    pub fn crm_properties(&self) -> serde_json::Value {
        serde_json::json!({
            "email": self.email,
            "firstname": self.name,
            "industry": self.industry,
            "budget": self.budget,
            "service": self.service,
            "phone": self.phone,
            "country": self.country,
            "lead_score": self.lead_score.to_string(),
            "bot_channel": "Website Chatbot",
        })
    }
}
