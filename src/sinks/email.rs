//! Email notifications — SMTP via lettre.
//!
//! Two messages per captured lead: an operator notification and a thank-you
//! to the lead's own address, both simple HTML.

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use secrecy::ExposeSecret;

use crate::config::SmtpConfig;
use crate::error::SinkError;
use crate::lead::Lead;

/// Sends the two per-lead emails over SMTP.
pub struct EmailNotifier {
    config: SmtpConfig,
}

impl EmailNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Send the operator notification and the thank-you to the lead.
    ///
    /// SMTP is blocking; both sends run on a blocking worker.
    pub async fn notify(&self, lead: &Lead) -> Result<(), SinkError> {
        let config = self.config.clone();
        let lead = lead.clone();
        tokio::task::spawn_blocking(move || {
            send_both(&lead, &config.operator_address, |to, subject, body| {
                send_html(&config, to, subject, body)
            })
        })
        .await
        .map_err(|e| SinkError::Email {
            reason: format!("email task panicked: {e}"),
        })?
    }
}

/// Render and send the two per-lead messages through `send`.
///
/// The sends are independent: a failed operator notification must not stop
/// the thank-you to the lead. Failures from both are folded into one error.
fn send_both<F>(lead: &Lead, operator_address: &str, mut send: F) -> Result<(), SinkError>
where
    F: FnMut(&str, &str, &str) -> Result<(), SinkError>,
{
    let (subject, body) = render_operator_email(lead);
    let operator = send(operator_address, &subject, &body);

    let (subject, body) = render_lead_email(lead);
    let to_lead = send(&lead.email, &subject, &body);

    let mut reasons = Vec::new();
    if let Err(e) = operator {
        reasons.push(format!("operator notification: {e}"));
    }
    if let Err(e) = to_lead {
        reasons.push(format!("lead thank-you: {e}"));
    }
    if reasons.is_empty() {
        Ok(())
    } else {
        Err(SinkError::Email {
            reason: reasons.join("; "),
        })
    }
}

/// Send one HTML email via SMTP.
fn send_html(config: &SmtpConfig, to: &str, subject: &str, body: &str) -> Result<(), SinkError> {
    let creds = Credentials::new(
        config.username.clone(),
        config.password.expose_secret().to_string(),
    );

    let transport = SmtpTransport::starttls_relay(&config.host)
        .map_err(|e| SinkError::Email {
            reason: format!("SMTP relay error: {e}"),
        })?
        .port(config.port)
        .credentials(creds)
        .build();

    let email = Message::builder()
        .from(config.from_address.parse().map_err(|e| SinkError::Email {
            reason: format!("Invalid from address: {e}"),
        })?)
        .to(to.parse().map_err(|e| SinkError::Email {
            reason: format!("Invalid to address {to}: {e}"),
        })?)
        .subject(subject)
        .header(ContentType::TEXT_HTML)
        .body(body.to_string())
        .map_err(|e| SinkError::Email {
            reason: format!("Failed to build email: {e}"),
        })?;

    transport.send(&email).map_err(|e| SinkError::Email {
        reason: format!("SMTP send failed: {e}"),
    })?;

    tracing::info!("Email sent to {to}");
    Ok(())
}

/// Operator notification: every field as a list.
pub fn render_operator_email(lead: &Lead) -> (String, String) {
    let subject = "🚀 New Lead Captured!".to_string();
    let body = format!(
        "<h3>New Lead Details</h3>\n\
         <ul>\n\
             <li><b>Name:</b> {}</li>\n\
             <li><b>Industry:</b> {}</li>\n\
             <li><b>Budget:</b> {}</li>\n\
             <li><b>Service:</b> {}</li>\n\
             <li><b>Email:</b> {}</li>\n\
             <li><b>Country:</b> {}</li>\n\
             <li><b>Phone:</b> {}</li>\n\
             <li><b>Lead Score:</b> {}</li>\n\
         </ul>",
        lead.name,
        lead.industry,
        lead.budget,
        lead.service,
        lead.email,
        lead.country,
        lead.phone,
        lead.lead_score,
    );
    (subject, body)
}

/// Thank-you email to the lead.
pub fn render_lead_email(lead: &Lead) -> (String, String) {
    let subject = "🎉 Thanks for contacting us!".to_string();
    let body = format!(
        "<p>Hi {},</p>\n\
         <p>Thanks for reaching out to us! We're excited to help you with your \
         <b>{}</b> needs in the <b>{}</b> industry.</p>\n\
         <p>Our team will get in touch with you shortly. If you have any questions, \
         feel free to reply to this email.</p>\n\
         <br>\n\
         <p>Best Regards,<br><b>AI Chatbot Team</b></p>",
        lead.name, lead.service, lead.industry,
    );
    (subject, body)
}
