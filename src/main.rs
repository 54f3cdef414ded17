use std::sync::Arc;

use lead_intake::catalog::QuestionCatalog;
use lead_intake::config::{CrmConfig, ServerConfig, SmtpConfig};
use lead_intake::dialogue::{self, AppState, DialogueEngine, SessionStore, chat_routes};
use lead_intake::sinks::{CrmClient, EmailNotifier, LeadDispatcher, LeadSink};
use lead_intake::store::{LeadStore, LibSqlBackend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage (lettre)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServerConfig::from_env();

    eprintln!("💬 Lead Intake v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Chat API: http://0.0.0.0:{}/chat", config.port);
    eprintln!("   Leads API: http://0.0.0.0:{}/leads", config.port);

    // ── Question catalog ────────────────────────────────────────────────
    let catalog = match &config.catalog_path {
        Some(path) => {
            eprintln!("   Catalog: {}", path.display());
            QuestionCatalog::from_path(path)?
        }
        None => {
            eprintln!("   Catalog: builtin");
            QuestionCatalog::builtin()?
        }
    };

    // ── Lead storage ────────────────────────────────────────────────────
    let store: Arc<dyn LeadStore> = Arc::new(LibSqlBackend::new_local(&config.db_path).await?);
    eprintln!("   Database: {}", config.db_path.display());

    // ── Optional sinks ──────────────────────────────────────────────────
    let email = match SmtpConfig::from_env() {
        Some(smtp) => {
            eprintln!(
                "   Email: enabled (SMTP: {}:{}, operator: {})",
                smtp.host, smtp.port, smtp.operator_address
            );
            Some(EmailNotifier::new(smtp))
        }
        None => {
            eprintln!("   Email: disabled (SENDER_EMAIL not set)");
            None
        }
    };

    let crm = match CrmConfig::from_env() {
        Some(crm) => {
            eprintln!("   CRM: enabled ({})", crm.base_url);
            Some(CrmClient::new(crm))
        }
        None => {
            eprintln!("   CRM: disabled (HUBSPOT_API_KEY not set)");
            None
        }
    };

    let dispatcher: Arc<dyn LeadSink> = Arc::new(LeadDispatcher::new(
        Arc::clone(&store),
        email,
        crm,
        config.sink_timeout,
    ));

    // ── Engine ──────────────────────────────────────────────────────────
    let sessions = Arc::new(SessionStore::new());
    let _prune_handle =
        dialogue::spawn_prune_task(Arc::clone(&sessions), config.session_idle_timeout);

    let engine = Arc::new(DialogueEngine::new(
        sessions,
        Arc::new(catalog),
        dispatcher,
    ));

    let app = chat_routes(AppState { engine, store });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    tracing::info!(port = config.port, "Lead intake server started");
    axum::serve(listener, app).await?;

    Ok(())
}
