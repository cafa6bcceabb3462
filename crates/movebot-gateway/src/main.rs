use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use rusqlite::Connection;
use tracing::info;

use movebot_channels::{BotApiSender, HttpMediaFetcher, SenderRegistry};
use movebot_core::config::MovebotConfig;
use movebot_gateway::app::{build_router, AppState};
use movebot_gateway::handlers::{
    CrewFallbackHandler, MediaCleanupHandler, NotifyOperatorHandler, OutboundReplyHandler,
    ProcessMediaHandler,
};
use movebot_gateway::ingress::Ingress;
use movebot_gateway::poller::Poller;
use movebot_leads::LeadRepository;
use movebot_media::{LocalDirStore, MediaLinkSigner, MediaStore};
use movebot_pricing::catalog::Catalog;
use movebot_queue::{types::types_for_role, JobQueue, Worker};
use movebot_sessions::{InboundDedup, SessionStore};
use movebot_tenants::{TaggedPlainCipher, TenantRegistry};

/// Which loops this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ProcessRole {
    /// HTTP ingress only.
    Web,
    /// Queue worker only.
    Worker,
    /// Lease sweep + periodic cleanup only.
    Poller,
    /// Everything in one process.
    All,
}

#[derive(Parser, Debug)]
#[command(name = "movebot-gateway", about = "Conversational lead-capture service")]
struct Args {
    /// Path to movebot.toml (defaults to ~/.movebot/movebot.toml).
    #[arg(long)]
    config: Option<String>,

    /// Deployment role for this process.
    #[arg(long, value_enum, default_value_t = ProcessRole::All)]
    role: ProcessRole,
}

fn open_db(path: &str) -> anyhow::Result<Connection> {
    if let Some(parent) = Path::new(path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    // WAL lets the per-store connections write without blocking each other.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA busy_timeout=5000;")?;
    Ok(conn)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "movebot=info,movebot_gateway=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();
    let config = MovebotConfig::load(args.config.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        MovebotConfig::default()
    });

    let db_path = config.database.path.clone();

    // One connection per store; WAL keeps the writers from blocking each
    // other across the process.
    let sessions_conn = open_db(&db_path)?;
    movebot_sessions::db::init_db(&sessions_conn)?;
    let dedup_conn = open_db(&db_path)?;
    let queue_conn = open_db(&db_path)?;
    movebot_queue::db::init_db(&queue_conn)?;
    let leads_conn = open_db(&db_path)?;
    movebot_leads::db::init_db(&leads_conn)?;
    let tenants_conn = open_db(&db_path)?;
    movebot_tenants::db::init_db(&tenants_conn)?;
    let media_conn = open_db(&db_path)?;
    movebot_media::db::init_db(&media_conn)?;

    let cipher = Arc::new(TaggedPlainCipher::new(
        config.security.credentials_key.clone().into_bytes(),
    ));
    let registry = Arc::new(TenantRegistry::new(tenants_conn, cipher));
    let sessions = Arc::new(SessionStore::new(sessions_conn));
    let dedup = Arc::new(InboundDedup::new(dedup_conn));
    let queue = Arc::new(JobQueue::new(queue_conn));
    let leads = Arc::new(LeadRepository::new(leads_conn));
    let media = Arc::new(MediaStore::new(media_conn));
    let objects = Arc::new(LocalDirStore::new(config.media.root_dir.clone()));
    let signer = Arc::new(MediaLinkSigner::new(
        config.media.sign_secret.clone().into_bytes(),
    ));
    let catalog = Arc::new(Catalog::from_config(&config.pricing));

    let mut senders = SenderRegistry::new();
    senders.register(Arc::new(BotApiSender::default()));
    let senders = Arc::new(senders);
    let fetcher = Arc::new(HttpMediaFetcher::new());

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let mut tasks = Vec::new();

    if matches!(args.role, ProcessRole::Worker | ProcessRole::All) {
        let mut worker = Worker::new(
            queue.clone(),
            Duration::from_millis(config.worker.poll_interval_ms),
        );
        for job_type in types_for_role(config.worker.role) {
            match *job_type {
                movebot_queue::job_types::OUTBOUND_REPLY => {
                    worker.register(Arc::new(OutboundReplyHandler::new(
                        registry.clone(),
                        senders.clone(),
                    )))
                }
                movebot_queue::job_types::PROCESS_MEDIA => {
                    worker.register(Arc::new(ProcessMediaHandler::new(
                        registry.clone(),
                        fetcher.clone(),
                        objects.clone(),
                        media.clone(),
                        queue.clone(),
                        config.media.ttl_days,
                    )))
                }
                movebot_queue::job_types::NOTIFY_OPERATOR => {
                    worker.register(Arc::new(NotifyOperatorHandler::new(
                        registry.clone(),
                        leads.clone(),
                        media.clone(),
                        signer.clone(),
                        senders.clone(),
                        catalog.clone(),
                        config.operator.clone(),
                        queue.clone(),
                    )))
                }
                movebot_queue::job_types::NOTIFY_CREW_FALLBACK => {
                    worker.register(Arc::new(CrewFallbackHandler::new(
                        registry.clone(),
                        leads.clone(),
                        senders.clone(),
                        catalog.clone(),
                        config.operator.clone(),
                        queue.clone(),
                    )))
                }
                movebot_queue::job_types::MEDIA_CLEANUP => {
                    worker.register(Arc::new(MediaCleanupHandler::new(
                        media.clone(),
                        objects.clone(),
                    )))
                }
                other => tracing::warn!(job_type = other, "no handler known for job type"),
            }
        }
        info!(role = ?config.worker.role, types = ?worker.allowed_types(), "worker configured");
        tasks.push(tokio::spawn(worker.run(shutdown_rx.clone())));
    }

    if matches!(args.role, ProcessRole::Poller | ProcessRole::All) {
        let poller = Poller::new(
            queue.clone(),
            Duration::from_secs(config.worker.lease_horizon_secs),
        );
        tasks.push(tokio::spawn(poller.run(shutdown_rx.clone())));
    }

    if matches!(args.role, ProcessRole::Web | ProcessRole::All) {
        let ingress = Arc::new(Ingress::new(
            config.clone(),
            registry.clone(),
            sessions.clone(),
            dedup.clone(),
            leads.clone(),
            queue.clone(),
        ));
        let state = Arc::new(AppState { ingress });
        let router = build_router(state);

        let addr: SocketAddr =
            format!("{}:{}", config.gateway.bind, config.gateway.port).parse()?;
        info!("movebot gateway listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tasks.push(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("http server error: {e}");
            }
        }));
    }

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    let _ = shutdown_tx.send(true);
    for task in tasks {
        let _ = task.await;
    }
    Ok(())
}
