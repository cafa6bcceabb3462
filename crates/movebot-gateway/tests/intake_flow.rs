use std::sync::Arc;

use chrono::DateTime;
use rusqlite::Connection;

use movebot_core::config::MovebotConfig;
use movebot_core::types::{ChannelCredentials, Provider, ProviderEvent};
use movebot_gateway::ingress::{Ingress, DUPLICATE_IGNORED};
use movebot_leads::LeadRepository;
use movebot_queue::{job_types, JobQueue, JobStatus};
use movebot_sessions::{InboundDedup, SessionStore};
use movebot_tenants::{CredentialCipher, TaggedPlainCipher, TenantConfig, TenantRegistry};

struct Harness {
    ingress: Ingress,
    sessions: Arc<SessionStore>,
    leads: Arc<LeadRepository>,
    queue: Arc<JobQueue>,
    next_message: std::cell::Cell<u64>,
}

fn harness() -> Harness {
    let sessions_conn = Connection::open_in_memory().expect("open failed");
    movebot_sessions::db::init_db(&sessions_conn).expect("init failed");
    let dedup_conn = Connection::open_in_memory().expect("open failed");
    movebot_sessions::db::init_db(&dedup_conn).expect("init failed");
    let queue_conn = Connection::open_in_memory().expect("open failed");
    movebot_queue::db::init_db(&queue_conn).expect("init failed");
    let leads_conn = Connection::open_in_memory().expect("open failed");
    movebot_leads::db::init_db(&leads_conn).expect("init failed");
    let tenants_conn = Connection::open_in_memory().expect("open failed");
    movebot_tenants::db::init_db(&tenants_conn).expect("init failed");

    let cipher = Arc::new(TaggedPlainCipher::new(b"test-key".to_vec()));
    let registry = Arc::new(TenantRegistry::new(tenants_conn, cipher.clone()));
    let blob = cipher
        .seal(
            "t1:telegram",
            &ChannelCredentials {
                api_token: "tok".to_string(),
                extra: serde_json::Map::new(),
            },
        )
        .expect("seal failed");
    registry
        .register_tenant(
            "t1",
            &TenantConfig {
                operator_provider: Some(Provider::Telegram),
                operator_chat_id: Some("-100".to_string()),
                crew_chat_id: Some("-200".to_string()),
                ..Default::default()
            },
            Provider::Telegram,
            "bot-1",
            &blob,
        )
        .expect("register failed");

    let sessions = Arc::new(SessionStore::new(sessions_conn));
    let dedup = Arc::new(InboundDedup::new(dedup_conn));
    let queue = Arc::new(JobQueue::new(queue_conn));
    let leads = Arc::new(LeadRepository::new(leads_conn));

    let ingress = Ingress::new(
        MovebotConfig::default(),
        registry,
        sessions.clone(),
        dedup.clone(),
        leads.clone(),
        queue.clone(),
    );

    Harness {
        ingress,
        sessions,
        leads,
        queue,
        next_message: std::cell::Cell::new(0),
    }
}

impl Harness {
    fn event(&self) -> ProviderEvent {
        let n = self.next_message.get() + 1;
        self.next_message.set(n);
        ProviderEvent {
            provider: Provider::Telegram,
            provider_account_id: "bot-1".to_string(),
            chat_id: "chat-1".to_string(),
            message_id: format!("m-{n}"),
            text: None,
            button_payload: None,
            location: None,
            media: Vec::new(),
        }
    }

    fn text(&self, text: &str) -> String {
        let mut event = self.event();
        event.text = Some(text.to_string());
        self.ingress.process(&event).expect("process failed").text
    }

    fn button(&self, payload: &str) -> String {
        let mut event = self.event();
        event.button_payload = Some(payload.to_string());
        self.ingress.process(&event).expect("process failed").text
    }
}

/// Happy path, Russian, single pickup (end-to-end scenario 1).
#[test]
fn happy_path_creates_lead_and_deletes_session() {
    let h = harness();

    h.text("Здравствуйте");
    h.text("Холодильник, диван");
    h.button("1");
    h.text("Хайфа, ул. Герцль 12, этаж 3, без лифта");
    h.text("3 нет");
    h.text("Тель-Авив, этаж 2, лифт");
    h.text("2 да");
    h.button("tomorrow");
    h.button("morning");
    h.button("skip");
    h.button("extras_none");
    let reply = h.button("yes");
    assert!(!reply.is_empty());

    // Session gone; a new inbound would start a fresh session.
    assert!(h
        .sessions
        .get("t1", "chat-1")
        .expect("get failed")
        .is_none());

    // Exactly one lead with the first sequence number.
    assert_eq!(h.leads.max_seq().expect("seq failed"), 1);
    let session_jobs = h
        .queue
        .list_status(JobStatus::Pending)
        .expect("list failed");
    let operator_job = session_jobs
        .iter()
        .find(|j| j.job_type == job_types::NOTIFY_OPERATOR)
        .expect("no operator job");
    let lead_id = operator_job.payload["lead_id"]
        .as_str()
        .expect("no lead_id")
        .to_string();

    let lead = h.leads.get("t1", &lead_id).expect("lead missing");
    assert_eq!(lead.lead_seq, 1);
    assert_eq!(lead.payload.lead_number, 1);

    let estimate = lead.payload.estimate.expect("no estimate");
    let cfg = MovebotConfig::default();
    assert!(estimate.min >= cfg.pricing.min_same_metro);
    assert!(estimate.breakdown.iter().any(|b| b.label.contains("fridge")));
    assert!(estimate.breakdown.iter().any(|b| b.label.contains("sofa")));
}

/// Duplicate webhook delivery (end-to-end scenario 2).
#[test]
fn duplicate_webhook_short_circuits() {
    let h = harness();

    let mut event = h.event();
    event.text = Some("Здравствуйте".to_string());
    let first = h.ingress.process(&event).expect("first failed");
    let second = h.ingress.process(&event).expect("second failed");

    assert_ne!(first.text, DUPLICATE_IGNORED);
    assert_eq!(second.text, DUPLICATE_IGNORED);

    // Session mutated at most once: still at the step the first delivery set.
    let session = h
        .sessions
        .get("t1", "chat-1")
        .expect("get failed")
        .expect("missing session");
    assert_eq!(session.step.as_str(), "cargo");

    // Only the first delivery enqueued an outbound reply.
    let replies: Vec<_> = h
        .queue
        .list_status(JobStatus::Pending)
        .expect("list failed")
        .into_iter()
        .filter(|j| j.job_type == job_types::OUTBOUND_REPLY)
        .collect();
    assert_eq!(replies.len(), 1);
}

/// Crew-fallback ordering (end-to-end scenario 6).
#[test]
fn crew_fallback_trails_operator_notification() {
    let h = harness();

    h.text("hello");
    h.text("sofa and fridge");
    h.button("1");
    h.text("Haifa, Herzl 1");
    h.text("3 no");
    h.text("Tel Aviv, Allenby 2");
    h.text("2 yes");
    h.button("tomorrow");
    h.button("morning");
    h.button("skip");
    h.button("extras_none");
    h.button("yes");

    let pending = h
        .queue
        .list_status(JobStatus::Pending)
        .expect("list failed");
    let operator = pending
        .iter()
        .find(|j| j.job_type == job_types::NOTIFY_OPERATOR)
        .expect("no operator job");
    let crew = pending
        .iter()
        .find(|j| j.job_type == job_types::NOTIFY_CREW_FALLBACK)
        .expect("no crew job");

    let operator_at = DateTime::parse_from_rfc3339(&operator.scheduled_at).expect("bad ts");
    let crew_at = DateTime::parse_from_rfc3339(&crew.scheduled_at).expect("bad ts");
    let now = chrono::Utc::now();

    assert!(operator_at <= now, "operator job is due immediately");
    assert!(
        crew_at - operator_at >= chrono::Duration::milliseconds(1500),
        "crew job is delayed behind the operator job"
    );

    assert_eq!(
        operator.idempotency_key(),
        Some(format!("{}:notify_operator_v1", operator.payload["lead_id"].as_str().unwrap()).as_str())
    );
    assert_eq!(
        crew.idempotency_key(),
        Some(format!("{}:crew_fallback_v1", crew.payload["lead_id"].as_str().unwrap()).as_str())
    );
}

/// Attribute-suppressed quantities flow into the stored lead (scenario 3).
#[test]
fn attribute_suppressed_quantities_survive_to_lead() {
    let h = harness();

    h.text("Здравствуйте");
    h.text("Холодильник 200кг, 5 дверный шкаф");
    h.button("1");
    h.text("Хайфа, Герцль 1");
    h.text("2 нет");
    h.text("Тель-Авив, Алленби 2");
    h.text("1 да");
    h.button("tomorrow");
    h.button("day");
    h.button("skip");
    h.button("extras_none");
    h.button("yes");

    let pending = h.queue.list_status(JobStatus::Pending).expect("list failed");
    let lead_id = pending
        .iter()
        .find(|j| j.job_type == job_types::NOTIFY_OPERATOR)
        .expect("no operator job")
        .payload["lead_id"]
        .as_str()
        .expect("no lead_id")
        .to_string();
    let lead = h.leads.get("t1", &lead_id).expect("lead missing");

    let items = &lead.payload.data.items;
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| i.qty == 1), "no attribute digit became a quantity");
}

/// Unknown binding is rejected without leaking identifiers.
#[test]
fn unknown_account_is_rejected() {
    let h = harness();
    let mut event = h.event();
    event.provider_account_id = "ghost".to_string();
    event.text = Some("hi".to_string());
    let err = h.ingress.process(&event).expect_err("expected rejection");
    assert!(!format!("{err}").contains("ghost"));
}
