//! Subcommands run against a stubbed backend, asserting on terminal output.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use flexi_cli::bootstrap::assemble;
use flexi_cli::commands::{self, Command, ThemeAction};
use flexi_cli::TerminalUi;
use flexi_core::config::ClientConfig;
use flexi_core::gateway::AuthResponse;
use flexi_core::marketplace::{BudgetType, EarningsSummary, ExperienceLevel, Job, Payment};
use flexi_core::messaging::Conversation;
use flexi_core::navigation::PageId;
use flexi_core::session::LOGIN_REQUIRED_TOAST;
use flexi_core::store::{MemoryStore, keys};
use flexi_core::test_support::{
    StubGateway, sample_client, sample_job, sample_message, sample_user,
};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

struct Harness {
    gateway: Arc<StubGateway>,
    store: Arc<MemoryStore>,
    out: SharedBuffer,
}

impl Harness {
    fn new(store: MemoryStore) -> Self {
        colored::control::set_override(false);
        let gateway = Arc::new(StubGateway::new());
        gateway.set_jobs(Ok(vec![sample_job(1, "Logo design")]));
        Self {
            gateway,
            store: Arc::new(store),
            out: SharedBuffer::default(),
        }
    }

    fn signed_in() -> Self {
        let harness = Self::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "tok")]));
        harness.gateway.set_profile(Ok(sample_user(1, "ada")));
        harness
    }

    fn signed_in_client() -> Self {
        let harness = Self::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "tok")]));
        harness.gateway.set_profile(Ok(sample_client(2, "acme")));
        harness
    }

    async fn run(&self, command: Command) -> bool {
        let ui = Arc::new(TerminalUi::new(self.out.clone()));
        let app = assemble(
            &ClientConfig::default(),
            self.gateway.clone(),
            self.store.clone(),
            &ui,
            command.start_page(),
        );
        commands::run(&app, &ui, command).await.unwrap()
    }
}

#[tokio::test]
async fn test_login_opens_dashboard() {
    let harness = Harness::new(MemoryStore::new());
    harness.gateway.set_auth(Ok(AuthResponse {
        access: "tok-1".to_string(),
        refresh: None,
        user: sample_user(1, "ada"),
    }));
    harness.gateway.set_proposals(Ok(vec![]));
    harness.gateway.set_contracts(Ok(vec![]));
    harness.gateway.set_summary(Ok(EarningsSummary::default()));

    let ok = harness
        .run(Command::Login {
            username: "ada".to_string(),
            password: "Secret123".to_string(),
        })
        .await;

    assert!(ok);
    let text = harness.out.text();
    assert!(!text.contains("Recent jobs"), "start page is muted: {text}");
    assert!(text.contains("Signed in as ada"), "{text}");
    assert!(text.contains("== dashboard =="), "{text}");
    assert!(text.contains("Proposals: 0  Contracts: 0  Earned: $0.00"), "{text}");
    assert_eq!(harness.store.value(keys::ACCESS_TOKEN).as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn test_open_protected_page_anonymously_falls_back_home() {
    let harness = Harness::new(MemoryStore::new());

    let ok = harness.run(Command::Open { page: PageId::Dashboard }).await;

    assert!(!ok);
    let text = harness.out.text();
    assert!(text.contains(LOGIN_REQUIRED_TOAST), "{text}");
    assert!(text.contains("flexi login"), "{text}");
    assert!(text.contains("Recent jobs\n  #1 Logo design"), "{text}");
    assert_eq!(harness.gateway.call_count("profile"), 0);
}

#[tokio::test]
async fn test_jobs_search_sends_filters() {
    let harness = Harness::new(MemoryStore::new());

    let ok = harness
        .run(Command::Jobs {
            search: Some(" rust ".to_string()),
        })
        .await;

    assert!(ok);
    assert_eq!(
        harness.gateway.last_filters().and_then(|f| f.search).as_deref(),
        Some("rust")
    );
    assert!(harness.out.text().contains("Jobs\n  #1 Logo design"));
}

#[tokio::test]
async fn test_whoami_requires_a_session() {
    let anonymous = Harness::new(MemoryStore::new());
    assert!(!anonymous.run(Command::Whoami).await);
    assert!(anonymous.out.text().contains("Not signed in"));

    let signed_in = Harness::signed_in();
    assert!(signed_in.run(Command::Whoami).await);
    assert!(signed_in.out.text().contains("ada (freelancer)\n  email: ada@example.com"));
}

#[tokio::test]
async fn test_send_appends_to_conversation() {
    let harness = Harness::signed_in();
    let ada = sample_user(1, "ada");
    let grace = sample_user(2, "grace");
    harness.gateway.set_conversations(Ok(vec![Conversation {
        id: 5,
        participants: vec![ada.clone(), grace.clone()],
        last_message: None,
        unread_count: 0,
        created_at: String::new(),
        updated_at: String::new(),
    }]));
    harness
        .gateway
        .set_messages(5, vec![sample_message(1, &grace, "ping")]);
    harness.gateway.set_sent(Ok(sample_message(2, &ada, "pong")));

    let ok = harness
        .run(Command::Send {
            conversation_id: 5,
            text: "pong".to_string(),
        })
        .await;

    assert!(ok);
    let text = harness.out.text();
    assert!(text.contains("grace: ping\n  2025-01-01 00:00 you: pong"), "{text}");
    assert_eq!(harness.gateway.call_count("send_message:5"), 1);
}

#[tokio::test]
async fn test_send_fails_when_backend_refuses() {
    let harness = Harness::signed_in();
    harness.gateway.set_messages(5, vec![]);

    let ok = harness
        .run(Command::Send {
            conversation_id: 5,
            text: "pong".to_string(),
        })
        .await;

    assert!(!ok);
    assert!(harness.out.text().contains("✖"));
}

#[tokio::test]
async fn test_theme_toggle_persists() {
    let harness = Harness::new(MemoryStore::new());

    assert!(harness.run(Command::Theme { action: None }).await);
    assert!(
        harness
            .run(Command::Theme {
                action: Some(ThemeAction::Toggle),
            })
            .await
    );

    let text = harness.out.text();
    assert!(text.contains("Theme: light\n"), "{text}");
    assert!(text.contains("Theme: dark\n"), "{text}");
}

#[tokio::test]
async fn test_logout_returns_home() {
    let harness = Harness::signed_in();

    assert!(harness.run(Command::Logout).await);

    assert!(!harness.store.contains(keys::ACCESS_TOKEN));
    let text = harness.out.text();
    assert!(text.contains("Not signed in"), "{text}");
    assert!(text.contains("== home =="), "{text}");
}

#[tokio::test]
async fn test_send_starts_on_messages() {
    let harness = Harness::signed_in();
    harness.gateway.set_conversations(Ok(vec![]));
    harness.gateway.set_messages(5, vec![]);
    harness.gateway.set_sent(Ok(sample_message(2, &sample_user(1, "ada"), "pong")));

    let ok = harness
        .run(Command::Send {
            conversation_id: 5,
            text: "pong".to_string(),
        })
        .await;

    assert!(ok);
    assert_eq!(harness.gateway.call_count("conversations"), 1);
    assert_eq!(harness.gateway.call_count("jobs"), 0, "home was never loaded");
}

#[tokio::test]
async fn test_job_shows_proposals_to_its_client() {
    let harness = Harness::signed_in_client();
    harness.gateway.set_job(Ok(Job {
        client: Some(sample_client(2, "acme")),
        ..sample_job(3, "Logo design")
    }));
    harness.gateway.set_proposals(Ok(vec![
        serde_json::from_value(serde_json::json!({ "id": 8, "bid_amount": 75, "delivery_time": 4 }))
            .unwrap(),
    ]));

    assert!(harness.run(Command::Job { job_id: 3 }).await);

    let text = harness.out.text();
    assert!(text.contains("#3 Logo design (open)"), "{text}");
    assert!(text.contains("  client: acme"), "{text}");
    assert!(text.contains("  proposal #8 $75.00 in 4 days (pending)"), "{text}");
}

#[tokio::test]
async fn test_categories_need_a_client() {
    let freelancer = Harness::signed_in();
    assert!(!freelancer.run(Command::Categories).await);
    assert!(freelancer.out.text().contains("Only clients can post jobs"));

    let client = Harness::signed_in_client();
    assert!(client.run(Command::Categories).await);
    assert!(client.out.text().contains("Job categories\n  No categories available."));
}

#[tokio::test]
async fn test_post_job_as_client() {
    let harness = Harness::signed_in_client();

    let ok = harness
        .run(Command::PostJob {
            title: "Landing page".to_string(),
            description: "One page".to_string(),
            budget_min: 200.0,
            budget_max: Some(400.0),
            budget_type: BudgetType::Fixed,
            experience: ExperienceLevel::Intermediate,
            skills: vec!["html".to_string(), " ".to_string()],
            duration: "2 weeks".to_string(),
            category: None,
        })
        .await;

    assert!(ok);
    assert_eq!(harness.gateway.call_count("create_job"), 1);
    assert!(harness.out.text().contains("Job posted successfully!"));
}

#[tokio::test]
async fn test_propose_as_client_is_refused() {
    let harness = Harness::signed_in_client();

    let ok = harness
        .run(Command::Propose {
            job_id: 3,
            bid: 50.0,
            days: 2,
            cover_letter: "Hi".to_string(),
        })
        .await;

    assert!(!ok);
    assert_eq!(harness.gateway.call_count("submit_proposal"), 0);
    assert!(harness.out.text().contains("Only freelancers can submit proposals"));
}

#[tokio::test]
async fn test_accept_and_contact() {
    let client = Harness::signed_in_client();
    assert!(client.run(Command::Accept { proposal_id: 8 }).await);
    assert!(client.out.text().contains("Proposal accepted!"));

    let freelancer = Harness::signed_in();
    freelancer.gateway.set_job(Ok(Job {
        client: Some(sample_client(2, "acme")),
        ..sample_job(3, "Logo design")
    }));
    assert!(freelancer.run(Command::Contact { job_id: 3 }).await);
    assert_eq!(freelancer.gateway.call_count("start_conversation"), 1);
}

#[tokio::test]
async fn test_contract_and_earnings() {
    let harness = Harness::signed_in();
    assert!(!harness.run(Command::Contract { contract_id: 4 }).await);
    assert!(harness.out.text().contains("Failed to load contract"));

    let payments: Vec<Payment> = serde_json::from_value(serde_json::json!([
        { "id": 1, "amount": "100.00", "net_amount": "90.00", "status": "completed" }
    ]))
    .unwrap();
    harness.gateway.set_payments(Ok(payments));
    assert!(harness.run(Command::Earnings).await);
    assert!(harness.out.text().contains("Earnings: $90.00\n  #1 $90.00 (completed)"));
}
