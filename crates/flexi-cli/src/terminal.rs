//! Line-oriented rendering of pages, chat and toasts.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use colored::{ColoredString, Colorize};
use flexi_application::preferences::Theme;
use flexi_application::{Dashboard, JobDetail, PageView};
use flexi_core::marketplace::{Contract, Job, JobCategory, Payment};
use flexi_core::messaging::{Conversation, ConversationId, Message, MessageView};
use flexi_core::navigation::PageId;
use flexi_core::ui::{Notifier, PageRegion, ToastKind};
use flexi_core::user::User;
use minijinja::{Environment, context};
use serde::Serialize;
use serde_json::{Map, Value};

// Block tags trim the whitespace before them; every output line starts
// with the newline that precedes it in the source.
const JOBS_TEMPLATE: &str = r#"{{ heading }}
{%- for job in jobs %}
  #{{ job.id }} {{ job.title }} | {{ job.budget_type }} {{ job.budget_min | money }}{% if job.budget_max %} - {{ job.budget_max | money }}{% endif %} | {{ job.proposals_count }} proposals
{%- else %}
  No jobs found.
{%- endfor %}"#;

const JOB_TEMPLATE: &str = r#"#{{ job.id }} {{ job.title }} ({{ job.status }})
  {{ job.budget_type }} {{ job.budget_min | money }}{% if job.budget_max %} - {{ job.budget_max | money }}{% endif %} | {{ job.experience_level }}{% if job.duration %} | {{ job.duration }}{% endif %}
{%- if job.client %}
  client: {{ job.client.username }}
{%- endif %}
{%- if job.skills_required %}
  skills: {{ job.skills_required | join(", ") }}
{%- endif %}
{%- if job.description %}
  {{ job.description }}
{%- endif %}
{%- for proposal in proposals %}
  proposal #{{ proposal.id }} {{ proposal.bid_amount | money }} in {{ proposal.delivery_time }} days ({{ proposal.status }})
{%- endfor %}"#;

const CATEGORIES_TEMPLATE: &str = r#"Job categories
{%- for category in categories %}
  [{{ category.id }}] {{ category.name }}
{%- else %}
  No categories available.
{%- endfor %}"#;

const CONTRACT_TEMPLATE: &str = r#"Contract #{{ contract.id }} ({{ contract.status }})
  amount: {{ contract.amount | money }}
{%- if contract.client %}
  client: {{ contract.client.username }}
{%- endif %}
{%- if contract.freelancer %}
  freelancer: {{ contract.freelancer.username }}
{%- endif %}
{%- if contract.start_date %}
  started: {{ contract.start_date }}{% if contract.end_date %}, ends {{ contract.end_date }}{% endif %}
{%- endif %}
{%- if contract.description %}
  {{ contract.description }}
{%- endif %}"#;

const EARNINGS_TEMPLATE: &str = r#"Earnings: {{ total | money }}
{%- for payment in payments %}
  #{{ payment.id }} {{ payment.net_amount | money }} ({{ payment.status }}){% if payment.description %} {{ payment.description }}{% endif %}
{%- else %}
  No payments yet.
{%- endfor %}"#;

const DASHBOARD_TEMPLATE: &str = r#"{% if dashboard.role == "freelancer" %}Proposals: {{ dashboard.proposals_count }}  Contracts: {{ dashboard.contracts_count }}  Earned: {{ dashboard.total_earned | money }}
{%- for proposal in dashboard.recent_proposals %}
  proposal #{{ proposal.id }} {{ proposal.bid_amount | money }} ({{ proposal.status }})
{%- endfor %}
{%- for contract in dashboard.recent_contracts %}
  contract #{{ contract.id }} {{ contract.amount | money }} ({{ contract.status }})
{%- endfor %}
{%- elif dashboard.role == "client" %}Active jobs: {{ dashboard.active_jobs }}  Completed: {{ dashboard.completed_jobs }}  Spent: {{ dashboard.total_spent | money }}
{%- for job in dashboard.recent_jobs %}
  #{{ job.id }} {{ job.title }} ({{ job.status }})
{%- endfor %}
{%- else %}Nothing to show for this account.
{%- endif %}"#;

const CONVERSATIONS_TEMPLATE: &str = r#"Conversations
{%- for row in rows %}
  [{{ row.id }}] {{ row.with }}{% if row.unread %} ({{ row.unread }} unread){% endif %}{% if row.preview %}: {{ row.preview }}{% endif %}
{%- else %}
  No conversations yet.
{%- endfor %}"#;

const MESSAGES_TEMPLATE: &str = r#"Conversation {{ conversation_id }}
{%- for row in rows %}
  {% if row.time %}{{ row.time }} {% endif %}{% if row.mine %}you{% else %}{{ row.who }}{% endif %}: {{ row.content }}
{%- else %}
  No messages yet.
{%- endfor %}"#;

const PROFILE_TEMPLATE: &str = r#"{{ user.username }} ({{ user.user_type }})
{%- if name %}
  name: {{ name }}
{%- endif %}
  email: {{ user.email }}
{%- if user.location %}
  location: {{ user.location }}
{%- endif %}
{%- if user.skills %}
  skills: {{ user.skills | join(", ") }}
{%- endif %}
{%- if user.hourly_rate %}
  rate: {{ user.hourly_rate | money }}/h
{%- endif %}"#;

const TEMPLATES: [(&str, &str); 9] = [
    ("jobs", JOBS_TEMPLATE),
    ("job", JOB_TEMPLATE),
    ("categories", CATEGORIES_TEMPLATE),
    ("contract", CONTRACT_TEMPLATE),
    ("earnings", EARNINGS_TEMPLATE),
    ("dashboard", DASHBOARD_TEMPLATE),
    ("conversations", CONVERSATIONS_TEMPLATE),
    ("messages", MESSAGES_TEMPLATE),
    ("profile", PROFILE_TEMPLATE),
];

fn money(value: f64) -> String {
    format!("${value:.2}")
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.add_filter("money", money);
    for (name, source) in TEMPLATES {
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("[Terminal] Template '{}' is invalid: {}", name, e);
        }
    }
    env
}

/// Colours a toast by severity.
pub fn toast_line(kind: ToastKind, message: &str) -> ColoredString {
    match kind {
        ToastKind::Success => format!("✔ {message}").green(),
        ToastKind::Error => format!("✖ {message}").red(),
        ToastKind::Warning => format!("! {message}").yellow(),
        ToastKind::Info => format!("i {message}").blue(),
    }
}

#[derive(Serialize)]
struct ConversationRow<'a> {
    id: ConversationId,
    with: &'a str,
    unread: u32,
    preview: Option<&'a str>,
}

#[derive(Serialize)]
struct MessageRow<'a> {
    time: Option<String>,
    who: &'a str,
    mine: bool,
    content: &'a str,
}

/// Renders everything the application shows, to one writer.
///
/// Page output can be muted (toasts and the auth line never are), which lets
/// a command start the client without echoing the start page.
pub struct TerminalUi {
    out: Mutex<Box<dyn Write + Send>>,
    env: Environment<'static>,
    me: Mutex<Option<u64>>,
    muted: AtomicBool,
    complaints: AtomicUsize,
}

impl TerminalUi {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        Self {
            out: Mutex::new(Box::new(out)),
            env: environment(),
            me: Mutex::new(None),
            muted: AtomicBool::new(false),
            complaints: AtomicUsize::new(0),
        }
    }

    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::SeqCst);
    }

    /// Error and warning toasts shown so far.
    pub fn complaints(&self) -> usize {
        self.complaints.load(Ordering::SeqCst)
    }

    /// One [`PageRegion`] per page, all drawing through this renderer.
    pub fn regions(self: &Arc<Self>) -> Vec<(PageId, Arc<dyn PageRegion>)> {
        PageId::all()
            .map(|page| {
                let region: Arc<dyn PageRegion> = Arc::new(TerminalRegion {
                    page,
                    ui: self.clone(),
                });
                (page, region)
            })
            .collect()
    }

    pub fn line(&self, text: impl std::fmt::Display) {
        match self.out.lock() {
            Ok(mut out) => {
                if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
                    tracing::warn!("[Terminal] Failed to write output: {}", e);
                }
            }
            Err(_) => tracing::warn!("[Terminal] Output lock poisoned"),
        }
    }

    fn page_line(&self, text: impl std::fmt::Display) {
        if !self.muted.load(Ordering::SeqCst) {
            self.line(text);
        }
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Option<String> {
        match self.env.get_template(name).and_then(|t| t.render(ctx)) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("[Terminal] Failed to render '{}': {}", name, e);
                None
            }
        }
    }

    fn render_page(&self, name: &str, ctx: minijinja::Value) {
        if self.muted.load(Ordering::SeqCst) {
            return;
        }
        if let Some(text) = self.render(name, ctx) {
            self.line(text.trim());
        }
    }

    fn current_user_id(&self) -> Option<u64> {
        self.me.lock().ok().and_then(|me| *me)
    }
}

impl Notifier for TerminalUi {
    fn toast(&self, kind: ToastKind, message: &str) {
        if matches!(kind, ToastKind::Error | ToastKind::Warning) {
            self.complaints.fetch_add(1, Ordering::SeqCst);
        }
        self.line(toast_line(kind, message));
    }
}

impl PageView for TerminalUi {
    fn render_jobs(&self, page: PageId, jobs: &[Job]) {
        let heading = match page {
            PageId::Home => "Recent jobs",
            _ => "Jobs",
        };
        self.render_page("jobs", context! { heading, jobs });
    }

    fn render_job_detail(&self, detail: &JobDetail) {
        self.render_page(
            "job",
            context! { job => &detail.job, proposals => &detail.proposals },
        );
    }

    fn render_dashboard(&self, dashboard: &Dashboard) {
        self.render_page("dashboard", context! { dashboard });
    }

    fn render_conversations(&self, conversations: &[Conversation], me: &User) {
        let rows: Vec<ConversationRow<'_>> = conversations
            .iter()
            .map(|c| ConversationRow {
                id: c.id,
                with: c
                    .other_participant(me.id)
                    .map(User::display_name)
                    .unwrap_or("unknown"),
                unread: c.unread_count,
                preview: c.last_message.as_ref().map(|m| m.content.as_str()),
            })
            .collect();
        self.render_page("conversations", context! { rows });
    }

    fn render_profile(&self, user: &User) {
        let name = format!("{} {}", user.first_name, user.last_name)
            .trim()
            .to_string();
        self.render_page("profile", context! { user, name });
    }

    fn render_settings(&self, theme: Theme) {
        self.page_line(format!("Theme: {theme}"));
    }

    fn render_contract(&self, contract: &Contract) {
        self.render_page("contract", context! { contract });
    }

    fn render_earnings(&self, payments: &[Payment]) {
        let total: f64 = payments.iter().map(|p| p.net_amount).sum();
        self.render_page("earnings", context! { total, payments });
    }

    fn show_post_job_form(&self, categories: &[JobCategory]) {
        self.render_page("categories", context! { categories });
    }

    fn restore_draft(&self, form: &str, fields: &Map<String, Value>) {
        self.page_line(format!("Restored unsaved {form} draft ({} fields)", fields.len()).dimmed());
    }

    fn show_login_prompt(&self) {
        self.line("Sign in with `flexi login <username> <password>`.".bold());
    }

    fn refresh_auth_chrome(&self, user: Option<&User>) {
        if let Ok(mut me) = self.me.lock() {
            *me = user.map(|u| u.id);
        }
        match user {
            Some(user) => self.line(format!("Signed in as {}", user.display_name()).dimmed()),
            None => self.line("Not signed in".dimmed()),
        }
    }

    fn apply_theme(&self, theme: Theme) {
        tracing::debug!("[Terminal] Theme is {}", theme);
    }
}

impl MessageView for TerminalUi {
    fn render_messages(&self, conversation_id: ConversationId, messages: &[Message]) {
        let me = self.current_user_id();
        let rows: Vec<MessageRow<'_>> = messages
            .iter()
            .map(|m| MessageRow {
                time: m.sent_at().map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
                who: m.sender.display_name(),
                mine: me.is_some_and(|id| m.is_sent_by(id)),
                content: &m.content,
            })
            .collect();
        if let Some(text) = self.render("messages", context! { conversation_id, rows }) {
            self.line(text.trim());
        }
    }
}

/// A page's area on the terminal: showing it prints the page banner.
struct TerminalRegion {
    page: PageId,
    ui: Arc<TerminalUi>,
}

impl PageRegion for TerminalRegion {
    fn show(&self) {
        self.ui.page_line(format!("== {} ==", self.page).bold());
    }

    fn hide(&self) {
        tracing::trace!("[Terminal] Hiding {}", self.page);
    }
}
