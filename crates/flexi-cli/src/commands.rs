//! What each `flexi` subcommand does once the client is running.

use std::time::Duration;

use anyhow::Result;
use clap::Subcommand;
use flexi_application::{AppRoot, PageView, UiEvent};
use flexi_core::gateway::Registration;
use flexi_core::marketplace::{BudgetType, ExperienceLevel, JobFilters, NewJob, NewProposal};
use flexi_core::messaging::ConversationId;
use flexi_core::navigation::PageId;
use flexi_core::user::UserType;

use crate::terminal::TerminalUi;

pub const DEFAULT_CHAT_SECS: u64 = 60;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and open the dashboard
    Login { username: String, password: String },
    /// Create an account and sign in
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long = "confirm")]
        password_confirm: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        /// freelancer or client
        #[arg(long, default_value = "freelancer")]
        user_type: UserType,
    },
    /// Sign out and forget the stored token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// Open a page (home, jobs, dashboard, messages, profile, settings)
    Open { page: PageId },
    /// List open jobs
    Jobs {
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one job; its own client also sees the proposals on it
    Job { job_id: u64 },
    /// List the categories a job can be posted under
    Categories,
    /// Post a job (clients only)
    PostJob {
        title: String,
        description: String,
        #[arg(long)]
        budget_min: f64,
        #[arg(long)]
        budget_max: Option<f64>,
        /// fixed or hourly
        #[arg(long, default_value = "fixed")]
        budget_type: BudgetType,
        /// entry, intermediate or expert
        #[arg(long, default_value = "entry")]
        experience: ExperienceLevel,
        /// Comma-separated
        #[arg(long, value_delimiter = ',')]
        skills: Vec<String>,
        #[arg(long, default_value = "")]
        duration: String,
        /// Category id, see `flexi categories`
        #[arg(long)]
        category: Option<u64>,
    },
    /// Bid on a job (freelancers only)
    Propose {
        job_id: u64,
        bid: f64,
        /// Delivery time in days
        days: u32,
        cover_letter: String,
    },
    /// Accept a proposal on one of your jobs
    Accept { proposal_id: u64 },
    /// Start a conversation with the client who posted a job
    Contact { job_id: u64 },
    /// Show one of your contracts
    Contract { contract_id: u64 },
    /// List payments you received
    Earnings,
    /// Follow a conversation, printing it as new messages arrive
    Chat {
        conversation_id: ConversationId,
        #[arg(long, default_value_t = DEFAULT_CHAT_SECS)]
        duration_secs: u64,
    },
    /// Send a message to a conversation
    Send {
        conversation_id: ConversationId,
        text: String,
    },
    /// Show or switch the colour theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    /// Switch between light and dark
    Toggle,
}

impl Command {
    /// Page the client starts on for this command.
    pub fn start_page(&self) -> Option<PageId> {
        match self {
            Command::Open { page } => Some(*page),
            Command::Jobs { .. } => Some(PageId::Jobs),
            Command::Chat { .. } | Command::Send { .. } => Some(PageId::Messages),
            _ => None,
        }
    }

    /// Whether the start page is part of the command's output.
    pub fn shows_start_page(&self) -> bool {
        matches!(self, Command::Open { .. } | Command::Jobs { .. } | Command::Chat { .. })
    }
}

/// Starts `app` and runs `command` against it.
///
/// # Returns
///
/// `false` when the command did not achieve what it asked for; the reason
/// has already been shown as a toast.
pub async fn run(app: &AppRoot, ui: &TerminalUi, command: Command) -> Result<bool> {
    if let Command::Jobs { search: Some(term) } = &command
        && !term.trim().is_empty()
    {
        app.loaders().set_filters(JobFilters::with_search(term.trim())).await;
    }

    ui.set_muted(!command.shows_start_page());
    let started_on = app.start().await;
    ui.set_muted(false);
    tracing::debug!("[Cli] Started on {}", started_on);

    let succeeded = match command {
        Command::Login { username, password } => {
            app.dispatch(UiEvent::LoginSubmitted { username, password }).await;
            app.session().is_authenticated().await
        }
        Command::Register {
            username,
            email,
            password,
            password_confirm,
            first_name,
            last_name,
            user_type,
        } => {
            let registration = Registration {
                username,
                email,
                password,
                password_confirm,
                first_name,
                last_name,
                user_type,
            };
            app.dispatch(UiEvent::RegisterSubmitted(registration)).await;
            app.session().is_authenticated().await
        }
        Command::Logout => {
            app.dispatch(UiEvent::LogoutClicked).await;
            true
        }
        Command::Whoami => match app.session().current_user().await {
            Some(user) => {
                ui.render_profile(&user);
                true
            }
            None => false,
        },
        Command::Open { page } => started_on == page,
        Command::Job { job_id } => quietly(app, ui, UiEvent::JobSelected(job_id)).await,
        Command::Categories => quietly(app, ui, UiEvent::PostJobClicked).await,
        Command::PostJob {
            title,
            description,
            budget_min,
            budget_max,
            budget_type,
            experience,
            skills,
            duration,
            category,
        } => {
            let job = NewJob {
                title,
                description,
                category,
                budget_type,
                budget_min,
                budget_max,
                experience_level: experience,
                skills_required: skills
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                duration,
            };
            quietly(app, ui, UiEvent::JobSubmitted(job)).await
        }
        Command::Propose {
            job_id,
            bid,
            days,
            cover_letter,
        } => {
            let proposal = NewProposal {
                cover_letter,
                bid_amount: bid,
                delivery_time: days,
            };
            quietly(app, ui, UiEvent::ProposalSubmitted { job_id, proposal }).await
        }
        Command::Accept { proposal_id } => {
            quietly(app, ui, UiEvent::ProposalAccepted(proposal_id)).await
        }
        Command::Contact { job_id } => {
            quietly(app, ui, UiEvent::ContactClientClicked(job_id)).await
        }
        Command::Contract { contract_id } => {
            quietly(app, ui, UiEvent::ContractSelected(contract_id)).await
        }
        Command::Earnings => quietly(app, ui, UiEvent::EarningsRequested).await,
        Command::Jobs { .. } => started_on == PageId::Jobs,
        Command::Chat {
            conversation_id,
            duration_secs,
        } => {
            if started_on == PageId::Messages {
                follow(app, conversation_id, Duration::from_secs(duration_secs)).await
            } else {
                false
            }
        }
        Command::Send {
            conversation_id,
            text,
        } => send(app, conversation_id, text).await,
        Command::Theme { action } => {
            if action == Some(ThemeAction::Toggle) {
                app.dispatch(UiEvent::ThemeToggled).await;
            }
            ui.line(format!("Theme: {}", app.themes().current().await));
            true
        }
    };

    app.polling().close().await;
    Ok(succeeded)
}

/// Dispatches `event`; it succeeded when it raised no error or warning toast.
async fn quietly(app: &AppRoot, ui: &TerminalUi, event: UiEvent) -> bool {
    let before = ui.complaints();
    app.dispatch(event).await;
    ui.complaints() == before
}

async fn follow(app: &AppRoot, conversation_id: ConversationId, duration: Duration) -> bool {
    app.dispatch(UiEvent::ConversationSelected(conversation_id)).await;
    if !app.polling().is_active().await {
        return false;
    }

    tokio::select! {
        _ = tokio::time::sleep(duration) => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("[Cli] Interrupted"),
    }
    true
}

async fn send(app: &AppRoot, conversation_id: ConversationId, text: String) -> bool {
    app.dispatch(UiEvent::ConversationSelected(conversation_id)).await;
    if !app.polling().is_active().await {
        return false;
    }

    let before = app.polling().snapshot().await.len();
    app.dispatch(UiEvent::MessageSubmitted {
        conversation_id,
        content: text,
    })
    .await;
    app.polling().snapshot().await.len() > before
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_commands_start_on_their_page() {
        assert_eq!(
            Command::Open { page: PageId::Profile }.start_page(),
            Some(PageId::Profile)
        );
        assert_eq!(Command::Jobs { search: None }.start_page(), Some(PageId::Jobs));
        assert!(Command::Logout.start_page().is_none());
        let send = Command::Send {
            conversation_id: 4,
            text: "hi".to_string(),
        };
        assert_eq!(send.start_page(), Some(PageId::Messages));
        assert!(!send.shows_start_page());
        assert!(!Command::Whoami.shows_start_page());
    }
}
