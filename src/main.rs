//! TicketApp CLI
//!
//! Command-line driver over the file-backed stores:
//! - Sign up, log in and out
//! - List, create, edit and delete tickets
//! - Show dashboard statistics

use anyhow::{anyhow, bail, Context};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use ticketapp::config::{generate_default_config, Config};
use ticketapp::dashboard::{Dashboard, DashboardEntry, SaveOutcome};
use ticketapp::session::{AuthService, SessionGate, SignupRequest};
use ticketapp::storage::{FileStore, KeyValueStore};
use ticketapp::tickets::{DeleteOutcome, Ticket, TicketStatus};
use ticketapp::{Clock, SystemClock};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ticketapp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track support tickets from the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: searched in standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Data directory, overrides the config file
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an account
    Signup {
        email: String,
        /// Full name
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },

    /// Log in with the registered account
    Login {
        email: String,
        #[arg(short, long)]
        password: String,
    },

    /// End the current session
    Logout,

    /// Show the logged-in email
    Whoami,

    /// List tickets
    List {
        /// Only tickets with this status (open, in_progress, closed)
        #[arg(short, long)]
        status: Option<TicketStatus>,
        /// Case-insensitive text search over title and description
        #[arg(short = 'q', long)]
        search: Option<String>,
    },

    /// Create a ticket
    Create {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// open, in_progress or closed
        #[arg(short, long, default_value = "open")]
        status: String,
    },

    /// Edit a ticket; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Delete a ticket
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show ticket counts and the last seven days of activity
    Stats,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Both stores plus the clock, opened from config
struct Stores {
    session: Arc<dyn KeyValueStore>,
    local: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl Stores {
    fn open(config: &Config) -> anyhow::Result<Self> {
        let session = FileStore::open(config.storage.session_file())
            .context("Failed to open session store")?;
        let local =
            FileStore::open(config.storage.local_file()).context("Failed to open local store")?;
        Ok(Self {
            session: Arc::new(session),
            local: Arc::new(local),
            clock: Arc::new(SystemClock),
        })
    }

    fn dashboard(&self, config: &Config) -> anyhow::Result<Dashboard> {
        let entry = Dashboard::open(
            self.session.clone(),
            self.local.clone(),
            self.clock.clone(),
            config.dashboard.dashboard_config(),
        )?;

        match entry {
            DashboardEntry::Ready(dashboard) => Ok(*dashboard),
            DashboardEntry::Redirect(nav) => Err(anyhow!(
                "Not logged in (redirect to {}). Run `ticketapp login` first.",
                nav.target()
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    init_logging(&config);
    tracing::debug!("Data directory: {:?}", config.storage.data_path());

    let json = cli.format == "json";

    match cli.command {
        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Wrote default config to {}", path.display());
                }
                None => print!("{}", content),
            }
        }

        Commands::Signup {
            email,
            name,
            password,
            confirm,
        } => {
            let stores = Stores::open(&config)?;
            let auth = AuthService::new(
                stores.session.clone(),
                stores.clock.clone(),
                config.session.auth_config(),
            );
            let request = SignupRequest {
                full_name: name,
                email,
                password,
                confirm_password: confirm,
            };

            let nav = auth.signup(request, cancel_on_ctrl_c()).await?;
            println!("Account created. Next: {}", nav.target());
        }

        Commands::Login { email, password } => {
            let stores = Stores::open(&config)?;
            let gate = SessionGate::new(stores.session.clone(), stores.clock.clone());
            if gate.redirect_if_authenticated().is_some() {
                if let Some(session) = gate.current() {
                    println!("Already logged in as {}", session.email);
                }
                return Ok(());
            }

            let auth = AuthService::new(
                stores.session.clone(),
                stores.clock.clone(),
                config.session.auth_config(),
            );
            let success = auth.login(&email, &password, cancel_on_ctrl_c()).await?;
            println!(
                "Login successful! Session valid until {}",
                format_millis(success.session.expires_at)
            );
        }

        Commands::Logout => {
            let stores = Stores::open(&config)?;
            let gate = SessionGate::new(stores.session.clone(), stores.clock.clone());
            match gate.current() {
                Some(session) => {
                    gate.end_session();
                    println!("Logged out {}", session.email);
                }
                None => println!("Not logged in"),
            }
        }

        Commands::Whoami => {
            let stores = Stores::open(&config)?;
            let dashboard = stores.dashboard(&config)?;
            println!("{}", dashboard.email());
        }

        Commands::List { status, search } => {
            let stores = Stores::open(&config)?;
            let dashboard = stores.dashboard(&config)?;
            let store = dashboard.store();

            let mut tickets = store.search(search.as_deref().unwrap_or(""));
            if let Some(status) = status {
                let with_status = store.filter_status(status);
                tickets.retain(|t| with_status.iter().any(|s| s.id == t.id));
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&tickets)?);
            } else if tickets.is_empty() {
                println!("No tickets");
            } else {
                print_ticket_table(&tickets);
            }
        }

        Commands::Create {
            title,
            description,
            status,
        } => {
            let stores = Stores::open(&config)?;
            let mut dashboard = stores.dashboard(&config)?;

            dashboard.open_create();
            if let Some(form) = dashboard.form_mut() {
                form.title = title;
                form.description = description;
                form.status = status;
            }

            report_save(dashboard.save()?, json)?;
        }

        Commands::Edit {
            id,
            title,
            description,
            status,
        } => {
            let stores = Stores::open(&config)?;
            let mut dashboard = stores.dashboard(&config)?;

            dashboard.open_edit(&id)?;
            if let Some(form) = dashboard.form_mut() {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                if let Some(status) = status {
                    form.status = status;
                }
            }

            report_save(dashboard.save()?, json)?;
        }

        Commands::Delete { id, yes } => {
            let stores = Stores::open(&config)?;
            let mut dashboard = stores.dashboard(&config)?;

            let outcome = if yes {
                dashboard.delete(&id, &|_: &str| true)?
            } else {
                dashboard.delete(&id, &prompt_yes_no)?
            };

            match outcome {
                DeleteOutcome::Deleted(ticket) => println!("Ticket deleted: {}", ticket.id),
                DeleteOutcome::Declined => println!("Cancelled"),
            }
        }

        Commands::Stats => {
            let stores = Stores::open(&config)?;
            let dashboard = stores.dashboard(&config)?;
            let stats = dashboard.stats();
            let histogram = dashboard.histogram(&Local);

            if json {
                let body = serde_json::json!({
                    "stats": stats,
                    "last_7_days": histogram,
                });
                println!("{}", serde_json::to_string_pretty(&body)?);
            } else {
                println!("Total tickets: {}", stats.total);
                println!("Open:          {}", stats.open);
                println!("In progress:   {}", stats.in_progress);
                println!("Resolved:      {}", stats.resolved);
                println!();
                println!("Created in the last 7 days:");
                for bucket in histogram {
                    println!(
                        "  {:<7} {:>3} {}",
                        bucket.label,
                        bucket.count,
                        "#".repeat(bucket.count)
                    );
                }
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("ticketapp={}", config.logging.level).into());
    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Token cancelled when the user presses Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            child.cancel();
        }
    });
    token
}

fn prompt_yes_no(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    if std::io::stdout().flush().is_err() {
        return false;
    }

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
}

fn report_save(outcome: SaveOutcome, json: bool) -> anyhow::Result<()> {
    let (verb, ticket) = match outcome {
        SaveOutcome::Created(ticket) => ("created", ticket),
        SaveOutcome::Updated(ticket) => ("updated", ticket),
        SaveOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
            bail!("Ticket not saved");
        }
        SaveOutcome::NothingToSave => bail!("No ticket form open"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&ticket)?);
    } else {
        println!("Ticket {}: {} ({})", verb, ticket.id, ticket.title);
    }
    Ok(())
}

fn print_ticket_table(tickets: &[&Ticket]) {
    println!("{:<18} {:<12} {:<17} TITLE", "ID", "STATUS", "CREATED");
    for ticket in tickets {
        println!(
            "{:<18} {:<12} {:<17} {}",
            ticket.id,
            ticket.status.label(),
            format_millis(ticket.created_at),
            ticket.title
        );
    }
}

fn format_millis(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
