use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod alert;
mod chat;
mod config;
mod derive;
mod error;
mod filter;
mod loader;
mod mailer;
mod models;
mod refresh;
mod report;
mod session;
mod views;

use alert::AlertCondition;
use config::{FilterArgs, MailArgs, SourceArgs};
use mailer::{LogMailer, Mailer, SmtpMailer};
use models::ChatRole;
use report::{Dashboard, OutputFormat};
use session::Session;

#[derive(Parser)]
#[command(name = "employee-dashboard")]
#[command(about = "Employee performance dashboard over a shared spreadsheet", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the dashboard for the selected filters
    Report {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// List the values each filter accepts
    Options {
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
    },
    /// Email the administrator the employees matching a condition
    Alert {
        #[arg(value_enum)]
        condition: AlertCondition,
        #[command(flatten)]
        mail: MailArgs,
    },
    /// Reload the sheet on an interval and rewrite the dashboard each time
    Watch {
        #[command(flatten)]
        filters: FilterArgs,
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,
        #[arg(long, default_value = "dashboard.md")]
        out: PathBuf,
        #[arg(long, env = "REFRESH_INTERVAL_SECS", default_value_t = 300)]
        interval_secs: u64,
    },
    /// Ask questions in an interactive chat (/clear to reset, /quit to exit)
    Chat,
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("employee_dashboard={log_level},info").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn write_output(out: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Dashboard written to {}.", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

async fn run_chat(session: &mut Session) -> anyhow::Result<()> {
    println!("Chatbot ready. Type a question, /clear to delete the history, /quit to exit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        match line.trim() {
            "/quit" => break,
            "/clear" => {
                session.chat_mut().clear();
                println!("Chat history deleted.");
            }
            question => {
                if let Some(reply) = session.chat_mut().submit(question) {
                    println!("bot> {}", reply.message);
                }
            }
        }
    }

    if session.chat().is_empty() {
        return Ok(());
    }
    for message in session.chat().messages() {
        let speaker = match message.role {
            ChatRole::User => "you",
            ChatRole::Bot => "bot",
        };
        info!(session = %session.id, "{speaker}: {}", message.message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let mut session = Session::start(&client, cli.source.data_source()).await;
    if let Some(err) = session.load_error() {
        eprintln!("Failed to load data: {err}");
    }

    match cli.command {
        Commands::Report {
            filters,
            format,
            out,
        } => {
            let dashboard = Dashboard::build(&session, &filters.predicates());
            let rendered = report::render(&dashboard, format)?;
            write_output(out.as_deref(), &rendered)?;
        }
        Commands::Options { format } => {
            let rendered = report::render_options(&session.options(), format)?;
            print!("{rendered}");
        }
        Commands::Alert { condition, mail } => {
            let recipient = mail.recipient()?;
            let mailer: Box<dyn Mailer> = if mail.dry_run {
                Box::new(LogMailer)
            } else {
                Box::new(
                    SmtpMailer::new(&mail.smtp_settings()?)
                        .context("failed to configure SMTP transport")?,
                )
            };

            match alert::notify(session.table(), condition, mailer.as_ref(), recipient).await {
                Ok(outcome) => println!("{}", outcome.message()),
                Err(err) => println!("Failed to send {} email: {err}", condition.label()),
            }
        }
        Commands::Watch {
            filters,
            format,
            out,
            interval_secs,
        } => {
            let predicates = filters.predicates();
            refresh::run(
                &mut session,
                &client,
                Duration::from_secs(interval_secs),
                |session| {
                    let dashboard = Dashboard::build(session, &predicates);
                    write_output(Some(out.as_path()), &report::render(&dashboard, format)?)
                },
                async {
                    let _ = tokio::signal::ctrl_c().await;
                },
            )
            .await?;
        }
        Commands::Chat => run_chat(&mut session).await?,
    }

    Ok(())
}
