//! Command-line and environment configuration.
//!
//! Every setting can come from a flag or from the environment (a `.env` file
//! is loaded first if present).

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Args;

use crate::filter::{DateRange, Predicates, REMOTE_OPTIONS};
use crate::loader::DataSource;
use crate::mailer::SmtpSettings;

pub const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1OxU_4C8zAp_3sqcmj2dnn4YB7N6xcI6PUPLWSG-yl4E/export?format=csv";

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// CSV export URL of the employee sheet
    #[arg(long, global = true, env = "DASHBOARD_SHEET_URL", default_value = DEFAULT_SHEET_URL)]
    pub sheet_url: String,

    /// Read the sheet from a local CSV file instead of the URL
    #[arg(long, global = true, env = "DASHBOARD_CSV")]
    pub csv: Option<PathBuf>,
}

impl SourceArgs {
    pub fn data_source(&self) -> DataSource {
        match &self.csv {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Url(self.sheet_url.clone()),
        }
    }
}

/// Sidebar selections. Omitted flags (or the literal `All`) do not restrict.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    #[arg(long)]
    pub employee: Option<String>,

    #[arg(long)]
    pub department: Option<String>,

    #[arg(long)]
    pub job_title: Option<String>,

    #[arg(long, value_parser = REMOTE_OPTIONS)]
    pub remote: Option<String>,

    /// Start of the hire date range (YYYY-MM-DD), inclusive
    #[arg(long, requires = "hired_to")]
    pub hired_from: Option<NaiveDate>,

    /// End of the hire date range (YYYY-MM-DD), inclusive
    #[arg(long, requires = "hired_from")]
    pub hired_to: Option<NaiveDate>,
}

impl FilterArgs {
    pub fn predicates(&self) -> Predicates {
        Predicates {
            employee_id: self.employee.clone().into(),
            department: self.department.clone().into(),
            job_title: self.job_title.clone().into(),
            remote_category: self.remote.clone().into(),
            hire_date_range: self
                .hired_from
                .zip(self.hired_to)
                .map(|(start, end)| DateRange { start, end }),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct MailArgs {
    /// Address alerts are sent from
    #[arg(long, env = "ALERT_SENDER")]
    pub sender: Option<String>,

    /// Administrator address alerts are sent to
    #[arg(long, env = "ALERT_RECIPIENT")]
    pub recipient: Option<String>,

    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: Option<String>,

    /// Log the composed message instead of sending it
    #[arg(long)]
    pub dry_run: bool,
}

impl MailArgs {
    pub fn recipient(&self) -> anyhow::Result<&str> {
        self.recipient
            .as_deref()
            .context("ALERT_RECIPIENT must be set to the administrator's address")
    }

    pub fn smtp_settings(&self) -> anyhow::Result<SmtpSettings> {
        let sender = self
            .sender
            .clone()
            .context("ALERT_SENDER must be set to send alerts")?;
        Ok(SmtpSettings {
            host: self.smtp_host.clone(),
            port: self.smtp_port,
            username: self.smtp_username.clone().or_else(|| Some(sender.clone())),
            password: self.smtp_password.clone(),
            sender,
        })
    }
}
