use std::fmt::Write;

use clap::ValueEnum;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::DeliveryError;
use crate::mailer::{Mailer, OutgoingMail};
use crate::models::{EmployeeRecord, EmployeeTable, TextField};

const MISSING: &str = "n/a";

/// Organisation-wide alert conditions. They are always checked against the
/// full sheet, never the filtered view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlertCondition {
    LowSatisfaction,
    LowPerformance,
    HighRetentionRisk,
}

impl AlertCondition {
    pub fn label(self) -> &'static str {
        match self {
            AlertCondition::LowSatisfaction => "Low Satisfaction",
            AlertCondition::LowPerformance => "Low Performance",
            AlertCondition::HighRetentionRisk => "High Retention Risk",
        }
    }

    pub fn subject(self) -> String {
        format!("🚨 {}", self.label())
    }

    pub fn header(self) -> String {
        format!("{} Employees:", self.label())
    }

    pub fn matches(self, row: &EmployeeRecord) -> bool {
        let (field, expected) = match self {
            AlertCondition::LowSatisfaction => (TextField::SatisfactionLevel, "Low"),
            AlertCondition::LowPerformance => (TextField::PerformanceLevel, "Low"),
            AlertCondition::HighRetentionRisk => (TextField::RetentionRiskLevel, "High"),
        };
        row.text(field) == Some(expected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertOutcome {
    pub condition: AlertCondition,
    pub sent: bool,
    pub count: usize,
}

impl AlertOutcome {
    /// Message shown to the user after the alert action.
    pub fn message(&self) -> String {
        if self.sent {
            format!("✅ {} email sent.", self.condition.label())
        } else {
            format!(
                "No employees with {}.",
                self.condition.label().to_lowercase()
            )
        }
    }
}

pub fn matching_rows(table: &EmployeeTable, condition: AlertCondition) -> Vec<&EmployeeRecord> {
    table.rows.iter().filter(|row| condition.matches(row)).collect()
}

pub fn format_line(row: &EmployeeRecord) -> String {
    format!(
        "EmpID: {}, Dept: {}, Job: {}",
        row.employee_id.as_deref().unwrap_or(MISSING),
        row.department.as_deref().unwrap_or(MISSING),
        row.job_title.as_deref().unwrap_or(MISSING)
    )
}

/// Builds the alert body, or `None` when no row matches.
pub fn compose_body(table: &EmployeeTable, condition: AlertCondition) -> Option<(usize, String)> {
    let rows = matching_rows(table, condition);
    if rows.is_empty() {
        return None;
    }

    let mut body = condition.header();
    for row in &rows {
        let _ = write!(body, "\n{}", format_line(row));
    }
    Some((rows.len(), body))
}

pub async fn notify(
    table: &EmployeeTable,
    condition: AlertCondition,
    mailer: &dyn Mailer,
    recipient: &str,
) -> Result<AlertOutcome, DeliveryError> {
    let Some((count, body)) = compose_body(table, condition) else {
        info!(condition = condition.label(), "no matching employees, nothing to send");
        return Ok(AlertOutcome {
            condition,
            sent: false,
            count: 0,
        });
    };

    let mail = OutgoingMail {
        to: recipient.to_string(),
        subject: condition.subject(),
        body,
    };

    if let Err(err) = mailer.send(&mail).await {
        warn!(condition = condition.label(), error = %err, "alert delivery failed");
        return Err(err);
    }

    info!(condition = condition.label(), count, to = recipient, "alert sent");
    Ok(AlertOutcome {
        condition,
        sent: true,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    impl RecordingMailer {
        fn sent(&self) -> Vec<OutgoingMail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, mail: &OutgoingMail) -> Result<(), DeliveryError> {
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _mail: &OutgoingMail) -> Result<(), DeliveryError> {
            Err(DeliveryError::Transport("535 authentication failed".to_string()))
        }
    }

    fn employee(id: &str, satisfaction: &str) -> EmployeeRecord {
        EmployeeRecord {
            employee_id: Some(id.to_string()),
            department: Some("Sales".to_string()),
            job_title: Some("Analyst".to_string()),
            satisfaction_level: Some(satisfaction.to_string()),
            performance_level: Some("Medium".to_string()),
            retention_risk_level: Some("Low".to_string()),
            ..Default::default()
        }
    }

    fn satisfaction_table() -> EmployeeTable {
        EmployeeTable::new(
            Default::default(),
            vec![
                employee("E1", "Low"),
                employee("E2", "High"),
                employee("E3", "Low"),
                employee("E4", "High"),
                employee("E5", "High"),
            ],
        )
    }

    #[tokio::test]
    async fn sends_one_line_per_matching_row() {
        let mailer = RecordingMailer::default();
        let outcome = notify(
            &satisfaction_table(),
            AlertCondition::LowSatisfaction,
            &mailer,
            "admin@example.com",
        )
        .await
        .unwrap();

        assert!(outcome.sent);
        assert_eq!(outcome.count, 2);
        assert_eq!(outcome.message(), "✅ Low Satisfaction email sent.");

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "admin@example.com");
        assert_eq!(sent[0].subject, "🚨 Low Satisfaction");
        assert_eq!(
            sent[0].body,
            "Low Satisfaction Employees:\n\
             EmpID: E1, Dept: Sales, Job: Analyst\n\
             EmpID: E3, Dept: Sales, Job: Analyst"
        );
        for excluded in ["E2", "E4", "E5"] {
            assert!(!sent[0].body.contains(excluded));
        }
    }

    #[tokio::test]
    async fn sends_nothing_when_no_rows_match() {
        let mailer = RecordingMailer::default();
        for condition in [AlertCondition::LowPerformance, AlertCondition::HighRetentionRisk] {
            let outcome = notify(&satisfaction_table(), condition, &mailer, "admin@example.com")
                .await
                .unwrap();
            assert!(!outcome.sent);
            assert_eq!(outcome.count, 0);
        }
        assert!(mailer.sent().is_empty());

        let outcome = notify(
            &EmployeeTable::default(),
            AlertCondition::LowSatisfaction,
            &mailer,
            "admin@example.com",
        )
        .await
        .unwrap();
        assert_eq!(outcome.message(), "No employees with low satisfaction.");
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_reported() {
        let result = notify(
            &satisfaction_table(),
            AlertCondition::LowSatisfaction,
            &FailingMailer,
            "admin@example.com",
        )
        .await;
        assert!(matches!(result, Err(DeliveryError::Transport(_))));
    }

    #[test]
    fn missing_fields_render_as_placeholder() {
        let row = EmployeeRecord {
            employee_id: Some("E7".to_string()),
            ..Default::default()
        };
        assert_eq!(format_line(&row), "EmpID: E7, Dept: n/a, Job: n/a");
    }

    #[test]
    fn conditions_use_fixed_subjects() {
        assert_eq!(AlertCondition::LowPerformance.subject(), "🚨 Low Performance");
        assert_eq!(
            AlertCondition::HighRetentionRisk.header(),
            "High Retention Risk Employees:"
        );
    }
}
