use std::fmt::Write;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::Serialize;
use uuid::Uuid;

use crate::filter::{FilterOptions, Predicates};
use crate::models::{
    DepartmentSatisfaction, KpiSummary, PerformanceBranch, RemoteCategoryCount, RemoteEfficiency,
    RetentionCount, TenureTrendPoint,
};
use crate::session::Session;
use crate::views;

const NO_DATA: &str = "No data for the current filters.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Json,
}

/// Every card and chart of the dashboard, computed for one set of filters.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub session_id: Uuid,
    pub source: String,
    pub loaded_at: DateTime<Utc>,
    pub load_error: Option<String>,
    pub filters: Predicates,
    pub kpis: KpiSummary,
    pub retention_by_job_title: Vec<RetentionCount>,
    pub performance_by_job_title: Vec<PerformanceBranch>,
    pub remote_efficiency_by_department: Vec<RemoteEfficiency>,
    pub remote_category_distribution: Vec<RemoteCategoryCount>,
    pub satisfaction_by_department: Vec<DepartmentSatisfaction>,
    pub performance_trend_by_tenure: Vec<TenureTrendPoint>,
}

impl Dashboard {
    pub fn build(session: &Session, predicates: &Predicates) -> Self {
        let filtered = session.filtered(predicates);

        Self {
            session_id: session.id,
            source: session.source().to_string(),
            loaded_at: session.loaded_at(),
            load_error: session.load_error().map(|err| err.to_string()),
            filters: predicates.clone(),
            kpis: views::kpi_summary(&filtered),
            retention_by_job_title: views::retention_by_job_title(&filtered),
            performance_by_job_title: views::performance_by_job_title(&filtered),
            remote_efficiency_by_department: views::remote_efficiency_by_department(&filtered),
            remote_category_distribution: views::remote_category_distribution(&filtered),
            satisfaction_by_department: views::satisfaction_by_department(&filtered),
            performance_trend_by_tenure: views::performance_trend_by_tenure(&filtered),
        }
    }
}

fn format_mean(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.2}"))
}

/// Groups the integer part with commas, e.g. `1234567.5` -> `1,234,567.50`.
fn format_currency(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::new();
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{fraction}")
}

fn describe_filters(predicates: &Predicates) -> String {
    if predicates.is_unrestricted() {
        return "all employees".to_string();
    }
    let mut parts = vec![
        format!("employee {}", predicates.employee_id),
        format!("department {}", predicates.department),
        format!("job title {}", predicates.job_title),
        format!("remote type {}", predicates.remote_category),
    ];
    if let Some(range) = predicates.hire_date_range {
        parts.push(format!("hired {} to {}", range.start, range.end));
    }
    parts.join(", ")
}

pub fn render_markdown(dashboard: &Dashboard) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Employee Performance Dashboard");
    let _ = writeln!(
        output,
        "Generated for {} (data loaded {})",
        describe_filters(&dashboard.filters),
        dashboard.loaded_at.format("%Y-%m-%d %H:%M UTC")
    );
    if let Some(error) = &dashboard.load_error {
        let _ = writeln!(output);
        let _ = writeln!(output, "> Failed to load data: {error}");
    }

    let kpis = &dashboard.kpis;
    let _ = writeln!(output);
    let _ = writeln!(output, "## Key Metrics");
    if kpis.employees == 0 {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        let _ = writeln!(output, "- Remote Work Efficiency: {:.2}", kpis.remote_work_efficiency);
        let _ = writeln!(output, "- Productivity Score: {:.2}", kpis.productivity_score);
        let _ = writeln!(output, "- Average Salary: {}", format_currency(kpis.average_salary));
        let _ = writeln!(output, "- Employees: {}", kpis.employees);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Employee Count by Retention Risk Level and Job Title");
    if dashboard.retention_by_job_title.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for row in &dashboard.retention_by_job_title {
            let _ = writeln!(
                output,
                "- {} / {}: {}",
                row.job_title, row.retention_risk_level, row.number_of_employees
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Performance Level Distribution by Job Title");
    if dashboard.performance_by_job_title.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for branch in &dashboard.performance_by_job_title {
            let _ = writeln!(
                output,
                "- {} ({} employees)",
                branch.job_title, branch.number_of_employees
            );
            for level in &branch.levels {
                let _ = writeln!(
                    output,
                    "  - {}: {} ({:.0}%)",
                    level.performance_level,
                    level.number_of_employees,
                    level.share_of_job_title * 100.0
                );
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Remote Work Efficiency by Department");
    if dashboard.remote_efficiency_by_department.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for row in &dashboard.remote_efficiency_by_department {
            let _ = writeln!(
                output,
                "- {} / {}: productivity {}",
                row.department,
                row.remote_work_category,
                format_mean(row.productivity_score)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Remote Work Type Distribution");
    if dashboard.remote_category_distribution.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for row in &dashboard.remote_category_distribution {
            let _ = writeln!(output, "- {}: {}", row.remote_work_category, row.count);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Average Satisfaction by Department");
    if dashboard.satisfaction_by_department.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for row in &dashboard.satisfaction_by_department {
            let _ = writeln!(
                output,
                "- {}: {}",
                row.department,
                format_mean(row.employee_satisfaction_score)
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Performance Trend by Years at Company");
    if dashboard.performance_trend_by_tenure.is_empty() {
        let _ = writeln!(output, "{NO_DATA}");
    } else {
        for point in &dashboard.performance_trend_by_tenure {
            let _ = writeln!(
                output,
                "- {:.2} years, {}: {}",
                point.years_bin,
                point.job_title,
                format_mean(point.performance_score)
            );
        }
    }

    output
}

pub fn render(dashboard: &Dashboard, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Markdown => Ok(render_markdown(dashboard)),
        OutputFormat::Json => serde_json::to_string_pretty(dashboard),
    }
}

pub fn render_options(options: &FilterOptions, format: OutputFormat) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(options);
    }

    let mut output = String::new();
    let sections = [
        ("Employee IDs", &options.employee_ids),
        ("Departments", &options.departments),
        ("Job Titles", &options.job_titles),
        ("Remote Work Types", &options.remote_categories),
    ];
    for (title, values) in sections {
        let _ = writeln!(output, "## {title}");
        for value in values {
            let _ = writeln!(output, "- {value}");
        }
        let _ = writeln!(output);
    }

    let _ = writeln!(output, "## Hire Date Range");
    match options.hire_date_bounds {
        Some(range) => {
            let _ = writeln!(output, "{} to {}", range.start, range.end);
        }
        None => {
            let _ = writeln!(output, "No hire dates available.");
        }
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selection;
    use crate::loader::{parse_table, DataSource};

    const SHEET: &str = "\
Employee_ID,Department,Job_Title,Hire_Date,Remote_Work_Category,Productivity score,Annual Salary,Remote_Work_Efficiency,Employee_Satisfaction_Score,Performance_Score,Performance_Level,Retention_Risk_Level
E1,Sales,Analyst,2018-01-01,Hybrid,70,1234567.5,0.8,4,60,Low,High
E2,IT,Engineer,2020-01-01,Work From Home,90,80000,1.2,5,85,High,Low
";

    fn session() -> Session {
        Session::from_table(
            DataSource::File("employees.csv".into()),
            parse_table(SHEET.as_bytes()).unwrap(),
        )
    }

    #[test]
    fn formats_currency_with_grouping() {
        assert_eq!(format_currency(1234567.5), "$1,234,567.50");
        assert_eq!(format_currency(999.0), "$999.00");
        assert_eq!(format_currency(0.0), "$0.00");
    }

    #[test]
    fn renders_every_section() {
        let dashboard = Dashboard::build(&session(), &Predicates::default());
        let markdown = render_markdown(&dashboard);

        assert!(markdown.contains("Generated for all employees"));
        assert!(markdown.contains("- Employees: 2"));
        assert!(markdown.contains("- Analyst / High: 1"));
        assert!(markdown.contains("- Engineer (1 employees)"));
        assert!(markdown.contains("- IT / Work From Home: productivity 90.00"));
        assert!(markdown.contains("- Sales: 4.00"));
        assert!(markdown.contains("## Performance Trend by Years at Company"));
        assert!(!markdown.contains(NO_DATA));
    }

    #[test]
    fn empty_selection_renders_placeholders() {
        let predicates = Predicates {
            department: Selection::parse("Legal"),
            ..Default::default()
        };
        let dashboard = Dashboard::build(&session(), &predicates);
        let markdown = render_markdown(&dashboard);

        assert!(markdown.contains("department Legal"));
        assert_eq!(markdown.matches(NO_DATA).count(), 7);
    }

    #[test]
    fn lists_filter_options() {
        let options = session().options();
        let markdown = render_options(&options, OutputFormat::Markdown).unwrap();
        assert!(markdown.contains("## Departments\n- All\n- IT\n- Sales\n"));
        assert!(markdown.contains("2018-01-01 to 2020-01-01"));
    }

    #[test]
    fn dashboard_serializes_to_json() {
        let dashboard = Dashboard::build(&session(), &Predicates::default());
        let rendered = render(&dashboard, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["kpis"]["employees"], 2);
        assert_eq!(value["filters"]["department"], "All");
        assert_eq!(value["remote_category_distribution"].as_array().unwrap().len(), 2);
    }
}
