use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

/// Categorical columns read from the sheet, matched by exact header name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    EmployeeId,
    Department,
    JobTitle,
    RemoteWorkCategory,
    SatisfactionLevel,
    PerformanceLevel,
    RetentionRiskLevel,
}

impl TextField {
    pub const ALL: [TextField; 7] = [
        TextField::EmployeeId,
        TextField::Department,
        TextField::JobTitle,
        TextField::RemoteWorkCategory,
        TextField::SatisfactionLevel,
        TextField::PerformanceLevel,
        TextField::RetentionRiskLevel,
    ];

    pub fn column(self) -> &'static str {
        match self {
            TextField::EmployeeId => "Employee_ID",
            TextField::Department => "Department",
            TextField::JobTitle => "Job_Title",
            TextField::RemoteWorkCategory => "Remote_Work_Category",
            TextField::SatisfactionLevel => "Satisfaction_Level",
            TextField::PerformanceLevel => "Performance_Level",
            TextField::RetentionRiskLevel => "Retention_Risk_Level",
        }
    }
}

/// Numeric columns. Any of them may be missing from the source entirely, in
/// which case views fall back to [`NumericField::missing_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    ProductivityScore,
    EmployeeSatisfactionScore,
    PerformanceScore,
    AnnualSalary,
    RemoteWorkEfficiency,
}

impl NumericField {
    pub const ALL: [NumericField; 5] = [
        NumericField::ProductivityScore,
        NumericField::EmployeeSatisfactionScore,
        NumericField::PerformanceScore,
        NumericField::AnnualSalary,
        NumericField::RemoteWorkEfficiency,
    ];

    pub fn column(self) -> &'static str {
        match self {
            NumericField::ProductivityScore => "Productivity score",
            NumericField::EmployeeSatisfactionScore => "Employee_Satisfaction_Score",
            NumericField::PerformanceScore => "Performance_Score",
            NumericField::AnnualSalary => "Annual Salary",
            NumericField::RemoteWorkEfficiency => "Remote_Work_Efficiency",
        }
    }

    /// Placeholder reported when the column is absent from the sheet.
    pub fn missing_default(self) -> f64 {
        0.0
    }
}

pub const HIRE_DATE_COLUMN: &str = "Hire_Date";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EmployeeRecord {
    pub employee_id: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub remote_work_category: Option<String>,
    pub satisfaction_level: Option<String>,
    pub performance_level: Option<String>,
    pub retention_risk_level: Option<String>,
    pub hire_date_raw: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub years_at_company: Option<f64>,
    pub productivity_score: Option<f64>,
    pub employee_satisfaction_score: Option<f64>,
    pub performance_score: Option<f64>,
    pub annual_salary: Option<f64>,
    pub remote_work_efficiency: Option<f64>,
}

impl EmployeeRecord {
    pub fn text(&self, field: TextField) -> Option<&str> {
        let value = match field {
            TextField::EmployeeId => &self.employee_id,
            TextField::Department => &self.department,
            TextField::JobTitle => &self.job_title,
            TextField::RemoteWorkCategory => &self.remote_work_category,
            TextField::SatisfactionLevel => &self.satisfaction_level,
            TextField::PerformanceLevel => &self.performance_level,
            TextField::RetentionRiskLevel => &self.retention_risk_level,
        };
        value.as_deref()
    }

    pub fn set_text(&mut self, field: TextField, value: Option<String>) {
        let slot = match field {
            TextField::EmployeeId => &mut self.employee_id,
            TextField::Department => &mut self.department,
            TextField::JobTitle => &mut self.job_title,
            TextField::RemoteWorkCategory => &mut self.remote_work_category,
            TextField::SatisfactionLevel => &mut self.satisfaction_level,
            TextField::PerformanceLevel => &mut self.performance_level,
            TextField::RetentionRiskLevel => &mut self.retention_risk_level,
        };
        *slot = value;
    }

    pub fn numeric(&self, field: NumericField) -> Option<f64> {
        match field {
            NumericField::ProductivityScore => self.productivity_score,
            NumericField::EmployeeSatisfactionScore => self.employee_satisfaction_score,
            NumericField::PerformanceScore => self.performance_score,
            NumericField::AnnualSalary => self.annual_salary,
            NumericField::RemoteWorkEfficiency => self.remote_work_efficiency,
        }
    }

    pub fn set_numeric(&mut self, field: NumericField, value: Option<f64>) {
        let slot = match field {
            NumericField::ProductivityScore => &mut self.productivity_score,
            NumericField::EmployeeSatisfactionScore => &mut self.employee_satisfaction_score,
            NumericField::PerformanceScore => &mut self.performance_score,
            NumericField::AnnualSalary => &mut self.annual_salary,
            NumericField::RemoteWorkEfficiency => &mut self.remote_work_efficiency,
        };
        *slot = value;
    }
}

/// Rows loaded from the sheet plus the header names that were present.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmployeeTable {
    pub columns: BTreeSet<String>,
    pub rows: Vec<EmployeeRecord>,
}

impl EmployeeTable {
    pub fn new(columns: BTreeSet<String>, rows: Vec<EmployeeRecord>) -> Self {
        Self { columns, rows }
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A new table with the same columns and the given subset of rows.
    pub fn with_rows(&self, rows: Vec<EmployeeRecord>) -> Self {
        Self {
            columns: self.columns.clone(),
            rows,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub remote_work_efficiency: f64,
    pub productivity_score: f64,
    pub average_salary: f64,
    pub employees: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionCount {
    pub job_title: String,
    pub retention_risk_level: String,
    pub number_of_employees: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceLevelCount {
    pub performance_level: String,
    pub number_of_employees: usize,
    pub share_of_job_title: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceBranch {
    pub job_title: String,
    pub number_of_employees: usize,
    pub levels: Vec<PerformanceLevelCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteEfficiency {
    pub department: String,
    pub remote_work_category: String,
    pub productivity_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RemoteCategoryCount {
    pub remote_work_category: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepartmentSatisfaction {
    pub department: String,
    pub employee_satisfaction_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenureTrendPoint {
    pub years_bin: f64,
    pub job_title: String,
    pub performance_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub message: String,
}
