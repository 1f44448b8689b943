use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Serialize, Serializer};

use crate::models::{EmployeeRecord, EmployeeTable, TextField};

pub const ALL: &str = "All";

pub const REMOTE_OPTIONS: [&str; 4] = [ALL, "Work From Home", "Work From Office", "Hybrid"];

/// A single sidebar selection: either no restriction or an exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    pub fn parse(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selection::All => ALL,
            Selection::Only(value) => value,
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => value == Some(expected.as_str()),
        }
    }
}

impl From<Option<String>> for Selection {
    fn from(value: Option<String>) -> Self {
        value.as_deref().map(Selection::parse).unwrap_or_default()
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Selection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// The full set of active selections, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Predicates {
    pub employee_id: Selection,
    pub department: Selection,
    pub job_title: Selection,
    pub remote_category: Selection,
    pub hire_date_range: Option<DateRange>,
}

impl Predicates {
    pub fn matches(&self, row: &EmployeeRecord) -> bool {
        self.employee_id.matches(row.text(TextField::EmployeeId))
            && self.department.matches(row.text(TextField::Department))
            && self.job_title.matches(row.text(TextField::JobTitle))
            && self
                .remote_category
                .matches(row.text(TextField::RemoteWorkCategory))
            && match self.hire_date_range {
                None => true,
                Some(range) => row.hire_date.is_some_and(|date| range.contains(date)),
            }
    }

    pub fn is_unrestricted(&self) -> bool {
        *self == Predicates::default()
    }
}

/// Returns the rows of `table` matching every predicate. The source is not
/// modified.
pub fn filter(table: &EmployeeTable, predicates: &Predicates) -> EmployeeTable {
    let rows = table
        .rows
        .iter()
        .filter(|row| predicates.matches(row))
        .cloned()
        .collect();
    table.with_rows(rows)
}

/// Choices offered by the sidebar, always computed from the unfiltered table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub employee_ids: Vec<String>,
    pub departments: Vec<String>,
    pub job_titles: Vec<String>,
    pub remote_categories: Vec<String>,
    pub hire_date_bounds: Option<DateRange>,
}

impl FilterOptions {
    pub fn from_table(table: &EmployeeTable) -> Self {
        let dates = table.rows.iter().filter_map(|row| row.hire_date);
        let hire_date_bounds = dates
            .clone()
            .min()
            .zip(dates.max())
            .map(|(start, end)| DateRange { start, end });

        Self {
            employee_ids: distinct_with_all(table, TextField::EmployeeId),
            departments: distinct_with_all(table, TextField::Department),
            job_titles: distinct_with_all(table, TextField::JobTitle),
            remote_categories: REMOTE_OPTIONS.iter().map(|v| v.to_string()).collect(),
            hire_date_bounds,
        }
    }
}

fn distinct_with_all(table: &EmployeeTable, field: TextField) -> Vec<String> {
    let values: BTreeSet<&str> = table
        .rows
        .iter()
        .filter_map(|row| row.text(field))
        .filter(|value| *value != ALL)
        .collect();
    std::iter::once(ALL)
        .chain(values)
        .map(str::to_string)
        .collect()
}
