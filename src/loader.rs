use std::collections::BTreeSet;
use std::fmt;
use std::io::Read;
use std::path::PathBuf;

use csv::StringRecord;
use tracing::{error, info};

use crate::error::LoadError;
use crate::models::{EmployeeRecord, EmployeeTable, NumericField, TextField, HIRE_DATE_COLUMN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Url(String),
    File(PathBuf),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Url(url) => write!(f, "{url}"),
            DataSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Result of a load. `table` is empty whenever `error` is set.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub table: EmployeeTable,
    pub error: Option<LoadError>,
}

pub async fn load(client: &reqwest::Client, source: &DataSource) -> LoadOutcome {
    match fetch_table(client, source).await {
        Ok(table) => {
            info!(source = %source, rows = table.len(), "loaded employee sheet");
            LoadOutcome { table, error: None }
        }
        Err(err) => {
            error!(source = %source, error = %err, "failed to load data");
            LoadOutcome {
                table: EmployeeTable::default(),
                error: Some(err),
            }
        }
    }
}

async fn fetch_table(
    client: &reqwest::Client,
    source: &DataSource,
) -> Result<EmployeeTable, LoadError> {
    match source {
        DataSource::Url(url) => {
            let response = client
                .get(url)
                .send()
                .await
                .map_err(|source| LoadError::Fetch {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }

            let body = response.bytes().await.map_err(|source| LoadError::Fetch {
                url: url.clone(),
                source,
            })?;
            parse_table(body.as_ref())
        }
        DataSource::File(path) => {
            let body = tokio::fs::read(path).await.map_err(|source| LoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
            parse_table(body.as_slice())
        }
    }
}

/// Parses comma-delimited text with a header row. Columns the dashboard does
/// not know about are ignored; known columns that are missing leave the
/// corresponding fields empty.
pub fn parse_table<R: Read>(input: R) -> Result<EmployeeTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns: BTreeSet<String> = headers.iter().map(str::to_string).collect();
    let position = |name: &str| headers.iter().position(|header| header == name);

    let text_columns: Vec<(TextField, Option<usize>)> = TextField::ALL
        .iter()
        .map(|field| (*field, position(field.column())))
        .collect();
    let numeric_columns: Vec<(NumericField, Option<usize>)> = NumericField::ALL
        .iter()
        .map(|field| (*field, position(field.column())))
        .collect();
    let hire_date_column = position(HIRE_DATE_COLUMN);

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = EmployeeRecord::default();

        for (field, index) in &text_columns {
            row.set_text(*field, cell(&record, *index).map(str::to_string));
        }
        for (field, index) in &numeric_columns {
            let value = cell(&record, *index).and_then(|raw| raw.parse::<f64>().ok());
            row.set_numeric(*field, value.filter(|v| v.is_finite()));
        }
        row.hire_date_raw = cell(&record, hire_date_column).map(str::to_string);

        rows.push(row);
    }

    Ok(EmployeeTable::new(columns, rows))
}

fn cell(record: &StringRecord, index: Option<usize>) -> Option<&str> {
    index
        .and_then(|i| record.get(i))
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
