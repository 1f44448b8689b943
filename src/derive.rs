use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::models::EmployeeTable;

const DAYS_PER_YEAR: f64 = 365.25;

const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

/// Best-effort hire date parsing; anything unrecognised is treated as missing.
pub fn parse_hire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|parsed| parsed.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        })
}

pub fn years_between(hire_date: NaiveDate, today: NaiveDate) -> f64 {
    (today - hire_date).num_days() as f64 / DAYS_PER_YEAR
}

/// Fills `hire_date` and `years_at_company` on every row.
pub fn derive(table: &EmployeeTable, today: NaiveDate) -> EmployeeTable {
    let rows = table
        .rows
        .iter()
        .map(|row| {
            let mut row = row.clone();
            row.hire_date = row.hire_date_raw.as_deref().and_then(parse_hire_date);
            row.years_at_company = row.hire_date.map(|date| years_between(date, today));
            row
        })
        .collect();

    table.with_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmployeeRecord;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_common_formats() {
        assert_eq!(parse_hire_date("2020-01-15"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("2020-01-15 08:30:00"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("2020-01-15T08:30:00"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("2020-01-15T08:30:00Z"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("01/15/2020"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("2020/01/15"), Some(date(2020, 1, 15)));
    }

    #[test]
    fn parses_sheet_export_datetimes() {
        assert_eq!(parse_hire_date("1/15/2020 8:30:00"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("12/3/2019 17:05:59"), Some(date(2019, 12, 3)));
        assert_eq!(parse_hire_date("2020-01-15 08:30"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("1/15/2020 8:30"), Some(date(2020, 1, 15)));
        assert_eq!(parse_hire_date("1/15/2020"), Some(date(2020, 1, 15)));
    }

    #[test]
    fn unparsable_dates_are_missing() {
        assert_eq!(parse_hire_date(""), None);
        assert_eq!(parse_hire_date("soon"), None);
        assert_eq!(parse_hire_date("2020-13-45"), None);
    }

    #[test]
    fn derives_tenure_in_years() {
        let today = date(2024, 1, 1);
        let table = EmployeeTable::new(
            Default::default(),
            vec![
                EmployeeRecord {
                    hire_date_raw: Some("2022-01-01".to_string()),
                    ..Default::default()
                },
                EmployeeRecord {
                    hire_date_raw: Some("garbage".to_string()),
                    ..Default::default()
                },
            ],
        );

        let derived = derive(&table, today);
        let years = derived.rows[0].years_at_company.unwrap();
        assert!((years - 730.0 / 365.25).abs() < 1e-9);
        assert_eq!(derived.rows[1].hire_date, None);
        assert_eq!(derived.rows[1].years_at_company, None);
        // source table untouched
        assert_eq!(table.rows[0].hire_date, None);
    }
}
