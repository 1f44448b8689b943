//! Aggregations feeding the dashboard cards and charts.
//!
//! Every function here is pure over the (already filtered) table and returns
//! an empty or zeroed result for an empty table. Grouped views skip rows whose
//! group key is missing and list groups in ascending key order.

use std::collections::BTreeMap;

use tracing::warn;

use crate::models::{
    DepartmentSatisfaction, EmployeeRecord, EmployeeTable, KpiSummary, NumericField,
    PerformanceBranch, PerformanceLevelCount, RemoteCategoryCount, RemoteEfficiency,
    RetentionCount, TenureTrendPoint, TextField,
};

pub const TENURE_BIN_COUNT: usize = 10;

#[derive(Debug, Default, Clone, Copy)]
struct MeanAccumulator {
    sum: f64,
    present: usize,
}

impl MeanAccumulator {
    fn push(&mut self, value: Option<f64>) {
        if let Some(value) = value {
            self.sum += value;
            self.present += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.present == 0 {
            None
        } else {
            Some(self.sum / self.present as f64)
        }
    }
}

fn column_present(table: &EmployeeTable, field: NumericField) -> bool {
    let present = table.has_column(field.column());
    if !present {
        warn!(column = field.column(), "column missing from sheet");
    }
    present
}

/// Mean of a numeric column, or the field's placeholder when the column is
/// missing. A column with no values averages to zero.
fn column_mean(table: &EmployeeTable, field: NumericField) -> f64 {
    if !column_present(table, field) {
        return field.missing_default();
    }
    let mut acc = MeanAccumulator::default();
    for row in &table.rows {
        acc.push(row.numeric(field));
    }
    acc.mean().unwrap_or(0.0)
}

fn group_key<const N: usize>(row: &EmployeeRecord, fields: [TextField; N]) -> Option<[String; N]> {
    let mut key: [String; N] = std::array::from_fn(|_| String::new());
    for (slot, field) in key.iter_mut().zip(fields) {
        *slot = row.text(field)?.to_string();
    }
    Some(key)
}

fn count_by<const N: usize>(
    table: &EmployeeTable,
    fields: [TextField; N],
) -> BTreeMap<[String; N], usize> {
    let mut counts = BTreeMap::new();
    for row in &table.rows {
        if let Some(key) = group_key(row, fields) {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    counts
}

fn mean_by<const N: usize>(
    table: &EmployeeTable,
    fields: [TextField; N],
    value: NumericField,
) -> BTreeMap<[String; N], Option<f64>> {
    if !column_present(table, value) {
        return BTreeMap::new();
    }
    let mut groups: BTreeMap<[String; N], MeanAccumulator> = BTreeMap::new();
    for row in &table.rows {
        if let Some(key) = group_key(row, fields) {
            groups.entry(key).or_default().push(row.numeric(value));
        }
    }
    groups
        .into_iter()
        .map(|(key, acc)| (key, acc.mean()))
        .collect()
}

pub fn kpi_summary(table: &EmployeeTable) -> KpiSummary {
    if table.is_empty() {
        return KpiSummary::default();
    }
    KpiSummary {
        remote_work_efficiency: column_mean(table, NumericField::RemoteWorkEfficiency),
        productivity_score: column_mean(table, NumericField::ProductivityScore),
        average_salary: column_mean(table, NumericField::AnnualSalary),
        employees: table.len(),
    }
}

pub fn retention_by_job_title(table: &EmployeeTable) -> Vec<RetentionCount> {
    count_by(table, [TextField::JobTitle, TextField::RetentionRiskLevel])
        .into_iter()
        .map(|([job_title, retention_risk_level], number_of_employees)| RetentionCount {
            job_title,
            retention_risk_level,
            number_of_employees,
        })
        .collect()
}

/// Job title → performance level counts, with each level's share of its
/// job title for the proportional (tree) view.
pub fn performance_by_job_title(table: &EmployeeTable) -> Vec<PerformanceBranch> {
    let mut branches: Vec<PerformanceBranch> = Vec::new();

    for ([job_title, performance_level], count) in
        count_by(table, [TextField::JobTitle, TextField::PerformanceLevel])
    {
        let leaf = PerformanceLevelCount {
            performance_level,
            number_of_employees: count,
            share_of_job_title: 0.0,
        };
        if let Some(branch) = branches
            .last_mut()
            .filter(|branch| branch.job_title == job_title)
        {
            branch.number_of_employees += count;
            branch.levels.push(leaf);
        } else {
            branches.push(PerformanceBranch {
                job_title,
                number_of_employees: count,
                levels: vec![leaf],
            });
        }
    }

    for branch in &mut branches {
        let total = branch.number_of_employees as f64;
        for level in &mut branch.levels {
            level.share_of_job_title = level.number_of_employees as f64 / total;
        }
    }

    branches
}

pub fn remote_efficiency_by_department(table: &EmployeeTable) -> Vec<RemoteEfficiency> {
    mean_by(
        table,
        [TextField::Department, TextField::RemoteWorkCategory],
        NumericField::ProductivityScore,
    )
    .into_iter()
    .map(|([department, remote_work_category], productivity_score)| RemoteEfficiency {
        department,
        remote_work_category,
        productivity_score,
    })
    .collect()
}

/// Value counts, most common first.
pub fn remote_category_distribution(table: &EmployeeTable) -> Vec<RemoteCategoryCount> {
    let mut counts: Vec<RemoteCategoryCount> = count_by(table, [TextField::RemoteWorkCategory])
        .into_iter()
        .map(|([remote_work_category], count)| RemoteCategoryCount {
            remote_work_category,
            count,
        })
        .collect();
    counts.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.remote_work_category.cmp(&b.remote_work_category))
    });
    counts
}

pub fn satisfaction_by_department(table: &EmployeeTable) -> Vec<DepartmentSatisfaction> {
    mean_by(
        table,
        [TextField::Department],
        NumericField::EmployeeSatisfactionScore,
    )
    .into_iter()
    .map(|([department], employee_satisfaction_score)| DepartmentSatisfaction {
        department,
        employee_satisfaction_score,
    })
    .collect()
}

/// Equal-width tenure bins over an observed `[min, max]`, right-closed, with
/// the first edge nudged down so the minimum itself lands in the first bin.
#[derive(Debug, Clone, PartialEq)]
pub struct TenureBins {
    edges: [f64; TENURE_BIN_COUNT + 1],
}

impl TenureBins {
    /// A zero-width range is widened by 0.1% of the value on each side
    /// (0.001 when the value is zero) before splitting.
    pub fn fit(min: f64, max: f64) -> Self {
        let degenerate = max <= min;
        let (low, high) = if degenerate {
            let pad = if min == 0.0 { 0.001 } else { min.abs() * 0.001 };
            (min - pad, min + pad)
        } else {
            (min, max)
        };

        let width = (high - low) / TENURE_BIN_COUNT as f64;
        let mut edges: [f64; TENURE_BIN_COUNT + 1] =
            std::array::from_fn(|i| low + width * i as f64);
        edges[TENURE_BIN_COUNT] = high;
        if !degenerate {
            edges[0] -= (high - low) * 0.001;
        }
        Self { edges }
    }

    pub fn index(&self, value: f64) -> usize {
        self.edges[1..]
            .partition_point(|edge| *edge < value)
            .min(TENURE_BIN_COUNT - 1)
    }

    pub fn midpoint(&self, index: usize) -> f64 {
        (self.edges[index] + self.edges[index + 1]) / 2.0
    }
}

/// Mean performance per (tenure bin, job title). Bins are fitted to the rows
/// passed in, so they move with the active filters.
pub fn performance_trend_by_tenure(table: &EmployeeTable) -> Vec<TenureTrendPoint> {
    if !column_present(table, NumericField::PerformanceScore) {
        return Vec::new();
    }

    let tenures = table.rows.iter().filter_map(|row| row.years_at_company);
    let Some((min, max)) = tenures
        .clone()
        .reduce(f64::min)
        .zip(tenures.reduce(f64::max))
    else {
        return Vec::new();
    };
    let bins = TenureBins::fit(min, max);

    let mut groups: BTreeMap<(usize, String), MeanAccumulator> = BTreeMap::new();
    for row in &table.rows {
        let (Some(years), Some(job_title)) = (row.years_at_company, row.job_title.as_ref()) else {
            continue;
        };
        groups
            .entry((bins.index(years), job_title.clone()))
            .or_default()
            .push(row.performance_score);
    }

    groups
        .into_iter()
        .map(|((bin, job_title), acc)| TenureTrendPoint {
            years_bin: bins.midpoint(bin),
            job_title,
            performance_score: acc.mean(),
        })
        .collect()
}
