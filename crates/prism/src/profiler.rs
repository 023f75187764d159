// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2025 Prism Project
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

use crate::error::{DataError, DataResult};
use crate::histogram::HistogramGrid;
use chrono::NaiveDate;
use itertools::Itertools;
use polars::prelude::QuantileMethod;
use polars::prelude::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const EPOCH_DAY_FROM_CE: i32 = 719_163;
const SUMMARY_STATISTICS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnKind {
    Numeric,
    Datetime,
    Other,
}
impl ColumnKind {
    pub fn of(dtype: &DataType) -> Self {
        match dtype {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64 => ColumnKind::Numeric,
            DataType::Date | DataType::Datetime(_, _) => ColumnKind::Datetime,
            _ => ColumnKind::Other,
        }
    }
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Numeric)
    }
    pub fn is_datetime(&self) -> bool {
        matches!(self, ColumnKind::Datetime)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueRange {
    Numeric {
        min: Option<f64>,
        max: Option<f64>,
        mean: Option<f64>,
    },
    Dates {
        min: String,
        max: String,
    },
    None,
}
impl ValueRange {
    pub fn render(&self) -> Option<String> {
        match self {
            ValueRange::Numeric { min, max, mean } => Some(format!(
                "({}, {}, {})",
                format_value(*min),
                format_value(*max),
                format_value(*mean)
            )),
            ValueRange::Dates { min, max } => Some(format!("({min}, {max})")),
            ValueRange::None => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub dtype: String,
    pub kind: ColumnKind,
    pub num_unique: usize,
    pub num_null: usize,
    pub pct_null: f64,
    pub unique_values: Vec<String>,
    pub range: ValueRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingDateFinding {
    pub column: String,
    pub is_index: bool,
    pub missing: Vec<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexSpec {
    #[default]
    Positional,
    Column(String),
}

#[derive(Debug, Clone)]
pub struct ProfilerConfig {
    pub index: IndexSpec,
    pub histogram_bins: usize,
}
impl Default for ProfilerConfig {
    fn default() -> Self {
        Self {
            index: IndexSpec::Positional,
            histogram_bins: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportOptions {
    pub summary_stats: bool,
    pub histograms: bool,
    pub missing_dates: bool,
}
impl ReportOptions {
    pub fn all() -> Self {
        Self {
            summary_stats: true,
            histograms: true,
            missing_dates: true,
        }
    }
    pub fn descriptors_only() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone)]
pub struct DatasetReport {
    pub row_count: usize,
    pub column_count: usize,
    pub descriptors: Vec<ColumnDescriptor>,
    pub summary: Option<DataFrame>,
    pub histograms: Option<HistogramGrid>,
    pub missing_dates: Vec<MissingDateFinding>,
}
impl DatasetReport {
    pub fn to_dataframe(&self) -> DataResult<DataFrame> {
        let names: Vec<String> = self.descriptors.iter().map(|d| d.name.clone()).collect();
        let dtypes: Vec<String> = self.descriptors.iter().map(|d| d.dtype.clone()).collect();
        let num_unique: Vec<u64> = self.descriptors.iter().map(|d| d.num_unique as u64).collect();
        let num_null: Vec<u64> = self.descriptors.iter().map(|d| d.num_null as u64).collect();
        let pct_null: Vec<f64> = self.descriptors.iter().map(|d| d.pct_null).collect();
        let unique_values: Vec<String> = self
            .descriptors
            .iter()
            .map(|d| format!("[{}]", d.unique_values.iter().join(", ")))
            .collect();
        let ranges: Vec<Option<String>> = self.descriptors.iter().map(|d| d.range.render()).collect();
        let table = df!(
            "col_name" => names,
            "dtype" => dtypes,
            "num_unique" => num_unique,
            "num_null" => num_null,
            "pct_null" => pct_null,
            "unique_values" => unique_values,
            "range (min, max, mean)" => ranges,
        )?;
        Ok(table)
    }
    pub fn export_json(&self) -> DataResult<String> {
        serde_json::to_string_pretty(&self.descriptors).map_err(|e| DataError::ColumnProfiling {
            column: "<report>".to_string(),
            reason: format!("JSON serialisation failed: {e}"),
        })
    }
    pub fn descriptor(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }
}

pub struct Profiler {
    config: ProfilerConfig,
}
impl Profiler {
    pub fn new() -> Self {
        Self {
            config: ProfilerConfig::default(),
        }
    }
    pub fn with_config(config: ProfilerConfig) -> Self {
        Self { config }
    }
    pub fn profile(&self, df: &DataFrame, opts: &ReportOptions) -> DataResult<DatasetReport> {
        let total_rows = df.height();
        let (index_descriptor, index_finding, swept) = self.profile_index(df, opts)?;
        let column_count = swept.len();
        log::debug!("profiling {column_count} columns over {total_rows} rows");
        let column_results: Vec<(ColumnDescriptor, Option<MissingDateFinding>)> = swept
            .par_iter()
            .map(|series| profile_series(series, total_rows, opts.missing_dates, false))
            .collect::<DataResult<Vec<_>>>()?;

        let mut descriptors = Vec::with_capacity(1 + column_results.len());
        let mut missing_dates = Vec::new();
        descriptors.push(index_descriptor);
        if let Some(finding) = index_finding {
            missing_dates.push(finding);
        }
        for (descriptor, finding) in column_results {
            descriptors.push(descriptor);
            if let Some(finding) = finding {
                missing_dates.push(finding);
            }
        }

        let summary = if opts.summary_stats {
            Some(self.describe(df)?)
        } else {
            None
        };
        let histograms = if opts.histograms {
            Some(HistogramGrid::from_dataframe(df, self.config.histogram_bins)?)
        } else {
            None
        };

        Ok(DatasetReport {
            row_count: total_rows,
            column_count,
            descriptors,
            summary,
            histograms,
            missing_dates,
        })
    }
    fn profile_index<'a>(
        &self,
        df: &'a DataFrame,
        opts: &ReportOptions,
    ) -> DataResult<(
        ColumnDescriptor,
        Option<MissingDateFinding>,
        Vec<&'a Series>,
    )> {
        match &self.config.index {
            IndexSpec::Positional => {
                let swept = df
                    .get_columns()
                    .iter()
                    .map(|c| c.as_materialized_series())
                    .collect();
                Ok((positional_descriptor(df.height()), None, swept))
            }
            IndexSpec::Column(name) => {
                let column = df.column(name).map_err(|_| DataError::ColumnNotFound {
                    column: name.clone(),
                })?;
                let series = column.as_materialized_series();
                let (descriptor, finding) =
                    profile_series(series, df.height(), opts.missing_dates, true)?;
                let swept = df
                    .get_columns()
                    .iter()
                    .filter(|c| c.name().as_str() != name.as_str())
                    .map(|c| c.as_materialized_series())
                    .collect();
                Ok((descriptor, finding, swept))
            }
        }
    }
    fn describe(&self, df: &DataFrame) -> DataResult<DataFrame> {
        let mut columns: Vec<Column> =
            vec![Series::new("statistic".into(), SUMMARY_STATISTICS.to_vec()).into_column()];
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if !ColumnKind::of(series.dtype()).is_numeric() {
                continue;
            }
            let floats = series.cast(&DataType::Float64)?;
            let ca = floats.f64()?;
            let count = (series.len() - series.null_count()) as f64;
            let values = vec![
                count,
                round2(ca.mean()),
                round2(ca.std(1)),
                round2(ca.min()),
                round2(ca.quantile(0.25, QuantileMethod::Linear)?),
                round2(ca.quantile(0.50, QuantileMethod::Linear)?),
                round2(ca.quantile(0.75, QuantileMethod::Linear)?),
                round2(ca.max()),
            ];
            columns.push(Series::new(series.name().clone(), values).into_column());
        }
        Ok(DataFrame::new(columns)?)
    }
}
impl Default for Profiler {
    fn default() -> Self {
        Self::new()
    }
}

fn profile_series(
    series: &Series,
    total_rows: usize,
    check_dates: bool,
    is_index: bool,
) -> DataResult<(ColumnDescriptor, Option<MissingDateFinding>)> {
    let name = series.name().to_string();
    let kind = ColumnKind::of(series.dtype());
    let num_null = series.null_count();
    let pct_null = percent_null(num_null, total_rows);

    let non_null = series.drop_nulls();
    let unique = non_null.unique_stable()?;
    let num_unique = unique.len();
    let unique_values = stringify(&unique)?;

    let range = match kind {
        ColumnKind::Numeric => {
            let floats = series.cast(&DataType::Float64)?;
            let ca = floats.f64()?;
            ValueRange::Numeric {
                min: ca.min(),
                max: ca.max(),
                mean: ca.mean(),
            }
        }
        ColumnKind::Datetime => match date_bounds(series)? {
            Some((min, max)) => ValueRange::Dates {
                min: format_date(min),
                max: format_date(max),
            },
            None => ValueRange::None,
        },
        ColumnKind::Other => ValueRange::None,
    };

    let finding = if check_dates && kind.is_datetime() {
        missing_dates(series)?.map(|missing| MissingDateFinding {
            column: name.clone(),
            is_index,
            missing,
        })
    } else {
        None
    };

    let descriptor = ColumnDescriptor {
        name,
        dtype: series.dtype().to_string(),
        kind,
        num_unique,
        num_null,
        pct_null,
        unique_values,
        range,
    };
    Ok((descriptor, finding))
}

fn positional_descriptor(total_rows: usize) -> ColumnDescriptor {
    ColumnDescriptor {
        name: "index".to_string(),
        dtype: DataType::UInt32.to_string(),
        kind: ColumnKind::Numeric,
        num_unique: total_rows,
        num_null: 0,
        pct_null: percent_null(0, total_rows),
        unique_values: (0..total_rows).map(|i| i.to_string()).collect(),
        range: ValueRange::None,
    }
}

fn stringify(series: &Series) -> DataResult<Vec<String>> {
    let strings = series.cast(&DataType::String)?;
    let ca = strings.str()?;
    Ok(ca
        .into_iter()
        .filter_map(|v| v.map(String::from))
        .collect())
}

fn epoch_days(series: &Series) -> DataResult<Vec<i32>> {
    let days = series.cast(&DataType::Date)?.cast(&DataType::Int32)?;
    let ca = days.i32()?;
    Ok(ca.into_iter().flatten().collect())
}

fn date_bounds(series: &Series) -> DataResult<Option<(NaiveDate, NaiveDate)>> {
    let days = epoch_days(series)?;
    let min = days.iter().min().copied();
    let max = days.iter().max().copied();
    match (min, max) {
        (Some(min), Some(max)) => Ok(Some((epoch_day_to_date(min)?, epoch_day_to_date(max)?))),
        _ => Ok(None),
    }
}

fn missing_dates(series: &Series) -> DataResult<Option<Vec<NaiveDate>>> {
    let days = epoch_days(series)?;
    let Some(min) = days.iter().min().copied() else {
        return Ok(None);
    };
    let max = *days.iter().max().expect("non-empty day set has a maximum");
    let present: HashSet<i32> = days.into_iter().collect();
    let mut missing = Vec::new();
    for day in min..=max {
        if !present.contains(&day) {
            missing.push(epoch_day_to_date(day)?);
        }
    }
    Ok(Some(missing))
}

fn epoch_day_to_date(day: i32) -> DataResult<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(day + EPOCH_DAY_FROM_CE).ok_or_else(|| {
        DataError::ColumnProfiling {
            column: "<date>".to_string(),
            reason: format!("day offset {day} is outside the supported calendar range"),
        }
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_value(v: Option<f64>) -> String {
    match v {
        Some(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{v:.0}"),
        Some(v) if v.is_finite() => format!("{v:.2}"),
        _ => "NaN".to_string(),
    }
}

fn percent_null(num_null: usize, total_rows: usize) -> f64 {
    if total_rows == 0 {
        f64::NAN
    } else {
        round5(num_null as f64 / total_rows as f64)
    }
}

fn round5(v: f64) -> f64 {
    (v * 100_000.0).round() / 100_000.0
}

fn round2(v: Option<f64>) -> f64 {
    match v {
        Some(v) => (v * 100.0).round() / 100.0,
        None => f64::NAN,
    }
}
