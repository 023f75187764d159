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

pub mod anomaly;
pub mod cross_program;
pub mod paths;
pub mod post_grad;

pub use anomaly::{scan_activity, AccessCount, ActivityAnomalies, AnomalyConfig};
pub use cross_program::{cross_program_access, CrossProgramAccess, MonthlyCount};
pub use paths::{cohort_path_shares, CohortPathReport, CohortPathShares, PathShare, PathShareConfig};
pub use post_grad::{post_grad_paths, PathCount, PostGradReport, ProgramPaths};

use crate::error::DataResult;
use chrono::NaiveDate;
use polars::prelude::QuantileMethod;
use polars::prelude::*;

pub(crate) fn string_column(df: &DataFrame, name: &str) -> DataResult<Vec<String>> {
    let strings = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::String)?;
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.unwrap_or_default().to_string())
        .collect())
}

pub(crate) fn u64_column(df: &DataFrame, name: &str) -> DataResult<Vec<u64>> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::UInt64)?;
    Ok(values.u64()?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

pub(crate) fn i32_column(df: &DataFrame, name: &str) -> DataResult<Vec<i32>> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    Ok(values.i32()?.into_iter().map(|v| v.unwrap_or(0)).collect())
}

pub(crate) fn as_datetime(name: &str) -> Expr {
    col(name).cast(DataType::Datetime(TimeUnit::Microseconds, None))
}

pub(crate) fn as_epoch_day(name: &str) -> Expr {
    col(name).cast(DataType::Date).cast(DataType::Int32)
}

pub(crate) fn epoch_day(date: NaiveDate) -> i32 {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("the unix epoch is a valid date");
    (date - epoch).num_days() as i32
}

pub(crate) fn program_matches(column: &str, programs: &[&str]) -> Expr {
    programs
        .iter()
        .map(|p| col(column).eq(lit(*p)))
        .reduce(|a, b| a.or(b))
        .unwrap_or_else(|| lit(false))
}

pub(crate) fn quantile_threshold(df: &DataFrame, name: &str, q: f64) -> DataResult<Option<f64>> {
    let floats = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;
    Ok(floats.f64()?.quantile(q, QuantileMethod::Linear)?)
}
