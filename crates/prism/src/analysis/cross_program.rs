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

use super::{i32_column, program_matches, string_column, u64_column};
use crate::error::DataResult;
use crate::schema::{AccessLogSchema, DATA_PROGRAM, HOMEPAGE, WEB_PROGRAMS};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossProgramAccess {
    pub data_on_web: Vec<MonthlyCount>,
    pub web_on_data: Vec<MonthlyCount>,
}

pub fn cross_program_access(
    df: &DataFrame,
    schema: &AccessLogSchema,
) -> DataResult<CrossProgramAccess> {
    schema.require(df, &[&schema.program, &schema.path, &schema.accessed_at])?;
    let web_paths = program_paths(df, schema, &WEB_PROGRAMS)?;
    let data_paths = program_paths(df, schema, &[DATA_PROGRAM])?;
    log::debug!(
        "cross-program scan over {} web paths and {} data paths",
        web_paths.len(),
        data_paths.len()
    );
    Ok(CrossProgramAccess {
        data_on_web: monthly_counts(df, schema, &[DATA_PROGRAM], &web_paths)?,
        web_on_data: monthly_counts(df, schema, &WEB_PROGRAMS, &data_paths)?,
    })
}

fn program_paths(
    df: &DataFrame,
    schema: &AccessLogSchema,
    programs: &[&str],
) -> DataResult<Vec<String>> {
    let rows = df
        .clone()
        .lazy()
        .filter(program_matches(&schema.program, programs))
        .select([col(schema.path.as_str())])
        .collect()?;
    let mut paths: Vec<String> = string_column(&rows, &schema.path)?
        .into_iter()
        .filter(|p| p != HOMEPAGE)
        .collect();
    paths.sort();
    paths.dedup();
    Ok(paths)
}

fn monthly_counts(
    df: &DataFrame,
    schema: &AccessLogSchema,
    programs: &[&str],
    paths: &[String],
) -> DataResult<Vec<MonthlyCount>> {
    if paths.is_empty() {
        return Ok(Vec::new());
    }
    let keys = DataFrame::new(vec![
        Series::new(schema.path.as_str().into(), paths.to_vec()).into_column(),
    ])?;
    let counts = df
        .clone()
        .lazy()
        .filter(program_matches(&schema.program, programs))
        .join(
            keys.lazy(),
            [col(schema.path.as_str())],
            [col(schema.path.as_str())],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([
            col(schema.accessed_at.as_str())
                .dt()
                .year()
                .cast(DataType::Int32)
                .alias("year"),
            col(schema.accessed_at.as_str())
                .dt()
                .month()
                .cast(DataType::Int32)
                .alias("month"),
        ])
        .agg([len().alias("n")])
        .sort(["year", "month"], SortMultipleOptions::default())
        .collect()?;
    let years = i32_column(&counts, "year")?;
    let months = i32_column(&counts, "month")?;
    let totals = u64_column(&counts, "n")?;
    Ok(years
        .into_iter()
        .zip(months)
        .zip(totals)
        .map(|((year, month), count)| MonthlyCount {
            year,
            month: month.max(0) as u32,
            count,
        })
        .collect())
}
