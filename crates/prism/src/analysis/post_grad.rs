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

use super::{as_datetime, string_column, u64_column};
use crate::error::DataResult;
use crate::schema::{AccessLogSchema, DATA_PROGRAM, WEB_PROGRAMS};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCount {
    pub path: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramPaths {
    pub program: String,
    pub paths: Vec<PathCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostGradReport {
    pub top_n: usize,
    pub programs: Vec<ProgramPaths>,
}

pub fn post_grad_paths(
    df: &DataFrame,
    schema: &AccessLogSchema,
    top_n: usize,
) -> DataResult<PostGradReport> {
    schema.require(
        df,
        &[
            &schema.program,
            &schema.path,
            &schema.accessed_at,
            &schema.class_end,
        ],
    )?;
    log::debug!("computing top {top_n} post-graduation paths per program");
    let counts = df
        .clone()
        .lazy()
        .filter(col(schema.class_end.as_str()).is_not_null())
        .filter(as_datetime(&schema.accessed_at).gt(as_datetime(&schema.class_end)))
        .filter(col(schema.program.as_str()).is_not_null())
        .group_by([
            col(schema.program.as_str()).cast(DataType::String),
            col(schema.path.as_str()),
        ])
        .agg([len().alias("n")])
        .collect()?;
    let programs = string_column(&counts, &schema.program)?;
    let paths = string_column(&counts, &schema.path)?;
    let totals = u64_column(&counts, "n")?;

    let mut by_program: BTreeMap<String, Vec<PathCount>> = BTreeMap::new();
    for ((program, path), count) in programs.into_iter().zip(paths).zip(totals) {
        by_program
            .entry(program)
            .or_default()
            .push(PathCount { path, count });
    }
    let mut programs: Vec<ProgramPaths> = by_program
        .into_iter()
        .map(|(program, mut paths)| {
            paths.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.path.cmp(&b.path)));
            paths.truncate(top_n);
            ProgramPaths { program, paths }
        })
        .collect();
    programs.sort_by_key(|p| program_rank(&p.program));
    Ok(PostGradReport { top_n, programs })
}

fn program_rank(program: &str) -> (usize, String) {
    let rank = WEB_PROGRAMS
        .iter()
        .position(|p| *p == program)
        .unwrap_or_else(|| {
            if program == DATA_PROGRAM {
                WEB_PROGRAMS.len()
            } else {
                WEB_PROGRAMS.len() + 1
            }
        });
    (rank, program.to_string())
}
