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

use super::{as_epoch_day, epoch_day, string_column, u64_column};
use crate::error::DataResult;
use crate::schema::AccessLogSchema;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShare {
    pub path: String,
    pub share: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortPathShares {
    pub cohort_id: String,
    pub shares: Vec<PathShare>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortPathReport {
    pub overall_label: String,
    pub top_n: usize,
    pub overall: Vec<PathShare>,
    pub cohorts: Vec<CohortPathShares>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathShareConfig {
    pub start_cutoff: NaiveDate,
    pub top_n: usize,
    pub overall_label: String,
}
impl Default for PathShareConfig {
    fn default() -> Self {
        Self {
            start_cutoff: NaiveDate::from_ymd_opt(2020, 1, 1).expect("valid calendar date"),
            top_n: 10,
            overall_label: "Overall".to_string(),
        }
    }
}

pub fn cohort_path_shares(
    df: &DataFrame,
    schema: &AccessLogSchema,
    cfg: &PathShareConfig,
) -> DataResult<CohortPathReport> {
    schema.require(df, &[&schema.path, &schema.cohort_id, &schema.class_start])?;
    log::debug!(
        "computing top {} path shares for cohorts starting after {}",
        cfg.top_n,
        cfg.start_cutoff
    );
    let recent = df
        .clone()
        .lazy()
        .filter(as_epoch_day(&schema.class_start).gt(lit(epoch_day(cfg.start_cutoff))));

    let overall_counts = recent
        .clone()
        .group_by([col(schema.path.as_str())])
        .agg([len().alias("n")])
        .collect()?;
    let overall = top_shares(
        &string_column(&overall_counts, &schema.path)?,
        &u64_column(&overall_counts, "n")?,
        cfg.top_n,
    );

    let cohort_counts = recent
        .filter(col(schema.cohort_id.as_str()).is_not_null())
        .group_by([
            col(schema.cohort_id.as_str()).cast(DataType::String).alias("cohort"),
            col(schema.path.as_str()),
        ])
        .agg([len().alias("n")])
        .collect()?;
    let cohort_keys = string_column(&cohort_counts, "cohort")?;
    let cohort_paths = string_column(&cohort_counts, &schema.path)?;
    let cohort_ns = u64_column(&cohort_counts, "n")?;

    let mut by_cohort: BTreeMap<String, (Vec<String>, Vec<u64>)> = BTreeMap::new();
    for ((cohort, path), n) in cohort_keys
        .into_iter()
        .zip(cohort_paths)
        .zip(cohort_ns)
    {
        let entry = by_cohort.entry(cohort).or_default();
        entry.0.push(path);
        entry.1.push(n);
    }
    let cohorts = by_cohort
        .into_iter()
        .map(|(cohort_id, (paths, ns))| CohortPathShares {
            cohort_id,
            shares: top_shares(&paths, &ns, cfg.top_n),
        })
        .collect();

    Ok(CohortPathReport {
        overall_label: cfg.overall_label.clone(),
        top_n: cfg.top_n,
        overall,
        cohorts,
    })
}

fn top_shares(paths: &[String], counts: &[u64], top_n: usize) -> Vec<PathShare> {
    let total: u64 = counts.iter().sum();
    if total == 0 {
        return Vec::new();
    }
    let mut shares: Vec<PathShare> = paths
        .iter()
        .zip(counts)
        .map(|(path, n)| PathShare {
            path: path.clone(),
            share: *n as f64 / total as f64,
        })
        .collect();
    shares.sort_by(|a, b| {
        b.share
            .partial_cmp(&a.share)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.path.cmp(&b.path))
    });
    shares.truncate(top_n);
    shares
}
