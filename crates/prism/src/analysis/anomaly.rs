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

use super::{as_datetime, quantile_threshold, string_column, u64_column};
use crate::error::DataResult;
use crate::schema::AccessLogSchema;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCount {
    pub key: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyConfig {
    pub quantile: f64,
    pub excluded_ip_prefixes: Vec<String>,
}
impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            quantile: 0.99,
            excluded_ip_prefixes: vec!["97.105".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAnomalies {
    pub outside_access_users: Vec<AccessCount>,
    pub high_request_ips: Vec<AccessCount>,
    pub high_unique_page_ips: Vec<AccessCount>,
    pub high_same_page_ips: Vec<AccessCount>,
    pub suspicious_ips: Vec<String>,
}

pub fn scan_activity(
    df: &DataFrame,
    schema: &AccessLogSchema,
    cfg: &AnomalyConfig,
) -> DataResult<ActivityAnomalies> {
    schema.require(
        df,
        &[
            &schema.user_id,
            &schema.cohort_id,
            &schema.source_ip,
            &schema.path,
            &schema.accessed_at,
            &schema.class_start,
            &schema.class_end,
        ],
    )?;
    log::debug!("scanning activity anomalies at quantile {}", cfg.quantile);

    let outside = df
        .clone()
        .lazy()
        .filter(
            col(schema.class_start.as_str())
                .is_not_null()
                .and(col(schema.class_end.as_str()).is_not_null()),
        )
        .filter(
            as_datetime(&schema.accessed_at)
                .lt(as_datetime(&schema.class_start))
                .or(as_datetime(&schema.accessed_at).gt(as_datetime(&schema.class_end))),
        )
        .group_by([col(schema.user_id.as_str()).cast(DataType::String).alias("key")])
        .agg([len().alias("n")])
        .collect()?;
    let outside_access_users = sorted_counts(
        string_column(&outside, "key")?,
        u64_column(&outside, "n")?,
        &[],
    );

    let requests = df
        .clone()
        .lazy()
        .group_by([col(schema.source_ip.as_str()).alias("key")])
        .agg([len().alias("n")])
        .collect()?;
    let high_request_ips = above_quantile(&requests, cfg)?;

    let unique_pages = df
        .clone()
        .lazy()
        .group_by([col(schema.source_ip.as_str()).alias("key")])
        .agg([col(schema.path.as_str()).n_unique().alias("n")])
        .collect()?;
    let high_unique_page_ips = above_quantile(&unique_pages, cfg)?;

    let high_same_page_ips = same_page_outliers(df, schema, cfg)?;

    let suspicious_ips = suspicious(df, schema)?;

    Ok(ActivityAnomalies {
        outside_access_users,
        high_request_ips,
        high_unique_page_ips,
        high_same_page_ips,
        suspicious_ips,
    })
}

fn same_page_outliers(
    df: &DataFrame,
    schema: &AccessLogSchema,
    cfg: &AnomalyConfig,
) -> DataResult<Vec<AccessCount>> {
    let same_page = df
        .clone()
        .lazy()
        .group_by([col(schema.source_ip.as_str()), col(schema.path.as_str())])
        .agg([len().alias("n")])
        .collect()?;
    let Some(threshold) = quantile_threshold(&same_page, "n", cfg.quantile)? else {
        return Ok(Vec::new());
    };
    let ips = string_column(&same_page, &schema.source_ip)?;
    let counts = u64_column(&same_page, "n")?;
    let mut per_ip: BTreeMap<String, u64> = BTreeMap::new();
    for (ip, n) in ips.into_iter().zip(counts) {
        if n as f64 > threshold {
            *per_ip.entry(ip).or_insert(0) += n;
        }
    }
    let (keys, values): (Vec<String>, Vec<u64>) = per_ip.into_iter().unzip();
    Ok(sorted_counts(keys, values, &cfg.excluded_ip_prefixes))
}

fn suspicious(df: &DataFrame, schema: &AccessLogSchema) -> DataResult<Vec<String>> {
    let known = df
        .clone()
        .lazy()
        .filter(col(schema.cohort_id.as_str()).is_not_null())
        .select([col(schema.source_ip.as_str())])
        .collect()?;
    let known: HashSet<String> = string_column(&known, &schema.source_ip)?.into_iter().collect();
    let all: HashSet<String> = string_column(df, &schema.source_ip)?.into_iter().collect();
    let mut suspicious: Vec<String> = all.difference(&known).cloned().collect();
    suspicious.sort();
    Ok(suspicious)
}

fn above_quantile(counts: &DataFrame, cfg: &AnomalyConfig) -> DataResult<Vec<AccessCount>> {
    let Some(threshold) = quantile_threshold(counts, "n", cfg.quantile)? else {
        return Ok(Vec::new());
    };
    let keys = string_column(counts, "key")?;
    let values = u64_column(counts, "n")?;
    let (keys, values): (Vec<String>, Vec<u64>) = keys
        .into_iter()
        .zip(values)
        .filter(|(_, n)| *n as f64 > threshold)
        .unzip();
    Ok(sorted_counts(keys, values, &cfg.excluded_ip_prefixes))
}

fn sorted_counts(keys: Vec<String>, values: Vec<u64>, excluded_prefixes: &[String]) -> Vec<AccessCount> {
    let mut counts: Vec<AccessCount> = keys
        .into_iter()
        .zip(values)
        .filter(|(key, _)| !excluded_prefixes.iter().any(|p| key.starts_with(p.as_str())))
        .map(|(key, count)| AccessCount { key, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn sorted_counts_excludes_prefixes_and_orders_desc() {
        let counts = sorted_counts(
            vec![
                "97.105.0.1".to_string(),
                "10.0.0.2".to_string(),
                "10.0.0.1".to_string(),
            ],
            vec![100, 5, 5],
            &["97.105".to_string()],
        );
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].key, "10.0.0.1");
        assert_eq!(counts[1].key, "10.0.0.2");
    }
}
