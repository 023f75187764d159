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

use anyhow::{Context, Result};
use polars::prelude::*;
use prism::{chart, AnomalyConfig, EdaToolkit, PathShareConfig, ReportOptions};
use std::path::PathBuf;

fn main() -> Result<()> {
    env_logger::init();
    let mut args = std::env::args().skip(1);
    let input = args
        .next()
        .context("usage: prism-eda-demo <access_log.csv> [out_dir]")?;
    let out_dir = PathBuf::from(args.next().unwrap_or_else(|| "chart_specs".to_string()));

    let df = CsvReadOptions::default()
        .with_parse_options(CsvParseOptions::default().with_try_parse_dates(true))
        .try_into_reader_with_file_path(Some(PathBuf::from(&input)))
        .with_context(|| format!("failed to open '{input}'"))?
        .finish()
        .with_context(|| format!("failed to read '{input}'"))?;

    let toolkit = EdaToolkit::new();
    let report = toolkit.profile(&df, &ReportOptions::all())?;
    prism::print_report(&report)?;
    println!("{}", report.to_dataframe()?);

    let mut specs = Vec::new();
    if let Some(grid) = &report.histograms {
        specs.extend(chart::histogram_charts(grid));
    }

    if toolkit.schema().is_present(&df) {
        let paths = toolkit.cohort_path_shares(&df, &PathShareConfig::default())?;
        specs.extend(chart::cohort_path_charts(&paths));

        let anomalies = toolkit.scan_activity(&df, &AnomalyConfig::default())?;
        println!(
            "Suspicious IPs (no cohort ever): {}",
            anomalies.suspicious_ips.len()
        );
        specs.extend(chart::anomaly_charts(&anomalies));

        let cross = toolkit.cross_program_access(&df)?;
        specs.extend(chart::cross_program_charts(&cross));

        let post_grad = toolkit.post_grad_paths(&df, 10)?;
        specs.extend(chart::post_grad_charts(&post_grad));
    } else {
        log::warn!("access-log schema columns not present; emitting profile charts only");
    }

    let written = chart::write_chart_specs(&specs, &out_dir)?;
    println!("Wrote {} chart specs to {}", written.len(), out_dir.display());
    Ok(())
}
