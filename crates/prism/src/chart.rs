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

use crate::analysis::{AccessCount, ActivityAnomalies, CohortPathReport, CrossProgramAccess, PostGradReport};
use crate::error::{ChartError, ChartResult, Result};
use crate::histogram::HistogramGrid;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const OUTSIDE_ACCESS_TOP: usize = 10;
const HIGH_REQUEST_TOP: usize = 10;
const UNIQUE_PAGE_TOP: usize = 20;
const SAME_PAGE_TOP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutHints {
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertical_spacing: Option<f64>,
}
impl LayoutHints {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            vertical_spacing: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub name: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub chart_name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub orientation: Orientation,
    pub series: Vec<SeriesSpec>,
    pub layout: LayoutHints,
}
impl ChartSpec {
    pub fn to_json(&self) -> ChartResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json)?;
        Ok(())
    }
}

pub fn histogram_charts(grid: &HistogramGrid) -> Vec<ChartSpec> {
    grid.panels
        .iter()
        .map(|panel| {
            let labels = panel
                .bins
                .iter()
                .map(|b| format!("[{:.2}, {:.2})", b.lower, b.upper))
                .collect();
            let values = panel.bins.iter().map(|b| b.count as f64).collect();
            ChartSpec {
                chart_name: "histogram".to_string(),
                title: panel.column.clone(),
                x_label: panel.column.clone(),
                y_label: "Frequency".to_string(),
                orientation: Orientation::Vertical,
                series: vec![SeriesSpec {
                    name: panel.column.clone(),
                    labels,
                    values,
                    color: None,
                }],
                layout: LayoutHints {
                    width: grid.width,
                    height: grid.height,
                    vertical_spacing: Some(grid.vertical_spacing),
                },
            }
        })
        .collect()
}

pub fn cohort_path_charts(report: &CohortPathReport) -> Vec<ChartSpec> {
    report
        .cohorts
        .iter()
        .map(|cohort| {
            let mut labels: Vec<String> =
                cohort.shares.iter().map(|s| s.path.clone()).collect();
            for share in &report.overall {
                if !labels.contains(&share.path) {
                    labels.push(share.path.clone());
                }
            }
            let overall_values = aligned_values(&labels, &report.overall);
            let cohort_values = aligned_values(&labels, &cohort.shares);
            ChartSpec {
                chart_name: "barh".to_string(),
                title: format!(
                    "Cohort {} Top {} Paths vs. Overall Top {}",
                    cohort.cohort_id, report.top_n, report.top_n
                ),
                x_label: "Ratio of Accesses".to_string(),
                y_label: "Paths".to_string(),
                orientation: Orientation::Horizontal,
                series: vec![
                    SeriesSpec {
                        name: report.overall_label.clone(),
                        labels: labels.clone(),
                        values: overall_values,
                        color: None,
                    },
                    SeriesSpec {
                        name: format!("Cohort {}", cohort.cohort_id),
                        labels,
                        values: cohort_values,
                        color: None,
                    },
                ],
                layout: LayoutHints::new(12.0, 8.0),
            }
        })
        .collect()
}

fn aligned_values(labels: &[String], shares: &[crate::analysis::PathShare]) -> Vec<f64> {
    labels
        .iter()
        .map(|label| {
            shares
                .iter()
                .find(|s| &s.path == label)
                .map_or(0.0, |s| s.share)
        })
        .collect()
}

pub fn anomaly_charts(anomalies: &ActivityAnomalies) -> Vec<ChartSpec> {
    let layout = LayoutHints::new(14.0, 20.0);
    vec![
        barh_chart(
            &anomalies.outside_access_users,
            OUTSIDE_ACCESS_TOP,
            "Top 10 Users Accessing Outside of Cohort Duration",
            "Number of Accesses",
            "User ID",
            "cornflowerblue",
            layout,
        ),
        barh_chart(
            &anomalies.high_request_ips,
            HIGH_REQUEST_TOP,
            "IPs with High Request Volume",
            "Number of Requests",
            "IP Address",
            "lightcoral",
            layout,
        ),
        barh_chart(
            &anomalies.high_unique_page_ips,
            UNIQUE_PAGE_TOP,
            "Top 20 IPs Accessing Most Unique Pages",
            "Number of Unique Pages Accessed",
            "IP Address",
            "mediumseagreen",
            layout,
        ),
        barh_chart(
            &anomalies.high_same_page_ips,
            SAME_PAGE_TOP,
            "Top 10 IPs Frequently Accessing the Same Page",
            "Number of Accesses",
            "IP Address",
            "orchid",
            layout,
        ),
    ]
}

fn barh_chart(
    counts: &[AccessCount],
    top_n: usize,
    title: &str,
    x_label: &str,
    y_label: &str,
    color: &str,
    layout: LayoutHints,
) -> ChartSpec {
    let mut top: Vec<&AccessCount> = counts.iter().take(top_n).collect();
    top.reverse();
    ChartSpec {
        chart_name: "barh".to_string(),
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: y_label.to_string(),
        orientation: Orientation::Horizontal,
        series: vec![SeriesSpec {
            name: title.to_string(),
            labels: top.iter().map(|c| c.key.clone()).collect(),
            values: top.iter().map(|c| c.count as f64).collect(),
            color: Some(color.to_string()),
        }],
        layout,
    }
}

pub fn cross_program_charts(access: &CrossProgramAccess) -> Vec<ChartSpec> {
    let layout = LayoutHints::new(14.0, 12.0);
    vec![
        monthly_line_chart(
            &access.data_on_web,
            "Monthly Accesses: Data Program Users Accessing Web Paths",
            "mediumseagreen",
            layout,
        ),
        monthly_line_chart(
            &access.web_on_data,
            "Monthly Accesses: Web Program Users Accessing Data Paths",
            "cornflowerblue",
            layout,
        ),
    ]
}

fn monthly_line_chart(
    counts: &[crate::analysis::MonthlyCount],
    title: &str,
    color: &str,
    layout: LayoutHints,
) -> ChartSpec {
    ChartSpec {
        chart_name: "line".to_string(),
        title: title.to_string(),
        x_label: "Year, Month".to_string(),
        y_label: "Number of Accesses".to_string(),
        orientation: Orientation::Vertical,
        series: vec![SeriesSpec {
            name: title.to_string(),
            labels: counts
                .iter()
                .map(|c| format!("{}-{:02}", c.year, c.month))
                .collect(),
            values: counts.iter().map(|c| c.count as f64).collect(),
            color: Some(color.to_string()),
        }],
        layout,
    }
}

pub fn post_grad_charts(report: &PostGradReport) -> Vec<ChartSpec> {
    const COLORS: [&str; 4] = ["gold", "crimson", "cornflowerblue", "mediumseagreen"];
    let layout = LayoutHints::new(12.0, 14.0);
    report
        .programs
        .iter()
        .enumerate()
        .map(|(i, program)| {
            let mut paths: Vec<_> = program.paths.iter().collect();
            paths.reverse();
            ChartSpec {
                chart_name: "barh".to_string(),
                title: format!(
                    "Top {} Accessed Paths After Graduation for {} Program",
                    report.top_n,
                    program_display_name(&program.program)
                ),
                x_label: "Number of Accesses".to_string(),
                y_label: "Paths".to_string(),
                orientation: Orientation::Horizontal,
                series: vec![SeriesSpec {
                    name: program.program.clone(),
                    labels: paths.iter().map(|p| p.path.clone()).collect(),
                    values: paths.iter().map(|p| p.count as f64).collect(),
                    color: Some(COLORS[i % COLORS.len()].to_string()),
                }],
                layout,
            }
        })
        .collect()
}

fn program_display_name(program: &str) -> String {
    match program {
        "web_php" => "Web PHP".to_string(),
        "web_java" => "Web Java".to_string(),
        "web_front" => "Web Front End".to_string(),
        "data" => "Data Science".to_string(),
        other => other.to_string(),
    }
}

pub fn write_chart_specs<P: AsRef<Path>>(specs: &[ChartSpec], dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(specs.len());
    for (i, spec) in specs.iter().enumerate() {
        let path = dir.join(format!("{:03}_{}.json", i, spec.chart_name));
        spec.write_json(&path).map_err(|e| match e {
            crate::error::EdaError::Io(source) => crate::error::EdaError::Chart(ChartError::Export {
                name: spec.title.clone(),
                reason: source.to_string(),
            }),
            other => other,
        })?;
        written.push(path);
    }
    Ok(written)
}
