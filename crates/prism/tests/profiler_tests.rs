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

use chrono::NaiveDate;
use polars::prelude::*;
use prism::error::DataError;
use prism::{
    ColumnKind, IndexSpec, Profiler, ProfilerConfig, ReportOptions, ValueRange,
};
use proptest::prelude::*;
use std::collections::HashSet;

fn date_series(name: &str, dates: &[Option<&str>]) -> Series {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
    let days: Vec<Option<i32>> = dates
        .iter()
        .map(|d| {
            d.map(|s| {
                let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
                (date - epoch).num_days() as i32
            })
        })
        .collect();
    Series::new(name.into(), days)
        .cast(&DataType::Date)
        .unwrap()
}

fn sample_frame() -> DataFrame {
    DataFrame::new(vec![
        Series::new("id".into(), &[Some(1i64), Some(2), Some(2), None]).into_column(),
        date_series(
            "signup",
            &[Some("2024-01-01"), Some("2024-01-03"), None, Some("2024-01-01")],
        )
        .into_column(),
        Series::new(
            "status".into(),
            &[Some("a"), Some("b"), Some("a"), Some("a")],
        )
        .into_column(),
    ])
    .unwrap()
}

#[test]
fn test_descriptor_table_has_one_row_per_column_plus_index() {
    let df = sample_frame();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    assert_eq!(report.row_count, 4);
    assert_eq!(report.column_count, 3);
    assert_eq!(report.descriptors.len(), 1 + df.width());
    assert_eq!(report.descriptors[0].name, "index");
    assert_eq!(report.descriptors[1].name, "id");
    assert_eq!(report.descriptors[2].name, "signup");
    assert_eq!(report.descriptors[3].name, "status");

    let table = report.to_dataframe().unwrap();
    assert_eq!(table.height(), 4);
    let names: Vec<&str> = table
        .get_column_names()
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "col_name",
            "dtype",
            "num_unique",
            "num_null",
            "pct_null",
            "unique_values",
            "range (min, max, mean)",
        ]
    );
}

#[test]
fn test_numeric_and_datetime_descriptors_match_expected_scenario() {
    let df = sample_frame();
    let opts = ReportOptions {
        missing_dates: true,
        ..ReportOptions::default()
    };
    let report = Profiler::new().profile(&df, &opts).unwrap();

    let id = report.descriptor("id").unwrap();
    assert_eq!(id.kind, ColumnKind::Numeric);
    assert_eq!(id.num_unique, 2);
    assert_eq!(id.num_null, 1);
    assert!((id.pct_null - 0.25).abs() < 1e-12);
    match &id.range {
        ValueRange::Numeric { min, max, mean } => {
            assert_eq!(*min, Some(1.0));
            assert_eq!(*max, Some(2.0));
            assert!((mean.unwrap() - 5.0 / 3.0).abs() < 1e-9);
        }
        other => panic!("expected numeric range, got {other:?}"),
    }
    assert_eq!(id.range.render().unwrap(), "(1, 2, 1.67)");

    let signup = report.descriptor("signup").unwrap();
    assert_eq!(signup.kind, ColumnKind::Datetime);
    assert_eq!(signup.num_unique, 2);
    assert_eq!(signup.num_null, 1);
    assert!((signup.pct_null - 0.25).abs() < 1e-12);
    match &signup.range {
        ValueRange::Dates { min, max } => {
            assert_eq!(min, "2024-01-01");
            assert_eq!(max, "2024-01-03");
        }
        other => panic!("expected date range, got {other:?}"),
    }

    let finding = report
        .missing_dates
        .iter()
        .find(|f| f.column == "signup")
        .unwrap();
    assert_eq!(
        finding.missing,
        vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()]
    );
}

#[test]
fn test_categorical_columns_have_no_range() {
    let df = DataFrame::new(vec![
        Series::new("status".into(), &["a", "b", "a"]).into_column(),
    ])
    .unwrap();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    let status = report.descriptor("status").unwrap();
    assert_eq!(status.kind, ColumnKind::Other);
    assert_eq!(status.num_unique, 2);
    assert_eq!(status.num_null, 0);
    assert_eq!(status.range, ValueRange::None);
    assert_eq!(status.range.render(), None);
}

#[test]
fn test_boolean_columns_are_other() {
    let df = DataFrame::new(vec![
        Series::new("flag".into(), &[true, false, true]).into_column(),
    ])
    .unwrap();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    let flag = report.descriptor("flag").unwrap();
    assert_eq!(flag.kind, ColumnKind::Other);
    assert_eq!(flag.range, ValueRange::None);
}

#[test]
fn test_empty_frame_yields_nan_pct_null_without_panicking() {
    let df = DataFrame::new(vec![
        Series::new("x".into(), Vec::<i64>::new()).into_column(),
    ])
    .unwrap();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    assert_eq!(report.row_count, 0);
    assert_eq!(report.descriptors.len(), 2);
    assert!(report.descriptors[0].pct_null.is_nan());
    assert!(report.descriptor("x").unwrap().pct_null.is_nan());
}

#[test]
fn test_pct_null_rounds_to_five_decimals() {
    let df = DataFrame::new(vec![
        Series::new("x".into(), &[Some(1i64), Some(2), None]).into_column(),
    ])
    .unwrap();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    let x = report.descriptor("x").unwrap();
    assert!((x.pct_null - 0.33333).abs() < 1e-12);
}

#[test]
fn test_positional_index_skips_range() {
    let df = sample_frame();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    let index = &report.descriptors[0];
    assert_eq!(index.kind, ColumnKind::Numeric);
    assert_eq!(index.num_unique, 4);
    assert_eq!(index.num_null, 0);
    assert_eq!(index.pct_null, 0.0);
    assert_eq!(index.range, ValueRange::None);
    assert_eq!(
        index.unique_values,
        vec!["0".to_string(), "1".to_string(), "2".to_string(), "3".to_string()]
    );
}

#[test]
fn test_column_index_is_profiled_first_and_removed_from_sweep() {
    let df = sample_frame();
    let config = ProfilerConfig {
        index: IndexSpec::Column("signup".to_string()),
        ..ProfilerConfig::default()
    };
    let opts = ReportOptions {
        missing_dates: true,
        ..ReportOptions::default()
    };
    let report = Profiler::with_config(config).profile(&df, &opts).unwrap();
    assert_eq!(report.descriptors.len(), df.width());
    assert_eq!(report.descriptors[0].name, "signup");
    assert_eq!(report.descriptors[0].kind, ColumnKind::Datetime);
    assert!(report
        .descriptors
        .iter()
        .skip(1)
        .all(|d| d.name != "signup"));
    let finding = report
        .missing_dates
        .iter()
        .find(|f| f.column == "signup")
        .unwrap();
    assert!(finding.is_index);
    assert_eq!(
        finding.missing,
        vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()]
    );
}

#[test]
fn test_missing_index_column_is_an_error() {
    let df = sample_frame();
    let config = ProfilerConfig {
        index: IndexSpec::Column("nope".to_string()),
        ..ProfilerConfig::default()
    };
    let err = Profiler::with_config(config)
        .profile(&df, &ReportOptions::default())
        .unwrap_err();
    assert!(matches!(err, DataError::ColumnNotFound { column } if column == "nope"));
}

#[test]
fn test_summary_stats_are_rounded_to_two_decimals() {
    let df = DataFrame::new(vec![
        Series::new("x".into(), &[1.0f64, 2.0, 3.0, 4.0]).into_column(),
        Series::new("label".into(), &["a", "b", "c", "d"]).into_column(),
    ])
    .unwrap();
    let opts = ReportOptions {
        summary_stats: true,
        ..ReportOptions::default()
    };
    let report = Profiler::new().profile(&df, &opts).unwrap();
    let summary = report.summary.unwrap();
    let names: Vec<&str> = summary
        .get_column_names()
        .iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(names, vec!["statistic", "x"]);
    let x = summary
        .column("x")
        .unwrap()
        .as_materialized_series()
        .f64()
        .unwrap()
        .into_iter()
        .map(|v| v.unwrap())
        .collect::<Vec<f64>>();
    assert_eq!(x, vec![4.0, 2.5, 1.29, 1.0, 1.75, 2.5, 3.25, 4.0]);
}

#[test]
fn test_histogram_grid_covers_numeric_columns_only() {
    let df = DataFrame::new(vec![
        Series::new("x".into(), &[1.0f64, 2.0, 3.0, 4.0, 5.0]).into_column(),
        Series::new("y".into(), &[10i64, 20, 30, 40, 50]).into_column(),
        Series::new("label".into(), &["a", "b", "c", "d", "e"]).into_column(),
    ])
    .unwrap();
    let opts = ReportOptions {
        histograms: true,
        ..ReportOptions::default()
    };
    let report = Profiler::new().profile(&df, &opts).unwrap();
    let grid = report.histograms.unwrap();
    assert_eq!(grid.panels.len(), 2);
    assert_eq!(grid.width, 10.0);
    assert_eq!(grid.height, 10.0);
    assert_eq!(grid.vertical_spacing, 0.5);
    for panel in &grid.panels {
        assert_eq!(panel.total_count(), 5);
    }
}

#[test]
fn test_profiling_is_idempotent() {
    let df = sample_frame();
    let opts = ReportOptions::all();
    let profiler = Profiler::new();
    let first = profiler.profile(&df, &opts).unwrap();
    let second = profiler.profile(&df, &opts).unwrap();
    assert_eq!(first.descriptors.len(), second.descriptors.len());
    for (a, b) in first.descriptors.iter().zip(&second.descriptors) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.dtype, b.dtype);
        assert_eq!(a.num_unique, b.num_unique);
        assert_eq!(a.num_null, b.num_null);
        assert!((a.pct_null == b.pct_null) || (a.pct_null.is_nan() && b.pct_null.is_nan()));
        assert_eq!(a.range, b.range);
        let left: HashSet<&String> = a.unique_values.iter().collect();
        let right: HashSet<&String> = b.unique_values.iter().collect();
        assert_eq!(left, right);
    }
}

#[test]
fn test_report_never_mutates_the_input() {
    let df = sample_frame();
    let before = df.clone();
    let _ = Profiler::new().profile(&df, &ReportOptions::all()).unwrap();
    assert!(df.equals_missing(&before));
}

#[test]
fn test_export_json_serialises_descriptors() {
    let df = sample_frame();
    let report = Profiler::new()
        .profile(&df, &ReportOptions::default())
        .unwrap();
    let json = report.export_json().unwrap();
    assert!(json.contains("\"name\": \"signup\""));
    assert!(json.contains("\"2024-01-01\""));
}

proptest! {
    #[test]
    fn numeric_ranges_keep_min_mean_max_ordered(
        values in proptest::collection::vec(-1.0e6f64..1.0e6, 1..50)
    ) {
        let df = DataFrame::new(vec![
            Series::new("x".into(), values.clone()).into_column(),
        ]).unwrap();
        let report = Profiler::new().profile(&df, &ReportOptions::default()).unwrap();
        let descriptor = report.descriptor("x").unwrap();
        prop_assert_eq!(descriptor.num_null, 0);
        prop_assert!(descriptor.pct_null.abs() < 1e-12);
        match descriptor.range {
            ValueRange::Numeric { min: Some(min), max: Some(max), mean: Some(mean) } => {
                prop_assert!(min <= mean + 1e-9);
                prop_assert!(mean <= max + 1e-9);
            }
            ref other => prop_assert!(false, "expected a populated numeric range, got {:?}", other),
        }
    }
}
