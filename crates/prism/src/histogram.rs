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

use crate::error::DataResult;
use crate::profiler::ColumnKind;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

const GRID_WIDTH: f64 = 10.0;
const GRID_HEIGHT: f64 = 10.0;
const GRID_VERTICAL_SPACING: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramPanel {
    pub column: String,
    pub bins: Vec<HistogramBin>,
}
impl HistogramPanel {
    pub fn from_series(series: &Series, bins: usize) -> DataResult<Self> {
        let column = series.name().to_string();
        let floats = series.cast(&DataType::Float64)?;
        let ca = floats.f64()?;
        let (min, max) = match (ca.min(), ca.max()) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => (min, max),
            _ => {
                return Ok(Self {
                    column,
                    bins: Vec::new(),
                })
            }
        };
        if bins == 0 {
            return Ok(Self {
                column,
                bins: Vec::new(),
            });
        }
        if max == min {
            let count = ca.into_iter().flatten().count();
            return Ok(Self {
                column,
                bins: vec![HistogramBin {
                    lower: min,
                    upper: max,
                    count,
                }],
            });
        }
        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for value in ca.into_iter().flatten() {
            let mut slot = ((value - min) / width) as usize;
            if slot >= bins {
                slot = bins - 1;
            }
            counts[slot] += 1;
        }
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBin {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect();
        Ok(Self { column, bins })
    }
    pub fn total_count(&self) -> usize {
        self.bins.iter().map(|b| b.count).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramGrid {
    pub width: f64,
    pub height: f64,
    pub vertical_spacing: f64,
    pub grid_columns: usize,
    pub panels: Vec<HistogramPanel>,
}
impl HistogramGrid {
    pub fn from_dataframe(df: &DataFrame, bins: usize) -> DataResult<Self> {
        let mut panels = Vec::new();
        for column in df.get_columns() {
            let series = column.as_materialized_series();
            if !ColumnKind::of(series.dtype()).is_numeric() {
                continue;
            }
            panels.push(HistogramPanel::from_series(series, bins)?);
        }
        let grid_columns = (panels.len() as f64).sqrt().ceil() as usize;
        Ok(Self {
            width: GRID_WIDTH,
            height: GRID_HEIGHT,
            vertical_spacing: GRID_VERTICAL_SPACING,
            grid_columns: grid_columns.max(1),
            panels,
        })
    }
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}
