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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum EdaError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),
    #[error("Chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },
    #[error("Failed to profile column '{column}': {reason}")]
    ColumnProfiling { column: String, reason: String },
    #[error("Invalid configuration: {field} = {value}")]
    InvalidConfig { field: String, value: String },
}
#[derive(Error, Debug)]
pub enum ChartError {
    #[error("JSON serialisation failed: {source}")]
    JsonSerialisation {
        #[from]
        source: serde_json::Error,
    },
    #[error("Failed to export chart spec '{name}': {reason}")]
    Export { name: String, reason: String },
}
pub type Result<T> = std::result::Result<T, EdaError>;
pub type DataResult<T> = std::result::Result<T, DataError>;
pub type ChartResult<T> = std::result::Result<T, ChartError>;
impl From<polars::error::PolarsError> for EdaError {
    fn from(err: polars::error::PolarsError) -> Self {
        EdaError::Data(DataError::Polars(err))
    }
}
impl From<serde_json::Error> for EdaError {
    fn from(err: serde_json::Error) -> Self {
        EdaError::Chart(ChartError::JsonSerialisation { source: err })
    }
}
impl EdaError {
    pub fn category(&self) -> &'static str {
        match self {
            EdaError::Data(_) => "Data",
            EdaError::Chart(_) => "Chart",
            EdaError::Io(_) => "I/O",
        }
    }
    pub fn user_message(&self) -> String {
        match self {
            EdaError::Data(DataError::ColumnNotFound { column }) => {
                format!("The dataset has no column named '{column}'. Check the schema configuration against the dataframe's columns.")
            }
            _ => self.to_string(),
        }
    }
}
