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

use crate::error::{DataError, DataResult};
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};

pub const WEB_PROGRAMS: [&str; 3] = ["web_php", "web_java", "web_front"];
pub const DATA_PROGRAM: &str = "data";
pub const HOMEPAGE: &str = "homepage";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessLogSchema {
    pub user_id: String,
    pub cohort_id: String,
    pub source_ip: String,
    pub path: String,
    pub accessed_at: String,
    pub class_start: String,
    pub class_end: String,
    pub program: String,
}
impl Default for AccessLogSchema {
    fn default() -> Self {
        Self {
            user_id: "user_id".to_string(),
            cohort_id: "cohort_id".to_string(),
            source_ip: "source_ip".to_string(),
            path: "path".to_string(),
            accessed_at: "datetime".to_string(),
            class_start: "class_start".to_string(),
            class_end: "class_end".to_string(),
            program: "program".to_string(),
        }
    }
}
impl AccessLogSchema {
    pub fn require(&self, df: &DataFrame, names: &[&str]) -> DataResult<()> {
        for name in names {
            if df.column(name).is_err() {
                return Err(DataError::ColumnNotFound {
                    column: (*name).to_string(),
                });
            }
        }
        Ok(())
    }
    pub fn all_columns(&self) -> [&str; 8] {
        [
            &self.user_id,
            &self.cohort_id,
            &self.source_ip,
            &self.path,
            &self.accessed_at,
            &self.class_start,
            &self.class_end,
            &self.program,
        ]
    }
    pub fn is_present(&self, df: &DataFrame) -> bool {
        self.require(df, &self.all_columns()).is_ok()
    }
}
