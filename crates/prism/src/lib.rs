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

pub mod analysis;
pub mod chart;
pub mod error;
pub mod histogram;
pub mod profiler;
pub mod report;
pub mod schema;

pub use analysis::{
    cohort_path_shares, cross_program_access, post_grad_paths, scan_activity, AccessCount,
    ActivityAnomalies, AnomalyConfig, CohortPathReport, CohortPathShares, CrossProgramAccess,
    MonthlyCount, PathCount, PathShare, PathShareConfig, PostGradReport, ProgramPaths,
};
pub use chart::{ChartSpec, LayoutHints, Orientation, SeriesSpec};
pub use error::{ChartError, DataError, EdaError, Result};
pub use histogram::{HistogramBin, HistogramGrid, HistogramPanel};
pub use profiler::{
    ColumnDescriptor, ColumnKind, DatasetReport, IndexSpec, MissingDateFinding, Profiler,
    ProfilerConfig, ReportOptions, ValueRange,
};
pub use report::{print_report, render_report, write_report};
pub use schema::AccessLogSchema;

use polars::prelude::DataFrame;

pub struct EdaToolkit {
    profiler: Profiler,
    schema: AccessLogSchema,
}
impl EdaToolkit {
    pub fn new() -> Self {
        Self {
            profiler: Profiler::new(),
            schema: AccessLogSchema::default(),
        }
    }
    pub fn with_config(config: ProfilerConfig, schema: AccessLogSchema) -> Self {
        Self {
            profiler: Profiler::with_config(config),
            schema,
        }
    }
    pub fn schema(&self) -> &AccessLogSchema {
        &self.schema
    }
    pub fn profile(&self, df: &DataFrame, opts: &ReportOptions) -> Result<DatasetReport> {
        Ok(self.profiler.profile(df, opts)?)
    }
    pub fn check_columns(&self, df: &DataFrame, opts: &ReportOptions) -> Result<DataFrame> {
        let report = self.profiler.profile(df, opts)?;
        report::print_report(&report)?;
        Ok(report.to_dataframe()?)
    }
    pub fn cohort_path_shares(
        &self,
        df: &DataFrame,
        cfg: &PathShareConfig,
    ) -> Result<CohortPathReport> {
        Ok(analysis::cohort_path_shares(df, &self.schema, cfg)?)
    }
    pub fn scan_activity(&self, df: &DataFrame, cfg: &AnomalyConfig) -> Result<ActivityAnomalies> {
        Ok(analysis::scan_activity(df, &self.schema, cfg)?)
    }
    pub fn cross_program_access(&self, df: &DataFrame) -> Result<CrossProgramAccess> {
        Ok(analysis::cross_program_access(df, &self.schema)?)
    }
    pub fn post_grad_paths(&self, df: &DataFrame, top_n: usize) -> Result<PostGradReport> {
        Ok(analysis::post_grad_paths(df, &self.schema, top_n)?)
    }
}
impl Default for EdaToolkit {
    fn default() -> Self {
        Self::new()
    }
}

pub fn check_columns(df: &DataFrame, opts: &ReportOptions) -> Result<DataFrame> {
    EdaToolkit::new().check_columns(df, opts)
}
