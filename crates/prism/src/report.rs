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

use crate::profiler::{DatasetReport, MissingDateFinding};
use itertools::Itertools;
use std::io::{self, Write};

pub fn write_report<W: Write>(report: &DatasetReport, w: &mut W) -> io::Result<()> {
    writeln!(w, "Total rows: {}", report.row_count)?;
    writeln!(w, "Total columns: {}", report.column_count)?;
    if let Some(summary) = &report.summary {
        writeln!(w, "{summary}")?;
    }
    for finding in &report.missing_dates {
        write_finding(finding, w)?;
    }
    Ok(())
}

fn write_finding<W: Write>(finding: &MissingDateFinding, w: &mut W) -> io::Result<()> {
    let target = if finding.is_index {
        "index".to_string()
    } else {
        format!("column '{}'", finding.column)
    };
    if finding.missing.is_empty() {
        writeln!(w, "No missing dates in {target}")
    } else {
        let dates = finding
            .missing
            .iter()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .join(", ");
        writeln!(
            w,
            "Missing dates in {target}: ({} Total) [{dates}]",
            finding.missing.len()
        )
    }
}

pub fn print_report(report: &DatasetReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    write_report(report, &mut lock)
}

pub fn render_report(report: &DatasetReport) -> String {
    let mut buffer = Vec::new();
    write_report(report, &mut buffer).expect("writing a report to memory cannot fail");
    String::from_utf8_lossy(&buffer).into_owned()
}
