// src/load/mod.rs
use anyhow::{bail, Context, Result};
use calamine::{open_workbook, Data, Reader, Xlsx};
use std::path::Path;
use tracing::{info, instrument};

use crate::config::SheetLayout;

/// One view of the sheet as an ordered grid of text cells. The workbook types
/// are erased here: blanks and error cells become empty strings, numbers keep
/// their display text and are parsed where a stage actually needs a number.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSheet {
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Widest row in the grid. Rows below a merged region often come back
    /// ragged, so callers pad to this width rather than trusting any one row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }
}

/// Reads the headers view and the data view of the configured sheet. The two
/// views overlap deliberately: the headers view is the `header_rows` rows
/// starting at `header_skip_rows`, the data view is everything from
/// `data_skip_rows` down.
#[instrument(level = "info", skip(path, layout), fields(workbook = %path.as_ref().display()))]
pub fn load_views<P: AsRef<Path>>(path: P, layout: &SheetLayout) -> Result<(RawSheet, RawSheet)> {
    let path = path.as_ref();
    let mut workbook: Xlsx<_> = open_workbook(path)
        .with_context(|| format!("opening workbook {}", path.display()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet_names.get(layout.sheet_index) {
        Some(name) => name.clone(),
        None => bail!(
            "sheet index {} out of range: workbook has {} sheets",
            layout.sheet_index,
            sheet_names.len()
        ),
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("reading sheet `{}`", sheet_name))?;
    let grid: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    let (headers, data) = split_views(grid, layout)?;
    info!(
        sheet = %sheet_name,
        header_rows = headers.rows.len(),
        data_rows = data.rows.len(),
        "loaded sheet views"
    );
    Ok((headers, data))
}

/// Slices one grid into the overlapping headers/data views. Split out of
/// `load_views` so the offset arithmetic is testable without a workbook.
pub fn split_views(grid: Vec<Vec<String>>, layout: &SheetLayout) -> Result<(RawSheet, RawSheet)> {
    let header_end = layout.header_skip_rows + layout.header_rows;
    if grid.len() < header_end {
        bail!(
            "sheet has {} rows but the header block needs rows {}..{}",
            grid.len(),
            layout.header_skip_rows,
            header_end
        );
    }
    if grid.len() <= layout.data_skip_rows {
        bail!("sheet has no data rows below offset {}", layout.data_skip_rows);
    }

    let headers = RawSheet {
        rows: grid[layout.header_skip_rows..header_end].to_vec(),
    };
    let data = RawSheet {
        rows: grid[layout.data_skip_rows..].to_vec(),
    };
    Ok((headers, data))
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            // count cells load as floats; keep integral values free of ".0"
            if f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                f.to_string()
            }
        }
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.as_f64().to_string(),
        Data::DateTimeIso(s) => s.trim().to_string(),
        Data::DurationIso(s) => s.trim().to_string(),
        Data::Error(_) => String::new(),
    }
}
