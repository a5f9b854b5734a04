use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::rows::{Row, Tier};
use crate::state::{Column, column_label};

pub const SHEET_NAME: &str = "Assets";
const NUMBER_FORMAT: &str = "#,##0";

pub struct ExportReport {
    pub rows: usize,
}

/// Writes `rows` (already filtered and ordered for display) to a single
/// sheet workbook at `path`.
pub fn export_rows(path: &Path, rows: &[Row]) -> Result<ExportReport> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        write_header(sheet)?;
        write_rows(sheet, rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport { rows: rows.len() })
}

fn write_header(worksheet: &mut Worksheet) -> Result<()> {
    let bold = Format::new().set_bold();
    for (col_idx, column) in Column::ALL.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, column_label(*column), &bold)
            .with_context(|| format!("write header ({col_idx})"))?;
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Row]) -> Result<()> {
    let number = Format::new().set_num_format(NUMBER_FORMAT);
    for (idx, row) in rows.iter().enumerate() {
        let row_idx = idx as u32 + 1;
        worksheet
            .write_number(row_idx, 0, row.rank as f64)
            .with_context(|| format!("write cell ({row_idx},0)"))?;
        worksheet
            .write_string(row_idx, 1, &row.player)
            .with_context(|| format!("write cell ({row_idx},1)"))?;
        worksheet
            .write_string(row_idx, 2, &row.team)
            .with_context(|| format!("write cell ({row_idx},2)"))?;
        for (offset, tier) in Tier::ALL.iter().enumerate() {
            let col_idx = 3 + offset as u16;
            worksheet
                .write_number_with_format(row_idx, col_idx, row.values.get(*tier) as f64, &number)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
