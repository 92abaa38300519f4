use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::Workbook;

use super::types::JobPosting;
use crate::util::time::format_date;

pub const SHEET_NAME: &str = "Jobs";
pub const HEADER: [&str; 5] = ["Title", "Company", "Location", "URL", "Source"];
pub const DATE_HEADER: &str = "Posted Date";

/// Header row and one row per posting, in the given order.
/// `with_dates` adds the Posted Date column; postings without a date leave it blank.
pub fn table_rows(postings: &[JobPosting], with_dates: bool) -> Vec<Vec<String>> {
    let mut header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    if with_dates { header.push(DATE_HEADER.to_string()); }

    let mut rows = Vec::with_capacity(postings.len() + 1);
    rows.push(header);
    for p in postings {
        let mut row = vec![p.title.clone(), p.company.clone(), p.location.clone(), p.url.clone(), p.source().name().to_string()];
        if with_dates { row.push(p.posted_date.map(format_date).unwrap_or_default()); }
        rows.push(row);
    }
    rows
}

/// Single-sheet workbook holding `table_rows`. Blank cells are left unwritten.
pub fn build_workbook(postings: &[JobPosting], with_dates: bool) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (r, row) in table_rows(postings, with_dates).iter().enumerate() {
        let r = u32::try_from(r).context("row index exceeds sheet limits")?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_empty() { continue; }
            let c = u16::try_from(c).context("column index exceeds sheet limits")?;
            sheet.write_string(r, c, cell.as_str())?;
        }
    }
    Ok(workbook)
}

/// Replace the file at `path` with a fresh workbook; earlier runs are not merged.
pub fn export_to_path(path: &Path, postings: &[JobPosting], with_dates: bool) -> Result<()> {
    let mut workbook = build_workbook(postings, with_dates)?;
    workbook.save(path).with_context(|| format!("write {}", path.display()))
}
