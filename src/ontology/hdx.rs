//! Text extraction from HDX spreadsheet exports (`.xlsx`, `.xls`, `.ods`).
//!
//! The first row of a sheet is its header. Every column holding at least one
//! string cell counts as a text column; its non-empty cells are extracted
//! column by column, top to bottom, for [`super::preprocess::prepare_sentences`].

use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use thiserror::Error;
use tracing::{info, warn};

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("cannot read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("sheet '{name}' not found (available: {})", available.join(", "))]
    MissingSheet { name: String, available: Vec<String> },
}

/// True when `path` has a spreadsheet extension.
pub fn is_spreadsheet(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| SPREADSHEET_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// Text segments of `sheet`, or of the first sheet when `sheet` is `None`.
pub fn read_sheet_texts(path: &Path, sheet: Option<&str>) -> Result<Vec<String>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names().to_vec();

    let name = match sheet {
        Some(name) if available.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(SheetError::MissingSheet { name: name.to_string(), available });
        }
        None => available.first().cloned().ok_or(SheetError::NoSheets)?,
    };

    let range = workbook.worksheet_range(&name)?;
    info!(sheet = %name, rows = range.height().saturating_sub(1), "loaded sheet");
    Ok(text_columns(&range))
}

/// Non-empty cells of every text column, column-major. Row 0 is the header.
pub fn text_columns(range: &Range<Data>) -> Vec<String> {
    let rows: Vec<&[Data]> = range.rows().collect();
    let Some((header, data)) = rows.split_first() else {
        warn!("sheet is empty");
        return Vec::new();
    };

    let mut texts = Vec::new();
    for col in 0..range.width() {
        let cells: Vec<&Data> = data.iter().filter_map(|row| row.get(col)).collect();
        if !cells.iter().any(|c| matches!(c, Data::String(_))) {
            continue;
        }
        let before = texts.len();
        texts.extend(cells.into_iter().filter_map(cell_text));
        let column = header.get(col).and_then(cell_text).unwrap_or_else(|| format!("#{col}"));
        info!(column = %column, segments = texts.len() - before, "extracted text column");
    }
    texts
}

fn cell_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
    };
    (!text.trim().is_empty()).then_some(text)
}
