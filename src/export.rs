//! Workbook export.
//!
//! Serializes each query's dataset as one worksheet in a single `.xlsx`
//! workbook, in registry order, with a styled header row. Datasets that
//! exceed the spreadsheet format's limits are written to sibling CSV files
//! instead.

use crate::db::{Dataset, Value};
use crate::error::{ReportError, Result};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Maximum rows per worksheet (including the header row).
const MAX_SHEET_ROWS: usize = 1_048_576;

/// Maximum columns per worksheet.
const MAX_SHEET_COLUMNS: usize = 16_384;

/// Maximum worksheet name length.
const MAX_SHEET_NAME_LEN: usize = 31;

/// Where the export step wrote its artifacts.
#[derive(Debug, Clone, Default)]
pub struct ExportOutput {
    /// The workbook path, if at least one sheet was written.
    pub workbook: Option<PathBuf>,

    /// CSV files written for datasets too large for a worksheet.
    pub csv_files: Vec<PathBuf>,

    /// Sheet names, in the order they appear in the workbook.
    pub sheets: Vec<String>,
}

/// Workbook builder holding shared cell formats.
pub struct WorkbookBuilder {
    workbook: Workbook,
    header_format: Format,
    sheet_count: usize,
}

impl WorkbookBuilder {
    /// Creates an empty workbook with the shared formats.
    pub fn new() -> Self {
        // Header style: blue background, white bold text
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(0x4472C4))
            .set_align(FormatAlign::Center)
            .set_border(FormatBorder::Thin);

        Self {
            workbook: Workbook::new(),
            header_format,
            sheet_count: 0,
        }
    }

    /// Returns the number of sheets added so far.
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    /// Adds one worksheet holding the dataset, named after the query.
    pub fn add_sheet(&mut self, name: &str, dataset: &Dataset) -> Result<()> {
        let sheet_name = sanitize_sheet_name(name);
        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet_name)
            .map_err(|e| ReportError::export(format!("Invalid sheet name '{sheet_name}': {e}")))?;

        for (col, column) in dataset.columns.iter().enumerate() {
            worksheet
                .write_with_format(0, col as u16, &column.name, &self.header_format)
                .map_err(|e| ReportError::export(format!("Failed to write header: {e}")))?;
        }

        for (row_idx, row) in dataset.rows.iter().enumerate() {
            let row_num = (row_idx + 1) as u32;
            for (col_idx, value) in row.iter().enumerate() {
                write_cell(worksheet, row_num, col_idx as u16, value)?;
            }
        }

        worksheet.autofit();
        self.sheet_count += 1;
        Ok(())
    }

    /// Writes the workbook to disk.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.workbook
            .save(path)
            .map_err(|e| ReportError::export(format!("Failed to save '{}': {e}", path.display())))
    }
}

impl Default for WorkbookBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Exports the datasets of a report run to `<output_dir>/<report_name>.xlsx`.
///
/// Datasets are written in the given order, one sheet per query. Oversized
/// datasets fall back to `<report_name>__<query_name>.csv` next to the
/// workbook.
pub fn export_report(
    report_name: &str,
    output_dir: &Path,
    datasets: &[(String, Dataset)],
) -> Result<ExportOutput> {
    fs::create_dir_all(output_dir)
        .map_err(|e| ReportError::export(format!("Failed to create output dir: {e}")))?;

    let mut builder = WorkbookBuilder::new();
    let mut output = ExportOutput::default();

    for (name, dataset) in datasets {
        if exceeds_sheet_limits(dataset) {
            let csv_path = output_dir.join(format!("{report_name}__{name}.csv"));
            warn!(
                "Dataset '{}' exceeds worksheet limits, exporting to '{}'",
                name,
                csv_path.display()
            );
            write_csv(&csv_path, dataset)?;
            output.csv_files.push(csv_path);
        } else {
            debug!("Writing sheet '{}' with {} rows", name, dataset.row_count());
            builder.add_sheet(name, dataset)?;
            output.sheets.push(name.clone());
        }
    }

    if builder.sheet_count() > 0 {
        let workbook_path = output_dir.join(format!("{report_name}.xlsx"));
        builder.save(&workbook_path)?;
        info!("Exported workbook to '{}'", workbook_path.display());
        output.workbook = Some(workbook_path);
    }

    Ok(output)
}

fn exceeds_sheet_limits(dataset: &Dataset) -> bool {
    dataset.row_count() + 1 > MAX_SHEET_ROWS || dataset.column_count() > MAX_SHEET_COLUMNS
}

/// Writes a single cell, leaving NULL values blank.
fn write_cell(
    worksheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    value: &Value,
) -> Result<()> {
    let result = match value {
        Value::Null => return Ok(()),
        Value::Bool(b) => worksheet.write_boolean(row, col, *b),
        Value::Int(i) => worksheet.write_number(row, col, *i as f64),
        Value::Float(f) => worksheet.write_number(row, col, *f),
        Value::Text(s) => worksheet.write_string(row, col, s),
        Value::Bytes(b) => worksheet.write_string(row, col, format!("<{} bytes>", b.len())),
    };

    result
        .map(|_| ())
        .map_err(|e| ReportError::export(format!("Failed to write cell: {e}")))
}

/// Sanitizes a query name into a legal worksheet name.
///
/// Worksheet names are capped at 31 characters and may not contain
/// `[ ] : * ? / \`.
fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .take(MAX_SHEET_NAME_LEN)
        .collect();

    if cleaned.is_empty() {
        "Sheet".to_string()
    } else {
        cleaned
    }
}

/// Writes a dataset as a CSV file.
fn write_csv(path: &Path, dataset: &Dataset) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| ReportError::export(format!("Failed to create '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);

    let header: Vec<String> = dataset
        .columns
        .iter()
        .map(|c| escape_csv_field(&c.name))
        .collect();
    writeln!(writer, "{}", header.join(","))
        .map_err(|e| ReportError::export(format!("Failed to write CSV: {e}")))?;

    for row in &dataset.rows {
        let fields: Vec<String> = row
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                other => escape_csv_field(&other.to_display_string()),
            })
            .collect();
        writeln!(writer, "{}", fields.join(","))
            .map_err(|e| ReportError::export(format!("Failed to write CSV: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| ReportError::export(format!("Failed to write CSV: {e}")))
}

fn escape_csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
