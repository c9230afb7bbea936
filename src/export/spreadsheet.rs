//! A minimal in-memory sheet model plus `.xlsx` read (calamine) and
//! write (rust_xlsxwriter).

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{KioskError, KioskResult};

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<i32> for CellValue {
    fn from(value: i32) -> Self {
        CellValue::Number(f64::from(value))
    }
}

impl From<&Data> for CellValue {
    fn from(value: &Data) -> Self {
        match value {
            Data::Empty => CellValue::Empty,
            Data::String(text) => CellValue::Text(text.clone()),
            Data::Float(number) => CellValue::Number(*number),
            Data::Int(number) => CellValue::Number(*number as f64),
            Data::Bool(flag) => CellValue::Bool(*flag),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(text) => f.write_str(text),
            // Whole numbers read back from Excel are floats; print them as integers.
            CellValue::Number(number) if number.fract() == 0.0 && number.abs() < 1e15 => {
                write!(f, "{}", *number as i64)
            }
            CellValue::Number(number) => write!(f, "{}", number),
            CellValue::Bool(flag) => write!(f, "{}", flag),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn require_column(&self, name: &str) -> KioskResult<usize> {
        self.column_index(name).ok_or_else(|| {
            KioskError::Validation(format!("'{}' column not found in the Excel file.", name))
        })
    }

    pub fn cell(&self, row: usize, column: usize) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .unwrap_or(EMPTY)
    }

    pub fn push_row(&mut self, row: Vec<CellValue>) {
        self.rows.push(row);
    }

    /// Reads the first worksheet; its first row is the header.
    pub fn read_xlsx(bytes: &[u8]) -> KioskResult<Sheet> {
        let mut workbook: Xlsx<Cursor<Vec<u8>>> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e| KioskError::Validation(format!("Unreadable Excel file: {}", e)))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| KioskError::Validation("The Excel file has no worksheets.".to_string()))?
            .map_err(|e| KioskError::Validation(format!("Unreadable worksheet: {}", e)))?;

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header) => header.iter().map(|cell| cell.to_string()).collect(),
            None => Vec::new(),
        };
        let rows = rows
            .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
            .map(|row| row.iter().map(CellValue::from).collect())
            .collect();

        Ok(Sheet { headers, rows })
    }

    pub fn to_workbook(&self) -> KioskResult<Workbook> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let worksheet = workbook.add_worksheet();

        for (col, header) in self.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, header, &bold)?;
        }
        for (index, row) in self.rows.iter().enumerate() {
            let row_number = index as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let col = col as u16;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Text(text) => {
                        worksheet.write_string(row_number, col, text)?;
                    }
                    CellValue::Number(number) => {
                        worksheet.write_number(row_number, col, *number)?;
                    }
                    CellValue::Bool(flag) => {
                        worksheet.write_boolean(row_number, col, *flag)?;
                    }
                }
            }
        }
        Ok(workbook)
    }

    pub fn to_xlsx_bytes(&self) -> KioskResult<Vec<u8>> {
        let mut workbook = self.to_workbook()?;
        Ok(workbook.save_to_buffer()?)
    }

    pub fn write_xlsx(&self, path: &Path) -> KioskResult<()> {
        let mut workbook = self.to_workbook()?;
        workbook.save(path)?;
        Ok(())
    }
}
