// src/common/sheet.rs

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{open_workbook_from_rs, Reader, Xlsx};

use crate::common::error::AppError;

/// Planilha enviada pelo usuário, já normalizada para texto.
#[derive(Debug, Clone, Default)]
pub struct UploadedTable {
    headers: HashMap<String, usize>,
    pub rows: Vec<Vec<String>>,
}

fn normalize_header(h: &str) -> String {
    h.trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

impl UploadedTable {
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Result<Self, AppError> {
        if rows.is_empty() {
            return Err(AppError::InvalidUpload("the file has no header row".into()));
        }
        let header_row = rows.remove(0);
        let headers = header_row
            .iter()
            .enumerate()
            .map(|(i, h)| (normalize_header(h), i))
            .collect();

        // Linhas totalmente vazias não contam como linhas de dados
        rows.retain(|r| r.iter().any(|c| !c.trim().is_empty()));
        Ok(Self { headers, rows })
    }

    /// Decide o formato pela extensão do arquivo (XLSX ou CSV).
    pub fn parse(file_name: &str, bytes: &[u8]) -> Result<Self, AppError> {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".csv") {
            Self::from_csv(bytes)
        } else if lower.ends_with(".xlsx") || lower.ends_with(".xlsm") {
            Self::from_xlsx(bytes)
        } else {
            Err(AppError::InvalidUpload(format!(
                "unsupported file type '{}' (use .xlsx or .csv)",
                file_name
            )))
        }
    }

    pub fn from_csv(bytes: &[u8]) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| AppError::InvalidUpload(e.to_string()))?;
            rows.push(record.iter().map(|s| s.trim().to_string()).collect());
        }
        Self::from_rows(rows)
    }

    pub fn from_xlsx(bytes: &[u8]) -> Result<Self, AppError> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes.to_vec()))
            .map_err(|e: calamine::XlsxError| AppError::InvalidUpload(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| AppError::InvalidUpload("the workbook has no sheets".into()))?
            .map_err(|e| AppError::InvalidUpload(e.to_string()))?;

        let rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string().trim().to_string()).collect())
            .collect();
        Self::from_rows(rows)
    }

    /// Valor da coluna (por qualquer um dos nomes aceitos), vazio vira `None`.
    pub fn get<'a>(&self, row: &'a [String], names: &[&str]) -> Option<&'a str> {
        names
            .iter()
            .find_map(|n| self.headers.get(&normalize_header(n)))
            .and_then(|&i| row.get(i))
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }

    pub fn has_column(&self, names: &[&str]) -> bool {
        names
            .iter()
            .any(|n| self.headers.contains_key(&normalize_header(n)))
    }
}

/// Inteiros podem vir como "5" ou "5.0" (células numéricas do Excel).
pub fn parse_int(value: &str) -> Option<i32> {
    let value = value.trim();
    value.parse::<i32>().ok().or_else(|| {
        value
            .parse::<f64>()
            .ok()
            .filter(|f| f.fract() == 0.0 && *f >= i32::MIN as f64 && *f <= i32::MAX as f64)
            .map(|f| f as i32)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_matched_loosely() {
        let t = UploadedTable::from_csv(b"Part ID,Reorder Level\nA-1,5\n").unwrap();
        let row = &t.rows[0];
        assert_eq!(t.get(row, &["part_id"]), Some("A-1"));
        assert_eq!(t.get(row, &["reorderLevel"]), Some("5"));
        assert_eq!(t.get(row, &["missing"]), None);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let t = UploadedTable::from_csv(b"Name\nAlice\n,\n\nBob\n").unwrap();
        assert_eq!(t.rows.len(), 2);
    }

    #[test]
    fn excel_floats_parse_as_ints() {
        assert_eq!(parse_int("5.0"), Some(5));
        assert_eq!(parse_int(" 12 "), Some(12));
        assert_eq!(parse_int("2.5"), None);
        assert_eq!(parse_int("x"), None);
    }

    #[test]
    fn xlsx_written_by_exports_reads_back() {
        use crate::common::report::{Cell, ReportTable};

        let bytes = ReportTable::single(
            "Staff",
            &["Name", "Building"],
            vec![vec![Cell::text("Alice"), Cell::text("Main Hall")]],
        )
        .to_xlsx()
        .unwrap();
        let t = UploadedTable::parse("staff.xlsx", &bytes).unwrap();
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.get(&t.rows[0], &["building"]), Some("Main Hall"));
    }

    #[test]
    fn corrupt_xlsx_is_an_upload_error() {
        assert!(matches!(
            UploadedTable::from_xlsx(b"not a zip archive"),
            Err(AppError::InvalidUpload(_))
        ));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        assert!(matches!(
            UploadedTable::parse("staff.pdf", b""),
            Err(AppError::InvalidUpload(_))
        ));
    }
}
