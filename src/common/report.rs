// src/common/report.rs
//
// Tabela intermediária usada por todas as exportações. A tela (JSON) e os
// arquivos (CSV / XLSX / PDF) saem das mesmas linhas, na mesma ordem.

use chrono::{DateTime, Utc};
use genpdf::{elements, style, Element};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Deserialize;

use crate::common::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Money(Decimal),
    Timestamp(DateTime<Utc>),
    Empty,
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn opt_text(value: Option<&str>) -> Self {
        value.map(Cell::text).unwrap_or(Cell::Empty)
    }

    pub fn opt_money(value: Option<Decimal>) -> Self {
        value.map(Cell::Money).unwrap_or(Cell::Empty)
    }

    pub fn opt_timestamp(value: Option<DateTime<Utc>>) -> Self {
        value.map(Cell::Timestamp).unwrap_or(Cell::Empty)
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Int(n) => n.to_string(),
            Cell::Money(d) => format!("{:.2}", d),
            Cell::Timestamp(t) => t.format("%Y-%m-%d %H:%M").to_string(),
            Cell::Empty => String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone)]
pub struct ReportTable {
    pub title: String,
    pub sheets: Vec<Sheet>,
}

impl ReportTable {
    pub fn single(title: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        Self {
            title: title.to_string(),
            sheets: vec![Sheet {
                name: title.chars().take(31).collect(),
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            }],
        }
    }

    pub fn with_sheet(mut self, name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push(Sheet {
            name: name.chars().take(31).collect(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        });
        self
    }

    /// Somente a primeira aba vai para CSV.
    pub fn to_csv(&self) -> Result<Vec<u8>, AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        if let Some(sheet) = self.sheets.first() {
            writer
                .write_record(&sheet.headers)
                .map_err(|e| anyhow::anyhow!("csv header: {}", e))?;
            for row in &sheet.rows {
                writer
                    .write_record(row.iter().map(Cell::display))
                    .map_err(|e| anyhow::anyhow!("csv row: {}", e))?;
            }
        }
        writer
            .into_inner()
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("csv flush: {}", e)))
    }

    pub fn to_xlsx(&self) -> Result<Vec<u8>, AppError> {
        let mut workbook = Workbook::new();
        let bold = Format::new().set_bold();
        let money = Format::new().set_num_format("#,##0.00");
        let date = Format::new().set_num_format("yyyy-mm-dd hh:mm");

        for sheet in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(&sheet.name)?;
            for (col, header) in sheet.headers.iter().enumerate() {
                worksheet.write_string_with_format(0, col as u16, header, &bold)?;
            }
            for (i, row) in sheet.rows.iter().enumerate() {
                let r = (i + 1) as u32;
                for (c, cell) in row.iter().enumerate() {
                    write_cell(worksheet, r, c as u16, cell, &money, &date)?;
                }
            }
            worksheet.autofit();
        }

        Ok(workbook.save_to_buffer()?)
    }

    pub fn to_pdf(&self, font_dir: &str) -> Result<Vec<u8>, AppError> {
        let font_family = genpdf::fonts::from_files(font_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(font_dir.to_string()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(self.title.clone());
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        doc.push(
            elements::Paragraph::new(self.title.clone())
                .styled(style::Style::new().bold().with_font_size(16)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Generated {}",
            Utc::now().format("%Y-%m-%d %H:%M UTC")
        )));
        doc.push(elements::Break::new(1.5));

        for sheet in &self.sheets {
            if self.sheets.len() > 1 {
                doc.push(
                    elements::Paragraph::new(sheet.name.clone())
                        .styled(style::Style::new().bold().with_font_size(12)),
                );
            }

            let mut table = elements::TableLayout::new(vec![1; sheet.headers.len().max(1)]);
            table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

            let style_bold = style::Style::new().bold().with_font_size(8);
            let mut header = table.row();
            for h in &sheet.headers {
                header.push_element(elements::Paragraph::new(h.clone()).styled(style_bold));
            }
            header
                .push()
                .map_err(|e| anyhow::anyhow!("pdf header row: {}", e))?;

            for row in &sheet.rows {
                let mut line = table.row();
                for cell in row {
                    line.push_element(
                        elements::Paragraph::new(cell.display())
                            .styled(style::Style::new().with_font_size(8)),
                    );
                }
                line.push().map_err(|e| anyhow::anyhow!("pdf row: {}", e))?;
            }

            doc.push(table);
            doc.push(elements::Break::new(1));
        }

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        Ok(buffer)
    }
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    money: &Format,
    date: &Format,
) -> Result<(), AppError> {
    match cell {
        Cell::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        Cell::Int(n) => {
            worksheet.write_number(row, col, *n as f64)?;
        }
        Cell::Money(d) => {
            worksheet.write_number_with_format(row, col, d.to_f64().unwrap_or_default(), money)?;
        }
        Cell::Timestamp(t) => {
            worksheet.write_string_with_format(row, col, t.format("%Y-%m-%d %H:%M").to_string(), date)?;
        }
        Cell::Empty => {}
    }
    Ok(())
}

// ---
// Formato de exportação
// ---
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// PDF abre numa aba nova; planilhas são baixadas.
    pub fn disposition(&self, base_name: &str) -> String {
        let kind = if *self == ExportFormat::Pdf { "inline" } else { "attachment" };
        format!("{}; filename=\"{}.{}\"", kind, base_name, self.extension())
    }

    pub fn render(&self, table: &ReportTable, font_dir: &str) -> Result<Vec<u8>, AppError> {
        match self {
            ExportFormat::Csv => table.to_csv(),
            ExportFormat::Xlsx => table.to_xlsx(),
            ExportFormat::Pdf => table.to_pdf(font_dir),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn sample() -> ReportTable {
        ReportTable::single(
            "Deliveries",
            &["Part", "Qty", "Cost"],
            vec![
                vec![Cell::text("B-2"), Cell::Int(3), Cell::Money(Decimal::new(1050, 2))],
                vec![Cell::text("A-1"), Cell::Int(1), Cell::Empty],
            ],
        )
    }

    #[test]
    fn csv_keeps_row_order_and_count() {
        let bytes = sample().to_csv().unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["Part,Qty,Cost", "B-2,3,10.50", "A-1,1,"]);
    }

    #[test]
    fn xlsx_is_a_zip_container() {
        let bytes = sample()
            .with_sheet("Summary", &["Total"], vec![vec![Cell::Int(4)]])
            .to_xlsx()
            .unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn pdf_is_inline_spreadsheets_are_attachments() {
        assert!(ExportFormat::Pdf.disposition("r").starts_with("inline"));
        assert_eq!(
            ExportFormat::Csv.disposition("report"),
            "attachment; filename=\"report.csv\""
        );
    }

    #[test]
    fn missing_fonts_surface_as_error() {
        let err = sample().to_pdf("/definitely/not/here").unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
