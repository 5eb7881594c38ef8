// src/services/import_service.rs
//
// Importação de planilhas (XLSX ou CSV). Cada linha é validada e gravada
// sozinha; linhas ruins viram erros no resumo e não param a importação.

use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use validator::{Validate, ValidateEmail};

use crate::{
    common::{
        error::AppError,
        sheet::{parse_int, UploadedTable},
    },
    db::{PartRepository, ReferenceRepository, StaffRepository},
    models::{
        import::{ImportRowError, ImportSummary},
        parts::CreatePartPayload,
        reference::StaffPayload,
    },
    services::realtime::Notifier,
};

pub const STAFF_HEADERS: &[&str] = &["Name", "Email", "Phone", "Building", "Cost Center"];
pub const PART_HEADERS: &[&str] = &[
    "Part ID",
    "Name",
    "Description",
    "Quantity",
    "Reorder Level",
    "Unit Cost",
    "Category",
    "Location",
    "Shelf",
];

/// Linha da planilha de funcionários já validada (prédio/centro ainda por nome).
#[derive(Debug, Clone, PartialEq)]
pub struct StaffRow {
    pub row: usize,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub building: Option<String>,
    pub cost_center: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PartRow {
    pub row: usize,
    pub part: CreatePartPayload,
}

/// Linha 1 é o cabeçalho; a primeira linha de dados é a 2.
fn sheet_row(index: usize) -> usize {
    index + 2
}

pub fn parse_staff_rows(table: &UploadedTable) -> Result<(Vec<StaffRow>, Vec<ImportRowError>), AppError> {
    if !table.has_column(&["name", "staff name", "full name"]) {
        return Err(AppError::InvalidUpload("missing required column 'Name'".into()));
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (i, cells) in table.rows.iter().enumerate() {
        let row = sheet_row(i);
        let Some(name) = table.get(cells, &["name", "staff name", "full name"]) else {
            errors.push(ImportRowError { row, message: "Name is required".into() });
            continue;
        };
        let email = table.get(cells, &["email", "e-mail", "email address"]);
        if let Some(e) = email {
            if !e.validate_email() {
                errors.push(ImportRowError { row, message: format!("Invalid email '{}'", e) });
                continue;
            }
        }
        rows.push(StaffRow {
            row,
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: table.get(cells, &["phone", "phone number"]).map(str::to_string),
            building: table.get(cells, &["building", "building name"]).map(str::to_string),
            cost_center: table
                .get(cells, &["cost center", "cost center code", "costcenter"])
                .map(str::to_string),
        });
    }
    Ok((rows, errors))
}

pub fn parse_part_rows(table: &UploadedTable) -> Result<(Vec<PartRow>, Vec<ImportRowError>), AppError> {
    for required in [&["part id", "partid", "part number"][..], &["name", "part name"][..]] {
        if !table.has_column(required) {
            return Err(AppError::InvalidUpload(format!("missing required column '{}'", required[0])));
        }
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    for (i, cells) in table.rows.iter().enumerate() {
        let row = sheet_row(i);
        match parse_part_row(table, cells) {
            Ok(part) => rows.push(PartRow { row, part }),
            Err(message) => errors.push(ImportRowError { row, message }),
        }
    }
    Ok((rows, errors))
}

fn parse_part_row(table: &UploadedTable, cells: &[String]) -> Result<CreatePartPayload, String> {
    let part_id = table
        .get(cells, &["part id", "partid", "part number"])
        .ok_or("Part ID is required")?;
    let name = table.get(cells, &["name", "part name"]).ok_or("Name is required")?;

    let int_field = |names: &[&str], label: &str| -> Result<i32, String> {
        match table.get(cells, names) {
            None => Ok(0),
            Some(v) => parse_int(v).ok_or_else(|| format!("{} must be a whole number, got '{}'", label, v)),
        }
    };
    let quantity = int_field(&["quantity", "qty"], "Quantity")?;
    let reorder_level = int_field(&["reorder level", "reorder"], "Reorder level")?;

    let unit_cost = match table.get(cells, &["unit cost", "cost", "price"]) {
        None => None,
        Some(v) => Some(
            Decimal::from_str(v.trim_start_matches('$'))
                .map_err(|_| format!("Unit cost must be a number, got '{}'", v))?
                .round_dp(2),
        ),
    };

    let payload = CreatePartPayload {
        part_id: part_id.to_string(),
        name: name.to_string(),
        description: table.get(cells, &["description"]).map(str::to_string),
        quantity,
        reorder_level,
        unit_cost,
        category: table.get(cells, &["category"]).map(str::to_string),
        location: table.get(cells, &["location"]).map(str::to_string),
        shelf: table.get(cells, &["shelf"]).map(str::to_string),
    };
    payload.validate().map_err(|e| {
        e.field_errors()
            .values()
            .flat_map(|errs| errs.iter())
            .filter_map(|err| err.message.as_ref().map(|m| m.to_string()))
            .collect::<Vec<_>>()
            .join("; ")
    })?;
    Ok(payload)
}

#[derive(Clone)]
pub struct ImportService {
    pool: PgPool,
    staff_repo: StaffRepository,
    reference_repo: ReferenceRepository,
    part_repo: PartRepository,
    notifier: Notifier,
}

impl ImportService {
    pub fn new(
        pool: PgPool,
        staff_repo: StaffRepository,
        reference_repo: ReferenceRepository,
        part_repo: PartRepository,
        notifier: Notifier,
    ) -> Self {
        Self {
            pool,
            staff_repo,
            reference_repo,
            part_repo,
            notifier,
        }
    }

    pub async fn import_staff(&self, file_name: &str, bytes: &[u8]) -> Result<ImportSummary, AppError> {
        let table = UploadedTable::parse(file_name, bytes)?;
        let (rows, errors) = parse_staff_rows(&table)?;

        let mut summary = ImportSummary::new(table.rows.len());
        summary.errors = errors;

        for row in rows {
            match self.insert_staff_row(&row).await {
                Ok(()) => summary.imported_rows += 1,
                Err(e) => summary.fail(row.row, e.to_string()),
            }
        }
        summary.errors.sort_by_key(|e| e.row);

        tracing::info!(
            "📥 Importação de funcionários: {}/{} linhas",
            summary.imported_rows,
            summary.total_rows
        );
        if summary.imported_rows > 0 {
            self.notifier.data_changed("staff");
        }
        Ok(summary)
    }

    async fn insert_staff_row(&self, row: &StaffRow) -> Result<(), AppError> {
        let building_id = match &row.building {
            Some(name) => Some(
                self.reference_repo
                    .find_building_by_name(&self.pool, name)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Building '{}'", name)))?
                    .id,
            ),
            None => None,
        };
        let cost_center_id = match &row.cost_center {
            Some(value) => Some(
                self.reference_repo
                    .find_cost_center_by_code_or_name(&self.pool, value)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Cost center '{}'", value)))?
                    .id,
            ),
            None => None,
        };

        let payload = StaffPayload {
            name: row.name.clone(),
            building_id,
            cost_center_id,
            email: row.email.clone(),
            phone: row.phone.clone(),
        };
        self.staff_repo.create(&self.pool, &payload).await?;
        Ok(())
    }

    pub async fn import_parts(&self, file_name: &str, bytes: &[u8]) -> Result<ImportSummary, AppError> {
        let table = UploadedTable::parse(file_name, bytes)?;
        let (rows, errors) = parse_part_rows(&table)?;

        let mut summary = ImportSummary::new(table.rows.len());
        summary.errors = errors;

        for row in rows {
            match self.part_repo.upsert_by_code(&self.pool, &row.part).await {
                Ok(_) => summary.imported_rows += 1,
                Err(e) => {
                    tracing::warn!("Linha {} da importação de peças falhou: {:?}", row.row, e);
                    summary.fail(row.row, e.to_string());
                }
            }
        }
        summary.errors.sort_by_key(|e| e.row);

        tracing::info!(
            "📥 Importação de peças: {}/{} linhas",
            summary.imported_rows,
            summary.total_rows
        );
        if summary.imported_rows > 0 {
            self.notifier.data_changed("parts");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(csv: &str) -> UploadedTable {
        UploadedTable::from_csv(csv.as_bytes()).unwrap()
    }

    #[test]
    fn staff_rows_split_valid_and_invalid() {
        let t = table(
            "Name,Email,Phone,Building,Cost Center\n\
             Jane Smith,j-smith@onu.edu,555-1000,McIntosh,FAC-100\n\
             ,nobody@onu.edu,,,\n\
             Bob,not-an-email,,,\n\
             Ana,,,,\n",
        );
        let (rows, errors) = parse_staff_rows(&t).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(errors.len(), 2);
        assert_eq!(rows.len() + errors.len(), t.rows.len());
        assert_eq!(errors[0].row, 3);
        assert_eq!(errors[1].row, 4);
        assert_eq!(rows[0].building.as_deref(), Some("McIntosh"));
        assert_eq!(rows[1].email, None);
    }

    #[test]
    fn staff_file_without_name_column_is_rejected() {
        let t = table("Email\na@b.co\n");
        assert!(matches!(parse_staff_rows(&t), Err(AppError::InvalidUpload(_))));
    }

    #[test]
    fn part_rows_parse_numbers() {
        let t = table(
            "Part ID,Name,Quantity,Reorder Level,Unit Cost\n\
             FLT-1,Filter,12.0,4,$8.755\n\
             FLT-2,Filter small,-3,0,\n\
             FLT-3,Filter tiny,lots,0,\n",
        );
        let (rows, errors) = parse_part_rows(&t).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].part.quantity, 12);
        assert_eq!(rows[0].part.unit_cost, Some(Decimal::new(876, 2)));
        assert_eq!(errors.iter().map(|e| e.row).collect::<Vec<_>>(), vec![3, 4]);
        assert!(errors[0].message.contains("negative"));
    }
}
