// src/models/import.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ImportRowError {
    /// Linha da planilha (1 = cabeçalho).
    pub row: usize,
    pub message: String,
}

/// Resultado de uma importação; sucesso parcial é normal.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported_rows: usize,
    pub total_rows: usize,
    pub errors: Vec<ImportRowError>,
}

impl ImportSummary {
    pub fn new(total_rows: usize) -> Self {
        Self { total_rows, ..Default::default() }
    }

    pub fn fail(&mut self, row: usize, message: impl Into<String>) {
        self.errors.push(ImportRowError { row, message: message.into() });
    }
}
