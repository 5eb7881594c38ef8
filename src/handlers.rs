pub mod auth;
pub mod catalog;
pub mod deliveries;
pub mod manual_parts;
pub mod parts;
pub mod users;
pub mod work_orders;
pub mod ws;

use axum::{
    extract::Multipart,
    http::header,
    response::{IntoResponse, Response},
};

use crate::common::{
    error::AppError,
    report::{ExportFormat, ReportTable},
};

/// Renderiza a tabela no formato pedido, com os headers de download.
pub(crate) fn export_response(
    format: ExportFormat,
    base_name: &str,
    table: &ReportTable,
    font_dir: &str,
) -> Result<Response, AppError> {
    let bytes = format.render(table, font_dir)?;
    let headers = [
        (header::CONTENT_TYPE, format.content_type().to_string()),
        (header::CONTENT_DISPOSITION, format.disposition(base_name)),
    ];
    Ok((headers, bytes).into_response())
}

/// Primeiro campo de arquivo do formulário multipart.
pub(crate) async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Could not read upload: {}", e)))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(AppError::BadRequest("No file was uploaded".into()))
}
