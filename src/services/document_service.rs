// src/services/document_service.rs

use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;

use crate::{common::error::AppError, models::delivery::DeliveryDetail};

#[derive(Clone)]
pub struct DocumentService {
    font_dir: String,
}

impl DocumentService {
    pub fn new(font_dir: String) -> Self {
        Self { font_dir }
    }

    pub fn font_dir(&self) -> &str {
        &self.font_dir
    }

    /// Recibo da entrega, com QR code do id para conferência no quiosque.
    pub fn delivery_receipt(&self, detail: &DeliveryDetail) -> Result<Vec<u8>, AppError> {
        let d = &detail.delivery;

        // Carrega a fonte da pasta configurada
        let font_family = genpdf::fonts::from_files(&self.font_dir, "Roboto", None)
            .map_err(|_| AppError::FontNotFound(self.font_dir.clone()))?;

        let mut doc = genpdf::Document::new(font_family);
        doc.set_title(format!("Delivery receipt {}", d.id));
        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(10);
        doc.set_page_decorator(decorator);

        // --- CABEÇALHO ---
        doc.push(
            elements::Paragraph::new("ONU PARTS TRACKER")
                .styled(style::Style::new().bold().with_font_size(18)),
        );
        doc.push(
            elements::Paragraph::new("Parts Delivery Receipt")
                .styled(style::Style::new().bold().with_font_size(14)),
        );
        doc.push(elements::Paragraph::new(format!(
            "Delivered: {}",
            d.delivered_at.format("%Y-%m-%d %H:%M UTC")
        )));
        doc.push(elements::Paragraph::new(format!("Status: {}", d.status.as_str())));
        doc.push(elements::Break::new(1.5));

        // --- DADOS DA ENTREGA ---
        let mut table = elements::TableLayout::new(vec![1, 2]);
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let style_bold = style::Style::new().bold();
        let mut fields: Vec<(&str, String)> = vec![
            ("Part", format!("{} ({})", detail.part_name, detail.part_code)),
            ("Quantity", d.quantity.to_string()),
            ("Staff member", detail.staff_name.clone()),
            ("Building", detail.building_name.clone().unwrap_or_default()),
            (
                "Cost center",
                match (&detail.cost_center_code, &detail.cost_center_name) {
                    (Some(code), Some(name)) => format!("{} - {}", code, name),
                    (Some(code), None) => code.clone(),
                    _ => String::new(),
                },
            ),
            ("Issued by", detail.delivered_by_name.clone().unwrap_or_default()),
        ];
        if let Some(cost) = d.unit_cost {
            fields.push(("Unit cost", format!("${:.2}", cost)));
        }
        if let Some(total) = detail.total_cost() {
            fields.push(("Total cost", format!("${:.2}", total)));
        }
        if let Some(code) = &d.project_code {
            fields.push(("Project code", code.clone()));
        }
        if let Some(notes) = &d.notes {
            fields.push(("Notes", notes.clone()));
        }

        for (label, value) in fields {
            table
                .row()
                .element(elements::Paragraph::new(label).styled(style_bold))
                .element(elements::Paragraph::new(value))
                .push()
                .map_err(|e| anyhow::anyhow!("receipt row: {}", e))?;
        }
        doc.push(table);
        doc.push(elements::Break::new(2));

        // --- ASSINATURA ---
        match (&d.signature, d.confirmed_at) {
            (Some(signature), Some(at)) => {
                doc.push(elements::Paragraph::new(format!("Signed by: {}", signature)));
                doc.push(elements::Paragraph::new(format!(
                    "Confirmed: {}",
                    at.format("%Y-%m-%d %H:%M UTC")
                )));
            }
            _ => {
                doc.push(elements::Paragraph::new("Signature: ______________________________"));
            }
        }
        doc.push(elements::Break::new(2));

        // --- QR CODE ---
        let code = QrCode::new(d.id.to_string().as_bytes())
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?
            .with_scale(genpdf::Scale::new(0.5, 0.5));
        doc.push(pdf_image);
        doc.push(
            elements::Paragraph::new(d.id.to_string())
                .styled(style::Style::new().italic().with_font_size(8)),
        );

        let mut buffer = Vec::new();
        doc.render(&mut buffer)
            .map_err(|e| AppError::InternalServerError(anyhow::Error::msg(e.to_string())))?;
        Ok(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::delivery::tests::detail;

    #[test]
    fn missing_fonts_are_reported() {
        let service = DocumentService::new("/no/such/fonts".into());
        let err = service.delivery_receipt(&detail("bolt", 1, None, 1)).unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));
    }
}
