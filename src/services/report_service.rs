// src/services/report_service.rs
//
// Monta as tabelas das exportações a partir das mesmas linhas da tela.

use rust_decimal::Decimal;

use crate::{
    common::{month::MonthRange, report::{Cell, ReportTable}},
    models::{
        delivery::{summarize_by_cost_center, DeliveryDetail},
        parts::Part,
        reference::StaffMemberDetail,
    },
    services::import_service::{PART_HEADERS, STAFF_HEADERS},
};

const DELIVERY_HEADERS: &[&str] = &[
    "Delivered",
    "Part ID",
    "Part",
    "Quantity",
    "Unit Cost",
    "Total Cost",
    "Staff Member",
    "Building",
    "Cost Center",
    "Status",
    "Confirmed",
    "Delivered By",
    "Project Code",
    "Notes",
];

fn delivery_row(d: &DeliveryDetail) -> Vec<Cell> {
    vec![
        Cell::Timestamp(d.delivery.delivered_at),
        Cell::text(&d.part_code),
        Cell::text(&d.part_name),
        Cell::Int(i64::from(d.delivery.quantity)),
        Cell::opt_money(d.delivery.unit_cost),
        Cell::opt_money(d.total_cost()),
        Cell::text(&d.staff_name),
        Cell::opt_text(d.building_name.as_deref()),
        Cell::opt_text(d.cost_center_code.as_deref()),
        Cell::text(d.delivery.status.as_str()),
        Cell::opt_timestamp(d.delivery.confirmed_at),
        Cell::opt_text(d.delivered_by_name.as_deref()),
        Cell::opt_text(d.delivery.project_code.as_deref()),
        Cell::opt_text(d.delivery.notes.as_deref()),
    ]
}

/// Uma linha por entrega, na ordem recebida.
pub fn deliveries_table(title: &str, rows: &[DeliveryDetail]) -> ReportTable {
    ReportTable::single(title, DELIVERY_HEADERS, rows.iter().map(delivery_row).collect())
}

/// Fechamento mensal: entregas + resumo por centro de custo.
pub fn excel_final_table(month: &MonthRange, rows: &[DeliveryDetail]) -> ReportTable {
    let summary = summarize_by_cost_center(rows);
    let grand_total: Decimal = summary.iter().map(|s| s.total_cost).sum();

    let mut summary_rows: Vec<Vec<Cell>> = summary
        .iter()
        .map(|s| {
            vec![
                Cell::opt_text(s.cost_center_code.as_deref()),
                Cell::opt_text(s.cost_center_name.as_deref()),
                Cell::Int(s.deliveries),
                Cell::Int(s.units),
                Cell::Money(s.total_cost),
            ]
        })
        .collect();
    summary_rows.push(vec![
        Cell::text("TOTAL"),
        Cell::Empty,
        Cell::Int(summary.iter().map(|s| s.deliveries).sum()),
        Cell::Int(summary.iter().map(|s| s.units).sum()),
        Cell::Money(grand_total),
    ]);

    deliveries_table(&format!("Charge-out {}", month.label()), rows).with_sheet(
        "By Cost Center",
        &["Cost Center", "Name", "Deliveries", "Units", "Total Cost"],
        summary_rows,
    )
}

pub fn parts_table(parts: &[Part]) -> ReportTable {
    let rows = parts
        .iter()
        .map(|p| {
            vec![
                Cell::text(&p.part_id),
                Cell::text(&p.name),
                Cell::opt_text(p.description.as_deref()),
                Cell::Int(i64::from(p.quantity)),
                Cell::Int(i64::from(p.reorder_level)),
                Cell::opt_money(p.unit_cost),
                Cell::opt_text(p.category.as_deref()),
                Cell::opt_text(p.location.as_deref()),
                Cell::opt_text(p.shelf.as_deref()),
            ]
        })
        .collect();
    ReportTable::single("Parts", PART_HEADERS, rows)
}

pub fn staff_table(staff: &[StaffMemberDetail]) -> ReportTable {
    let rows = staff
        .iter()
        .map(|s| {
            vec![
                Cell::text(&s.staff.name),
                Cell::opt_text(s.staff.email.as_deref()),
                Cell::opt_text(s.staff.phone.as_deref()),
                Cell::opt_text(s.building_name.as_deref()),
                Cell::opt_text(s.cost_center_code.as_deref()),
            ]
        })
        .collect();
    ReportTable::single("Staff", STAFF_HEADERS, rows)
}

/// Modelos de importação: só o cabeçalho.
pub fn parts_template() -> ReportTable {
    ReportTable::single("Parts", PART_HEADERS, Vec::new())
}

pub fn staff_template() -> ReportTable {
    ReportTable::single("Staff", STAFF_HEADERS, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::delivery::tests::detail;

    #[test]
    fn export_keeps_screen_order_and_count() {
        let rows = vec![
            detail("washer", 1, None, 9),
            detail("anchor", 2, None, 3),
            detail("bolt", 3, None, 6),
        ];
        let table = deliveries_table("Deliveries", &rows);
        let sheet = &table.sheets[0];
        assert_eq!(sheet.rows.len(), rows.len());
        let names: Vec<String> = sheet.rows.iter().map(|r| r[2].display()).collect();
        assert_eq!(names, vec!["washer", "anchor", "bolt"]);

        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
        assert_eq!(csv.lines().count(), rows.len() + 1);
    }

    #[test]
    fn excel_final_has_summary_with_total() {
        let month = MonthRange::new(2025, 3).unwrap();
        let rows = vec![detail("bolt", 2, Some("FAC-1"), 1), detail("nut", 2, Some("FAC-2"), 2)];
        let table = excel_final_table(&month, &rows);
        assert_eq!(table.sheets.len(), 2);
        let summary = &table.sheets[1];
        assert_eq!(summary.rows.len(), 3);
        let total = summary.rows.last().unwrap();
        assert_eq!(total[0].display(), "TOTAL");
        assert_eq!(total[4], Cell::Money(Decimal::new(1000, 2)));
    }

    #[test]
    fn templates_are_header_only() {
        assert!(staff_template().sheets[0].rows.is_empty());
        assert_eq!(parts_template().sheets[0].headers[0], "Part ID");
    }
}
