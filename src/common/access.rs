// src/common/access.rs

use axum::http::Method;

use crate::models::auth::Role;

use Role::{Admin, Controller, Student, Technician};

const ALL: &[Role] = &[Admin, Technician, Student, Controller];
const STAFF: &[Role] = &[Admin, Technician, Controller];
const ADMIN: &[Role] = &[Admin];

/// Uma regra por prefixo de rota: quem pode ler (GET/HEAD) e quem pode escrever.
#[derive(Debug, Clone, Copy)]
pub struct AccessRule {
    pub prefix: &'static str,
    pub read: &'static [Role],
    pub write: &'static [Role],
}

const fn rule(prefix: &'static str, read: &'static [Role], write: &'static [Role]) -> AccessRule {
    AccessRule { prefix, read, write }
}

// ---
// Rotas da API
// ---
pub const API_RULES: &[AccessRule] = &[
    rule("/api/users", ADMIN, ADMIN),
    rule("/api/technicians", &[Admin, Controller], ADMIN),
    rule("/api/parts", ALL, &[Admin, Technician]),
    rule("/api/parts/import", ADMIN, ADMIN),
    rule("/api/parts/usage-analytics", STAFF, STAFF),
    rule("/api/buildings", STAFF, ADMIN),
    rule("/api/cost-centers", STAFF, ADMIN),
    rule("/api/staff", STAFF, ADMIN),
    rule("/api/parts-delivery", STAFF, &[Admin, Technician]),
    rule("/api/excel-final", &[Admin, Controller], &[Admin, Controller]),
    rule("/api/work-orders", &[Admin, Technician], &[Admin, Technician]),
    rule("/api/parts-used", &[Admin, Technician], &[Admin, Technician]),
    rule("/api/manual-parts-review", ADMIN, ADMIN),
    rule("/api/kiosk", ALL, ALL),
];

// ---
// Rotas do cliente (páginas)
// ---
pub const PAGE_RULES: &[AccessRule] = &[
    rule("/", STAFF, STAFF),
    rule("/parts-inventory", ALL, ALL),
    rule("/kiosk", ALL, ALL),
    rule("/parts-issuance", &[Admin, Technician], &[Admin, Technician]),
    rule("/deliveries", STAFF, STAFF),
    rule("/work-orders", &[Admin, Technician], &[Admin, Technician]),
    rule("/reports", &[Admin, Controller], &[Admin, Controller]),
    rule("/buildings", ADMIN, ADMIN),
    rule("/cost-centers", ADMIN, ADMIN),
    rule("/staff", ADMIN, ADMIN),
    rule("/technicians", ADMIN, ADMIN),
    rule("/manual-parts-review", ADMIN, ADMIN),
    rule("/users", ADMIN, ADMIN),
    rule("/settings", ADMIN, ADMIN),
];

/// `prefix` casa com `path` só em fronteira de segmento ("/api/parts" não casa "/api/parts-delivery").
fn prefix_matches(prefix: &str, path: &str) -> bool {
    if prefix == "/" {
        return path.starts_with('/');
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

/// Regra de prefixo mais longo que casa com o caminho.
pub fn find_rule<'a>(rules: &'a [AccessRule], path: &str) -> Option<&'a AccessRule> {
    rules
        .iter()
        .filter(|r| prefix_matches(r.prefix, path))
        .max_by_key(|r| r.prefix.len())
}

/// Sem regra cadastrada, só o admin passa.
pub fn is_allowed(rules: &[AccessRule], method: &Method, path: &str, role: Role) -> bool {
    let Some(rule) = find_rule(rules, path) else {
        return role == Admin;
    };
    let roles = if method == Method::GET || method == Method::HEAD {
        rule.read
    } else {
        rule.write
    };
    roles.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        let r = find_rule(API_RULES, "/api/parts/import").unwrap();
        assert_eq!(r.prefix, "/api/parts/import");
        let r = find_rule(API_RULES, "/api/parts/123").unwrap();
        assert_eq!(r.prefix, "/api/parts");
    }

    #[test]
    fn parts_prefix_does_not_swallow_parts_delivery() {
        let r = find_rule(API_RULES, "/api/parts-delivery/monthly-total").unwrap();
        assert_eq!(r.prefix, "/api/parts-delivery");
    }

    #[test]
    fn student_can_browse_parts_but_not_admin_routes() {
        assert!(is_allowed(API_RULES, &Method::GET, "/api/parts", Student));
        assert!(!is_allowed(API_RULES, &Method::POST, "/api/parts", Student));
        assert!(!is_allowed(API_RULES, &Method::GET, "/api/users", Student));
        assert!(!is_allowed(API_RULES, &Method::GET, "/api/excel-final", Student));
        assert!(!is_allowed(API_RULES, &Method::GET, "/api/parts-delivery", Student));
    }

    #[test]
    fn controller_reads_reports_but_cannot_edit_buildings() {
        assert!(is_allowed(API_RULES, &Method::GET, "/api/excel-final", Controller));
        assert!(is_allowed(API_RULES, &Method::GET, "/api/buildings", Controller));
        assert!(!is_allowed(API_RULES, &Method::POST, "/api/buildings", Controller));
    }

    #[test]
    fn unknown_routes_are_admin_only() {
        assert!(is_allowed(API_RULES, &Method::GET, "/api/secret", Admin));
        assert!(!is_allowed(API_RULES, &Method::GET, "/api/secret", Technician));
    }

    #[test]
    fn student_pages() {
        assert!(is_allowed(PAGE_RULES, &Method::GET, "/parts-inventory", Student));
        assert!(!is_allowed(PAGE_RULES, &Method::GET, "/", Student));
        assert!(!is_allowed(PAGE_RULES, &Method::GET, "/reports/monthly", Student));
    }
}
