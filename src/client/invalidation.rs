// src/client/invalidation.rs
//
// Quais chaves do cache cada escrita no servidor pode ter deixado velhas.

use reqwest::Method;

/// `prefix` cobre `key` quando é igual ou termina numa fronteira de caminho.
/// "/api/parts" cobre "/api/parts/123" e "/api/parts?search=x", mas não "/api/parts-delivery".
pub fn covers(prefix: &str, key: &str) -> bool {
    match key.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

/// Chaves invalidadas por `method endpoint`. GET não invalida nada.
pub fn for_endpoint(method: &Method, endpoint: &str) -> Vec<String> {
    if *method == Method::GET || *method == Method::HEAD {
        return Vec::new();
    }
    let path = endpoint.split('?').next().unwrap_or(endpoint);

    // Sessão nova ou encerrada: nada do cache vale mais
    if path == "/api/login" || path == "/api/logout" {
        return keys(&["/api"]);
    }
    if covers("/api/parts-delivery", path) {
        return keys(&[
            "/api/parts-delivery",
            "/api/parts-delivery/monthly-total",
            "/api/parts",
            "/api/excel-final",
        ]);
    }
    if covers("/api/parts-used", path) {
        return keys(&["/api/parts", "/api/work-orders"]);
    }
    if covers("/api/manual-parts-review", path) {
        return keys(&["/api/manual-parts-review", "/api/parts"]);
    }
    if covers("/api/kiosk", path) {
        return keys(&["/api/manual-parts-review"]);
    }
    if covers("/api/parts", path) {
        return keys(&["/api/parts"]);
    }
    if covers("/api/work-orders", path) {
        return keys(&["/api/work-orders"]);
    }
    // A listagem de funcionários traz nome do prédio e código do centro de custo
    if covers("/api/buildings", path) {
        return keys(&["/api/buildings", "/api/staff"]);
    }
    if covers("/api/cost-centers", path) {
        return keys(&["/api/cost-centers", "/api/staff"]);
    }
    if covers("/api/staff", path) {
        return keys(&["/api/staff", "/api/parts-delivery"]);
    }
    if covers("/api/technicians", path) || covers("/api/users", path) {
        return keys(&["/api/users", "/api/technicians"]);
    }
    vec![path.to_string()]
}

/// Chaves para um aviso `data-changed` do `/ws`: as mesmas de uma escrita no recurso.
pub fn for_resource(resource: &str) -> Vec<String> {
    let endpoint = format!("/api/{}", resource.trim_start_matches('/'));
    for_endpoint(&Method::POST, &endpoint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_respects_path_boundaries() {
        assert!(covers("/api/parts", "/api/parts"));
        assert!(covers("/api/parts", "/api/parts/low-stock"));
        assert!(covers("/api/parts", "/api/parts?search=filter"));
        assert!(!covers("/api/parts", "/api/parts-delivery"));
        assert!(covers("/api", "/api/parts-delivery/monthly-total"));
    }

    #[test]
    fn delivery_creation_touches_stock_and_totals() {
        let keys = for_endpoint(&Method::POST, "/api/parts-delivery");
        assert!(keys.contains(&"/api/parts-delivery".to_string()));
        assert!(keys.contains(&"/api/parts-delivery/monthly-total".to_string()));
        assert!(keys.contains(&"/api/parts".to_string()));
    }

    #[test]
    fn confirm_is_a_delivery_mutation_not_a_parts_one() {
        let keys = for_endpoint(&Method::POST, "/api/parts-delivery/5f0c/confirm");
        assert_eq!(keys[0], "/api/parts-delivery");
    }

    #[test]
    fn reads_invalidate_nothing() {
        assert!(for_endpoint(&Method::GET, "/api/parts").is_empty());
    }

    #[test]
    fn ws_resource_uses_the_write_mapping() {
        assert_eq!(
            for_resource("parts-delivery"),
            for_endpoint(&Method::POST, "/api/parts-delivery")
        );
        assert!(for_resource("parts-delivery").contains(&"/api/excel-final".to_string()));
        assert_eq!(for_resource("parts"), vec!["/api/parts".to_string()]);
    }
}
