// src/client/route_guard.rs

use crate::{
    common::{
        access::{is_allowed, PAGE_RULES},
        error::ACCESS_DENIED_FALLBACK,
    },
    models::auth::Role,
};
use reqwest::Method;

/// Estado da consulta `current-user` do ponto de vista da tela.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Loading,
    Anonymous,
    User(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    Loading,
    RedirectToLogin { next: String },
    AccessDenied { fallback: &'static str },
    Render,
}

/// Decide o que a página `path` mostra. `/login` sempre renderiza.
pub fn evaluate(path: &str, auth: AuthState) -> GuardOutcome {
    if path == "/login" || path.starts_with("/login?") {
        return GuardOutcome::Render;
    }
    match auth {
        AuthState::Loading => GuardOutcome::Loading,
        AuthState::Anonymous => GuardOutcome::RedirectToLogin {
            next: path.to_string(),
        },
        AuthState::User(role) => {
            // Páginas são só leitura do ponto de vista da lista
            if is_allowed(PAGE_RULES, &Method::GET, path, role) {
                GuardOutcome::Render
            } else {
                GuardOutcome::AccessDenied {
                    fallback: ACCESS_DENIED_FALLBACK,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn student_is_sent_to_parts_inventory() {
        assert_eq!(
            evaluate("/reports", AuthState::User(Role::Student)),
            GuardOutcome::AccessDenied { fallback: "/parts-inventory" }
        );
        assert_eq!(
            evaluate("/parts-inventory", AuthState::User(Role::Student)),
            GuardOutcome::Render
        );
    }

    #[test]
    fn anonymous_goes_to_login_with_next() {
        assert_eq!(
            evaluate("/deliveries", AuthState::Anonymous),
            GuardOutcome::RedirectToLogin { next: "/deliveries".into() }
        );
    }

    #[test]
    fn loading_waits() {
        assert_eq!(evaluate("/deliveries", AuthState::Loading), GuardOutcome::Loading);
    }

    #[test]
    fn controller_sees_reports_but_not_staff_admin() {
        assert_eq!(evaluate("/reports", AuthState::User(Role::Controller)), GuardOutcome::Render);
        assert_eq!(
            evaluate("/staff", AuthState::User(Role::Controller)),
            GuardOutcome::AccessDenied { fallback: "/parts-inventory" }
        );
    }
}
