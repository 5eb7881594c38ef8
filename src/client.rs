//! Biblioteca de cliente tipada para a API: cache de consultas, mutações
//! com invalidação e o guarda de rotas das páginas.

pub mod invalidation;
pub mod query_client;
pub mod route_guard;

pub use query_client::{ClientError, Mutation, QueryClient};
pub use route_guard::{evaluate, AuthState, GuardOutcome};
