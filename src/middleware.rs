pub mod auth;
pub mod client_info;
pub mod error_normalizer;
pub mod extract;
pub mod rbac;
