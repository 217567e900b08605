/// Upstream courier API: login, orders and reference data.
pub mod login;
pub mod orders;
pub mod upstream;
