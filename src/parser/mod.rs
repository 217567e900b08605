pub mod csv;
pub mod orders;
