pub mod reference_cache;
pub mod token;
pub mod token_cache;
