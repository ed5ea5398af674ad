pub mod accounts;
pub mod memory;
