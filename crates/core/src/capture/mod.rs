pub mod capture_source;
pub mod domain;
pub mod infrastructure;
