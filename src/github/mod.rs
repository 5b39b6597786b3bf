pub mod client;
pub mod lister;
pub mod types;
