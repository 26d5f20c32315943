pub mod csv_writer;
pub mod exporter;
pub mod token_store;

pub use exporter::{ExportOptions, ExportOutcome, Exporter};
pub use token_store::TokenStore;
