pub mod sheets_api;

pub use sheets_api::{SheetsApi, spreadsheet_id_from};
