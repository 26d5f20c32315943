pub mod table;
pub mod value_range;

pub use table::{RaggedPolicy, Table};
pub use value_range::ValueRange;
