use crate::error::GsheetError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::warn;

/// What to do with data rows whose cell count differs from the header's.
///
/// Short rows are always padded with empty cells; the variants differ in how
/// rows wider than the header are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RaggedPolicy {
    /// Widen the header with unlabeled columns so no cell is dropped.
    #[default]
    Pad,
    /// Cut wide rows down to the header width.
    Truncate,
    /// Reject the export when a row is wider than the header.
    Strict,
}

/// Rectangular string table: one header row plus data rows of the same width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Split raw rows into header (row 0) and data rows.
    ///
    /// Returns `Ok(None)` when there are no rows at all.
    pub fn from_values(
        values: Vec<Vec<String>>,
        policy: RaggedPolicy,
    ) -> Result<Option<Self>, GsheetError> {
        let mut iter = values.into_iter();
        let Some(mut headers) = iter.next() else {
            return Ok(None);
        };
        let mut rows: Vec<Vec<String>> = iter.collect();

        warn_duplicate_headers(&headers);

        let header_width = headers.len();
        let widest = rows.iter().map(Vec::len).max().unwrap_or(0);

        let width = if widest <= header_width {
            header_width
        } else {
            match policy {
                RaggedPolicy::Pad => {
                    warn!(
                        header_columns = header_width,
                        widest_row = widest,
                        "rows extend past the header; adding unlabeled columns"
                    );
                    headers.resize(widest, String::new());
                    widest
                }
                RaggedPolicy::Truncate => {
                    let cut = rows.iter().filter(|r| r.len() > header_width).count();
                    warn!(
                        rows = cut,
                        header_columns = header_width,
                        "truncating rows wider than the header"
                    );
                    header_width
                }
                RaggedPolicy::Strict => {
                    if let Some((idx, row)) = rows
                        .iter()
                        .enumerate()
                        .find(|(_, r)| r.len() > header_width)
                    {
                        return Err(GsheetError::RaggedRow {
                            // 1-based, counting the header line
                            row: idx + 2,
                            cells: row.len(),
                            width: header_width,
                        });
                    }
                    header_width
                }
            }
        };

        for row in &mut rows {
            row.resize(width, String::new());
        }

        Ok(Some(Table { headers, rows }))
    }

    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn warn_duplicate_headers(headers: &[String]) {
    let mut seen = HashSet::new();
    for name in headers.iter().filter(|h| !h.is_empty()) {
        if !seen.insert(name.as_str()) {
            warn!(column = %name, "duplicate header name; columns are not uniquely addressable");
        }
    }
}
