use crate::error::GsheetError;
use crate::types::table::Table;
use std::io::Write;

/// UTF-8 byte-order mark; spreadsheet applications use it to detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
    pub bom: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            bom: true,
        }
    }
}

/// Write the header line followed by one line per data row. Lines end in
/// `\n`; fields are quoted only when they need to be.
pub fn write_table<W: Write>(
    table: &Table,
    mut out: W,
    opts: &CsvOptions,
) -> Result<(), GsheetError> {
    if opts.bom {
        out.write_all(UTF8_BOM)?;
    }

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(opts.delimiter)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(&table.headers)?;
    for row in &table.rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Render the whole file in memory so it can be written with one call.
pub fn render_table(table: &Table, opts: &CsvOptions) -> Result<Vec<u8>, GsheetError> {
    let mut buf = Vec::new();
    write_table(table, &mut buf, opts)?;
    Ok(buf)
}
