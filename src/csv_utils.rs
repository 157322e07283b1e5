use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, StencilError};
use crate::stencil::Stencil;

/// Reads a column of f64 values from a CSV file by column name, skipping invalid/missing values.
pub fn read_csv_column<P: AsRef<Path>>(path: P, column: &str) -> Result<Vec<f64>> {
    read_column_from_reader(File::open(path)?, column)
}

/// Reads a column of f64 values from a CSV file by column index, skipping invalid/missing values.
pub fn read_csv_column_by_index<P: AsRef<Path>>(path: P, col_index: usize) -> Result<Vec<f64>> {
    read_column_by_index_from_reader(File::open(path)?, col_index)
}

/// Same as [`read_csv_column`] for any reader with a header row.
pub fn read_column_from_reader<R: Read>(reader: R, column: &str) -> Result<Vec<f64>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let col_index = rdr
        .headers()?
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| StencilError::MissingColumn(column.to_string()))?;

    collect_column(rdr, col_index)
}

/// Same as [`read_csv_column_by_index`] for any reader with a header row.
pub fn read_column_by_index_from_reader<R: Read>(reader: R, col_index: usize) -> Result<Vec<f64>> {
    collect_column(csv::Reader::from_reader(reader), col_index)
}

fn collect_column<R: Read>(mut rdr: csv::Reader<R>, col_index: usize) -> Result<Vec<f64>> {
    let mut values = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let Some(field) = record.get(col_index) {
            if let Ok(val) = field.trim().parse::<f64>() {
                values.push(val);
            }
        }
    }
    Ok(values)
}

/// Writes `offset,weight` rows for a stencil, one per sample, for plotting
/// tools that consume tabular data.
pub fn write_stencil_csv<W: Write>(writer: W, stencil: &Stencil) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["offset", "weight"])?;
    for (offset, weight) in stencil.iter() {
        wtr.write_record([offset.to_string(), weight.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}
