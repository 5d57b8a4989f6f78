//! Wide CSV matrices
//!
//! One row per file, one column per tag in chronological order. A file that
//! has no value at a tag gets an empty cell, never a zero.

use std::io::{Read, Write};

use crate::detector::deviation::Deviation;
use crate::detector::series::MetricMatrix;
use crate::export::error::{ExportError, ExportResult};

/// Header of the file column
pub const FILE_COLUMN: &str = "file";

/// Write `matrix` as CSV. Values use the shortest exact representation.
pub fn write_matrix<W: Write>(matrix: &MetricMatrix, writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(matrix.tags.len() + 1);
    header.push(FILE_COLUMN);
    header.extend(matrix.tags.iter().map(String::as_str));
    csv.write_record(&header)?;

    for (file, series) in &matrix.rows {
        let mut record = Vec::with_capacity(matrix.tags.len() + 1);
        record.push(file.clone());
        record.extend((0..matrix.tags.len()).map(|i| exact_cell(series.get(i))));
        csv.write_record(&record)?;
    }
    csv.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

/// Read a matrix written by [`write_matrix`]
pub fn read_matrix<R: Read>(metric: &str, reader: R) -> ExportResult<MetricMatrix> {
    let mut csv = csv::Reader::from_reader(reader);
    let headers = csv.headers()?.clone();
    match headers.get(0) {
        Some(FILE_COLUMN) => {}
        other => {
            return Err(ExportError::Malformed {
                row: 0,
                message: format!("expected '{}' as first column, found {:?}", FILE_COLUMN, other),
            })
        }
    }

    let tags = headers.iter().skip(1).map(String::from).collect();
    let mut matrix = MetricMatrix::new(metric, tags);

    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let row = index + 1;
        let file = record.get(0).unwrap_or_default();
        for (tag_index, cell) in record.iter().skip(1).enumerate() {
            if cell.is_empty() {
                continue;
            }
            let value: f64 = cell.parse().map_err(|_| ExportError::Malformed {
                row,
                message: format!("'{}' is not a number", cell),
            })?;
            matrix.insert(file, tag_index, value);
        }
    }
    Ok(matrix)
}

/// Deviation list with 4-decimal values; undefined values are empty cells
pub fn write_deviations<W: Write>(deviations: &[Deviation], writer: W) -> ExportResult<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "file",
        "metric",
        "previous_tag",
        "current_tag",
        "previous_value",
        "current_value",
        "mean_prior",
        "deviation_from_previous",
        "deviation_from_mean",
        "context_metric",
        "context_previous",
        "context_current",
        "context_difference",
    ])?;

    for d in deviations {
        let context = d.context.as_ref();
        csv.write_record([
            d.file_path.clone(),
            d.metric.clone(),
            d.previous_tag.clone(),
            d.current_tag.clone(),
            fixed_cell(Some(d.previous_value)),
            fixed_cell(Some(d.current_value)),
            fixed_cell(Some(d.mean_prior)),
            fixed_cell(Some(d.deviation_from_previous)),
            fixed_cell(Some(d.deviation_from_mean)),
            context.map(|c| c.metric.clone()).unwrap_or_default(),
            fixed_cell(context.and_then(|c| c.previous)),
            fixed_cell(context.and_then(|c| c.current)),
            fixed_cell(context.and_then(|c| c.difference())),
        ])?;
    }
    csv.flush().map_err(|e| ExportError::Csv(e.into()))?;
    Ok(())
}

fn exact_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}

fn fixed_cell(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.4}", v),
        _ => String::new(),
    }
}
