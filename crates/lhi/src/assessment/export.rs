use std::io::Write;

use super::catalog::Catalog;
use super::repository::AssessmentRecord;

const LEADING_COLUMNS: [&str; 6] = [
    "id",
    "createdAt",
    "accessCode",
    "totalScore",
    "category",
    "attachmentStyle",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV output: {0}")]
    Io(#[from] std::io::Error),
}

/// Header row: fixed leading columns, one `T:<dimension id>` column per catalog
/// dimension, then the client address.
pub fn csv_header(catalog: &Catalog) -> Vec<String> {
    LEADING_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(
            catalog
                .dimensions()
                .iter()
                .map(|dimension| format!("T:{}", dimension.id)),
        )
        .chain(std::iter::once("ipAddress".to_string()))
        .collect()
}

/// Write `records` as CSV in the given order. Dimensions missing from a record leave an
/// empty cell.
pub fn write_csv<W: Write>(
    writer: W,
    catalog: &Catalog,
    records: &[AssessmentRecord],
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(csv_header(catalog))?;

    for record in records {
        let mut row = vec![
            record.id.0.clone(),
            record.created_at.to_rfc3339(),
            record.access_code.clone(),
            record.result.total_score.to_string(),
            record.result.category.label().to_string(),
            record.result.attachment_style.label().to_string(),
        ];
        row.extend(catalog.dimensions().iter().map(|dimension| {
            record
                .result
                .dimension(&dimension.id)
                .map(|result| result.t_score.to_string())
                .unwrap_or_default()
        }));
        row.push(record.ip_address.clone().unwrap_or_default());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn export_csv(catalog: &Catalog, records: &[AssessmentRecord]) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, catalog, records)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
