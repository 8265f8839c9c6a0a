//! Roster CSV reader: header row plus comma-separated records.

use serde::de::DeserializeOwned;

use crate::error::{LabAccessError, Result};

/// Parse a roster file into typed rows.
///
/// Headers and values are trimmed. Records may be shorter or longer than the
/// header: absent columns deserialize to their defaults and extra trailing
/// values are dropped.
pub fn parse_roster<T: DeserializeOwned>(data: &[u8]) -> Result<Vec<T>> {
    let text = std::str::from_utf8(data)
        .map_err(|e| LabAccessError::Roster(format!("roster is not valid UTF-8: {e}")))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| LabAccessError::Roster(format!("CSV header error: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        // Line 1 is the header.
        let line = index + 2;
        let mut record = result
            .map_err(|e| LabAccessError::Roster(format!("CSV parse error on line {line}: {e}")))?;
        while record.len() < headers.len() {
            record.push_field("");
        }
        record.truncate(headers.len());

        let row: T = record.deserialize(Some(&headers)).map_err(|e| {
            LabAccessError::Roster(format!("CSV parse error on line {line}: {e}"))
        })?;
        rows.push(row);
    }

    Ok(rows)
}
