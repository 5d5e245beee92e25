//! The decode/validate boundary between wire rows and typed records.

use serde_json::Value;

use crate::{ModelError, ModelResult, Record};

/// Decodes a single wire row into a validated record.
pub fn decode_row<E: Record>(row: Value) -> ModelResult<E> {
    let record: E = serde_json::from_value(row).map_err(|source| ModelError::Malformed {
        family: E::FAMILY,
        source,
    })?;
    record.validate()?;
    Ok(record)
}

/// Decodes a JSON array of wire rows, preserving order.
///
/// Fails on the first bad row; a partially decoded list is never returned.
pub fn decode_rows<E: Record>(rows: Value) -> ModelResult<Vec<E>> {
    let Value::Array(rows) = rows else {
        return Err(ModelError::NotAList { family: E::FAMILY });
    };
    rows.into_iter()
        .enumerate()
        .map(|(index, row)| {
            decode_row::<E>(row).map_err(|e| ModelError::Row {
                family: E::FAMILY,
                index,
                source: Box::new(e),
            })
        })
        .collect()
}
