//! Encoding and decoding of single column entries.

use std::borrow::Cow;

use bytes::BufMut;
use colstore_dtype::{ColumnType, Value};
use colstore_error::{ColstoreResult, colstore_bail, colstore_err};

use crate::{ABSENT, FALSE, PRESENT, TRUE};

/// Size of the length prefix of variable-width payloads.
const LENGTH_PREFIX: usize = size_of::<i32>();

/// The fixed payload width of a type, if it has one.
const fn fixed_width(column_type: ColumnType) -> Option<usize> {
    match column_type {
        ColumnType::Boolean => Some(1),
        ColumnType::Double => Some(size_of::<f64>()),
        ColumnType::Long => Some(size_of::<i64>()),
        ColumnType::Id | ColumnType::String => None,
    }
}

/// Append the entry for `value` to `out`.
pub(crate) fn encode<B: BufMut>(value: Option<&Value<'_>>, out: &mut B) -> ColstoreResult<()> {
    let Some(value) = value else {
        out.put_u8(ABSENT);
        return Ok(());
    };
    out.put_u8(PRESENT);
    match value {
        Value::Boolean(v) => out.put_u8(if *v { TRUE } else { FALSE }),
        Value::Double(v) => out.put_f64(*v),
        Value::Long(v) => out.put_i64(*v),
        Value::Id(v) => put_variable(v, out)?,
        Value::String(v) => put_variable(v.as_bytes(), out)?,
    }
    Ok(())
}

fn put_variable<B: BufMut>(payload: &[u8], out: &mut B) -> ColstoreResult<()> {
    let len = i32::try_from(payload.len())
        .map_err(|_| colstore_err!("Value of {} bytes is too large to store", payload.len()))?;
    out.put_i32(len);
    out.put_slice(payload);
    Ok(())
}

/// Whether the entry starting at `offset` holds a value.
pub(crate) fn is_present(bytes: &[u8], offset: usize) -> ColstoreResult<bool> {
    match bytes.get(offset) {
        Some(&PRESENT) => Ok(true),
        Some(&ABSENT) => Ok(false),
        Some(other) => colstore_bail!(
            InvalidSerde: "Invalid presence byte {:#04x} at offset {}",
            other,
            offset
        ),
        None => colstore_bail!(InvalidSerde: "No entry at offset {}", offset),
    }
}

/// The payload size of the present entry starting at `offset`.
pub(crate) fn payload_size(
    column_type: ColumnType,
    bytes: &[u8],
    offset: usize,
) -> ColstoreResult<usize> {
    if let Some(width) = fixed_width(column_type) {
        return Ok(width);
    }
    let start = offset + 1;
    let prefix = slice(bytes, start, LENGTH_PREFIX)?;
    let len = i32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);
    let len = usize::try_from(len).map_err(
        |_| colstore_err!(InvalidSerde: "Negative payload length {} at offset {}", len, offset),
    )?;
    Ok(LENGTH_PREFIX + len)
}

/// Decode the entry starting at `offset`, borrowing variable-width payloads from `bytes`.
pub(crate) fn decode(
    column_type: ColumnType,
    bytes: &[u8],
    offset: usize,
) -> ColstoreResult<Option<Value<'_>>> {
    if !is_present(bytes, offset)? {
        return Ok(None);
    }
    let size = payload_size(column_type, bytes, offset)?;
    let payload = slice(bytes, offset + 1, size)?;
    let value = match column_type {
        ColumnType::Boolean => Value::Boolean(payload[0] == TRUE),
        ColumnType::Double => Value::Double(f64::from_be_bytes(fixed(payload)?)),
        ColumnType::Long => Value::Long(i64::from_be_bytes(fixed(payload)?)),
        ColumnType::Id => Value::Id(Cow::Borrowed(&payload[LENGTH_PREFIX..])),
        ColumnType::String => {
            let text = std::str::from_utf8(&payload[LENGTH_PREFIX..]).map_err(|e| {
                colstore_err!(InvalidSerde: "Invalid UTF-8 at offset {}: {}", offset, e)
            })?;
            Value::String(Cow::Borrowed(text))
        }
    };
    Ok(Some(value))
}

fn slice(bytes: &[u8], start: usize, len: usize) -> ColstoreResult<&[u8]> {
    bytes.get(start..start + len).ok_or_else(|| {
        colstore_err!(
            InvalidSerde: "Entry payload [{}, {}) extends past the end of {} bytes",
            start,
            start + len,
            bytes.len()
        )
    })
}

fn fixed<const N: usize>(payload: &[u8]) -> ColstoreResult<[u8; N]> {
    payload
        .try_into()
        .map_err(|_| colstore_err!(InvalidSerde: "Expected {} payload bytes, found {}", N, payload.len()))
}
