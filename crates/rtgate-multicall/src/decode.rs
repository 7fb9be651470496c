//! Positional decoding of multicall responses into records.
//!
//! Entity multicalls answer with one row per entity; position `i` of a row
//! belongs to selector `i + call_scoped` of the argument list. The system
//! multicall answers with one single-element array per call descriptor, and
//! all of them land in one record.
//!
//! Decoding is all-or-nothing: any structural or coercion failure discards the
//! partially built output.

use crate::call::SystemCall;
use crate::error::{MulticallError, MulticallResult};
use crate::model::SystemFacts;
use crate::schema::{Record, Schema, Setter, ValueKind};
use crate::value::RpcValue;

/// Decode an entity multicall response.
///
/// `selectors` is the argument list sent with the call, including the leading
/// call-scoped entries. Selectors unknown to `schema` are skipped; `nil`
/// values leave the field at its zero value.
///
/// # Errors
///
/// Fails on a non-array response or row, on a row whose length differs from
/// the selector count, and on a present value whose wire type does not match
/// the field type.
pub fn decode_entities<R, S>(
    schema: &Schema<R>,
    selectors: &[S],
    raw: &RpcValue,
) -> MulticallResult<Vec<R>>
where
    R: Default,
    S: AsRef<str>,
{
    let call_scoped = schema.call_scoped();
    let requested = selectors
        .get(call_scoped..)
        .ok_or(MulticallError::SelectorListTooShort {
            call_scoped,
            actual: selectors.len(),
        })?;
    let rows = raw.as_array().ok_or(MulticallError::ResponseNotArray {
        found: raw.kind_name(),
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let values = row.as_array().ok_or(MulticallError::RowNotArray {
            row: row_index,
            found: row.kind_name(),
        })?;
        if values.len() != requested.len() {
            return Err(MulticallError::RowLength {
                row: row_index,
                expected: requested.len(),
                actual: values.len(),
            });
        }

        let mut record = R::default();
        for (selector, value) in requested.iter().zip(values) {
            assign(schema, &mut record, selector.as_ref(), value)?;
        }
        records.push(record);
    }
    Ok(records)
}

/// Decode a `system.multicall` response into a single record.
///
/// # Errors
///
/// Fails when the result count differs from the call count, when an entry is
/// not a single-element array (or is a fault struct), and on coercion failures.
pub fn decode_calls<R: Default>(
    schema: &Schema<R>,
    calls: &[SystemCall],
    raw: &RpcValue,
) -> MulticallResult<R> {
    let results = raw.as_array().ok_or(MulticallError::ResponseNotArray {
        found: raw.kind_name(),
    })?;
    if results.len() != calls.len() {
        return Err(MulticallError::ResponseLength {
            expected: calls.len(),
            actual: results.len(),
        });
    }

    let mut record = R::default();
    for (index, (call, result)) in calls.iter().zip(results).enumerate() {
        let value = single_result(index, &call.method_name, result)?;
        assign(schema, &mut record, &call.method_name, value)?;
    }
    Ok(record)
}

/// [`decode_calls`] against the [`SystemFacts`] schema.
///
/// # Errors
///
/// See [`decode_calls`].
pub fn decode_system_facts(calls: &[SystemCall], raw: &RpcValue) -> MulticallResult<SystemFacts> {
    decode_calls(SystemFacts::schema(), calls, raw)
}

fn single_result<'a>(
    index: usize,
    method: &str,
    result: &'a RpcValue,
) -> MulticallResult<&'a RpcValue> {
    match result {
        RpcValue::Array(items) if items.len() == 1 => Ok(&items[0]),
        RpcValue::Array(items) => Err(MulticallError::CallResultShape {
            index,
            method: method.to_string(),
            found: result.kind_name(),
            len: Some(items.len()),
        }),
        RpcValue::Struct(members) if members.contains_key("faultCode") => {
            Err(MulticallError::CallFault {
                index,
                method: method.to_string(),
                code: members
                    .get("faultCode")
                    .and_then(RpcValue::as_i64)
                    .unwrap_or_default(),
                message: members
                    .get("faultString")
                    .and_then(RpcValue::as_str)
                    .unwrap_or_default()
                    .to_string(),
            })
        }
        other => Err(MulticallError::CallResultShape {
            index,
            method: method.to_string(),
            found: other.kind_name(),
            len: None,
        }),
    }
}

fn assign<R>(
    schema: &Schema<R>,
    record: &mut R,
    selector: &str,
    value: &RpcValue,
) -> MulticallResult<()> {
    let Some(field) = schema.lookup(selector) else {
        return Ok(());
    };
    if value.is_nil() {
        return Ok(());
    }
    match (field.setter(), value) {
        (Setter::Int(set), RpcValue::Int(number)) => set(record, *number),
        (Setter::Str(set), RpcValue::String(text)) => set(record, text.clone()),
        (setter, other) => {
            return Err(coercion_error(selector, setter.kind(), other));
        }
    }
    Ok(())
}

fn coercion_error(selector: &str, expected: ValueKind, found: &RpcValue) -> MulticallError {
    MulticallError::Coercion {
        selector: selector.to_string(),
        expected,
        found: found.kind_name(),
    }
}
