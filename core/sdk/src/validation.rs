use crate::error::{error_and_warn_log, Result, SdkError};
use crate::types::{ClearInput, FheValueKind, TypedValue};
use alloy_primitives::Address;
use std::str::FromStr;

const ERR_MISSING_HEX_PREFIX: &str = "address must start with 0x";
const ERR_ADDRESS_LENGTH: &str = "address must contain exactly 40 hex digits";
const ERR_BAD_CHECKSUM: &str = "mixed-case address has an invalid EIP-55 checksum";

/// Check `input` against the legal range of `kind` and produce the typed value.
///
/// Nothing is ever clamped or coerced: an out-of-range integer, a non-boolean
/// passed as `ebool` or a malformed address are all rejected.
pub fn validate(input: &ClearInput, kind: FheValueKind) -> Result<TypedValue> {
    let res = match kind {
        FheValueKind::Bool => match input {
            ClearInput::Bool(b) => Ok(TypedValue::Bool(*b)),
            other => Err(type_mismatch(kind, "boolean", other)),
        },
        FheValueKind::Uint8 => integer_in_range(input, kind).map(|v| TypedValue::Uint8(v as u8)),
        FheValueKind::Uint16 => {
            integer_in_range(input, kind).map(|v| TypedValue::Uint16(v as u16))
        }
        FheValueKind::Uint32 => {
            integer_in_range(input, kind).map(|v| TypedValue::Uint32(v as u32))
        }
        FheValueKind::Uint64 => integer_in_range(input, kind).map(TypedValue::Uint64),
        FheValueKind::Address => match input {
            ClearInput::Address(a) => Ok(TypedValue::Address(*a)),
            ClearInput::Text(s) => parse_address(s)
                .map(TypedValue::Address)
                .map_err(|reason| SdkError::validation(kind, format!("{s:?}: {reason}"))),
            other => Err(type_mismatch(kind, "address", other)),
        },
    };
    res.map_err(error_and_warn_log)
}

/// Parse a `0x`-prefixed address.
///
/// All-lowercase and all-uppercase addresses are accepted as they are,
/// mixed-case ones must carry a valid EIP-55 checksum.
pub fn parse_address(s: &str) -> std::result::Result<Address, &'static str> {
    let digits = s.strip_prefix("0x").ok_or(ERR_MISSING_HEX_PREFIX)?;
    if digits.len() != 40 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ERR_ADDRESS_LENGTH);
    }
    let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        Address::parse_checksummed(s, None).map_err(|_| ERR_BAD_CHECKSUM)
    } else {
        Address::from_str(s).map_err(|_| ERR_ADDRESS_LENGTH)
    }
}

/// Checksummed rendering of an address string, after validation.
pub fn normalize_address(s: &str) -> Result<String> {
    match validate(&ClearInput::Text(s.to_string()), FheValueKind::Address)? {
        TypedValue::Address(a) => Ok(a.to_checksum(None)),
        other => Err(SdkError::validation(
            FheValueKind::Address,
            format!("unexpected value {other}"),
        )),
    }
}

fn integer_in_range(input: &ClearInput, kind: FheValueKind) -> Result<u64> {
    let max = kind
        .max_integer()
        .ok_or_else(|| SdkError::validation(kind, "not an integer type"))?;
    let value = match input {
        ClearInput::Integer(v) => *v,
        ClearInput::Text(s) => parse_integer_literal(s)
            .ok_or_else(|| SdkError::validation(kind, format!("{s:?} is not an integer")))?,
        other => return Err(type_mismatch(kind, "integer", other)),
    };
    if value < 0 {
        return Err(SdkError::validation(
            kind,
            format!("value {value} is below the minimum 0"),
        ));
    }
    if value > max as i128 {
        return Err(SdkError::validation(
            kind,
            format!("value {value} exceeds the maximum {max}"),
        ));
    }
    Ok(value as u64)
}

// Decimal (optionally negative) or 0x-prefixed hexadecimal, with no
// whitespace and no `+` sign.
fn parse_integer_literal(s: &str) -> Option<i128> {
    let (digits, radix) = match s.strip_prefix("0x") {
        Some(hex) => (hex, 16),
        None => (s.strip_prefix('-').unwrap_or(s), 10),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    match radix {
        16 => u128::from_str_radix(digits, 16)
            .ok()
            .and_then(|v| i128::try_from(v).ok()),
        _ => s.parse::<i128>().ok(),
    }
}

fn type_mismatch(kind: FheValueKind, expected: &str, got: &ClearInput) -> SdkError {
    SdkError::validation(
        kind,
        format!("expected {expected}, got {} {got}", got.type_name()),
    )
}
