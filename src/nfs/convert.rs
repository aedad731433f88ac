// Numeric field conversion for mountstats lines.

use std::num::IntErrorKind;

/// Why a single token failed to convert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConvertError {
    /// Value does not fit in a u64.
    Overflow { token: String },
    /// Anything else (non-digit, sign, ...). Kept as zero by the caller.
    Other { token: String },
}

/// A counter too large for a u64; fails the whole line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOverflow {
    pub token: String,
}

/// Parse one decimal token. Only bare digits are accepted; a sign is a syntax error.
pub fn parse_field(token: &str) -> Result<u64, ConvertError> {
    if token.starts_with('+') {
        return Err(ConvertError::Other {
            token: token.to_string(),
        });
    }
    token.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => ConvertError::Overflow {
            token: token.to_string(),
        },
        _ => ConvertError::Other {
            token: token.to_string(),
        },
    })
}

/// Convert `tokens[1..]` to u64s. The first token is the category key and is skipped.
///
/// Fewer than two tokens yields an empty vec. Tokens that fail for any reason other
/// than overflow become 0 and conversion continues; overflow fails the whole line.
pub fn convert_to_u64(tokens: &[&str]) -> Result<Vec<u64>, FieldOverflow> {
    if tokens.len() < 2 {
        return Ok(Vec::new());
    }

    let mut values = Vec::with_capacity(tokens.len() - 1);
    for token in &tokens[1..] {
        let value = match parse_field(token) {
            Ok(v) => v,
            Err(ConvertError::Overflow { token }) => return Err(FieldOverflow { token }),
            Err(ConvertError::Other { .. }) => 0,
        };
        values.push(value);
    }
    Ok(values)
}
