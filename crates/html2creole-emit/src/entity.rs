//! Resolution of character and entity references at emission time.

use crate::EmitError;

/// Resolve a character reference name: decimal `65` or hex `x41`/`X41`.
///
/// # Errors
///
/// Returns [`EmitError::UnresolvedEntityReference`] if the name is not a
/// number or not a Unicode scalar value.
pub fn resolve_charref(name: &str) -> Result<char, EmitError> {
    let code = match name.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => name.parse::<u32>().ok(),
    };
    code.and_then(char::from_u32)
        .ok_or_else(|| EmitError::UnresolvedEntityReference {
            name: name.to_string(),
        })
}

/// Resolve a named entity such as `amp` or `nbsp`.
///
/// # Errors
///
/// Returns [`EmitError::UnresolvedEntityReference`] for unknown names.
pub fn resolve_entityref(name: &str) -> Result<String, EmitError> {
    let reference = format!("&{name};");
    let decoded = html_escape::decode_html_entities(&reference);
    if decoded == reference {
        return Err(EmitError::UnresolvedEntityReference {
            name: name.to_string(),
        });
    }
    Ok(decoded.into_owned())
}
