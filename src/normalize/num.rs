//! Tolerant numeric parsing for screener cells.

/// Parse a currency/percent cell into a float.
///
/// Strips `$`, thousands separators, `+`, `%` and `>` before parsing. The
/// sentinel cells `""`, `"-"` and `"New"` are null, never zero.
pub(crate) fn to_f64(raw: &str) -> Option<f64> {
    let v: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '+' | '%' | '>'))
        .collect();
    let v = v.trim();
    if v.is_empty() || v == "-" || v == "New" {
        return None;
    }
    v.parse().ok()
}

/// Parse an integer cell (quantities, counts). Strips `,`, `+` and `>`.
pub(crate) fn to_i64(raw: &str) -> Option<i64> {
    let v: String = raw
        .chars()
        .filter(|c| !matches!(c, ',' | '+' | '>'))
        .collect();
    let v = v.trim();
    if v.is_empty() || v == "-" {
        return None;
    }
    v.parse().ok()
}
