//! Text field extraction primitives.
//!
//! Total helpers over command output: a field that is not present is a
//! normal `None`/empty result, never an error. Callers decide what absence
//! means for them.

/// Leading token of every non-blank line, whitespace-trimmed.
///
/// Pulls session IDs out of tabular `list-sessions` output, where the ID
/// column may be right-aligned.
pub fn leading_tokens(text: &str) -> Vec<&str> {
    text.lines()
        .filter_map(|line| line.split_whitespace().next())
        .collect()
}

/// Value of the first `Label:` line in `text`, or `None` when absent.
///
/// A match requires the label at a token boundary, an immediate colon, and
/// at least one whitespace character before the value. The value is the
/// rest of that line, trimmed; a label with nothing after it does not match.
pub fn labeled_field<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    if label.is_empty() {
        return None;
    }
    for line in text.lines() {
        for (idx, _) in line.match_indices(label) {
            if idx > 0 && !line[..idx].ends_with(|c: char| c.is_whitespace()) {
                continue;
            }
            let after = &line[idx + label.len()..];
            let Some(rest) = after.strip_prefix(':') else {
                continue;
            };
            if !rest.starts_with(|c: char| c.is_whitespace()) {
                continue;
            }
            let value = rest.trim();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}

/// Leading decimal run of `value` parsed as u32 ("1234 (bash)" -> 1234).
///
/// `None` when the value does not start with a digit or the run overflows.
pub fn leading_u32(value: &str) -> Option<u32> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    if end == 0 {
        return None;
    }
    value[..end].parse().ok()
}
