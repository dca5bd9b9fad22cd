//! Patient identifier allocation.

/// Every allocated identifier starts with this prefix.
pub const ID_PREFIX: char = 'P';

/// Minimum number of digits after the prefix.
pub const ID_WIDTH: usize = 3;

/// Numeric part of a well-formed identifier (`P` followed only by digits).
pub fn parse_patient_number(id: &str) -> Option<u64> {
    let digits = id.strip_prefix(ID_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Render a number as an identifier, zero-padded to [`ID_WIDTH`].
pub fn format_patient_id(number: u64) -> String {
    format!("{}{:0width$}", ID_PREFIX, number, width = ID_WIDTH)
}

/// One past the highest well-formed identifier; `P001` when there is none.
///
/// Identifiers that do not match the pattern are ignored. Not safe under
/// concurrent allocation: callers hold the registry's write lock.
pub fn next_patient_id<'a, I>(existing: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let next = existing
        .into_iter()
        .filter_map(parse_patient_number)
        .max()
        .map_or(1, |max| max.saturating_add(1));
    format_patient_id(next)
}
