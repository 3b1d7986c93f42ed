//! Validation for names spliced into CQL statements.
//!
//! Keyspace, table and column names cannot be bound as parameters in DDL, so
//! they are checked against the CQL identifier grammar before being formatted
//! into a statement. Both forms are accepted:
//!
//! - unquoted: `[A-Za-z][A-Za-z0-9_]*` (case-insensitive in CQL),
//! - quoted: `"..."`, any non-empty text with embedded quotes doubled (`""`).

use crate::error::{CassandraError, CassandraResult};

/// Longest name Cassandra accepts for keyspaces and tables
pub const MAX_IDENTIFIER_LEN: usize = 48;

/// Check that `name` is a single CQL identifier. Used for column names,
/// which have no length limit.
pub fn validate_identifier(name: &str) -> CassandraResult<&str> {
    match parse_identifier(name) {
        Some((_, "")) => Ok(name),
        _ => Err(invalid(name)),
    }
}

/// Check a keyspace or table name: a CQL identifier of at most
/// [`MAX_IDENTIFIER_LEN`] characters (quotes excluded).
pub fn validate_schema_name(name: &str) -> CassandraResult<&str> {
    match parse_identifier(name) {
        Some((len, "")) if len <= MAX_IDENTIFIER_LEN => Ok(name),
        _ => Err(invalid(name)),
    }
}

/// Check a table reference: either `table` or `keyspace.table`.
pub fn validate_table_ref(name: &str) -> CassandraResult<&str> {
    let (first_len, rest) = parse_identifier(name).ok_or_else(|| invalid(name))?;
    if first_len > MAX_IDENTIFIER_LEN {
        return Err(invalid(name));
    }

    match rest.strip_prefix('.') {
        None if rest.is_empty() => Ok(name),
        Some(table) => match parse_identifier(table) {
            Some((len, "")) if len <= MAX_IDENTIFIER_LEN => Ok(name),
            _ => Err(invalid(name)),
        },
        None => Err(invalid(name)),
    }
}

/// Parse one identifier from the start of `input`.
///
/// Returns the name's length in characters (quotes excluded, doubled quotes
/// counted once) and the unparsed remainder.
fn parse_identifier(input: &str) -> Option<(usize, &str)> {
    if let Some(quoted) = input.strip_prefix('"') {
        let mut len = 0;
        let mut chars = quoted.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '"' {
                if matches!(chars.peek(), Some((_, '"'))) {
                    chars.next();
                } else {
                    return (len > 0).then(|| (len, &quoted[i + 1..]));
                }
            }
            len += 1;
        }
        // Unterminated
        return None;
    }

    let first = input.chars().next()?;
    if !first.is_ascii_alphabetic() {
        return None;
    }
    let end = input
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(input.len());
    Some((end, &input[end..]))
}

fn invalid(name: &str) -> CassandraError {
    CassandraError::InvalidIdentifier(name.to_string())
}
