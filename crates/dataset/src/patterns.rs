//! Masks for common value formats.

/// ISO 8601 timestamp with a numeric offset, e.g. `2024-01-31T08:00:00+0000`.
pub const REGEX_DATE_ISO8601: &str =
    r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:Z|[+-]\d{2}:?\d{2})$";

/// Calendar date, e.g. `2024-01-31`.
pub const REGEX_DATE_YMD: &str = r"^\d{4}-\d{2}-\d{2}$";
