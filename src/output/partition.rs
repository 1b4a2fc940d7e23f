//! Hive-style partition directories
//!
//! A partitioned table stores each distinct combination of partition
//! values under `col1=v1/col2=v2/`. The columns themselves are not written
//! into the files.

use std::fmt::Write as _;

/// Directory value standing for null (and empty) partition values
pub const HIVE_DEFAULT_PARTITION: &str = "__HIVE_DEFAULT_PARTITION__";

fn needs_escape(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '"' | '#' | '%' | '\'' | '*' | '/' | ':' | '=' | '?' | '\\' | '{' | '[' | ']' | '^'
        )
}

/// Percent-encode characters that are unsafe in a directory name
pub fn escape_partition_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if needs_escape(c) {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                let _ = write!(out, "%{byte:02X}");
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Reverse `escape_partition_value`
///
/// Malformed escapes are kept literally.
pub fn unescape_partition_value(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            if let Some(byte) = value
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// One `col=value` directory component
///
/// Null and `""` both render as the default partition, so an empty string
/// reads back as null.
pub fn partition_segment(column: &str, value: Option<&str>) -> String {
    match value {
        None | Some("") => format!("{column}={HIVE_DEFAULT_PARTITION}"),
        Some(v) => format!("{column}={}", escape_partition_value(v)),
    }
}

/// Full partition directory for `columns` and their values
pub fn partition_dir(columns: &[&str], values: &[Option<String>]) -> String {
    columns
        .iter()
        .zip(values)
        .map(|(column, value)| partition_segment(column, value.as_deref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Parse `col=value` components out of a relative file key
///
/// Returns `(column, value)` pairs in path order; null partitions map to
/// `None`.
pub fn parse_partition_path(key: &str) -> Vec<(String, Option<String>)> {
    key.split('/')
        .filter_map(|segment| segment.split_once('='))
        .map(|(column, value)| {
            let value = if value == HIVE_DEFAULT_PARTITION {
                None
            } else {
                Some(unescape_partition_value(value))
            };
            (column.to_string(), value)
        })
        .collect()
}
