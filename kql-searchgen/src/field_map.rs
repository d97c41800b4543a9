#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Well-known KQL field names mapped to their backend field paths.
const KNOWN_FIELDS: &[(&str, &str)] = &[
    ("EventID", "event_id"),
    ("User", "user.name"),
    ("Timestamp", "@timestamp"),
    ("SourceIP", "source.ip"),
    ("DestinationIP", "destination.ip"),
    ("Process", "process.name"),
    ("Host", "host.name"),
];

/// Field paths considered text-analyzed (full-text, tokenized) rather
/// than keyword (exact-match). `contains` on one of these uses a
/// `match` query instead of a `wildcard`.
const TEXT_ANALYZED_FIELDS: &[&str] = &["raw_message", "process.command_line", "_search_text"];

/// Maps a KQL field name to its backend field path: known names use the
/// fixed table above; unknown names fall back to a PascalCase →
/// snake_case conversion.
pub fn map_field(name: &str) -> String {
    for (kql_name, backend_path) in KNOWN_FIELDS {
        if *kql_name == name {
            return (*backend_path).into();
        }
    }
    pascal_to_snake_case(name)
}

/// Whether `backend_path` (already mapped) is text-analyzed.
pub fn is_text_analyzed(backend_path: &str) -> bool {
    TEXT_ANALYZED_FIELDS.contains(&backend_path)
}

fn pascal_to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_field_names_use_the_fixed_mapping_table() {
        assert_eq!(map_field("EventID"), "event_id");
        assert_eq!(map_field("User"), "user.name");
    }

    #[test]
    fn unknown_field_names_fall_back_to_snake_case() {
        assert_eq!(map_field("RequestDurationMs"), "request_duration_ms");
        assert_eq!(map_field("severity"), "severity");
    }

    #[test]
    fn text_analyzed_allow_list_is_closed() {
        assert!(is_text_analyzed("raw_message"));
        assert!(is_text_analyzed("process.command_line"));
        assert!(!is_text_analyzed("user.name"));
    }
}
