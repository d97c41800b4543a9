#[cfg(not(feature = "std"))]
use alloc::string::String;

/// Wraps `name` in double quotes, doubling any embedded `"`.
pub fn quote_ident(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Maps a KQL scalar function name to its SQL equivalent. Unmapped names
/// pass through uppercased.
pub fn map_function_name(name: &str) -> String {
    match name.to_ascii_lowercase().as_str() {
        "strlen" => "LENGTH".into(),
        "toupper" => "UPPER".into(),
        "tolower" => "LOWER".into(),
        "split" => "STRING_TO_ARRAY".into(),
        "strcat" => "CONCAT".into(),
        "trim" => "TRIM".into(),
        "substring" => "SUBSTRING".into(),
        "replace" => "REPLACE".into(),
        "pow" => "POWER".into(),
        "log" => "LN".into(),
        "log10" => "LOG".into(),
        "abs" => "ABS".into(),
        "round" => "ROUND".into(),
        "floor" => "FLOOR".into(),
        "ceiling" => "CEIL".into(),
        "sqrt" => "SQRT".into(),
        "now" => "NOW".into(),
        "count" => "COUNT".into(),
        "sum" => "SUM".into(),
        "avg" => "AVG".into(),
        "min" => "MIN".into(),
        "max" => "MAX".into(),
        _ => name.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quoting_doubles_embedded_double_quotes() {
        assert_eq!(quote_ident("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn quoting_wraps_a_plain_identifier() {
        assert_eq!(quote_ident("severity"), "\"severity\"");
    }

    #[test]
    fn mapped_function_names_translate_to_their_sql_equivalent() {
        assert_eq!(map_function_name("strlen"), "LENGTH");
        assert_eq!(map_function_name("StrCat"), "CONCAT");
    }

    #[test]
    fn unmapped_function_names_pass_through_uppercased() {
        assert_eq!(map_function_name("my_custom_fn"), "MY_CUSTOM_FN");
    }
}
