#[cfg(not(feature = "std"))]
use alloc::string::String;
use core::fmt::{self, Write};

/// Renders an iterable of `Display`-able items comma-separated, e.g. for
/// call arguments and array elements.
pub fn display_comma_separated<T: fmt::Display>(items: &[T]) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        // `String`'s `Write` impl never errors.
        let _ = write!(out, "{}", item);
    }
    out
}
