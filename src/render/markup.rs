//! Markup pipeline: Escape and colorize raw log chunks.
//!
//! Two total, order-preserving string transforms. Escaping runs first so
//! the entities it introduces survive the color substitutions unchanged;
//! colorizing only rewrites a fixed set of foreground markers and leaves
//! every other escape sequence in place.

/// The six recognized foreground-color start markers and the span
/// openings they map to.
///
/// Only these sequences (plus [`RESET`]) are rewritten. This is not an
/// SGR parser: anything else passes through as text.
const COLOR_SPANS: [(&str, &str); 6] = [
    ("\x1b[31m", "<span style=\"color: rgb(239, 100, 135);\">"), // Red
    ("\x1b[32m", "<span style=\"color: rgb(94, 202, 137);\">"),  // Green
    ("\x1b[33m", "<span style=\"color: rgb(253, 216, 119);\">"), // Yellow
    ("\x1b[34m", "<span style=\"color: rgb(101, 174, 247);\">"), // Blue
    ("\x1b[35m", "<span style=\"color: rgb(170, 127, 240);\">"), // Magenta
    ("\x1b[36m", "<span style=\"color: rgb(67, 193, 190);\">"),  // Cyan
];

/// The reset marker that closes the most recent color span.
const RESET: &str = "\x1b[0m";

/// Escape the three HTML-significant characters.
///
/// `&` is rewritten first so the `&amp;`/`&gt;`/`&lt;` entities produced
/// here are never themselves re-escaped.
pub fn escape(chunk: &str) -> String {
    let mut out = String::with_capacity(chunk.len());
    for ch in chunk.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Replace the recognized color markers with span tags.
///
/// Each start marker becomes an opening `<span>` carrying its RGB value;
/// the reset marker becomes the matching `</span>`. Unknown escape
/// sequences are left as-is.
pub fn colorize(chunk: &str) -> String {
    let mut out = chunk.to_string();
    for (marker, span) in COLOR_SPANS {
        out = out.replace(marker, span);
    }
    out.replace(RESET, "</span>")
}

/// Transform a raw log chunk into display markup.
///
/// Applies [`escape`] then [`colorize`], in that order.
pub fn to_markup(chunk: &str) -> String {
    colorize(&escape(chunk))
}
