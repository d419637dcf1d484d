//! Log sanitizing helpers. Client input goes straight into log lines, and
//! telnet clients happily send control bytes; everything logged through
//! [`escape_log`] stays on one line with the escapes spelled out.

/// Render untrusted text for a single log line. Newlines, carriage returns,
/// tabs, and backslashes become their two-character escapes; any other
/// control character (ANSI ESC included) becomes `\xNN`. Input longer than
/// the preview cap is cut with an ellipsis to keep log noise bounded.
pub fn escape_log(input: &str) -> String {
    const PREVIEW: usize = 160;
    let mut out = String::with_capacity(input.len().min(PREVIEW));
    let mut shown = 0usize;
    for ch in input.chars() {
        if shown == PREVIEW {
            out.push('…');
            break;
        }
        shown += 1;
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                use std::fmt::Write;
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_log;

    #[test]
    fn escapes_line_breaks_and_ansi() {
        assert_eq!(escape_log("a\nb\r\tc"), "a\\nb\\r\\tc");
        assert_eq!(escape_log("\x1b[31mred"), "\\x1B[31mred");
    }

    #[test]
    fn caps_long_input() {
        let long = "x".repeat(500);
        let escaped = escape_log(&long);
        assert!(escaped.chars().count() <= 161);
        assert!(escaped.ends_with('…'));
    }
}
