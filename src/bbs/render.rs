//! Protocol text rendering: menus, banners, listings, and word wrapping.
//!
//! Everything here is a pure function from store data to the exact bytes a
//! terminal client sees. ANSI escapes are emitted, never parsed; simple
//! telnet/netcat clients render them, dumber clients just show the noise.

use chrono::SecondsFormat;

use crate::storage::{Bulletin, Message};

/// Column width used for message and bulletin bodies.
pub const BODY_WIDTH: usize = 70;

const CYAN: &str = "\x1b[36m";
const GREEN: &str = "\x1b[32m";
const BLUE: &str = "\x1b[34m";
const MAGENTA: &str = "\x1b[35m";
const RESET: &str = "\x1b[0m";
const CLEAR: &str = "\x1b[2J\x1b[H";

pub const MAIN_MENU: &str = "\n\x1b[33mMain Menu\x1b[0m\n[1] Message Board\n[2] Bulletins\n[3] Who's Online\n[4] Logoff\nSelect: ";

pub const BOARD_MENU: &str = "\n\x1b[33mMessage Board\x1b[0m\n[L] List messages\n[R] Read message\n[P] Post message\n[B] Back\nSelect: ";

/// Clear the screen and print the service name boxed in a 40-column rule.
pub fn banner(name: &str) -> String {
    let rule = "=".repeat(40);
    format!("{CLEAR}\n{CYAN}{rule}\n{name:^40}\n{rule}{RESET}\n")
}

pub fn signup_header() -> String {
    format!("\n{GREEN}Signup{RESET}\n")
}

pub fn signin_header() -> String {
    format!("\n{BLUE}Login{RESET}\n")
}

/// First `max` characters of `s`, safe on multi-byte input.
pub fn clip(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Greedy word wrap. Whitespace (newlines included) is collapsed and the
/// words re-flowed into lines of at most `width` columns; a single word
/// longer than `width` gets a line of its own.
pub fn wrap(text: &str, width: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
        } else if current.chars().count() + 1 + word.chars().count() <= width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines.join("\n")
}

/// Board listing: a header row, then one row per message with the date
/// clipped to its date-time prefix and the author clipped to 10 columns.
pub fn message_rows(messages: &[Message]) -> String {
    let mut out = vec!["\n#  Date (UTC)           From       Subject".to_string()];
    for (i, m) in messages.iter().enumerate() {
        let date = m.created.format("%Y-%m-%dT%H:%M:%S").to_string();
        out.push(format!(
            "{:2} {:<20} {:<10} {}",
            i + 1,
            clip(&date, 19),
            clip(&m.author, 10),
            m.subject
        ));
    }
    out.join("\n") + "\n"
}

/// Full view of one post: header lines plus the wrapped body.
pub fn message_view(message: &Message) -> String {
    format!(
        "\nSubject: {}\nFrom: {}\nDate: {}\n\n{}\n\n",
        message.subject,
        message.author,
        message.created.to_rfc3339_opts(SecondsFormat::Secs, true),
        wrap(&message.body, BODY_WIDTH)
    )
}

/// Numbered bulletin titles with the combined read-or-back prompt.
pub fn bulletin_index(bulletins: &[Bulletin]) -> String {
    let mut out = vec![format!("\n{MAGENTA}Bulletins{RESET}")];
    for (i, b) in bulletins.iter().enumerate() {
        out.push(format!("[{}] {}", i + 1, b.title));
    }
    out.push("Select number to read or B to go back: ".to_string());
    out.join("\n")
}

/// One bulletin: title underlined with a dash rule of matching length,
/// then the wrapped body.
pub fn bulletin_view(bulletin: &Bulletin) -> String {
    format!(
        "\n{}\n{}\n{}\n\n",
        bulletin.title,
        "-".repeat(bulletin.title.chars().count()),
        wrap(&bulletin.body, BODY_WIDTH)
    )
}

/// Comma-joined roster of online users, or the empty-room line.
pub fn online_line(names: &[String]) -> String {
    if names.is_empty() {
        "No one online.\n".to_string()
    } else {
        format!("Online: {}\n", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_message() -> Message {
        Message {
            subject: "hi".to_string(),
            body: "line1".to_string(),
            author: "alexandrina".to_string(),
            created: Utc.with_ymd_and_hms(2024, 3, 5, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn wrap_reflows_to_width() {
        let text = "the quick brown fox jumps over the lazy dog ".repeat(4);
        for line in wrap(&text, 20).lines() {
            assert!(line.chars().count() <= 20, "line too wide: {line:?}");
        }
    }

    #[test]
    fn wrap_collapses_newlines() {
        assert_eq!(wrap("a\nb\n\nc", 70), "a b c");
        assert_eq!(wrap("", 70), "");
    }

    #[test]
    fn wrap_keeps_overlong_word_whole() {
        let word = "x".repeat(90);
        assert_eq!(wrap(&word, 70), word);
    }

    #[test]
    fn listing_clips_author_and_date() {
        let rows = message_rows(&[sample_message()]);
        assert!(rows.contains(" 1 2024-03-05T09:30:00"));
        assert!(rows.contains("alexandrin"), "author clipped to 10 chars");
        assert!(!rows.contains("alexandrina"));
        assert!(rows.trim_end().ends_with("hi"));
    }

    #[test]
    fn clip_respects_char_boundaries() {
        assert_eq!(clip("héllo wörld", 5), "héllo");
        assert_eq!(clip("ab", 10), "ab");
    }

    #[test]
    fn bulletin_rule_matches_title_length() {
        let view = bulletin_view(&Bulletin {
            title: "Tips".to_string(),
            body: "Use netcat".to_string(),
        });
        assert!(view.contains("\nTips\n----\n"));
    }

    #[test]
    fn online_line_formats() {
        assert_eq!(online_line(&[]), "No one online.\n");
        let names = vec!["alice".to_string(), "bob".to_string()];
        assert_eq!(online_line(&names), "Online: alice, bob\n");
    }
}
