//! CLI theme and styling.

use colored::Colorize;
use shellward_core::CommandCategory;

/// Width of the confirmation box, borders included.
const BOX_WIDTH: usize = 64;

/// CLI theme configuration.
pub(crate) struct Theme;

impl Theme {
    /// Format a header.
    pub(crate) fn header(text: &str) -> String {
        format!("{}", text.bold().cyan())
    }

    /// Format a success message.
    pub(crate) fn success(text: &str) -> String {
        format!("{} {}", "✓".green(), text)
    }

    /// Format an error message.
    pub(crate) fn error(text: &str) -> String {
        format!("{} {}", "✗".red(), text.red())
    }

    /// Format a warning message.
    pub(crate) fn warning(text: &str) -> String {
        format!("{} {}", "!".yellow(), text.yellow())
    }

    /// Format an info message.
    pub(crate) fn info(text: &str) -> String {
        format!("{} {}", "i".blue(), text)
    }

    /// Format a dimmed message.
    pub(crate) fn dimmed(text: &str) -> String {
        format!("{}", text.dimmed())
    }

    /// Format a separator line.
    pub(crate) fn separator() -> String {
        "━".repeat(50).dimmed().to_string()
    }

    /// Format a key-value pair.
    pub(crate) fn kv(key: &str, value: &str) -> String {
        format!("{}: {}", key.bold(), value)
    }

    /// Format a category in its risk color.
    pub(crate) fn category(category: CommandCategory) -> String {
        let label = category.as_str().to_uppercase();
        match category {
            CommandCategory::Safe => label.green().to_string(),
            CommandCategory::Risky => label.yellow().to_string(),
            CommandCategory::Dangerous => label.red().to_string(),
            CommandCategory::Blocked => label.red().bold().to_string(),
        }
    }

    /// Draw a box around `content`, bordered in the category's color.
    pub(crate) fn confirmation_box(
        title: &str,
        content: &[String],
        category: CommandCategory,
    ) -> String {
        let paint = |s: &str| match category {
            CommandCategory::Safe => s.green().to_string(),
            CommandCategory::Risky => s.yellow().to_string(),
            CommandCategory::Dangerous | CommandCategory::Blocked => s.red().to_string(),
        };

        let inner = BOX_WIDTH.saturating_sub(2);
        let rule = "─".repeat(inner);
        let pad_line = |text: &str| -> String {
            let padding = inner.saturating_sub(2).saturating_sub(visible_len(text));
            format!("{} {text}{:p$} {}", paint("│"), "", paint("│"), p = padding)
        };

        let mut lines = vec![
            paint(&format!("╭{rule}╮")),
            pad_line(&title.bold().to_string()),
            pad_line(""),
        ];
        lines.extend(content.iter().map(|line| pad_line(line)));
        lines.push(paint(&format!("╰{rule}╯")));
        lines.join("\n")
    }
}

/// Printable width of `s`, ignoring ANSI escape sequences.
fn visible_len(s: &str) -> usize {
    let mut len = 0usize;
    let mut in_escape = false;
    for c in s.chars() {
        if in_escape {
            in_escape = !c.is_ascii_alphabetic();
        } else if c == '\x1b' {
            in_escape = true;
        } else {
            len = len.saturating_add(1);
        }
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_len_skips_escapes() {
        assert_eq!(visible_len("\x1b[1mbold\x1b[0m"), 4);
        assert_eq!(visible_len("plain"), 5);
    }

    #[test]
    fn test_box_lines_share_width() {
        colored::control::set_override(false);
        let rendered = Theme::confirmation_box(
            "Title",
            &["Command: mkdir build".to_owned()],
            CommandCategory::Risky,
        );
        let widths: Vec<usize> = rendered.lines().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == BOX_WIDTH));
    }
}
