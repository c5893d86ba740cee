//! Keyboard input, one line at a time.

/// What the player asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Enter or space: the continue signal.
    Continue,
    /// A digit from 1 to 9, stored zero-based.
    Choose(usize),
    /// Print a JSON snapshot of the session.
    Status,
    /// Leave.
    Quit,
}

/// Parses one input line. Returns `None` for anything unrecognised.
#[must_use]
pub fn parse(line: &str) -> Option<Command> {
    match line.trim() {
        "" => Some(Command::Continue),
        "q" | "quit" | "exit" => Some(Command::Quit),
        "s" | "status" => Some(Command::Status),
        other => match other.parse::<usize>() {
            Ok(n @ 1..=9) => Some(Command::Choose(n - 1)),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_continue() {
        assert_eq!(parse(""), Some(Command::Continue));
        assert_eq!(parse("   "), Some(Command::Continue));
        assert_eq!(parse("\n"), Some(Command::Continue));
    }

    #[test]
    fn test_digits_choose_zero_based() {
        assert_eq!(parse("1"), Some(Command::Choose(0)));
        assert_eq!(parse(" 3 "), Some(Command::Choose(2)));
        assert_eq!(parse("9"), Some(Command::Choose(8)));
    }

    #[test]
    fn test_out_of_range_digits_are_unrecognised() {
        assert_eq!(parse("0"), None);
        assert_eq!(parse("10"), None);
        assert_eq!(parse("-1"), None);
    }

    #[test]
    fn test_words() {
        assert_eq!(parse("q"), Some(Command::Quit));
        assert_eq!(parse("quit"), Some(Command::Quit));
        assert_eq!(parse("status"), Some(Command::Status));
        assert_eq!(parse("hello"), None);
    }
}
