// FILE: crates/cli/src/input.rs

//! Parsing of the interactive player's command lines

use std::fmt;

/// One line typed at the player prompt
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    TogglePlay,
    NextChapter,
    PreviousChapter,
    JumpForward,
    JumpBackward,
    /// Arm the sleep timer for N chapters, 0 cancels
    Sleep(u8),
    SeekTo(f64),
    Rate(f32),
    Info,
    Retry,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(String);

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ParseError {}

/// Parses a prompt line; blank lines yield `None`
pub fn parse_command(line: &str) -> Result<Option<PlayerCommand>, ParseError> {
    let mut parts = line.split_whitespace();
    let Some(word) = parts.next() else {
        return Ok(None);
    };
    let arg = parts.next();
    if parts.next().is_some() {
        return Err(ParseError(format!("Too many arguments for '{}'", word)));
    }

    let command = match (word, arg) {
        ("p", None) => PlayerCommand::TogglePlay,
        ("n", None) => PlayerCommand::NextChapter,
        ("b", None) => PlayerCommand::PreviousChapter,
        ("f", None) => PlayerCommand::JumpForward,
        ("r", None) => PlayerCommand::JumpBackward,
        ("i", None) => PlayerCommand::Info,
        ("retry", None) => PlayerCommand::Retry,
        ("h" | "?", None) => PlayerCommand::Help,
        ("q", None) => PlayerCommand::Quit,
        ("s", Some(n)) => PlayerCommand::Sleep(
            n.parse()
                .map_err(|_| ParseError(format!("'{}' is not a chapter count", n)))?,
        ),
        ("g", Some(t)) => PlayerCommand::SeekTo(parse_time(t)?),
        ("x", Some(r)) => PlayerCommand::Rate(
            r.trim_end_matches('x')
                .parse()
                .map_err(|_| ParseError(format!("'{}' is not a rate", r)))?,
        ),
        ("s" | "g" | "x", None) => {
            return Err(ParseError(format!("'{}' needs an argument", word)))
        }
        _ => return Err(ParseError(format!("Unknown command '{}' (h for help)", line.trim()))),
    };
    Ok(Some(command))
}

/// Accepts plain seconds or `[H:]MM:SS`
fn parse_time(text: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError(format!("'{}' is not a time", text));

    let fields: Vec<&str> = text.split(':').collect();
    if fields.len() > 3 {
        return Err(invalid());
    }
    let mut seconds = 0.0;
    for (i, field) in fields.iter().enumerate() {
        let value: f64 = field.parse().map_err(|_| invalid())?;
        if value < 0.0 || (i > 0 && value >= 60.0) {
            return Err(invalid());
        }
        seconds = seconds * 60.0 + value;
    }
    Ok(seconds)
}

pub const HELP: &str = "\
  p          play / pause
  n / b      next / previous chapter
  f / r      jump forward / back
  s <N>      sleep after N chapters (0 cancels)
  g <time>   go to seconds or H:MM:SS
  x <rate>   playback speed
  i          session info
  retry      reopen after an error
  q          quit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_letter_commands() {
        assert_eq!(parse_command("p").unwrap(), Some(PlayerCommand::TogglePlay));
        assert_eq!(parse_command(" n ").unwrap(), Some(PlayerCommand::NextChapter));
        assert_eq!(parse_command("b").unwrap(), Some(PlayerCommand::PreviousChapter));
        assert_eq!(parse_command("q").unwrap(), Some(PlayerCommand::Quit));
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_sleep_argument() {
        assert_eq!(parse_command("s 2").unwrap(), Some(PlayerCommand::Sleep(2)));
        assert!(parse_command("s").is_err());
        assert!(parse_command("s two").is_err());
    }

    #[test]
    fn test_seek_formats() {
        assert_eq!(parse_command("g 90").unwrap(), Some(PlayerCommand::SeekTo(90.0)));
        assert_eq!(parse_command("g 1:30").unwrap(), Some(PlayerCommand::SeekTo(90.0)));
        assert_eq!(
            parse_command("g 1:00:05").unwrap(),
            Some(PlayerCommand::SeekTo(3605.0))
        );
        assert!(parse_command("g 1:75").is_err());
        assert!(parse_command("g -3").is_err());
    }

    #[test]
    fn test_rate_accepts_suffix() {
        assert_eq!(parse_command("x 1.5").unwrap(), Some(PlayerCommand::Rate(1.5)));
        assert_eq!(parse_command("x 2x").unwrap(), Some(PlayerCommand::Rate(2.0)));
    }

    #[test]
    fn test_unknown_and_extra_arguments() {
        assert!(parse_command("zz").is_err());
        assert!(parse_command("p now").is_err());
        assert!(parse_command("g 1 2").is_err());
    }
}
