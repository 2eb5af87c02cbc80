//! Timestamp markup and human-readable rendering.
//!
//! A format code mixes literal text with `%`-prefixed tokens. Each token
//! becomes a chat timestamp tag (`<t:1641801600:R>`) in the markup output
//! and a rendered date, time or relative phrase in the display output.

use chrono::DateTime;
use chrono_tz::Tz;

/// The thirteen format codes offered to users, most common first.
pub const FORMAT_PRESETS: [&str; 13] = [
    "%R",
    "%t",
    "%T",
    "%d",
    "%D",
    "%f",
    "%F",
    "%t (%R)",
    "%T (%R)",
    "%D %t",
    "%d %T",
    "%f (%R)",
    "%F (%R)",
];

/// Format code used when the user has not picked one.
pub const DEFAULT_FORMAT_CODE: &str = "%R";

/// A timestamp token. The set is closed: any other letter after `%` is
/// literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    ShortTime,
    LongTime,
    ShortDate,
    LongDate,
    ShortDateTime,
    LongDateTime,
    Relative,
}

impl Token {
    pub const ALL: [Token; 7] = [
        Token::ShortTime,
        Token::LongTime,
        Token::ShortDate,
        Token::LongDate,
        Token::ShortDateTime,
        Token::LongDateTime,
        Token::Relative,
    ];

    pub fn from_letter(letter: char) -> Option<Token> {
        match letter {
            't' => Some(Token::ShortTime),
            'T' => Some(Token::LongTime),
            'd' => Some(Token::ShortDate),
            'D' => Some(Token::LongDate),
            'f' => Some(Token::ShortDateTime),
            'F' => Some(Token::LongDateTime),
            'R' => Some(Token::Relative),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Token::ShortTime => 't',
            Token::LongTime => 'T',
            Token::ShortDate => 'd',
            Token::LongDate => 'D',
            Token::ShortDateTime => 'f',
            Token::LongDateTime => 'F',
            Token::Relative => 'R',
        }
    }

    /// `strftime` pattern for calendar tokens; `None` for [`Token::Relative`].
    fn pattern(self) -> Option<&'static str> {
        match self {
            Token::ShortTime => Some("%-I:%M %p"),
            Token::LongTime => Some("%-I:%M:%S %p"),
            Token::ShortDate => Some("%m/%d/%Y"),
            Token::LongDate => Some("%B %-d, %Y"),
            Token::ShortDateTime => Some("%B %-d, %Y %-I:%M %p"),
            Token::LongDateTime => Some("%A, %B %-d, %Y %-I:%M %p"),
            Token::Relative => None,
        }
    }
}

/// A piece of a parsed format code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Token(Token),
}

/// Splits a format code into literal runs and tokens.
pub fn parse(code: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut literal_start = 0;
    let mut chars = code.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if ch != '%' {
            continue;
        }
        let Some(&(_, letter)) = chars.peek() else {
            break;
        };
        if let Some(token) = Token::from_letter(letter) {
            if literal_start < index {
                pieces.push(Piece::Literal(&code[literal_start..index]));
            }
            pieces.push(Piece::Token(token));
            chars.next();
            literal_start = index + 2;
        }
    }
    if literal_start < code.len() {
        pieces.push(Piece::Literal(&code[literal_start..]));
    }
    pieces
}

/// Both renderings of one instant under one format code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// What gets copied: timestamp tags the chat client renders itself.
    pub markup: String,
    /// What we show: the instant rendered in its own timezone.
    pub display: String,
}

/// Renders `instant` under `code`. Relative tokens are phrased against `now`.
pub fn format(instant: &DateTime<Tz>, code: &str, now: &DateTime<Tz>) -> Rendered {
    let epoch = instant.timestamp();
    let mut markup = String::with_capacity(code.len() + 16);
    let mut display = String::with_capacity(code.len() + 16);

    for piece in parse(code) {
        match piece {
            Piece::Literal(text) => {
                markup.push_str(text);
                display.push_str(text);
            }
            Piece::Token(token) => {
                markup.push_str(&format!("<t:{}:{}>", epoch, token.letter()));
                match token.pattern() {
                    Some(pattern) => display.push_str(&instant.format(pattern).to_string()),
                    None => display.push_str(&relative(instant, now)),
                }
            }
        }
    }
    Rendered { markup, display }
}

const RELATIVE_UNITS: [(i64, &str); 6] = [
    (365 * 86_400, "year"),
    (30 * 86_400, "month"),
    (86_400, "day"),
    (3_600, "hour"),
    (60, "minute"),
    (1, "second"),
];

/// Phrases the distance from `now` to `instant` in its largest whole unit,
/// e.g. "in 3 hours" or "2 days ago".
pub fn relative(instant: &DateTime<Tz>, now: &DateTime<Tz>) -> String {
    let delta = instant.timestamp() - now.timestamp();
    let magnitude = delta.abs();
    let (count, unit) = RELATIVE_UNITS
        .iter()
        .find(|(seconds, _)| magnitude >= *seconds)
        .map(|(seconds, unit)| (magnitude / seconds, *unit))
        .unwrap_or((0, "second"));
    let plural = if count == 1 { "" } else { "s" };

    if delta < 0 {
        format!("{} {}{} ago", count, unit, plural)
    } else {
        format!("in {} {}{}", count, unit, plural)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::Los_Angeles;

    fn instant() -> DateTime<Tz> {
        Los_Angeles.with_ymd_and_hms(2021, 4, 20, 16, 20, 30).unwrap()
    }

    #[test]
    fn markup_carries_epoch_seconds_for_every_token() {
        let rendered = format(&instant(), "%t", &instant());
        assert_eq!(rendered.markup, format!("<t:{}:t>", instant().timestamp()));
        assert_eq!(rendered.markup, "<t:1618960830:t>");

        for token in Token::ALL {
            let code = format!("%{}", token.letter());
            let rendered = format(&instant(), &code, &instant());
            assert_eq!(rendered.markup, format!("<t:1618960830:{}>", token.letter()));
        }
    }

    #[test]
    fn display_patterns() {
        let now = instant();
        let cases = [
            ("%t", "4:20 PM"),
            ("%T", "4:20:30 PM"),
            ("%d", "04/20/2021"),
            ("%D", "April 20, 2021"),
            ("%f", "April 20, 2021 4:20 PM"),
            ("%F", "Tuesday, April 20, 2021 4:20 PM"),
        ];
        for (code, expected) in cases {
            assert_eq!(format(&instant(), code, &now).display, expected, "{}", code);
        }
    }

    #[test]
    fn literals_pass_through_both_outputs() {
        let now = instant() - Duration::hours(3);
        let rendered = format(&instant(), "at %t (%R) 100% %x!", &now);
        assert_eq!(
            rendered.markup,
            "at <t:1618960830:t> (<t:1618960830:R>) 100% %x!"
        );
        assert_eq!(rendered.display, "at 4:20 PM (in 3 hours) 100% %x!");
    }

    #[test]
    fn trailing_percent_is_literal() {
        let rendered = format(&instant(), "%D%", &instant());
        assert_eq!(rendered.display, "April 20, 2021%");
        assert_eq!(parse("%%R"), vec![Piece::Literal("%"), Piece::Token(Token::Relative)]);
    }

    #[test]
    fn relative_phrases() {
        let now = instant();
        assert_eq!(relative(&(now + Duration::hours(3)), &now), "in 3 hours");
        assert_eq!(relative(&(now - Duration::days(2)), &now), "2 days ago");
        assert_eq!(relative(&(now + Duration::minutes(1)), &now), "in 1 minute");
        assert_eq!(relative(&(now + Duration::seconds(119)), &now), "in 1 minute");
        assert_eq!(relative(&(now - Duration::days(45)), &now), "1 month ago");
        assert_eq!(relative(&(now + Duration::days(800)), &now), "in 2 years");
        assert_eq!(relative(&now, &now), "in 0 seconds");
    }

    #[test]
    fn formatting_is_repeatable() {
        let now = instant() + Duration::minutes(5);
        for code in FORMAT_PRESETS {
            assert_eq!(format(&instant(), code, &now), format(&instant(), code, &now));
        }
    }

    #[test]
    fn presets_are_all_tokenized() {
        for code in FORMAT_PRESETS {
            assert!(parse(code).iter().any(|piece| matches!(piece, Piece::Token(_))));
        }
    }
}
