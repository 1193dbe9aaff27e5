//! Recursive-descent parser for the allotment language.
//!
//! Grammar:
//!
//! ```text
//! Document     := TagBlock* end-of-input
//! TagBlock     := (quoted-string | word | "untagged") "{" Block "}"
//! Block        := (Period | DateEntry)*
//! Period       := "from" date ("to" (end-of-time | date))? "{" WeekdayDelta* "}"
//! WeekdayDelta := weekday hours
//! DateEntry    := date hours quoted-string?
//! ```
//!
//! The parser holds exactly one token of lookahead and never backtracks.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc, Weekday};

use crate::document::{DateEntry, Document, Period, TagBlock, TagKey};
use crate::error::ConfigError;
use crate::lexer::{Lexer, line_fragment};
use crate::token::{Token, TokenKind};

/// Parses allotment source, interpreting dates in the system time zone.
///
/// Periods left open, or closed with `end of time`, end at `default_end`
/// (normally the end of the report window).
pub fn parse_document(src: &str, default_end: DateTime<Utc>) -> Result<Document, ConfigError> {
    parse_document_in(src, default_end, Local)
}

/// Parses allotment source, interpreting dates in the given time zone.
pub fn parse_document_in<Tz: TimeZone>(
    src: &str,
    default_end: DateTime<Utc>,
    tz: Tz,
) -> Result<Document, ConfigError> {
    Parser::new(src, default_end, tz)?.parse()
}

/// End of a period as written in the source, before resolution.
#[derive(Debug, Clone, Copy)]
enum PeriodEnd {
    /// No `to` clause.
    Open,
    /// `to end of time`.
    EndOfTime,
    At(DateTime<Utc>),
}

#[derive(Debug)]
struct RawPeriod {
    start: DateTime<Utc>,
    end: PeriodEnd,
    weekday_deltas: [TimeDelta; 7],
}

/// Allotment parser over a single source string.
pub struct Parser<'a, Tz: TimeZone> {
    lexer: Lexer<'a>,
    current: Token<'a>,
    default_end: DateTime<Utc>,
    tz: Tz,
}

impl<'a, Tz: TimeZone> Parser<'a, Tz> {
    /// Creates a parser and reads the first lookahead token.
    pub fn new(src: &'a str, default_end: DateTime<Utc>, tz: Tz) -> Result<Self, ConfigError> {
        let mut lexer = Lexer::new(src);
        let current = lexer.next_token()?;
        Ok(Self {
            lexer,
            current,
            default_end,
            tz,
        })
    }

    /// Parses the whole source into a [`Document`].
    pub fn parse(mut self) -> Result<Document, ConfigError> {
        let mut document = Document::default();
        while matches!(
            self.current.kind,
            TokenKind::Str | TokenKind::Word | TokenKind::Untagged
        ) {
            let line = self.current.line;
            let (key, block) = self.parse_tag_block()?;
            if document.insert(key.clone(), block).is_err() {
                return Err(ConfigError::DuplicateTag {
                    tag: key.to_string(),
                    line,
                });
            }
        }
        self.expect(TokenKind::Eof)?;

        tracing::debug!(blocks = document.len(), "parsed allotment document");
        Ok(document)
    }

    fn parse_tag_block(&mut self) -> Result<(TagKey, TagBlock), ConfigError> {
        let key = match self.current.kind {
            TokenKind::Untagged => {
                self.advance()?;
                TagKey::Untagged
            }
            TokenKind::Word => TagKey::named(self.advance()?.lexeme),
            _ => TagKey::Named(unquote(self.expect(TokenKind::Str)?.lexeme)),
        };
        self.expect(TokenKind::LBrace)?;
        let block = self.parse_block()?;
        self.expect(TokenKind::RBrace)?;
        Ok((key, block))
    }

    fn parse_block(&mut self) -> Result<TagBlock, ConfigError> {
        let mut periods = Vec::new();
        let mut date_entries = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::From => periods.push(self.parse_period()?),
                TokenKind::Date => date_entries.push(self.parse_date_entry()?),
                _ => break,
            }
        }

        Ok(TagBlock {
            periods: resolve_periods(periods, self.default_end),
            date_entries,
        })
    }

    fn parse_period(&mut self) -> Result<RawPeriod, ConfigError> {
        self.expect(TokenKind::From)?;
        let start = self.expect_date()?;

        let end = if self.current.kind == TokenKind::To {
            self.advance()?;
            if self.current.kind == TokenKind::EndOfTime {
                self.advance()?;
                PeriodEnd::EndOfTime
            } else {
                PeriodEnd::At(self.expect_date()?)
            }
        } else {
            PeriodEnd::Open
        };

        let mut weekday_deltas = [TimeDelta::zero(); 7];
        self.expect(TokenKind::LBrace)?;
        while self.current.kind == TokenKind::Weekday {
            let weekday = self.expect_weekday()?;
            let delta = self.expect_hours()?;
            let slot = &mut weekday_deltas[weekday.num_days_from_monday() as usize];
            *slot += delta;
        }
        self.expect(TokenKind::RBrace)?;

        Ok(RawPeriod {
            start,
            end,
            weekday_deltas,
        })
    }

    fn parse_date_entry(&mut self) -> Result<DateEntry, ConfigError> {
        let date = self.expect_date()?;
        let delta = self.expect_hours()?;
        let note = if self.current.kind == TokenKind::Str {
            unquote(self.advance()?.lexeme)
        } else {
            String::new()
        };
        Ok(DateEntry { date, delta, note })
    }

    /// Consumes the lookahead token and reads the next one.
    fn advance(&mut self) -> Result<Token<'a>, ConfigError> {
        let next = self.lexer.next_token()?;
        Ok(std::mem::replace(&mut self.current, next))
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token<'a>, ConfigError> {
        if self.current.kind != kind {
            return Err(ConfigError::Syntax {
                expected: kind,
                found: self.current.kind,
                line: self.current.line,
                fragment: line_fragment(self.lexer.source(), self.current.offset).to_string(),
            });
        }
        self.advance()
    }

    fn expect_date(&mut self) -> Result<DateTime<Utc>, ConfigError> {
        let token = self.expect(TokenKind::Date)?;
        NaiveDate::parse_from_str(token.lexeme, "%Y-%m-%d")
            .ok()
            .and_then(|date| local_midnight(&self.tz, date))
            .ok_or_else(|| invalid_literal(token))
    }

    fn expect_hours(&mut self) -> Result<TimeDelta, ConfigError> {
        let token = self.expect(TokenKind::Hours)?;
        parse_hours(token.lexeme).ok_or_else(|| invalid_literal(token))
    }

    fn expect_weekday(&mut self) -> Result<Weekday, ConfigError> {
        let token = self.expect(TokenKind::Weekday)?;
        token.lexeme.parse().map_err(|_| invalid_literal(token))
    }
}

/// Fills in period ends: an open period ends where the next one in the block
/// starts; anything still open, or closed with `end of time`, ends at
/// `default_end`.
fn resolve_periods(raw: Vec<RawPeriod>, default_end: DateTime<Utc>) -> Vec<Period> {
    let next_starts: Vec<Option<DateTime<Utc>>> = raw
        .iter()
        .skip(1)
        .map(|period| Some(period.start))
        .chain(std::iter::once(None))
        .collect();

    raw.into_iter()
        .zip(next_starts)
        .map(|(period, next_start)| {
            let end = match period.end {
                PeriodEnd::At(end) => end,
                PeriodEnd::Open => next_start.unwrap_or(default_end),
                PeriodEnd::EndOfTime => default_end,
            };
            Period {
                start: period.start,
                end,
                weekday_deltas: period.weekday_deltas,
            }
        })
        .collect()
}

/// Parses an hours literal: `[-+]?H(:MM)?`.
///
/// A leading `-` negates hours and minutes together, so `-2:30` is minus two
/// and a half hours.
pub fn parse_hours(lexeme: &str) -> Option<TimeDelta> {
    let (negative, unsigned) = match lexeme.as_bytes().first() {
        Some(b'-') => (true, &lexeme[1..]),
        Some(b'+') => (false, &lexeme[1..]),
        _ => (false, lexeme),
    };
    let (hours, minutes) = unsigned.split_once(':').unwrap_or((unsigned, "0"));
    let hours: i64 = hours.parse().ok()?;
    let minutes: i64 = minutes.parse().ok()?;
    if !(0..60).contains(&minutes) {
        return None;
    }

    let delta = TimeDelta::try_hours(hours)?.checked_add(&TimeDelta::minutes(minutes))?;
    Some(if negative { -delta } else { delta })
}

/// Converts a calendar date to the instant of its local midnight.
///
/// An ambiguous midnight (DST fall-back) resolves to the earlier instant. A
/// midnight skipped by a DST spring-forward falls back to 01:00.
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&date.and_hms_opt(1, 0, 0)?)
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strips the surrounding quotes of a string token and unescapes `\"`.
fn unquote(lexeme: &str) -> String {
    lexeme[1..lexeme.len() - 1].replace("\\\"", "\"")
}

fn invalid_literal(token: Token<'_>) -> ConfigError {
    ConfigError::InvalidLiteral {
        line: token.line,
        lexeme: token.lexeme.to_string(),
    }
}
