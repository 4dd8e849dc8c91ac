use std::fmt;
use std::time::Duration;

/// Parse a human-friendly duration such as `30s`, `1m30s`, `1.5s` or
/// `250ms` into a [`Duration`].
///
/// # Grammar
///
/// ```text
/// duration   = component ( separators component )* ;
/// component  = number separators? unit ;
/// number     = digits [ "." digits ] ;
/// unit       = "ms" | "s" | "m" | "h" ;
/// separators = { whitespace | "_" } ;
/// ```
///
/// Zero is accepted so that `--min-tail 0s` can disable the short-tail rule;
/// callers that need a positive length validate it themselves. Precision
/// finer than a millisecond is rejected because every consumer works in
/// whole milliseconds.
pub fn parse_duration(value: &str) -> Result<Duration, DurationParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DurationParseError::Empty);
    }

    let bytes = trimmed.as_bytes();
    let mut index = 0usize;
    let mut total_ms: u128 = 0;

    while index < bytes.len() {
        let (mantissa, scale, consumed) = parse_number(bytes, index)?;
        index += consumed;
        skip_separators(bytes, &mut index);

        let (unit, consumed) = parse_unit(trimmed, index)?;
        index += consumed;
        skip_separators(bytes, &mut index);

        let pow10 = 10u128.pow(scale);
        let scaled = mantissa
            .checked_mul(unit.millis())
            .ok_or(DurationParseError::TooLarge)?;
        if scaled % pow10 != 0 {
            return Err(DurationParseError::SubMillisecond);
        }
        total_ms = total_ms
            .checked_add(scaled / pow10)
            .ok_or(DurationParseError::TooLarge)?;
    }

    let total_ms = u64::try_from(total_ms).map_err(|_| DurationParseError::TooLarge)?;
    Ok(Duration::from_millis(total_ms))
}

fn parse_number(bytes: &[u8], start: usize) -> Result<(u128, u32, usize), DurationParseError> {
    let mut index = start;
    let mut mantissa: u128 = 0;
    let mut scale: Option<u32> = None;

    while let Some(&byte) = bytes.get(index) {
        match byte {
            b'0'..=b'9' => {
                mantissa = mantissa
                    .checked_mul(10)
                    .and_then(|m| m.checked_add(u128::from(byte - b'0')))
                    .ok_or(DurationParseError::TooLarge)?;
                if let Some(scale) = scale.as_mut() {
                    *scale += 1;
                    if *scale > 9 {
                        return Err(DurationParseError::SubMillisecond);
                    }
                }
            }
            b'.' if scale.is_none() && index > start => scale = Some(0),
            _ => break,
        }
        index += 1;
    }

    if index == start {
        return Err(DurationParseError::ExpectedNumber {
            index,
            found: bytes.get(index).map(|&b| b as char),
        });
    }
    if scale == Some(0) {
        return Err(DurationParseError::MissingFractionDigits { index });
    }

    Ok((mantissa, scale.unwrap_or(0), index - start))
}

fn parse_unit(input: &str, index: usize) -> Result<(Unit, usize), DurationParseError> {
    let rest = &input[index..];
    let word: String = rest.chars().take_while(char::is_ascii_alphabetic).collect();
    let unit = match word.as_str() {
        "ms" => Unit::Millisecond,
        "s" => Unit::Second,
        "m" => Unit::Minute,
        "h" => Unit::Hour,
        "" => {
            return Err(DurationParseError::ExpectedUnit {
                index,
                found: rest.chars().next(),
            })
        }
        _ => return Err(DurationParseError::UnknownUnit { index, found: word }),
    };
    Ok((unit, word.len()))
}

fn skip_separators(bytes: &[u8], index: &mut usize) {
    while let Some(&byte) = bytes.get(*index) {
        if byte == b'_' || byte.is_ascii_whitespace() {
            *index += 1;
        } else {
            break;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl Unit {
    fn millis(self) -> u128 {
        match self {
            Unit::Millisecond => 1,
            Unit::Second => 1_000,
            Unit::Minute => 60_000,
            Unit::Hour => 3_600_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DurationParseError {
    Empty,
    ExpectedNumber { index: usize, found: Option<char> },
    ExpectedUnit { index: usize, found: Option<char> },
    UnknownUnit { index: usize, found: String },
    MissingFractionDigits { index: usize },
    SubMillisecond,
    TooLarge,
}

impl std::error::Error for DurationParseError {}

impl fmt::Display for DurationParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationParseError::Empty => write!(f, "duration cannot be empty"),
            DurationParseError::ExpectedNumber { index, found } => match found {
                Some(ch) => write!(
                    f,
                    "expected a number at position {} but found '{ch}'",
                    index + 1
                ),
                None => write!(f, "expected a number at position {}", index + 1),
            },
            DurationParseError::ExpectedUnit { index, found } => match found {
                Some(ch) => write!(
                    f,
                    "expected a unit at position {} but found '{ch}'",
                    index + 1
                ),
                None => write!(f, "expected a unit (ms, s, m, h) at position {}", index + 1),
            },
            DurationParseError::UnknownUnit { index, found } => {
                write!(f, "unknown unit '{found}' at position {}", index + 1)
            }
            DurationParseError::MissingFractionDigits { index } => write!(
                f,
                "expected digits after decimal point at position {}",
                index + 1
            ),
            DurationParseError::SubMillisecond => {
                write!(f, "durations are limited to whole milliseconds")
            }
            DurationParseError::TooLarge => write!(
                f,
                "duration exceeds the maximum of {} milliseconds",
                u64::MAX
            ),
        }
    }
}
