//! Conversion between raw textual score values and typed scores.
//!
//! Time patterns are strftime patterns (`%H:%M:%S`). Patterns without any `%` are read as
//! token patterns such as `mm:ss.ffffff`, where `hh`/`mm`/`ss` are hours, minutes and seconds
//! and a run of 3, 6 or 9 `f` is the fractional second with that many digits.

use std::{borrow::Cow, fmt, fmt::Write as _, str::FromStr, time::SystemTime};

use chrono::{
    NaiveTime,
    format::{Item, Numeric, StrftimeItems},
};
use serde::Serialize;

use crate::dao::models::{ScoreEntity, ScoreKind, ScoreType, ScoreValue};

use super::ScoreError;

/// Pattern used for time values when no category pattern applies.
pub const FALLBACK_TIME_PATTERN: &str = "%H:%M:%S%.f";

/// Score value as shown to players: time scores go through their category's pattern,
/// point scores stay numeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RenderedScore {
    Time(String),
    Point(i64),
}

impl fmt::Display for RenderedScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderedScore::Time(value) => f.write_str(value),
            RenderedScore::Point(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for ScoreType {
    type Err = ScoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.eq_ignore_ascii_case("time") {
            Ok(ScoreType::Time)
        } else if value.eq_ignore_ascii_case("point") {
            Ok(ScoreType::Point)
        } else {
            Err(ScoreError::UnsupportedScoreType(value.to_owned()))
        }
    }
}

impl ScoreEntity {
    /// Record `value` for `player_id`, stamped with the current time.
    pub fn new(player_id: impl Into<String>, value: ScoreValue) -> Self {
        Self {
            player_id: player_id.into(),
            created_at: SystemTime::now(),
            value,
        }
    }
}

/// Translate a token pattern into strftime; strftime patterns are returned untouched.
pub fn strftime_pattern(pattern: &str) -> Cow<'_, str> {
    if pattern.contains('%') {
        return Cow::Borrowed(pattern);
    }

    let mut translated = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();
    while let Some(current) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&current) {
            chars.next();
            run += 1;
        }

        match (current, run) {
            ('h' | 'H', 2) => translated.push_str("%H"),
            ('m', 2) => translated.push_str("%M"),
            ('s', 2) => translated.push_str("%S"),
            ('f', 3) => translated.push_str("%3f"),
            ('f', 6) => translated.push_str("%6f"),
            ('f', 9) => translated.push_str("%9f"),
            _ => translated.extend(std::iter::repeat_n(current, run)),
        }
    }

    Cow::Owned(translated)
}

/// Check that `pattern` only uses specifiers the time parser understands and that a value
/// rendered with it parses back.
pub fn validate_pattern(pattern: &str) -> Result<(), ScoreError> {
    let invalid = || ScoreError::InvalidPattern(pattern.to_owned());
    let translated = strftime_pattern(pattern);
    if StrftimeItems::new(&translated).any(|item| matches!(item, Item::Error)) {
        return Err(invalid());
    }
    if !has_field(&translated, |_| true) {
        return Err(invalid());
    }

    let sample = NaiveTime::from_hms_micro_opt(1, 2, 3, 456_789).ok_or_else(invalid)?;
    let mut rendered = String::new();
    write!(rendered, "{}", sample.format(&translated)).map_err(|_| invalid())?;
    parse_canonical(&rendered, &translated).ok_or_else(invalid)?;
    Ok(())
}

/// Parse `raw` according to the declared kind of a leaf category.
pub fn parse_score(kind: &ScoreKind, raw: &str) -> Result<ScoreValue, ScoreError> {
    match kind {
        ScoreKind::Time { score_fmt } => parse_time(raw, score_fmt)
            .map(ScoreValue::Time)
            .ok_or_else(|| ScoreError::InvalidFormat {
                raw: raw.to_owned(),
                expected: ScoreType::Time,
            }),
        ScoreKind::Point => {
            raw.parse::<i64>()
                .map(ScoreValue::Point)
                .map_err(|_| ScoreError::InvalidFormat {
                    raw: raw.to_owned(),
                    expected: ScoreType::Point,
                })
        }
    }
}

/// Render a stored value for display using the category's declared kind.
pub fn render_score(kind: &ScoreKind, value: &ScoreValue) -> RenderedScore {
    match (value, kind) {
        (ScoreValue::Time(time), ScoreKind::Time { score_fmt }) => {
            RenderedScore::Time(format_time(time, score_fmt))
        }
        (ScoreValue::Time(time), ScoreKind::Point) => {
            RenderedScore::Time(format_time(time, FALLBACK_TIME_PATTERN))
        }
        (ScoreValue::Point(points), _) => RenderedScore::Point(*points),
    }
}

fn parse_time(raw: &str, pattern: &str) -> Option<NaiveTime> {
    validate_pattern(pattern).ok()?;
    parse_canonical(raw, &strftime_pattern(pattern))
}

/// Parse `raw` with a strftime `pattern`, accepting only the exact rendering of the result.
fn parse_canonical(raw: &str, pattern: &str) -> Option<NaiveTime> {
    let has_hour = has_field(pattern, |numeric| {
        matches!(numeric, Numeric::Hour | Numeric::Hour12)
    });
    let has_minute = has_field(pattern, |numeric| matches!(numeric, Numeric::Minute));

    // NaiveTime needs hour and minute; fill in the leading fields the pattern leaves out.
    let parsed = match (has_hour, has_minute) {
        (true, _) => NaiveTime::parse_from_str(raw, pattern),
        (false, true) => {
            NaiveTime::parse_from_str(&format!("00:{raw}"), &format!("%H:{pattern}"))
        }
        (false, false) => {
            NaiveTime::parse_from_str(&format!("00:00:{raw}"), &format!("%H:%M:{pattern}"))
        }
    };
    let time = parsed.ok()?;

    // chrono tolerates unpadded fields and leading spaces.
    let mut canonical = String::with_capacity(raw.len());
    write!(canonical, "{}", time.format(pattern)).ok()?;
    (canonical == raw).then_some(time)
}

fn has_field(pattern: &str, wanted: impl Fn(&Numeric) -> bool) -> bool {
    StrftimeItems::new(pattern).any(|item| match item {
        Item::Numeric(numeric, _) => wanted(&numeric),
        _ => false,
    })
}

fn format_time(time: &NaiveTime, pattern: &str) -> String {
    let pattern = strftime_pattern(pattern);
    let mut rendered = String::new();
    if write!(rendered, "{}", time.format(&pattern)).is_err() {
        rendered.clear();
        let _ = write!(rendered, "{}", time.format(FALLBACK_TIME_PATTERN));
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time_kind(pattern: &str) -> ScoreKind {
        ScoreKind::Time {
            score_fmt: pattern.into(),
        }
    }

    #[test]
    fn token_patterns_translate_to_strftime() {
        assert_eq!(strftime_pattern("mm:ss.ffffff"), "%M:%S.%6f");
        assert_eq!(strftime_pattern("hh:mm:ss"), "%H:%M:%S");
        assert_eq!(strftime_pattern("%H:%M:%S"), "%H:%M:%S");
    }

    #[test]
    fn parse_and_render_strftime_time() {
        let kind = time_kind("%H:%M:%S");
        let value = parse_score(&kind, "01:02:03").unwrap();
        assert_eq!(
            value,
            ScoreValue::Time(NaiveTime::from_hms_opt(1, 2, 3).unwrap())
        );
        assert_eq!(
            render_score(&kind, &value),
            RenderedScore::Time("01:02:03".into())
        );
    }

    #[test]
    fn parse_and_render_default_token_pattern() {
        let kind = time_kind("mm:ss.ffffff");
        let value = parse_score(&kind, "01:02.345678").unwrap();
        assert_eq!(
            value,
            ScoreValue::Time(NaiveTime::from_hms_micro_opt(0, 1, 2, 345_678).unwrap())
        );
        assert_eq!(render_score(&kind, &value).to_string(), "01:02.345678");
    }

    #[test]
    fn time_rejects_values_not_matching_pattern() {
        let kind = time_kind("%H:%M:%S");
        for raw in [
            "1:2",
            "1:2:3",
            " 01:02:03",
            "aa:bb:cc",
            "01:02:03 extra",
            "25:00:00",
            "",
        ] {
            let err = parse_score(&kind, raw).unwrap_err();
            assert!(
                matches!(err, ScoreError::InvalidFormat { expected: ScoreType::Time, .. }),
                "{raw} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn points_parse_as_base_ten_integers() {
        assert_eq!(
            parse_score(&ScoreKind::Point, "120").unwrap(),
            ScoreValue::Point(120)
        );
        assert_eq!(
            parse_score(&ScoreKind::Point, "-7").unwrap(),
            ScoreValue::Point(-7)
        );
        for raw in ["12.5", "abc", "0x10", ""] {
            assert!(matches!(
                parse_score(&ScoreKind::Point, raw),
                Err(ScoreError::InvalidFormat {
                    expected: ScoreType::Point,
                    ..
                })
            ));
        }
        assert_eq!(
            render_score(&ScoreKind::Point, &ScoreValue::Point(120)),
            RenderedScore::Point(120)
        );
    }

    #[test]
    fn score_type_names() {
        assert_eq!("Time".parse::<ScoreType>().unwrap(), ScoreType::Time);
        assert_eq!("point".parse::<ScoreType>().unwrap(), ScoreType::Point);
        assert_eq!(
            "Float".parse::<ScoreType>().unwrap_err(),
            ScoreError::UnsupportedScoreType("Float".into())
        );
    }

    #[test]
    fn invalid_patterns_are_reported() {
        assert!(validate_pattern("%H:%M:%S").is_ok());
        assert!(validate_pattern("mm:ss.ffffff").is_ok());
        assert_eq!(
            validate_pattern("%H:%Q").unwrap_err(),
            ScoreError::InvalidPattern("%H:%Q".into())
        );
        for pattern in ["%H", "%I:%M", "%Y-%m-%d", "laps"] {
            assert_eq!(
                validate_pattern(pattern).unwrap_err(),
                ScoreError::InvalidPattern(pattern.into()),
                "{pattern} should be rejected"
            );
        }
        assert!(validate_pattern("%S%.3f").is_ok());
    }
}
