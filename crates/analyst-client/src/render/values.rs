//! Field-level formatting and defaults

use super::element::Tone;
use tracing::warn;

/// Placeholder for a missing numeric value
pub const MISSING: &str = "--";

/// Format a number without a trailing `.0` for whole values
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rounded = format!("{value:.2}");
        rounded
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    }
}

/// `12.5%`, or the missing placeholder
pub fn format_percent(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), |v| format!("{}%", format_number(v)))
}

/// Plain number, or the missing placeholder
pub fn format_plain(value: Option<f64>) -> String {
    value.map_or_else(|| MISSING.to_string(), format_number)
}

/// Sentiment score with an explicit sign for non-negative values
pub fn format_score(score: f64) -> String {
    if score >= 0.0 {
        format!("+{}", format_number(score))
    } else {
        format_number(score)
    }
}

/// Tone of a sentiment score: non-negative is positive
pub fn score_tone(score: f64) -> Tone {
    if score >= 0.0 {
        Tone::Positive
    } else {
        Tone::Negative
    }
}

/// Map a -10..=10 score linearly onto a 0..=100 bar width
///
/// Scores outside the nominal range are logged and clamped.
pub fn score_bar_width(score: f64) -> f64 {
    let width = (score + 10.0) / 20.0 * 100.0;
    clamp_width(width, "sentiment score", score)
}

/// Map a 0..=10 health score onto a 0..=100 bar width
pub fn health_bar_width(health: f64) -> f64 {
    clamp_width(health * 10.0, "health score", health)
}

fn clamp_width(width: f64, what: &str, raw: f64) -> f64 {
    if width.is_nan() {
        warn!("{what} is not a number");
        return 0.0;
    }
    if !(0.0..=100.0).contains(&width) {
        warn!("{what} {raw} is outside its nominal range; clamping bar");
    }
    width.clamp(0.0, 100.0)
}

/// Non-blank text, or the given placeholder
pub fn text_or(value: Option<&str>, placeholder: &str) -> String {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .unwrap_or(placeholder)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bar_width() {
        assert_eq!(score_bar_width(-10.0), 0.0);
        assert_eq!(score_bar_width(0.0), 50.0);
        assert_eq!(score_bar_width(10.0), 100.0);
        assert_eq!(score_bar_width(5.0), 75.0);
    }

    #[test]
    fn test_score_bar_width_out_of_range_is_clamped() {
        assert_eq!(score_bar_width(-15.0), 0.0);
        assert_eq!(score_bar_width(30.0), 100.0);
        assert_eq!(score_bar_width(f64::NAN), 0.0);
    }

    #[test]
    fn test_format_score() {
        assert_eq!(format_score(0.0), "+0");
        assert_eq!(format_score(7.0), "+7");
        assert_eq!(format_score(-3.0), "-3");
        assert_eq!(format_score(2.5), "+2.5");
        assert_eq!(score_tone(0.0), Tone::Positive);
        assert_eq!(score_tone(-0.5), Tone::Negative);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(12.346), "12.35");
        assert_eq!(format_number(0.1), "0.1");
        assert_eq!(format_percent(Some(-4.0)), "-4%");
        assert_eq!(format_percent(None), "--");
        assert_eq!(format_plain(Some(1.25)), "1.25");
    }

    #[test]
    fn test_text_or() {
        assert_eq!(text_or(Some("  fine "), "n/a"), "fine");
        assert_eq!(text_or(Some("   "), "n/a"), "n/a");
        assert_eq!(text_or(None, "n/a"), "n/a");
    }
}
