//! Per-section renderers
//!
//! Each function pushes elements as it goes and bails out with `?` on the
//! first hard failure; whatever was pushed before that stays on screen.

use super::element::{Element, SignalCategory, TableRow, Tone};
use super::values::{
    MISSING, format_number, format_percent, format_plain, format_score, health_bar_width,
    score_bar_width, score_tone, text_or,
};
use crate::error::Result;
use crate::model::{AnalysisResult, GrowthMetrics};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

const DEFAULT_SIGNAL: &str = "Hold";
const DEFAULT_STRENGTH: f64 = 5.0;
const DEFAULT_CONFIDENCE: &str = "Low";
const NO_SUMMARY: &str = "No summary available.";
const NO_HEADLINES: &str = "No headlines available.";
const NO_OUTLOOK: &str = "No Outlook Available";
const NO_FUTURE: &str = "No Future Plans Available";
const UNKNOWN_POSITION: &str = "Unknown";
const GENERIC_COMPANY: &str = "Company";

pub(super) fn header(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let company = text_or(result.company_name.as_deref(), GENERIC_COMPANY);
    out.push(Element::title(format!("Analysis: {company}")));

    let date = result
        .analysis_date
        .as_deref()
        .map_or_else(|| MISSING.to_string(), format_analysis_date);
    out.push(Element::field("Date", date));
    Ok(())
}

pub(super) fn signal(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let signal = result.signal()?;

    let signal_type = text_or(signal.signal_type.as_deref(), DEFAULT_SIGNAL);
    out.push(Element::Badge {
        label: signal_type.to_uppercase().replace('_', " "),
        category: SignalCategory::classify(&signal_type),
    });
    out.push(Element::text(
        "Summary",
        text_or(signal.summary.as_deref(), NO_SUMMARY),
    ));

    let strength = signal.signal_strength.unwrap_or(DEFAULT_STRENGTH);
    out.push(Element::field(
        "Signal strength",
        format!("{}/10", format_number(strength)),
    ));
    out.push(Element::field(
        "Confidence",
        text_or(signal.confidence.as_deref(), DEFAULT_CONFIDENCE),
    ));
    Ok(())
}

pub(super) fn news(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let news = result.news()?;

    if let Some(score) = news.score {
        let tone = score_tone(score);
        out.push(Element::toned_field("Sentiment score", format_score(score), tone));
        out.push(Element::Bar {
            label: "Sentiment".to_string(),
            percent: score_bar_width(score),
            tone,
        });
    } else {
        out.push(Element::field("Sentiment score", MISSING));
    }

    out.push(Element::toned_field(
        "Negative",
        format_count(news.negative_count),
        Tone::Negative,
    ));
    out.push(Element::toned_field(
        "Positive",
        format_count(news.positive_count),
        Tone::Positive,
    ));
    out.push(Element::toned_field(
        "Neutral",
        format_count(news.neutral_count),
        Tone::Neutral,
    ));

    if let Some(level) = news.panic_level.as_deref().filter(|l| !l.trim().is_empty()) {
        out.push(Element::field("Panic level", level.to_uppercase()));
    }
    if !news.key_themes.is_empty() {
        out.push(Element::list("Key themes", news.key_themes));
    }

    out.push(Element::List {
        label: "Headlines".to_string(),
        items: news.headlines,
        placeholder: Some(NO_HEADLINES.to_string()),
    });
    Ok(())
}

pub(super) fn fundamentals(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let fundamentals = result.fundamentals()?;

    match fundamentals.health_score {
        Some(health) => {
            out.push(Element::field(
                "Health score",
                format!("{}/10", format_number(health)),
            ));
            out.push(Element::Bar {
                label: "Health".to_string(),
                percent: health_bar_width(health),
                tone: Tone::Positive,
            });
        }
        None => out.push(Element::field("Health score", MISSING)),
    }

    out.push(Element::field(
        "Revenue Growth",
        format_percent(fundamentals.revenue_growth),
    ));
    out.push(Element::field(
        "Profit Margin",
        format_percent(fundamentals.profit_margin),
    ));
    out.push(Element::field("ROE", format_percent(fundamentals.roe)));
    out.push(Element::field(
        "Debt/Equity",
        format_plain(fundamentals.debt_to_equity),
    ));

    if !fundamentals.strengths.is_empty() {
        out.push(Element::list("Strengths", fundamentals.strengths));
    }
    if !fundamentals.concerns.is_empty() {
        out.push(Element::list("Concerns", fundamentals.concerns));
    }
    Ok(())
}

pub(super) fn peers(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let peers = result.peers()?;

    let position = text_or(peers.competitive_position.as_deref(), UNKNOWN_POSITION);
    out.push(Element::field("Competitive position", position.to_uppercase()));
    if let Some(strength) = peers.relative_strength {
        out.push(Element::field(
            "Relative strength",
            format!("{}/10", format_number(strength)),
        ));
    }

    // The target row must not depend on the fundamentals section being healthy
    let target = match result.fundamentals() {
        Ok(fundamentals) => fundamentals.growth(),
        Err(e) => {
            debug!("Target row without fundamentals: {e}");
            GrowthMetrics::default()
        }
    };
    let company = text_or(result.company_name.as_deref(), GENERIC_COMPANY);

    let mut rows = vec![growth_row(format!("{company} (Target)"), &target, true)];
    rows.extend(
        peers
            .rows()
            .into_iter()
            .map(|(name, metrics)| growth_row(name, &metrics, false)),
    );

    out.push(Element::Table {
        headers: ["Company", "Revenue Growth", "Profit Margin", "ROE"]
            .iter()
            .map(ToString::to_string)
            .collect(),
        rows,
    });
    Ok(())
}

pub(super) fn thesis(result: &AnalysisResult, out: &mut Vec<Element>) -> Result<()> {
    let signal = result.signal()?;

    out.push(Element::list("Opportunity reasons", signal.opportunity_reasons));
    out.push(Element::list("Risk factors", signal.risk_factors));
    out.push(Element::text(
        "Management outlook",
        text_or(signal.management_outlook.as_deref(), NO_OUTLOOK),
    ));
    out.push(Element::text(
        "Future development",
        text_or(signal.future_development.as_deref(), NO_FUTURE),
    ));
    out.push(Element::field(
        "Timeframe",
        text_or(signal.timeframe.as_deref(), MISSING),
    ));
    out.push(Element::field(
        "Entry strategy",
        text_or(signal.entry_strategy.as_deref(), MISSING),
    ));
    Ok(())
}

fn growth_row(name: String, metrics: &GrowthMetrics, highlighted: bool) -> TableRow {
    TableRow {
        cells: vec![
            name,
            format_percent(metrics.revenue_growth),
            format_percent(metrics.profit_margin),
            format_percent(metrics.roe),
        ],
        highlighted,
    }
}

fn format_count(count: Option<u64>) -> String {
    count.map_or_else(|| MISSING.to_string(), |c| c.to_string())
}

/// Calendar date of an ISO-8601 timestamp; unparseable input is shown as-is
fn format_analysis_date(raw: &str) -> String {
    const DISPLAY: &str = "%Y-%m-%d";
    let raw = raw.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return timestamp.format(DISPLAY).to_string();
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return timestamp.format(DISPLAY).to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DISPLAY) {
        return date.format(DISPLAY).to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_analysis_date() {
        assert_eq!(format_analysis_date("2024-05-01T09:30:00.123456"), "2024-05-01");
        assert_eq!(format_analysis_date("2024-05-01T09:30:00Z"), "2024-05-01");
        assert_eq!(format_analysis_date("2024-05-01"), "2024-05-01");
        assert_eq!(format_analysis_date("last tuesday"), "last tuesday");
    }

    #[test]
    fn test_format_count() {
        assert_eq!(format_count(Some(4)), "4");
        assert_eq!(format_count(None), "--");
    }
}
