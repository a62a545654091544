//! Output formatting for progress, results and transcript entries

use crate::progress::{ProgressView, StepState};
use crate::query::{Role, TranscriptEntry};
use crate::render::{Element, ResultsView, Section, SectionOutcome, TableRow, Tone};
use comfy_table::{Attribute, Cell, Table, presets};
use std::fmt;
use std::str::FromStr;

const BAR_WIDTH: usize = 20;

/// Supported output styles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Markdown,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Terminal => "terminal",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "terminal" | "text" => Ok(Self::Terminal),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("Unknown output format: {other}")),
        }
    }
}

pub trait Formatter: Send + Sync {
    fn output_format(&self) -> OutputFormat;
    fn format_progress(&self, view: &ProgressView) -> String;
    fn format_results(&self, view: &ResultsView) -> String;
    fn format_entry(&self, entry: &TranscriptEntry) -> String;
    fn format_error(&self, error: &str) -> String;
}

/// Plain text with box-drawn tables
pub struct TerminalFormatter;

impl TerminalFormatter {
    fn format_element(element: &Element) -> String {
        match element {
            Element::Title { text } => {
                format!("{text}\n{}", "=".repeat(text.chars().count()))
            }
            Element::Badge { label, category } => {
                format!("[ {label} ] {}", text_marker(category.tone()))
            }
            Element::Field {
                label,
                value,
                tone: None,
            } => format!("{label}: {value}"),
            Element::Field {
                label,
                value,
                tone: Some(tone),
            } => format!("{label}: {value} {}", text_marker(*tone)),
            Element::Bar {
                label,
                percent,
                tone,
            } => format!(
                "{label} {} {percent:.0}% {}",
                text_bar(*percent),
                text_marker(*tone)
            ),
            Element::List {
                label,
                items,
                placeholder,
            } => {
                let mut output = format!("{label}:");
                if items.is_empty() {
                    output.push_str(&format!(
                        "\n  ({})",
                        placeholder.as_deref().unwrap_or("none")
                    ));
                }
                for item in items {
                    output.push_str(&format!("\n  - {item}"));
                }
                output
            }
            Element::Text { label, text } => format!("{label}:\n  {text}"),
            Element::Table { headers, rows } => {
                render_table(presets::UTF8_FULL, headers, rows, |cell, highlighted| {
                    let cell = Cell::new(cell);
                    if highlighted {
                        cell.add_attribute(Attribute::Bold)
                    } else {
                        cell
                    }
                })
            }
        }
    }

    fn format_section(section: &Section) -> String {
        let mut output = format!("-- {} --", section.kind);
        for element in &section.elements {
            output.push('\n');
            output.push_str(&Self::format_element(element));
        }
        if let SectionOutcome::Failed { reason } = &section.outcome {
            output.push_str(&format!("\n(section unavailable: {reason})"));
        }
        output
    }
}

impl Formatter for TerminalFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Terminal
    }

    fn format_progress(&self, view: &ProgressView) -> String {
        let mut output = format!(
            "{}\n{} {:.0}%",
            view.title,
            text_bar(view.percent),
            view.percent
        );
        for (step, state) in view.steps.iter() {
            output.push_str(&format!("\n  {} {}", state.icon(), step.label()));
        }
        output.push_str(&format!("\nTip: {}", view.tip));
        output
    }

    fn format_results(&self, view: &ResultsView) -> String {
        view.sections
            .iter()
            .map(Self::format_section)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_entry(&self, entry: &TranscriptEntry) -> String {
        let speaker = match entry.role {
            Role::User => "You",
            Role::Bot => "Analyst",
        };
        let mut output = format!("{speaker}: {}", entry.text);
        for source in &entry.sources {
            output.push_str(&format!("\n  source: {source}"));
        }
        output
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }
}

/// GitHub-flavoured markdown
pub struct MarkdownFormatter;

impl MarkdownFormatter {
    fn format_element(element: &Element) -> String {
        match element {
            Element::Title { text } => format!("# {text}"),
            Element::Badge { label, category } => {
                format!("{} **{label}**", emoji_marker(category.tone()))
            }
            Element::Field {
                label,
                value,
                tone: None,
            } => format!("- **{label}:** {value}"),
            Element::Field {
                label,
                value,
                tone: Some(tone),
            } => format!("- {} **{label}:** {value}", emoji_marker(*tone)),
            Element::Bar {
                label,
                percent,
                tone,
            } => format!("- {} **{label}:** {percent:.0}%", emoji_marker(*tone)),
            Element::List {
                label,
                items,
                placeholder,
            } => {
                let mut output = format!("**{label}**\n");
                if items.is_empty() {
                    output.push_str(&format!(
                        "\n_{}_",
                        placeholder.as_deref().unwrap_or("None")
                    ));
                }
                for item in items {
                    output.push_str(&format!("\n- {item}"));
                }
                output
            }
            Element::Text { label, text } => format!("**{label}**\n\n{text}"),
            Element::Table { headers, rows } => {
                render_table(presets::ASCII_MARKDOWN, headers, rows, |cell, highlighted| {
                    if highlighted {
                        Cell::new(format!("**{cell}**"))
                    } else {
                        Cell::new(cell)
                    }
                })
            }
        }
    }

    fn format_section(section: &Section) -> String {
        let mut output = format!("## {}", section.kind);
        for element in &section.elements {
            output.push_str("\n\n");
            output.push_str(&Self::format_element(element));
        }
        if let SectionOutcome::Failed { reason } = &section.outcome {
            output.push_str(&format!("\n\n> Section unavailable: {reason}"));
        }
        output
    }
}

impl Formatter for MarkdownFormatter {
    fn output_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }

    fn format_progress(&self, view: &ProgressView) -> String {
        let mut output = format!("### {}\n\n{:.0}% complete\n", view.title, view.percent);
        for (step, state) in view.steps.iter() {
            let mark = if state == StepState::Completed { "x" } else { " " };
            output.push_str(&format!("\n- [{mark}] {}", step.label()));
            match state {
                StepState::Active => output.push_str(" _(running)_"),
                StepState::Error => output.push_str(" _(failed)_"),
                StepState::Pending | StepState::Completed => {}
            }
        }
        output.push_str(&format!("\n\n> {}", view.tip));
        output
    }

    fn format_results(&self, view: &ResultsView) -> String {
        view.sections
            .iter()
            .map(Self::format_section)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn format_entry(&self, entry: &TranscriptEntry) -> String {
        let speaker = match entry.role {
            Role::User => "You",
            Role::Bot => "Analyst",
        };
        let mut output = format!("**{speaker}:** {}", entry.text);
        for source in &entry.sources {
            output.push_str(&format!("\n> {source}"));
        }
        output
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ **Error:** {error}")
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Terminal => Box::new(TerminalFormatter),
            OutputFormat::Markdown => Box::new(MarkdownFormatter),
        }
    }
}

fn text_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "▲",
        Tone::Negative => "▼",
        Tone::Neutral => "•",
    }
}

fn emoji_marker(tone: Tone) -> &'static str {
    match tone {
        Tone::Positive => "🟢",
        Tone::Negative => "🔴",
        Tone::Neutral => "⚪",
    }
}

/// `[#####-----]` style bar for a 0..=100 percentage
fn text_bar(percent: f64) -> String {
    let filled = ((percent.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    )
}

fn render_table<F>(preset: &str, headers: &[String], rows: &[TableRow], cell: F) -> String
where
    F: Fn(&str, bool) -> Cell,
{
    let mut table = Table::new();
    table.load_preset(preset).set_header(headers);
    for row in rows {
        table.add_row(
            row.cells
                .iter()
                .map(|value| cell(value, row.highlighted))
                .collect::<Vec<_>>(),
        );
    }
    table.to_string()
}
