use anyhow::{Context, Result};
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};
use passbrew::scorer::ScorerConfig;
use passbrew::session::SessionOutcome;
use std::path::Path;
use std::time::Duration;

pub struct DisplayOptions {
    pub unicode_support: bool,
    pub color_support: bool,
    pub quiet: bool,
}

pub fn detect_unicode_support() -> bool {
    supports_unicode::on(supports_unicode::Stream::Stdout)
}

pub fn detect_color_support() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

pub fn get_status_symbols(unicode_support: bool) -> (&'static str, &'static str) {
    if unicode_support { ("✓", "!") } else { ("+", "!") }
}

pub fn make_progress_bar(total: usize, unicode_support: bool) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    if unicode_support {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} Brewing [{pos}/{len}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&[
                    "⠁", "⠂", "⠄", "⡀", "⡈", "⡐", "⡠", "⣀", "⣁", "⣂", "⣄", "⣌", "⣔", "⣤", "⣥", "⣦",
                    "⣮", "⣶", "⣷", "⣿", "⡿", "⠿", "⢟", "⠟", "⡛", "⠛", "⠫", "⢋", "⠋", "⠍", "⡉", "⠉",
                    "⠑", "⠡", "⢁", "⠁",
                ]),
        );
    } else {
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner} Brewing [{pos}/{len}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("-\\|/-"),
        );
    }

    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

pub fn display_outcome(
    index: usize,
    outcome: &SessionOutcome,
    config: &ScorerConfig,
    options: &DisplayOptions,
) {
    if options.quiet {
        println!("{}", outcome.candidate.text());
        return;
    }

    let (check_ok, check_warn) = get_status_symbols(options.unicode_support);
    let strong = !outcome.low_confidence;

    let entropy_style = if options.color_support {
        if strong {
            Style::new().green()
        } else {
            Style::new().yellow()
        }
    } else {
        Style::new()
    };

    let status_icon = if strong { check_ok } else { check_warn };
    let status_text = if strong { "Strong" } else { "Low confidence" };

    println!("Out[{}]:\n{}\n", index, outcome.candidate.text());

    println!(
        "  ├─ Entropy    {} {} bits (threshold {:.0})",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(format!("{:.1}", outcome.report.entropy_bits)),
        config.min_entropy_bits
    );

    let length = outcome.candidate.text().chars().count();
    println!(
        "  ├─ Length     {} {}",
        length,
        if length == 1 { "char" } else { "chars" }
    );

    if outcome.low_confidence {
        println!(
            "  ├─ Attempts   {} (retry cap reached, best seen returned)",
            outcome.attempts
        );
    } else {
        println!("  ├─ Attempts   {}", outcome.attempts);
    }

    if outcome.report.penalties.is_empty() {
        println!("  └─ Patterns   none");
    } else {
        let names: Vec<&str> = outcome
            .report
            .penalties
            .iter()
            .map(|p| p.pattern)
            .collect();
        println!(
            "  └─ Patterns   {} (severity {:.1})",
            names.join(", "),
            outcome.report.total_severity()
        );
    }

    println!(
        "\n{} Security: {}\n",
        entropy_style.apply_to(format!("[{}]", status_icon)),
        entropy_style.apply_to(status_text)
    );
}

pub fn display_summary(count: usize, elapsed: Duration, options: &DisplayOptions) {
    if options.quiet {
        return;
    }
    println!(
        "Generated {} {} in {:.2}s",
        count,
        if count == 1 { "password" } else { "passwords" },
        elapsed.as_secs_f64()
    );
}

/// Writes one password per line.
pub fn write_output_file(path: &Path, outcomes: &[SessionOutcome]) -> Result<()> {
    let lines: Vec<&str> = outcomes.iter().map(|o| o.candidate.text()).collect();
    std::fs::write(path, lines.join("\n") + "\n")
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_status_symbols_unicode() {
        let (ok, warn) = get_status_symbols(true);
        assert_eq!(ok, "✓");
        assert_eq!(warn, "!");
    }

    #[test]
    fn test_get_status_symbols_ascii() {
        let (ok, warn) = get_status_symbols(false);
        assert_eq!(ok, "+");
        assert_eq!(warn, "!");
    }
}
