mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use passbrew::{
    Dictionary, GenerationSession, LexicalVariator, OsEntropy, PatternRiskScorer, ScorerConfig,
    SessionConfig, StructureSpec, default_dictionary,
};
use std::path::PathBuf;
use std::time::Instant;

#[derive(Parser)]
#[command(
    name = "passbrew",
    version,
    about = "Memorable password generation with dictionary-driven variation and pattern-risk scoring"
)]
struct Cli {
    /// Dictionary file, one word per line (defaults to the embedded list)
    #[arg(short, long)]
    dictionary: Option<PathBuf>,

    /// Number of passwords to generate (1-1000)
    #[arg(short, long, default_value_t = 1)]
    count: usize,

    /// Slot structure, e.g. "word,sep,word,sep,digits:2,symbol"
    #[arg(short, long, default_value = "word,sep,word,sep,word,sep,digits:2,symbol")]
    structure: StructureSpec,

    /// Minimum entropy estimate in bits for acceptance
    #[arg(long, default_value_t = 50.0)]
    min_entropy: f64,

    /// Maximum total risk-pattern severity for acceptance
    #[arg(long, default_value_t = 0.0)]
    risk_budget: f64,

    /// Reject candidates shorter than this many characters
    #[arg(long, default_value_t = 8)]
    min_length: usize,

    /// Attempts per password before settling for the best seen
    #[arg(long, default_value_t = 50)]
    retries: usize,

    /// Write the generated passwords to a file, one per line
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print passwords only, no stats
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let options = ui::DisplayOptions {
        unicode_support: ui::detect_unicode_support(),
        color_support: ui::detect_color_support(),
        quiet: cli.quiet,
    };

    let dictionary = match &cli.dictionary {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read dictionary {}", path.display()))?;
            Dictionary::from_lines(raw.lines())
                .with_context(|| format!("Dictionary {} has no usable words", path.display()))?
        }
        None => default_dictionary(),
    };

    let variator = LexicalVariator::build(dictionary)?;
    let scorer_config = ScorerConfig {
        min_entropy_bits: cli.min_entropy,
        max_risk_budget: cli.risk_budget,
        min_length: cli.min_length,
        ..ScorerConfig::default()
    };
    let scorer = PatternRiskScorer::new(variator.dictionary(), scorer_config);
    let session_config = SessionConfig {
        retry_cap: cli.retries,
    };

    let count = cli.count.clamp(1, 1000);
    let progress = (!cli.quiet).then(|| ui::make_progress_bar(count, options.unicode_support));

    let start = Instant::now();
    let mut outcomes = Vec::with_capacity(count);
    for _ in 0..count {
        let entropy = OsEntropy::new()?;
        let mut session = GenerationSession::new(
            &cli.structure,
            &variator,
            &scorer,
            entropy,
            session_config,
        );
        outcomes.push(session.run()?);
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    let elapsed = start.elapsed();

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for (i, outcome) in outcomes.iter().enumerate() {
        ui::display_outcome(i + 1, outcome, &scorer_config, &options);
    }
    ui::display_summary(count, elapsed, &options);

    if let Some(path) = &cli.output {
        ui::write_output_file(path, &outcomes)?;
        if !cli.quiet {
            println!("Passwords saved to {}", path.display());
        }
    }

    Ok(())
}
