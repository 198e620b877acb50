//! unquiz CLI - exam question extraction tool

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;

use unquiz::output::{DEFAULT_OUTPUT_DIR, QUESTIONS_FILE, REPORT_FILE};
use unquiz::structure::DEFAULT_MAX_GAP;
use unquiz::{
    Extraction, NumberingPolicy, PageSource, PdfDecoder, QuestionStats, Section,
    Unquiz,
};

/// Input used when no file is given.
const DEFAULT_INPUT: &str = "sample.pdf";

/// Number of questions shown in the closing summary.
const SAMPLE_QUESTIONS: usize = 3;

#[derive(Parser)]
#[command(name = "unquiz")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Extract multiple-choice questions and images from exam PDFs", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    structure: StructureArgs,

    /// Write compact JSON
    #[arg(long, global = true)]
    compact: bool,

    /// Replace unreadable pages with empty ones instead of failing
    #[arg(long, global = true)]
    lenient: bool,

    /// Suppress per-page progress
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Args, Clone, Copy)]
struct StructureArgs {
    /// How question numbers are recognized
    #[arg(long, value_enum, default_value = "increasing", global = true)]
    policy: Policy,

    /// Largest jump between consecutive question numbers
    #[arg(long, default_value_t = DEFAULT_MAX_GAP, global = true)]
    max_gap: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract questions, images and reports (default)
    Extract {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Show section and answer statistics
    Stats {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Policy {
    /// Numbers must increase by at most --max-gap
    Increasing,
    /// Every `N.` or `N)` at a line start opens a question
    Any,
}

impl StructureArgs {
    fn numbering(&self) -> NumberingPolicy {
        match self.policy {
            Policy::Increasing => NumberingPolicy::Increasing {
                max_gap: self.max_gap,
            },
            Policy::Any => NumberingPolicy::Any,
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let mut builder = Unquiz::new().with_numbering(cli.structure.numbering());
    if cli.compact {
        builder = builder.compact();
    }
    if cli.lenient {
        builder = builder.lenient();
    }

    let result = match cli.command {
        Some(Commands::Extract { input, output }) => {
            cmd_extract(&builder, &input, output.as_deref(), cli.quiet)
        }
        Some(Commands::Stats { input, json }) => cmd_stats(&builder, &input, json),
        Some(Commands::Info { input }) => cmd_info(&builder, &input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            let input = cli.input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT));
            cmd_extract(&builder, &input, cli.output.as_deref(), cli.quiet)
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_extract(
    builder: &Unquiz,
    input: &Path,
    output: Option<&Path>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

    let mut extraction = builder.extract_with_progress(input, |record| {
        if !quiet {
            println!("Processing page {}...", record.page_number);
        }
    })?;
    builder.write(&mut extraction, &output_dir)?;

    for notice in &extraction.notices {
        log::debug!("{}", notice);
    }

    print_summary(&extraction, &output_dir);
    Ok(())
}

fn print_summary(extraction: &Extraction, output_dir: &Path) {
    let summary = extraction.summary();

    println!("\n{}", "Extraction complete!".green().bold());
    println!("  {}: {}", "Pages processed".bold(), summary.pages_processed);
    println!(
        "  {}: {}",
        "Images extracted".bold(),
        summary.total_images_extracted
    );
    println!(
        "  {}: {}",
        "Questions found".bold(),
        summary.total_questions_found
    );
    if !extraction.notices.is_empty() {
        println!(
            "  {}: {} {}",
            "Notices".bold(),
            extraction.notices.len(),
            "(RUST_LOG=debug to list)".dimmed()
        );
    }

    println!("\n{} {}", "Output files in".green().bold(), output_dir.display());
    println!("  {} {}", "├─".dimmed(), QUESTIONS_FILE);
    println!("  {} {}", "├─".dimmed(), REPORT_FILE);
    println!("  {} images/", "└─".dimmed());

    if extraction.questions.is_empty() {
        return;
    }

    println!("\n{}", "Sample questions".cyan().bold());
    for question in extraction.questions.iter().take(SAMPLE_QUESTIONS) {
        println!(
            "\n{} {}",
            format!("Q{}:", question.number).bold(),
            question.text
        );
        for option in &question.options {
            println!("   {}", option);
        }
        match question.answer {
            Some(answer) => println!("   {} {}", "Answer:".green(), answer),
            None => println!("   {}", "Answer: not found".yellow()),
        }
        if let Some(image) = &question.question_image {
            println!("   {} {}", "Image:".dimmed(), image);
        }
    }
}

fn cmd_stats(
    builder: &Unquiz,
    input: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let extraction = builder.extract(input)?;
    let stats = QuestionStats::compute(&extraction.questions);

    if json {
        let format = builder.output_options().format;
        println!("{}", unquiz::output::to_json(&stats, format)?);
        return Ok(());
    }

    println!("{}", "Question Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    println!("{}: {}", "Total questions".bold(), stats.total_questions);
    for section in Section::ALL {
        println!("{}: {}", section.to_string().bold(), stats.section_count(section));
    }
    println!(
        "{}: {}",
        "Questions with images".bold(),
        stats.questions_with_images
    );

    println!();
    println!("{}", "Answer Distribution".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());
    for (answer, count) in &stats.answer_distribution {
        let label = if answer.is_empty() { "none" } else { answer };
        println!("  {}: {} questions", label.bold(), count);
    }

    Ok(())
}

fn cmd_info(builder: &Unquiz, input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let decoder = PdfDecoder::open_with_options(input, builder.decode_options().clone())?;
    let pages = decoder.pages()?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Format".bold(), decoder.header());
    println!("{}: {}", "Pages".bold(), decoder.page_count());

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let words: usize = pages
        .iter()
        .map(|p| p.raw_text.split_whitespace().count())
        .sum();
    let images: usize = pages.iter().map(|p| p.raw_images.len()).sum();
    println!("{}: {}", "Words".bold(), words);
    println!("{}: {}", "Images".bold(), images);

    for page in &pages {
        println!(
            "  {} page {}: {} lines, {} images",
            "├─".dimmed(),
            page.page_index,
            page.raw_text.lines().count(),
            page.raw_images.len()
        );
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "unquiz".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Exam question extraction tool");
    println!();
    println!("License: MIT");
}
