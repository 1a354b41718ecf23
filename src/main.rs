use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use is_terminal::IsTerminal;

use logsieve::{EntryWriter, JsonWriter, Reader, TextWriter};

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Parser)]
#[command(name = "logsieve")]
#[command(about = "Parse, filter and re-render structured log lines")]
#[command(version)]
struct Args {
    /// Read pattern applied to each input line (default: syslog-like layout)
    #[arg(short = 'i', long = "input", default_value = "", value_name = "PATTERN")]
    input: String,

    /// Write pattern used to render accepted entries
    #[arg(short = 'o', long = "output", default_value = "", value_name = "PATTERN")]
    output: String,

    /// Filter expression; only matching entries are kept
    #[arg(short = 'f', long = "filter", default_value = "", value_name = "EXPR")]
    filter: String,

    /// Render entries as JSON instead of text
    #[arg(short = 'j', long)]
    json: bool,

    /// One JSON object per line instead of pretty-printed
    #[arg(long, requires = "json")]
    compact: bool,

    /// When to emit ANSI colors from the write pattern
    #[arg(long, value_enum, default_value = "auto")]
    color: ColorChoice,

    /// Output file (default: stdout)
    #[arg(long = "output-file", value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Input files (default: stdin)
    files: Vec<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let use_colors = match args.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => args.output_file.is_none() && io::stdout().is_terminal(),
    };
    let sink: Box<dyn Write> = match &args.output_file {
        Some(path) => Box::new(File::create(path).with_context(|| {
            format!("failed to create output file '{}'", path.display())
        })?),
        None => Box::new(io::stdout().lock()),
    };
    let mut writer: Box<dyn EntryWriter> = if args.json {
        Box::new(JsonWriter::new(sink, args.compact))
    } else {
        Box::new(
            TextWriter::with_colors(sink, &args.output, use_colors)
                .context("invalid write pattern")?,
        )
    };

    if args.files.is_empty() {
        process(io::stdin().lock(), &args, writer.as_mut())?;
    } else {
        for path in &args.files {
            let file = File::open(path)
                .with_context(|| format!("failed to open input file '{}'", path.display()))?;
            process(BufReader::new(file), &args, writer.as_mut())?;
        }
    }
    Ok(())
}

fn process<R: BufRead>(
    input: R,
    args: &Args,
    writer: &mut dyn EntryWriter,
) -> anyhow::Result<()> {
    let mut reader =
        Reader::new(input, &args.input, &args.filter).context("invalid read pattern or filter")?;
    while let Some(entry) = reader.read()? {
        writer.write(&entry)?;
    }
    Ok(())
}
