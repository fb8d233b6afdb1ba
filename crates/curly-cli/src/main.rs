use std::io::{Read, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use curly_core::{CurlyQuotes, KeyEvent, MemorySurface, SubstitutionStats};
use miette::{IntoDiagnostic, Result, WrapErr};

mod config;

#[derive(Parser)]
#[command(version, about = "Curly - replace straight quotes with typographic ones", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// HTML files to rewrite. Reads standard input when none are given
    files: Vec<PathBuf>,

    /// Write results back to the files instead of standard output
    #[arg(short, long, requires = "files")]
    in_place: bool,

    /// Treat input as plain text rather than HTML
    #[arg(long)]
    text: bool,

    /// Report substitution counts on standard error
    #[arg(long)]
    stats: bool,

    /// Path to config file
    #[arg(long, env = "CURLY_CONFIG")]
    config: Option<PathBuf>,

    /// More logging (-v debug, -vv trace). RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay TEXT as keypresses into an empty editor and print the result
    Type {
        /// Characters to type
        text: String,
    },
}

fn main() -> Result<()> {
    init_miette();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = config::load(cli.config.as_deref())?;
    let plugin = CurlyQuotes::new(options);

    match cli.command {
        Some(Commands::Type { text }) => {
            println!("{}", type_text(&plugin, &text));
            Ok(())
        }
        None => {
            let mode = Mode {
                text: cli.text,
                stats: cli.stats,
            };
            if cli.files.is_empty() {
                rewrite_stdin(&plugin, mode)
            } else {
                rewrite_files(&plugin, &cli.files, cli.in_place, mode)
            }
        }
    }
}

#[derive(Clone, Copy)]
struct Mode {
    text: bool,
    stats: bool,
}

fn rewrite_stdin(plugin: &CurlyQuotes, mode: Mode) -> Result<()> {
    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input).into_diagnostic()?;

    let (output, stats) = rewrite(plugin, &input, mode.text);
    std::io::stdout()
        .write_all(output.as_bytes())
        .into_diagnostic()?;

    if mode.stats {
        report("<stdin>", &stats);
    }
    Ok(())
}

fn rewrite_files(
    plugin: &CurlyQuotes,
    files: &[PathBuf],
    in_place: bool,
    mode: Mode,
) -> Result<()> {
    let mut total = SubstitutionStats::default();
    let mut stdout = std::io::stdout().lock();

    for path in files {
        let input = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let (output, stats) = rewrite(plugin, &input, mode.text);

        if in_place {
            if output != input {
                std::fs::write(path, &output)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            }
        } else {
            stdout.write_all(output.as_bytes()).into_diagnostic()?;
        }

        tracing::debug!(path = %path.display(), replaced = stats.replaced, "rewrote file");
        if mode.stats {
            report(&path.display().to_string(), &stats);
        }
        total += stats;
    }

    if mode.stats && files.len() > 1 {
        report("total", &total);
    }
    Ok(())
}

fn rewrite(plugin: &CurlyQuotes, input: &str, text: bool) -> (String, SubstitutionStats) {
    let bulk = plugin.bulk();
    if text {
        let stats = SubstitutionStats {
            text_nodes: 1,
            skipped_nodes: 0,
            replaced: input.chars().filter(|c| plugin.table().contains(*c)).count(),
        };
        (bulk.substitute_text(input), stats)
    } else {
        bulk.substitute_with_stats(input)
    }
}

/// Type `text` one key at a time, letting the interceptor claim quote keys.
fn type_text(plugin: &CurlyQuotes, text: &str) -> String {
    let live = plugin.live();
    let mut surface = MemorySurface::default();
    let mut buf = [0u8; 4];

    for ch in text.chars() {
        let mut event = KeyEvent::from_char(ch);
        live.handle_keypress(&mut event, &mut surface);
        if !event.default_prevented() {
            surface.type_plain(ch.encode_utf8(&mut buf));
        }
    }

    surface.content()
}

fn report(label: &str, stats: &SubstitutionStats) {
    eprintln!(
        "{label}: {} quotes replaced in {} text nodes ({} skipped)",
        stats.replaced, stats.text_nodes, stats.skipped_nodes
    );
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn init_miette() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .expect("couldn't set the miette hook");
    miette::set_panic_hook();
}
