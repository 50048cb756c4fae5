use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use serde_json::Value as JsonValue;
use stash_core::core_api::{CoreError, Engine, Session};
use stash_core::{CodecOptions, Fidelity, TextEncoding};
use stash_render::{
    RenderOptions, render_item_list, render_item_sheet, render_item_stats_json, render_json,
};
use tracing_subscriber::EnvFilter;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EncodingArg {
    Ascii,
    Utf8,
    Windows1252,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct StatEdit {
    item: usize,
    stat: String,
    value: String,
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(value_name = "PLAYER.STASH")]
    path: PathBuf,
    /// Include items past the declared stash size.
    #[arg(long)]
    all: bool,
    /// Show the stats of item N (numbered from 1).
    #[arg(long, value_name = "N")]
    item: Option<usize>,
    #[arg(long)]
    json: bool,
    /// Set a stat value, e.g. `--set 1:dmg=250`.
    #[arg(long = "set", value_name = "ITEM:STAT=VALUE", value_parser = parse_stat_edit)]
    set: Vec<StatEdit>,
    #[arg(long = "set-size", value_name = "N")]
    set_size: Option<usize>,
    /// Write edits here instead of saving in place with a backup.
    #[arg(long)]
    output: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = EncodingArg::Ascii)]
    encoding: EncodingArg,
    /// Reproduce the legacy editor's output exactly.
    #[arg(long)]
    legacy: bool,
    /// Re-encode without edits and report whether the result is identical.
    #[arg(long, conflicts_with_all = ["set", "set_size", "output"])]
    check: bool,
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let has_edits = !cli.set.is_empty() || cli.set_size.is_some();
    if !has_edits && cli.output.is_some() {
        eprintln!("--output requires at least one --set or --set-size flag");
        process::exit(2);
    }

    let options = CodecOptions {
        encoding: to_core_encoding(cli.encoding),
        fidelity: if cli.legacy {
            Fidelity::Legacy
        } else {
            Fidelity::Lossless
        },
    };

    tracing::debug!(path = %cli.path.display(), ?options, "opening stash");
    let bytes = fs::read(&cli.path).unwrap_or_else(|e| {
        eprintln!("Error reading {}: {e}", cli.path.display());
        process::exit(1);
    });

    let mut session = Engine::with_options(options)
        .open_bytes(&bytes)
        .unwrap_or_else(|e| {
            eprintln!("Error parsing stash file: {}", cli.path.display());
            eprintln!("  {}", e);
            process::exit(1);
        });

    if cli.check {
        process::exit(run_check(&session, &bytes));
    }

    for edit in &cli.set {
        session
            .set_stat_value(edit.item, &edit.stat, &edit.value)
            .unwrap_or_else(|e| exit_with("Error applying stat edit", &e));
    }
    if let Some(size) = cli.set_size {
        session.set_declared_size(size);
    }

    if has_edits {
        match &cli.output {
            Some(out_path) => {
                session
                    .write_to(out_path)
                    .unwrap_or_else(|e| exit_with("Error writing edited stash", &e));
                println!("Wrote edited stash to {}", out_path.display());
            }
            None => {
                let backup = session
                    .save_in_place(&cli.path)
                    .unwrap_or_else(|e| exit_with("Error saving stash", &e));
                println!("Saved {}", cli.path.display());
                if let Some(backup) = backup {
                    println!("Previous contents kept in {}", backup.display());
                }
            }
        }
        if !cli.json && cli.item.is_none() {
            return;
        }
    }

    let render_options = RenderOptions {
        include_stale: cli.all,
    };

    if cli.json {
        let json = match cli.item {
            Some(index) => render_item_stats_json(&session, index)
                .unwrap_or_else(|e| exit_with("Error reading item", &e)),
            None => render_json(&session, render_options),
        };
        print_json(&json);
        return;
    }

    if let Some(index) = cli.item {
        let sheet = render_item_sheet(&session, index)
            .unwrap_or_else(|e| exit_with("Error reading item", &e));
        print!("{sheet}");
        return;
    }

    print!("{}", render_item_list(&session, render_options));
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run_check(session: &Session, original: &[u8]) -> i32 {
    let emitted = session
        .to_bytes()
        .unwrap_or_else(|e| exit_with("Error re-encoding stash", &e));
    if emitted == original {
        println!("identical ({} bytes)", original.len());
        return 0;
    }

    match original.iter().zip(&emitted).position(|(a, b)| a != b) {
        Some(offset) => println!("differs at byte {offset}"),
        None => println!(
            "differs in length: original {}, re-encoded {}",
            original.len(),
            emitted.len()
        ),
    }
    1
}

fn print_json(json: &JsonValue) {
    let rendered = serde_json::to_string_pretty(json).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

fn exit_with(context: &str, error: &CoreError) -> ! {
    eprintln!("{context}: {error}");
    process::exit(if error.is_recoverable() { 2 } else { 1 });
}

fn parse_stat_edit(value: &str) -> Result<StatEdit, String> {
    let invalid = || format!("invalid edit {value:?}, expected ITEM:STAT=VALUE");
    let (item, rest) = value.split_once(':').ok_or_else(invalid)?;
    let (stat, new_value) = rest.split_once('=').ok_or_else(invalid)?;
    let item = item
        .trim()
        .parse::<usize>()
        .map_err(|_| format!("invalid item number {item:?} in {value:?}"))?;
    if stat.is_empty() {
        return Err(invalid());
    }
    Ok(StatEdit {
        item,
        stat: stat.to_string(),
        value: new_value.to_string(),
    })
}

fn to_core_encoding(encoding: EncodingArg) -> TextEncoding {
    match encoding {
        EncodingArg::Ascii => TextEncoding::Ascii,
        EncodingArg::Utf8 => TextEncoding::Utf8,
        EncodingArg::Windows1252 => TextEncoding::Windows1252,
    }
}
