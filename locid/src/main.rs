//! # locid - Main Entry Point
//!
//! Supports three modes:
//! - **Listing** (`locid <BINARY>`): every tagged call site, one per line
//! - **Lookup** (`locid <BINARY> -- <ID>...`): resolve ids a program reported
//! - **Export** (`--export locations.json`): the decoded table as JSON
//!
//! The decoder's own diagnostics are tagged with `loc!`, so `locid` can list
//! its own call sites.

use anyhow::{Context, Result};
use clap::Parser;
use locid::cli::Args;
use locid::decode::{DecodeReport, LocationTable};
use locid::export::JsonExporter;
use locid::preflight::run_preflight_checks;
use locid_common::loc;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Exit codes
const EXIT_SUCCESS: i32 = 0;
const EXIT_ERROR: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_INCOMPLETE: i32 = 3;

fn main() {
    env_logger::init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            // Nothing more to report if stderr itself is gone
            let _ = e.print();
            std::process::exit(code);
        }
    };

    std::process::exit(match run(&args) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) if args.strict => EXIT_INCOMPLETE,
        Ok(false) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            EXIT_ERROR
        }
    });
}

/// Returns whether every requested entry decoded
fn run(args: &Args) -> Result<bool> {
    let binary = args
        .binary_path()
        .context("Missing required argument: BINARY or --program-binary")?;
    let config = args.decoder_config();
    debug!("[{}] {config:?}", loc!());

    run_preflight_checks(binary, &config, args.quiet)?;

    let table = LocationTable::load(binary, &config)
        .with_context(|| format!("Failed to decode {}", binary.display()))?;
    info!(
        "[{}] {} record slots, {}, anchor {}",
        loc!(),
        table.len(),
        table.layout(),
        table.anchor().map_or_else(|| "missing".to_string(), |a| format!("0x{a:x}"))
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let complete = if args.ids.is_empty() {
        let report = table.report();
        print_report(&mut out, &report, args)?;
        if let Some(ref export_path) = args.export {
            export_report(&table, report.clone(), binary, export_path)?;
            if !args.quiet {
                println!("saved: {}", export_path.display());
            }
        }
        report.is_complete()
    } else {
        print_lookups(&mut out, &table, &args.ids)?
    };

    debug!("[{}] done, complete={complete}", loc!());
    Ok(complete)
}

fn print_report(out: &mut impl Write, report: &DecodeReport, args: &Args) -> Result<()> {
    if !args.brief && !args.quiet {
        writeln!(out, "{} location ids", report.locations.len())?;
        writeln!(out, "{:>6}  {:>8}  Location", "Index", "Id")?;
    }

    for decoded in &report.locations {
        let location = &decoded.location;
        if args.brief {
            writeln!(out, "{}:{}::{}()", location.file, location.line, location.function)?;
        } else {
            let id = decoded.id.map_or_else(|| "-".to_string(), |id| id.to_string());
            writeln!(
                out,
                "{:>6}  {id:>8}  fn='{}', file='{}', line={}",
                decoded.index, location.function, location.file, location.line
            )?;
        }
    }

    for failure in &report.failures {
        eprintln!("warning: entry {}: {}", failure.index, failure.error);
    }
    Ok(())
}

fn print_lookups(out: &mut impl Write, table: &LocationTable, ids: &[i32]) -> Result<bool> {
    let mut complete = true;
    for &id in ids {
        match table.resolve(id) {
            Ok(location) => {
                writeln!(out, "{id}: {}:{}::{}()", location.file, location.line, location.function)?;
            }
            Err(e) => {
                eprintln!("error: id {id}: {e}");
                complete = false;
            }
        }
    }
    Ok(complete)
}

fn export_report(
    table: &LocationTable,
    report: DecodeReport,
    binary: &Path,
    export_path: &Path,
) -> Result<()> {
    let exporter =
        JsonExporter::new(binary.display().to_string(), table.layout(), table.anchor(), report);
    let file = File::create(export_path).context("Failed to create export file")?;
    exporter.export(BufWriter::new(file)).context("Failed to export locations")?;
    Ok(())
}
