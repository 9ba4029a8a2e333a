// gffiter: Streaming hierarchical parser and printer for GFF/GTF annotations.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//
use std::fs::File;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use flate2::read::MultiGzDecoder;

use gffiter::Format;
use gffiter::Unrecognized;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

/// Maps the number of `--verbose` flags to a stderrlog verbosity.
///
/// Warnings are always shown, one flag adds info and two or more add debug.
fn log_level(verbose: u8) -> usize {
    1 + usize::from(verbose.min(2))
}

/// Opens `path` for reading, decompressing it if the name ends in .gz.
fn open_input(
    path: &Path,
) -> Result<Box<dyn Read>, E> {
    let file = File::open(path)?;
    match path.extension().and_then(|x| x.to_str()) {
        Some("gz") | Some("bgz") => Ok(Box::new(MultiGzDecoder::new(file))),
        _ => Ok(Box::new(file)),
    }
}

fn convert(
    input_files: &[PathBuf],
    out_file: &Option<PathBuf>,
    format: &str,
    unrecognized: &str,
) -> Result<(), E> {
    let format: Format = format.parse()?;
    let unrecognized: Unrecognized = unrecognized.parse()?;

    let conn_out: Box<dyn Write> = match out_file {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };
    let mut conn_out = BufWriter::new(conn_out);

    let mut conns_in: Vec<(String, Box<dyn Read>)> = Vec::with_capacity(input_files.len());
    for file in input_files {
        let conn_in = open_input(file).map_err(|err| format!("{}: {}", file.display(), err))?;
        conns_in.push((file.display().to_string(), conn_in));
    }
    gffiter::convert_from_reads_to_write(&mut conns_in, format, unrecognized, &mut conn_out)?;

    conn_out.flush()?;
    Ok(())
}

fn main() {
    let cli = cli::Cli::parse();

    // Subcommands:
    let res = match &cli.command {
        // Convert
        Some(cli::Commands::Convert {
            input_files,
            out_file,
            format,
            unrecognized,
            verbose,
        }) => {
            init_log(log_level(*verbose));
            convert(input_files, out_file, format, unrecognized)
        },
        None => {
            eprintln!("No subcommand given, see `gffiter --help`");
            std::process::exit(2);
        },
    };

    if let Err(err) = res {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn verbose_flags_reach_debug() {
        use super::log_level;

        assert_eq!(log_level(0), 1);
        assert_eq!(log_level(1), 2);
        assert_eq!(log_level(2), 3);
        assert_eq!(log_level(5), 3);
    }
}
