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
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    // Reformat or summarize GFF/GTF files
    Convert {
        // Input GFF/GTF file(s), optionally gzipped
        #[arg(group = "input", required = true, help = "Input file(s)")]
        input_files: Vec<PathBuf>,

        // Output file path, defaults to stdout
        #[arg(short = 'o', long = "output", required = false)]
        out_file: Option<PathBuf>,

        // Output format, defaults to GTF
        #[arg(long = "format", default_value = "gtf", help = "Output format (gtf, summary)")]
        format: String,

        // Lines with a feature kind other than gene, transcript, exon, or CDS
        #[arg(long = "unrecognized", default_value = "error", help = "Unrecognized feature kinds (error, skip)")]
        unrecognized: String,

        // Verbosity, repeat for debug messages
        #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
        verbose: u8,
    },
}
