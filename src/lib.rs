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

//! gffiter is a library and a command-line client for:
//!
//!   - Parsing GFF/GTF (version 2) annotations into gene → transcript →
//!     exon/CDS trees while streaming through the input.
//!   - Writing the trees back out as GFF/GTF or as a per-tree summary table.
//!
//! Attribute values in column 9 are typed: quoted values are strings and
//! unquoted values are integers or floats when they parse as such. The
//! attribute order of each line is preserved when writing it back out.
//!
//! ## Usage
//!
//! ### Command line
//!
//! The gffiter CLI supports the following subcommands:
//!   - `gffiter convert` reformat GFF/GTF files or summarize their features.
//!
//! ### Rust API
//!
//! The API provides several functions for operating on structs that implement
//! [Read] and/or [Write]. These are meant for use cases where an entire stream
//! should be processed.
//!
//! For use cases requiring access to a single feature tree at a time, the
//! following structs are provided:
//!
//!   - [Parser](parser::Parser): takes a [Read] containing GFF/GTF lines and returns assembled [Feature](feature::Feature) trees.
//!   - [Assembler](parser::Assembler): same as Parser but takes an iterator over lines.
//!   - [Hierarchy](hierarchy::Hierarchy): assembles trees from features pushed one at a time.
//!   - [Printer](printer::Printer): takes an iterator over [Feature](feature::Feature) trees and formats them as plain text.
//!
//! Single lines can be handled with [parse_line](record::parse_line),
//! [make_feature](feature::make_feature) and
//! [render_record](record::render_record), and column 9 on its own with
//! [decode](attributes::decode) and [encode](attributes::encode).
//!
//! See documentation for the appropriate functions or structs for usage examples.
//!

use std::io::Read;
use std::io::Write;

use feature::Feature;
use parser::Parser;
use printer::Printer;

pub mod attributes;
pub mod feature;
pub mod hierarchy;
pub mod parser;
pub mod printer;
pub mod record;

type E = Box<dyn std::error::Error>;

/// Supported plain text output formats.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Gtf,
    Summary,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gtf" | "gff" => Ok(Format::Gtf),
            "summary" => Ok(Format::Summary),
            _ => Err(format!("'{}' is not a valid Format", s)),
        }
    }
}

/// What to do with lines whose feature kind is not gene, transcript, exon or CDS.
#[non_exhaustive]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Unrecognized {
    /// Return an [UnrecognizedFeatureKind](feature::UnrecognizedFeatureKind) error for the line.
    #[default]
    Error,
    /// Drop the line and log a warning.
    Skip,
}

impl std::str::FromStr for Unrecognized {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Unrecognized::Error),
            "skip" => Ok(Unrecognized::Skip),
            _ => Err(format!("'{}' is not a valid Unrecognized policy", s)),
        }
    }
}

/// Parse all feature trees from [Read] into memory.
///
/// ## Errors
///
/// Returns the first error encountered, see [Parser].
///
/// ## Usage
///
/// ```rust
/// use gffiter::{parse_from_read, Unrecognized};
/// use std::io::Cursor;
///
/// let mut input: Vec<u8> = b"chr1\tsrc\ttranscript\t1\t100\t.\t+\t.\ttranscript_id \"T1\";\n".to_vec();
/// input.append(&mut b"chr1\tsrc\texon\t1\t40\t.\t+\t.\ttranscript_id \"T1\";\n".to_vec());
/// input.append(&mut b"chr1\tsrc\tCDS\t10\t40\t.\t+\t0\ttranscript_id \"T1\";\n".to_vec());
/// input.append(&mut b"chr1\tsrc\tstop_codon\t41\t43\t.\t+\t0\ttranscript_id \"T1\";\n".to_vec());
///
/// let mut cursor = Cursor::new(input);
/// let features = parse_from_read(&mut cursor, Unrecognized::Skip).unwrap();
///
/// assert_eq!(features.len(), 1);
/// assert_eq!(features[0].exons().count(), 1);
/// assert_eq!(features[0].cds().count(), 1);
/// ```
///
pub fn parse_from_read<R: Read>(
    conn_in: &mut R,
    unrecognized: Unrecognized,
) -> Result<Vec<Feature>, E> {
    let parser = Parser::new(conn_in).with_unrecognized(unrecognized);
    let features = parser.collect::<Result<Vec<Feature>, E>>()?;
    Ok(features)
}

/// Write feature trees from memory to [Write] in `format`.
///
/// ## Usage
///
/// ```rust
/// use gffiter::{format_to_write, Format};
/// use gffiter::feature::make_feature;
/// use gffiter::record::parse_line;
///
/// let line = "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\"; gene_biotype lncRNA;";
/// let features = vec![make_feature(parse_line(line).unwrap()).unwrap()];
///
/// let mut output: Vec<u8> = Vec::new();
/// format_to_write(&features, Format::Gtf, &mut output).unwrap();
///
/// assert_eq!(output, b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\"; gene_biotype \"lncRNA\";\n".to_vec());
/// ```
///
pub fn format_to_write<W: Write>(
    features: &[Feature],
    format: Format,
    conn_out: &mut W,
) -> Result<(), E> {
    let mut iter = features.iter().cloned();
    let mut printer = Printer::new(&mut iter, format);
    while let Some(bytes) = printer.try_next()? {
        conn_out.write_all(&bytes)?;
    }
    conn_out.flush()?;
    Ok(())
}

/// Convert GFF/GTF data from [Read] to `format` in [Write].
///
/// Streams through the input so that only one feature tree is held in memory
/// at a time.
///
/// ## Errors
///
/// Stops at the first error from the parser and returns it with the number
/// of the line that caused it. Every feature tree completed before that line
/// has been written to `conn_out`.
///
/// ## Usage
///
/// ```rust
/// use gffiter::{convert_from_read_to_write, Format, Unrecognized};
/// use std::io::Cursor;
///
/// let mut input: Vec<u8> = b"##description: test\n".to_vec();
/// input.append(&mut b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
/// input.append(&mut b"chr1\tsrc\texon\t1\t40\t.\t+\t.\tgene_id \"G1\"; exon_number \"1\";\n".to_vec());
///
/// let mut cursor = Cursor::new(input);
/// let mut output: Vec<u8> = Vec::new();
/// convert_from_read_to_write(&mut cursor, Format::Gtf, Unrecognized::Error, &mut output).unwrap();
///
/// let mut expected: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
/// expected.append(&mut b"chr1\tsrc\texon\t1\t40\t.\t+\t.\tgene_id \"G1\"; exon_number \"1\";\n".to_vec());
///
/// assert_eq!(output, expected);
/// ```
///
pub fn convert_from_read_to_write<R: Read, W: Write>(
    conn_in: &mut R,
    format: Format,
    unrecognized: Unrecognized,
    conn_out: &mut W,
) -> Result<(), E> {
    write_roots(conn_in, format, unrecognized, true, conn_out)
}

/// Convert several named GFF/GTF inputs into a single output in `format`.
///
/// Inputs are converted one after another into `conn_out` as if they were a
/// single file: a header line, if `format` has one, is written only once.
/// Feature trees do not continue across inputs.
///
/// ## Errors
///
/// Stops at the first error and returns it prefixed with the name of the
/// input and the line number.
///
/// ## Usage
///
/// ```rust
/// use gffiter::{convert_from_reads_to_write, Format, Unrecognized};
/// use std::io::Cursor;
///
/// let first = Cursor::new(b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
/// let second = Cursor::new(b"chr2\tsrc\tgene\t1\t50\t.\t-\t.\tgene_id \"G2\";\n".to_vec());
/// let mut inputs = vec![("a.gtf".to_string(), first), ("b.gtf".to_string(), second)];
///
/// let mut output: Vec<u8> = Vec::new();
/// convert_from_reads_to_write(&mut inputs, Format::Summary, Unrecognized::Error, &mut output).unwrap();
///
/// let mut expected: Vec<u8> = b"kind\tseqname\tstart\tend\tstrand\tid\ttranscripts\texons\tcds\n".to_vec();
/// expected.append(&mut b"gene\tchr1\t1\t100\t+\tG1\t0\t0\t0\n".to_vec());
/// expected.append(&mut b"gene\tchr2\t1\t50\t-\tG2\t0\t0\t0\n".to_vec());
///
/// assert_eq!(output, expected);
/// ```
///
pub fn convert_from_reads_to_write<R: Read, W: Write>(
    conns_in: &mut [(String, R)],
    format: Format,
    unrecognized: Unrecognized,
    conn_out: &mut W,
) -> Result<(), E> {
    for (index, (name, conn_in)) in conns_in.iter_mut().enumerate() {
        log::info!("Reading {}", name);
        write_roots(conn_in, format.clone(), unrecognized.clone(), index == 0, conn_out)
            .map_err(|err| format!("{}: {}", name, err))?;
    }
    Ok(())
}

fn write_roots<R: Read, W: Write>(
    conn_in: &mut R,
    format: Format,
    unrecognized: Unrecognized,
    header: bool,
    conn_out: &mut W,
) -> Result<(), E> {
    let mut parser = Parser::new(conn_in).with_unrecognized(unrecognized);

    let mut failure: Option<E> = None;
    {
        let mut roots = parser.by_ref().map_while(|feature| match feature {
            Ok(feature) => Some(feature),
            Err(err) => {
                failure = Some(err);
                None
            },
        });
        let mut printer = Printer::new(&mut roots, format).with_header(header);
        while let Some(bytes) = printer.try_next()? {
            conn_out.write_all(&bytes)?;
        }
    }
    conn_out.flush()?;

    match failure {
        Some(err) => Err(format!("line {}: {}", parser.line_number(), err).into()),
        None => Ok(()),
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_from_str() {
        use super::Format;

        assert_eq!("gtf".parse::<Format>().unwrap(), Format::Gtf);
        assert_eq!("gff".parse::<Format>().unwrap(), Format::Gtf);
        assert_eq!("summary".parse::<Format>().unwrap(), Format::Summary);
        assert!("bed".parse::<Format>().is_err());
    }

    #[test]
    fn unrecognized_from_str() {
        use super::Unrecognized;

        assert_eq!("error".parse::<Unrecognized>().unwrap(), Unrecognized::Error);
        assert_eq!("skip".parse::<Unrecognized>().unwrap(), Unrecognized::Skip);
        assert!("ignore".parse::<Unrecognized>().is_err());
        assert_eq!(Unrecognized::default(), Unrecognized::Error);
    }

    #[test]
    fn parse_then_format_round_trip() {
        use super::{format_to_write, parse_from_read, Format, Unrecognized};
        use std::io::Cursor;

        let mut data: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
        data.append(&mut b"chr1\tsrc\ttranscript\t1\t100\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n".to_vec());
        data.append(&mut b"chr1\tsrc\texon\t1\t100\t0.5\t+\t.\tgene_id \"G1\"; transcript_id \"T1\"; exon_number 1;\n".to_vec());
        data.append(&mut b"chr2\tsrc\tgene\t1\t100\t.\t-\t.\tgene_id \"G2\";\n".to_vec());

        let mut cursor = Cursor::new(data.clone());
        let features = parse_from_read(&mut cursor, Unrecognized::Error).unwrap();

        let mut got: Vec<u8> = Vec::new();
        format_to_write(&features, Format::Gtf, &mut got).unwrap();

        assert_eq!(features.len(), 2);
        assert_eq!(got, data);
    }

    #[test]
    fn parse_from_read_stops_at_malformed_line() {
        use super::{parse_from_read, Unrecognized};
        use crate::record::MalformedRecord;
        use std::io::Cursor;

        let mut data: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
        data.append(&mut b"chr1\tsrc\tgene\t1\n".to_vec());

        let mut cursor = Cursor::new(data);
        let got = parse_from_read(&mut cursor, Unrecognized::Error);

        assert!(got.unwrap_err().downcast_ref::<MalformedRecord>().is_some());
    }

    #[test]
    fn convert_reports_line_of_error() {
        use super::{convert_from_read_to_write, Format, Unrecognized};
        use std::io::Cursor;

        let mut data: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
        data.append(&mut b"chr2\tsrc\tgene\t1\t100\t.\t-\t.\tgene_id \"G2\";\n".to_vec());
        data.append(&mut b"chr2\tsrc\tgene\tx\t100\t.\t-\t.\tgene_id \"G3\";\n".to_vec());

        let mut cursor = Cursor::new(data);
        let mut got: Vec<u8> = Vec::new();
        let err = convert_from_read_to_write(&mut cursor, Format::Gtf, Unrecognized::Error, &mut got).unwrap_err();

        assert!(err.to_string().starts_with("line 3: "));
        assert_eq!(got, b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
    }

    #[test]
    fn convert_to_summary() {
        use super::{convert_from_read_to_write, Format, Unrecognized};
        use std::io::Cursor;

        let mut data: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
        data.append(&mut b"chr1\tsrc\tfive_prime_utr\t1\t10\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
        data.append(&mut b"chr1\tsrc\texon\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());

        let mut cursor = Cursor::new(data);
        let mut got: Vec<u8> = Vec::new();
        convert_from_read_to_write(&mut cursor, Format::Summary, Unrecognized::Skip, &mut got).unwrap();

        let mut expected: Vec<u8> = b"kind\tseqname\tstart\tend\tstrand\tid\ttranscripts\texons\tcds\n".to_vec();
        expected.append(&mut b"gene\tchr1\t1\t100\t+\tG1\t0\t1\t0\n".to_vec());

        assert_eq!(got, expected);
    }

    #[test]
    fn convert_several_inputs_writes_one_header() {
        use super::{convert_from_reads_to_write, Format, Unrecognized};
        use std::io::Cursor;

        let first = Cursor::new(b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\nchr1\tsrc\texon\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
        let second = Cursor::new(b"#!genome-build test\nchr2\tsrc\tgene\t1\t50\t.\t-\t.\tgene_id \"G2\";\n".to_vec());
        let mut inputs = vec![("first.gtf".to_string(), first), ("second.gtf".to_string(), second)];

        let mut got: Vec<u8> = Vec::new();
        convert_from_reads_to_write(&mut inputs, Format::Summary, Unrecognized::Error, &mut got).unwrap();

        let got = String::from_utf8(got).unwrap();
        assert_eq!(got.matches("kind\tseqname").count(), 1);
        assert_eq!(got.lines().collect::<Vec<&str>>(), vec![
            "kind\tseqname\tstart\tend\tstrand\tid\ttranscripts\texons\tcds",
            "gene\tchr1\t1\t100\t+\tG1\t0\t1\t0",
            "gene\tchr2\t1\t50\t-\tG2\t0\t0\t0",
        ]);
    }

    #[test]
    fn convert_several_inputs_names_failing_input() {
        use super::{convert_from_reads_to_write, Format, Unrecognized};
        use std::io::Cursor;

        let first = Cursor::new(b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
        let second = Cursor::new(b"chr2\tsrc\tgene\n".to_vec());
        let mut inputs = vec![("first.gtf".to_string(), first), ("second.gtf".to_string(), second)];

        let mut got: Vec<u8> = Vec::new();
        let err = convert_from_reads_to_write(&mut inputs, Format::Gtf, Unrecognized::Error, &mut got).unwrap_err();

        assert!(err.to_string().starts_with("second.gtf: line 1: "));
        assert_eq!(got, b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
    }
}
