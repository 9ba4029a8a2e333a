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

//! Printer for outputting [Feature] trees as plain text in any supported [Format].
//!
//! Can be used to convert any iterator over [Feature] roots to their plain
//! text representation.
//!
//! Returns 1 root with all of its descendants at a time using next().
//!
//! If the desired output format has a header line, it is included at the
//! start of the first returned item unless turned off with
//! [with_header](Printer::with_header). It can also be formatted on its own
//! with [print_header](Printer::print_header).
//!
//! ## Usage
//!
//! ### Reformat GTF data
//!
//! ```rust
//! use gffiter::Format;
//! use gffiter::parser::Parser;
//! use gffiter::printer::Printer;
//! use std::io::Cursor;
//!
//! let mut input: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
//! input.append(&mut b"chr1\tsrc\texon\t1\t50\t.\t+\t.\tgene_id \"G1\"; level 2;\n".to_vec());
//!
//! let mut cursor = Cursor::new(input.clone());
//! let mut roots = Parser::new(&mut cursor).map(|x| x.unwrap());
//! let mut printer = Printer::new(&mut roots, Format::Gtf);
//!
//! let mut output: Vec<u8> = Vec::new();
//! for mut bytes in printer.by_ref() {
//!     output.append(&mut bytes);
//! }
//!
//! assert_eq!(output, input);
//! ```
//!
//! ### Summarize feature trees
//!
//! ```rust
//! use gffiter::Format;
//! use gffiter::parser::Parser;
//! use gffiter::printer::Printer;
//! use std::io::Cursor;
//!
//! let mut input: Vec<u8> = b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec();
//! input.append(&mut b"chr1\tsrc\texon\t1\t50\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
//!
//! let mut cursor = Cursor::new(input);
//! let mut roots = Parser::new(&mut cursor).map(|x| x.unwrap());
//! let printer = Printer::new(&mut roots, Format::Summary);
//!
//! let output: Vec<u8> = printer.flatten().collect();
//!
//! let mut expected: Vec<u8> = b"kind\tseqname\tstart\tend\tstrand\tid\ttranscripts\texons\tcds\n".to_vec();
//! expected.append(&mut b"gene\tchr1\t1\t100\t+\tG1\t0\t1\t0\n".to_vec());
//!
//! assert_eq!(output, expected);
//! ```
//!

use crate::Format;
use crate::feature::Feature;

use gtf::format_gtf_feature;
use summary::format_summary_header;
use summary::format_summary_line;

// Format specific implementations
pub mod gtf;
pub mod summary;

type E = Box<dyn std::error::Error>;

pub struct Printer<'a, I: Iterator> where I: Iterator<Item=Feature> {
    // Inputs
    records: &'a mut I,

    header_done: bool,
    index: usize,
    pub format: Format,
}

impl<'a, I: Iterator> Printer<'a, I> where I: Iterator<Item=Feature> {
    pub fn new(
        records: &'a mut I,
        format: Format,
    ) -> Self {
        Printer{
            records,
            header_done: false,
            index: 0,
            format,
        }
    }

    /// Set whether the header line, if the format has one, is printed.
    ///
    /// Turn this off when appending to output that already has a header.
    pub fn with_header(
        mut self,
        header: bool,
    ) -> Self {
        self.header_done = !header;
        self
    }

    /// Number of roots printed so far.
    pub fn n_printed(
        &self,
    ) -> usize {
        self.index
    }
}

impl<'a, I: Iterator> Printer<'a, I> where I: Iterator<Item=Feature> {
    pub fn print_header(
        &self,
    ) -> Result<Option<Vec<u8>>, E> {
        let mut out: Vec<u8> = Vec::new();
        match self.format {
            Format::Gtf => Ok(None),
            Format::Summary => {
                format_summary_header(&mut out)?;
                Ok(Some(out))
            },
        }
    }

    /// Format the next root, returning errors instead of panicking.
    pub fn try_next(
        &mut self,
    ) -> Result<Option<Vec<u8>>, E> {
        let mut out: Vec<u8> = Vec::new();
        if !self.header_done {
            self.header_done = true;
            if let Some(mut header) = self.print_header()? {
                out.append(&mut header);
            }
        }

        if let Some(record) = self.records.next() {
            match self.format {
                Format::Gtf => format_gtf_feature(&record, &mut out)?,
                Format::Summary => format_summary_line(&record, &mut out)?,
            }
            self.index += 1;
            Ok(Some(out))
        } else if !out.is_empty() {
            // Header only
            Ok(Some(out))
        } else {
            Ok(None)
        }
    }
}

impl<'a, I: Iterator> Iterator for Printer<'a, I> where I: Iterator<Item=Feature> {
    type Item = Vec<u8>;

    fn next(
        &mut self,
    ) -> Option<Vec<u8>> {
        match self.try_next() {
            Ok(out) => out,
            Err(err) => {
                log::error!("Failed to format feature: {}", err);
                None
            },
        }
    }

}
