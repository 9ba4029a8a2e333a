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

//! Pull-based parsers that return assembled [Feature] trees.
//!
//! [Parser] reads lines from anything that implements [Read] and
//! [Assembler] takes lines from any iterator. Both skip comment lines
//! (starting with `#`) and blank lines, and return one completed root
//! feature per call to next(). A root is only returned once the next
//! unrelated feature has been read or the input ends.
//!
//! Errors are returned in place of a feature. The line that caused the error
//! is consumed and the next call to next() continues from the following line.
//!
//! ## Usage
//!
//! ```rust
//! use gffiter::parser::Parser;
//! use std::io::Cursor;
//!
//! let mut input: Vec<u8> = b"#!genome-build GRCh38\n".to_vec();
//! input.append(&mut b"chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\n".to_vec());
//! input.append(&mut b"chr1\tsrc\texon\t1\t50\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";\n".to_vec());
//! input.append(&mut b"chr1\tsrc\tgene\t200\t300\t.\t-\t.\tgene_id \"G2\";\n".to_vec());
//!
//! let mut cursor = Cursor::new(input);
//! let parser = Parser::new(&mut cursor);
//!
//! let roots = parser.collect::<Result<Vec<_>, _>>().unwrap();
//!
//! assert_eq!(roots.len(), 2);
//! assert_eq!(roots[0].exons().count(), 1);
//! assert_eq!(roots[1].children().len(), 0);
//! ```
//!

use crate::Unrecognized;
use crate::feature::make_feature;
use crate::feature::Feature;
use crate::hierarchy::Hierarchy;
use crate::record::parse_line;

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;

type E = Box<dyn std::error::Error>;

/// Turn a single line into a [Feature]
///
/// Returns None for comment lines, blank lines, and lines with an
/// unrecognized feature kind when `unrecognized` is [Unrecognized::Skip].
///
pub fn read_feature(
    line: &str,
    unrecognized: &Unrecognized,
) -> Result<Option<Feature>, E> {
    if line.starts_with('#') {
        log::debug!("Skipping comment: {}", line.trim_end());
        return Ok(None)
    }
    if line.trim().is_empty() {
        log::debug!("Skipping blank line");
        return Ok(None)
    }

    let record = parse_line(line)?;
    match make_feature(record) {
        Ok(feature) => Ok(Some(feature)),
        Err(err) => match unrecognized {
            Unrecognized::Error => Err(Box::new(err)),
            Unrecognized::Skip => {
                log::warn!("Skipping line with {}", err);
                Ok(None)
            },
        },
    }
}

/// Shared state of [Parser] and [Assembler].
#[derive(Debug, Default)]
struct State {
    hierarchy: Hierarchy,
    unrecognized: Unrecognized,
    line_number: usize,
    finished: bool,
}

impl State {
    fn consume(
        &mut self,
        line: &str,
    ) -> Option<Result<Feature, E>> {
        self.line_number += 1;
        let feature = match read_feature(line, &self.unrecognized) {
            Ok(Some(feature)) => feature,
            Ok(None) => return None,
            Err(err) => return Some(Err(err)),
        };
        match self.hierarchy.push(feature) {
            Ok(Some(root)) => {
                log::debug!("Closed {} {}:{}-{} at line {}", root.kind(), root.chromosome(), root.start(), root.end(), self.line_number);
                Some(Ok(root))
            },
            Ok(None) => None,
            Err(err) => Some(Err(Box::new(err))),
        }
    }

    fn finish(
        &mut self,
    ) -> Option<Result<Feature, E>> {
        self.finished = true;
        self.hierarchy.finish().map_err(|err| -> E { Box::new(err) }).transpose()
    }
}

pub struct Parser<'a, R: Read> {
    reader: BufReader<&'a mut R>,
    buf: String,
    state: State,
}

impl<'a, R: Read> Parser<'a, R> {
    pub fn new(
        conn: &'a mut R,
    ) -> Self {
        Parser {
            reader: BufReader::new(conn),
            buf: String::new(),
            state: State::default(),
        }
    }

    /// Set what happens to lines with an unrecognized feature kind.
    pub fn with_unrecognized(
        mut self,
        unrecognized: Unrecognized,
    ) -> Self {
        self.state.unrecognized = unrecognized;
        self
    }
}

impl<R: Read> Parser<'_, R> {
    /// Number of lines consumed so far, including comments.
    pub fn line_number(
        &self,
    ) -> usize {
        self.state.line_number
    }
}

impl<R: Read> Iterator for Parser<'_, R> {
    type Item = Result<Feature, E>;

    fn next(
        &mut self,
    ) -> Option<Result<Feature, E>> {
        if self.state.finished {
            return None
        }
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return self.state.finish(),
                Ok(_) => {
                    if let Some(res) = self.state.consume(&self.buf) {
                        return Some(res)
                    }
                },
                Err(err) => {
                    self.state.line_number += 1;
                    return Some(Err(Box::new(err)))
                },
            }
        }
    }
}

pub struct Assembler<I> {
    lines: I,
    state: State,
}

impl<I, S> Assembler<I> where I: Iterator<Item = S>, S: AsRef<str> {
    pub fn new(
        lines: I,
    ) -> Self {
        Assembler {
            lines,
            state: State::default(),
        }
    }

    /// Set what happens to lines with an unrecognized feature kind.
    pub fn with_unrecognized(
        mut self,
        unrecognized: Unrecognized,
    ) -> Self {
        self.state.unrecognized = unrecognized;
        self
    }

    /// Number of lines consumed so far, including comments.
    pub fn line_number(
        &self,
    ) -> usize {
        self.state.line_number
    }
}

impl<I, S> Iterator for Assembler<I> where I: Iterator<Item = S>, S: AsRef<str> {
    type Item = Result<Feature, E>;

    fn next(
        &mut self,
    ) -> Option<Result<Feature, E>> {
        if self.state.finished {
            return None
        }
        for line in self.lines.by_ref() {
            if let Some(res) = self.state.consume(line.as_ref()) {
                return Some(res)
            }
        }
        self.state.finish()
    }
}
