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
use std::io::Write;

use crate::feature::Feature;

type E = Box<dyn std::error::Error>;

/// Format a feature tree in GFF/GTF format
///
/// Writes the line for `feature` followed by one line for each descendant in
/// pre-order to `conn`.
///
pub fn format_gtf_feature<W: Write>(
    feature: &Feature,
    conn: &mut W,
) -> Result<(), E> {
    let formatted: String = feature.to_string() + "\n";
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

/// Format many feature trees in GFF/GTF format
///
/// Writes the formatted trees in `features` to `conn` in order.
///
pub fn format_gtf_file<W: Write>(
    features: &[Feature],
    conn: &mut W,
) -> Result<(), E> {
    for feature in features {
        format_gtf_feature(feature, conn)?;
    }
    conn.flush()?;
    Ok(())
}
