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

use crate::attributes::AttributeValue;
use crate::feature::Feature;

type E = Box<dyn std::error::Error>;

const COLUMNS: [&str; 9] = ["kind", "seqname", "start", "end", "strand", "id", "transcripts", "exons", "cds"];

/// Format the header line of a summary table
pub fn format_summary_header<W: Write>(
    conn: &mut W,
) -> Result<(), E> {
    let formatted: String = COLUMNS.join("\t") + "\n";
    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

fn format_id(
    id: Option<&AttributeValue>,
) -> String {
    match id {
        Some(value) => value.as_str().map_or_else(|| value.to_string(), |x| x.to_string()),
        None => ".".to_string(),
    }
}

/// Format a one line summary of a feature tree
///
/// The id is `gene_id` for genes and `transcript_id` for everything else.
/// Transcripts, exons and CDS are counted over all descendants.
///
pub fn format_summary_line<W: Write>(
    feature: &Feature,
    conn: &mut W,
) -> Result<(), E> {
    let separator: char = '\t';

    let id = match feature {
        Feature::Gene { .. } => format_id(feature.gene_id()),
        _ => format_id(feature.transcript_id()),
    };

    let mut counts: [usize; 3] = [0; 3];
    feature.descendants().for_each(|descendant| {
        match descendant {
            Feature::Transcript { .. } => counts[0] += 1,
            Feature::Exon(_) => counts[1] += 1,
            Feature::Cds(_) => counts[2] += 1,
            Feature::Gene { .. } => (),
        }
    });

    let mut formatted: String = [
        feature.kind().to_string(),
        feature.chromosome().to_string(),
        feature.start().to_string(),
        feature.end().to_string(),
        feature.strand().to_string(),
        id,
    ].join("\t");
    counts.iter().for_each(|count| {
        formatted += &separator.to_string();
        formatted += &count.to_string();
    });
    formatted += "\n";

    conn.write_all(formatted.as_bytes())?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn format_summary_header() {
        use super::format_summary_header;

        let mut got: Vec<u8> = Vec::new();
        format_summary_header(&mut got).unwrap();

        assert_eq!(got, b"kind\tseqname\tstart\tend\tstrand\tid\ttranscripts\texons\tcds\n".to_vec());
    }

    #[test]
    fn format_summary_line_gene() {
        use super::format_summary_line;
        use crate::parser::Assembler;

        let lines = vec![
            "chr1\tsrc\tgene\t1\t1000\t.\t+\t.\tgene_id \"G1\";",
            "chr1\tsrc\ttranscript\t1\t1000\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";",
            "chr1\tsrc\texon\t1\t200\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";",
            "chr1\tsrc\tCDS\t50\t200\t.\t+\t0\tgene_id \"G1\"; transcript_id \"T1\";",
            "chr1\tsrc\texon\t500\t1000\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";",
        ];
        let gene = Assembler::new(lines.into_iter()).next().unwrap().unwrap();

        let mut got: Vec<u8> = Vec::new();
        format_summary_line(&gene, &mut got).unwrap();

        assert_eq!(got, b"gene\tchr1\t1\t1000\t+\tG1\t1\t2\t1\n".to_vec());
    }

    #[test]
    fn format_summary_line_numeric_and_missing_id() {
        use super::format_summary_line;
        use crate::feature::make_feature;
        use crate::record::parse_line;

        let exon = make_feature(parse_line("chr3\tsrc\texon\t5\t9\t.\t-\t.\texon_id \"E1\";").unwrap()).unwrap();
        let transcript = make_feature(parse_line("chr3\tsrc\ttranscript\t5\t9\t.\t.\t.\ttranscript_id 17;").unwrap()).unwrap();

        let mut got: Vec<u8> = Vec::new();
        format_summary_line(&exon, &mut got).unwrap();
        format_summary_line(&transcript, &mut got).unwrap();

        let mut expected: Vec<u8> = b"exon\tchr3\t5\t9\t-\t.\t0\t0\t0\n".to_vec();
        expected.append(&mut b"transcript\tchr3\t5\t9\t.\t17\t0\t0\t0\n".to_vec());

        assert_eq!(got, expected);
    }
}
