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
use crate::attributes::decode;
use crate::attributes::encode;
use crate::attributes::format_float;
use crate::attributes::Attributes;

type E = Box<dyn std::error::Error>;

/// Number of tab separated columns on a GFF/GTF line.
pub const NUM_FIELDS: usize = 9;

#[derive(Debug, Clone)]
pub struct MalformedRecord {
    pub reason: String,
}

impl std::fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "malformed GFF/GTF line: {}", self.reason)
    }
}

impl std::error::Error for MalformedRecord {}

/// The 9 columns of a single GFF/GTF line.
///
/// `score` and `frame` are None when the column contains `.`.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub seqname: String,
    pub source: String,
    /// Feature kind, eg. `gene` or `exon`.
    pub feature: String,
    /// 1-based, inclusive.
    pub start: i64,
    /// 1-based, inclusive.
    pub end: i64,
    pub score: Option<f64>,
    /// Usually `+`, `-` or `.`; stored as written.
    pub strand: String,
    pub frame: Option<i64>,
    pub attributes: Attributes,
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", render_record(self))
    }
}

impl std::str::FromStr for Record {
    type Err = E;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_line(s)
    }
}

fn parse_coordinate(
    field: &str,
    column: &str,
) -> Result<i64, E> {
    let coordinate = field.parse::<i64>().map_err(|_| MalformedRecord{
        reason: format!("{} '{}' is not an integer", column, field),
    })?;
    Ok(coordinate)
}

/// Parse a line from a GFF/GTF file
///
/// Splits `line` on tabs and trims each field. Column 9 is decoded with
/// [decode](crate::attributes::decode). A score or frame that does not parse
/// as a number is stored as None.
///
/// Terminates with a [MalformedRecord] if the line does not have exactly 9
/// fields or if start or end is not an integer.
///
/// Comment lines are not recognized here and must be skipped by the caller.
///
pub fn parse_line(
    line: &str,
) -> Result<Record, E> {
    let separator: char = '\t';
    let fields: Vec<&str> = line.split(separator).map(|x| x.trim()).collect();

    if fields.len() != NUM_FIELDS {
        return Err(Box::new(MalformedRecord{
            reason: format!("expected {} tab separated fields, found {}", NUM_FIELDS, fields.len()),
        }))
    }

    let record = Record {
        seqname: fields[0].to_string(),
        source: fields[1].to_string(),
        feature: fields[2].to_string(),
        start: parse_coordinate(fields[3], "start")?,
        end: parse_coordinate(fields[4], "end")?,
        score: fields[5].parse::<f64>().ok(),
        strand: fields[6].to_string(),
        frame: fields[7].parse::<i64>().ok(),
        attributes: decode(fields[8])?,
    };

    Ok(record)
}

/// Format a record as a GFF/GTF line
///
/// Returns the 9 columns joined by tabs without a trailing newline. Missing
/// score and frame are written as `.`.
///
pub fn render_record(
    record: &Record,
) -> String {
    let score = record.score.map_or(".".to_string(), format_float);
    let frame = record.frame.map_or(".".to_string(), |x| x.to_string());

    [
        record.seqname.clone(),
        record.source.clone(),
        record.feature.clone(),
        record.start.to_string(),
        record.end.to_string(),
        score,
        record.strand.clone(),
        frame,
        encode(&record.attributes),
    ].join("\t")
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn parse_exon_line() {
        use super::parse_line;
        use crate::attributes::AttributeValue;

        let data = "chr1\tHAVANA\texon\t11869\t12227\t.\t+\t.\tgene_id \"ENSG00000223972\"; transcript_id \"ENST00000456328\"; exon_number 1;\n";
        let got = parse_line(data).unwrap();

        assert_eq!(got.seqname, "chr1");
        assert_eq!(got.source, "HAVANA");
        assert_eq!(got.feature, "exon");
        assert_eq!(got.start, 11869);
        assert_eq!(got.end, 12227);
        assert_eq!(got.score, None);
        assert_eq!(got.strand, "+");
        assert_eq!(got.frame, None);
        assert_eq!(got.attributes.get("transcript_id"), Some(&AttributeValue::String("ENST00000456328".to_string())));
        assert_eq!(got.attributes.get("exon_number"), Some(&AttributeValue::Integer(1)));
    }

    #[test]
    fn parse_score_and_frame() {
        use super::parse_line;

        let data = "chr2\tensembl\tCDS\t100\t250\t0.87\t-\t2\tgene_id \"G2\";";
        let got = parse_line(data).unwrap();

        assert_eq!(got.score, Some(0.87));
        assert_eq!(got.strand, "-");
        assert_eq!(got.frame, Some(2));
    }

    #[test]
    fn parse_unknown_frame_with_known_score() {
        use super::parse_line;

        let data = "chr2\tensembl\tgene\t100\t250\t12\t+\t.\tgene_id \"G2\";";
        let got = parse_line(data).unwrap();

        assert_eq!(got.score, Some(12.0));
        assert_eq!(got.frame, None);
    }

    #[test]
    fn parse_eight_fields() {
        use super::parse_line;
        use super::MalformedRecord;

        let data = "chr1\tsrc\tgene\t1\t100\t.\t+\t.";
        let got = parse_line(data);

        assert!(got.is_err());
        assert!(got.unwrap_err().downcast_ref::<MalformedRecord>().is_some());
    }

    #[test]
    fn parse_ten_fields() {
        use super::parse_line;
        use super::MalformedRecord;

        let data = "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";\textra";
        let got = parse_line(data);

        assert!(got.unwrap_err().downcast_ref::<MalformedRecord>().is_some());
    }

    #[test]
    fn parse_non_numeric_start() {
        use super::parse_line;
        use super::MalformedRecord;

        let data = "chr1\tsrc\tgene\tone\t100\t.\t+\t.\tgene_id \"G1\";";
        let got = parse_line(data);

        let err = got.unwrap_err();
        let err = err.downcast_ref::<MalformedRecord>().unwrap();
        assert_eq!(err.reason, "start 'one' is not an integer");
    }

    #[test]
    fn parse_negative_start() {
        use super::parse_line;

        let data = "chr1\tsrc\tgene\t-5\t100\t.\t+\t.\tgene_id \"G1\";";
        let got = parse_line(data).unwrap();

        assert_eq!(got.start, -5);
        assert_eq!(got.end, 100);
    }

    #[test]
    fn parse_empty_and_long_strand() {
        use super::parse_line;
        use super::render_record;

        let data = "chr1\tsrc\tgene\t1\t100\t.\t\t.\tgene_id \"G1\";";
        let got = parse_line(data).unwrap();
        assert_eq!(got.strand, "");
        assert_eq!(render_record(&got), data);

        let data = "chr1\tsrc\tgene\t1\t100\t.\t+-\t.\tgene_id \"G1\";";
        let got = parse_line(data).unwrap();
        assert_eq!(got.strand, "+-");
    }

    #[test]
    fn parse_malformed_attributes() {
        use super::parse_line;
        use crate::attributes::MalformedAttribute;

        let data = "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id;";
        let got = parse_line(data);

        assert!(got.unwrap_err().downcast_ref::<MalformedAttribute>().is_some());
    }

    #[test]
    fn render_gene_line() {
        use super::parse_line;
        use super::render_record;

        let data = "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";";
        let got = render_record(&parse_line(data).unwrap());

        assert_eq!(got, data);
    }

    #[test]
    fn render_empty_attributes() {
        use super::parse_line;
        use super::render_record;

        let data = "chr1\tsrc\tgene\t1\t100\t3.5\t.\t0\t";
        let got = render_record(&parse_line(data).unwrap());

        assert_eq!(got, data);
    }

    #[test]
    fn round_trip_record() {
        use super::parse_line;
        use super::render_record;

        let data = "chrX\tHAVANA\tCDS\t65419\t65433\t1000\t+\t0\tgene_id \"ENSG00000186092\"; transcript_id \"ENST00000641515\"; exon_number 2; ccds_id CCDS30547;";
        let record = parse_line(data).unwrap();
        let got = parse_line(&render_record(&record)).unwrap();

        assert_eq!(got, record);
    }
}
