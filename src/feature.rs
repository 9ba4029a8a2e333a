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

//! Typed features assembled from [Record]s.
//!
//! Exons and CDS are leaves. Transcripts contain exons and CDS with the same
//! `transcript_id`. Genes contain transcripts, exons and CDS with the same
//! `gene_id`. Children are owned by their container and kept in the order
//! they were added.
//!

use crate::attributes::AttributeValue;
use crate::attributes::Attributes;
use crate::record::render_record;
use crate::record::Record;

#[derive(Debug, Clone)]
pub struct UnrecognizedFeatureKind {
    pub kind: String,
}

impl std::fmt::Display for UnrecognizedFeatureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "unrecognized feature kind '{}'", self.kind)
    }
}

impl std::error::Error for UnrecognizedFeatureKind {}

#[derive(Debug, Clone)]
pub struct IncompatibleChild {
    pub parent: String,
    pub child: String,
}

impl std::fmt::Display for IncompatibleChild {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "cannot add {} as a child of {}", self.child, self.parent)
    }
}

impl std::error::Error for IncompatibleChild {}

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    Exon(Record),
    Cds(Record),
    Transcript {
        record: Record,
        children: Vec<Feature>,
    },
    Gene {
        record: Record,
        children: Vec<Feature>,
    },
}

/// Wrap a [Record] in the [Feature] matching its `feature` column
///
/// `gene`, `transcript`, `exon` and `CDS` are recognized.
///
/// Terminates with an [UnrecognizedFeatureKind] for anything else.
///
pub fn make_feature(
    record: Record,
) -> Result<Feature, UnrecognizedFeatureKind> {
    match record.feature.as_str() {
        "gene" => Ok(Feature::Gene { record, children: Vec::new() }),
        "transcript" => Ok(Feature::Transcript { record, children: Vec::new() }),
        "exon" => Ok(Feature::Exon(record)),
        "CDS" => Ok(Feature::Cds(record)),
        _ => Err(UnrecognizedFeatureKind{ kind: record.feature }),
    }
}

impl TryFrom<Record> for Feature {
    type Error = UnrecognizedFeatureKind;

    fn try_from(record: Record) -> Result<Self, Self::Error> {
        make_feature(record)
    }
}

impl Feature {
    pub fn record(&self) -> &Record {
        match self {
            Feature::Exon(record) => record,
            Feature::Cds(record) => record,
            Feature::Transcript { record, .. } => record,
            Feature::Gene { record, .. } => record,
        }
    }

    /// Direct children, empty for exons and CDS.
    pub fn children(&self) -> &[Feature] {
        match self {
            Feature::Exon(_) | Feature::Cds(_) => &[],
            Feature::Transcript { children, .. } => children,
            Feature::Gene { children, .. } => children,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Feature::Transcript { .. } | Feature::Gene { .. })
    }

    pub fn exons(&self) -> impl Iterator<Item = &Feature> {
        self.children().iter().filter(|x| matches!(x, Feature::Exon(_)))
    }

    pub fn cds(&self) -> impl Iterator<Item = &Feature> {
        self.children().iter().filter(|x| matches!(x, Feature::Cds(_)))
    }

    pub fn transcripts(&self) -> impl Iterator<Item = &Feature> {
        self.children().iter().filter(|x| matches!(x, Feature::Transcript { .. }))
    }

    /// All features below this one in pre-order.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants{ stack: self.children().iter().rev().collect() }
    }

    pub fn chromosome(&self) -> &str {
        &self.record().seqname
    }

    pub fn source(&self) -> &str {
        &self.record().source
    }

    pub fn kind(&self) -> &str {
        &self.record().feature
    }

    pub fn start(&self) -> i64 {
        self.record().start
    }

    pub fn end(&self) -> i64 {
        self.record().end
    }

    /// Start and end, 1-based and closed.
    pub fn extents(&self) -> (i64, i64) {
        (self.start(), self.end())
    }

    pub fn score(&self) -> Option<f64> {
        self.record().score
    }

    pub fn strand(&self) -> &str {
        &self.record().strand
    }

    pub fn frame(&self) -> Option<i64> {
        self.record().frame
    }

    pub fn attributes(&self) -> &Attributes {
        &self.record().attributes
    }

    pub fn gene_id(&self) -> Option<&AttributeValue> {
        self.attributes().get("gene_id")
    }

    pub fn transcript_id(&self) -> Option<&AttributeValue> {
        self.attributes().get("transcript_id")
    }

    pub fn exon_id(&self) -> Option<&AttributeValue> {
        self.attributes().get("exon_id")
    }

    /// Check whether `candidate` may be added as a child.
    ///
    /// Ids are compared as optional values, so a container without the id
    /// attribute accepts children that also lack it.
    pub fn can_add(
        &self,
        candidate: &Feature,
    ) -> bool {
        match self {
            Feature::Exon(_) | Feature::Cds(_) => false,
            Feature::Transcript { .. } => match candidate {
                Feature::Exon(_) | Feature::Cds(_) => candidate.transcript_id() == self.transcript_id(),
                Feature::Transcript { .. } | Feature::Gene { .. } => false,
            },
            Feature::Gene { .. } => match candidate {
                Feature::Transcript { .. } | Feature::Exon(_) | Feature::Cds(_) => candidate.gene_id() == self.gene_id(),
                Feature::Gene { .. } => false,
            },
        }
    }

    /// Append `child` to the children of this feature.
    ///
    /// Terminates with an [IncompatibleChild] if [can_add](Feature::can_add)
    /// is false. `child` is dropped in that case.
    pub fn add_child(
        &mut self,
        child: Feature,
    ) -> Result<(), IncompatibleChild> {
        let accepted = self.can_add(&child);
        match self {
            Feature::Transcript { children, .. } | Feature::Gene { children, .. } if accepted => {
                children.push(child);
                Ok(())
            },
            _ => Err(IncompatibleChild{ parent: self.to_string_short(), child: child.to_string_short() }),
        }
    }

    fn to_string_short(&self) -> String {
        format!("{} {}:{}-{}", self.kind(), self.chromosome(), self.start(), self.end())
    }
}

/// Pre-order iterator returned by [Feature::descendants].
pub struct Descendants<'a> {
    stack: Vec<&'a Feature>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Feature;

    fn next(
        &mut self,
    ) -> Option<&'a Feature> {
        let feature = self.stack.pop()?;
        self.stack.extend(feature.children().iter().rev());
        Some(feature)
    }
}

impl std::fmt::Display for Feature {
    /// Formats the feature line followed by its descendants in pre-order,
    /// one per line, without a trailing newline.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", render_record(self.record()))?;
        for descendant in self.descendants() {
            write!(f, "\n{}", render_record(descendant.record()))?;
        }
        Ok(())
    }
}
