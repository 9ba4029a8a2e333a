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

//! Assembles a flat sequence of [Feature]s into trees.
//!
//! [Hierarchy] keeps a stack of open features from the current root down to
//! the most recently pushed feature. Each element above the bottom has
//! already been accepted by the element beneath it and is moved into its
//! parent when it is closed.
//!
//! A new feature closes open features from the top until one of them accepts
//! it. If none does, the whole stack closes and the root is returned. Roots
//! are therefore returned one feature late: when the next unrelated feature
//! arrives or when [finish](Hierarchy::finish) is called.
//!
//! ## Usage
//!
//! ```rust
//! use gffiter::feature::make_feature;
//! use gffiter::hierarchy::Hierarchy;
//! use gffiter::record::parse_line;
//!
//! let lines = [
//!     "chr1\tsrc\tgene\t1\t100\t.\t+\t.\tgene_id \"G1\";",
//!     "chr1\tsrc\ttranscript\t1\t100\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";",
//!     "chr1\tsrc\texon\t1\t50\t.\t+\t.\tgene_id \"G1\"; transcript_id \"T1\";",
//!     "chr1\tsrc\tgene\t200\t300\t.\t+\t.\tgene_id \"G2\";",
//! ];
//!
//! let mut hierarchy = Hierarchy::new();
//! let mut roots = Vec::new();
//! for line in lines {
//!     let feature = make_feature(parse_line(line).unwrap()).unwrap();
//!     if let Some(root) = hierarchy.push(feature).unwrap() {
//!         roots.push(root);
//!     }
//! }
//! // G1 is complete once G2 arrives
//! assert_eq!(roots.len(), 1);
//! assert_eq!(roots[0].transcripts().next().unwrap().exons().count(), 1);
//!
//! roots.push(hierarchy.finish().unwrap().unwrap());
//! assert_eq!(roots.len(), 2);
//! ```
//!

use crate::feature::Feature;
use crate::feature::IncompatibleChild;

#[derive(Debug, Default)]
pub struct Hierarchy {
    open: Vec<Feature>,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently open features.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Closes the innermost open feature.
    ///
    /// Returns the feature if it was the root, otherwise moves it into its
    /// parent and returns None.
    fn close_top(
        &mut self,
    ) -> Result<Option<Feature>, IncompatibleChild> {
        let Some(closed) = self.open.pop() else {
            return Ok(None)
        };
        match self.open.last_mut() {
            Some(parent) => {
                parent.add_child(closed)?;
                Ok(None)
            },
            None => Ok(Some(closed)),
        }
    }

    /// Add the next feature from the input
    ///
    /// Closes open features until one accepts `feature` as a child, then
    /// opens `feature`. Leaves are opened too and close on the next push.
    ///
    /// Returns the root closed by this call, if any. At most one root can
    /// close per call because every open feature above the bottom already
    /// belongs to the one beneath it.
    ///
    /// An [IncompatibleChild] error means the stack invariant was broken and
    /// is not caused by the input.
    ///
    pub fn push(
        &mut self,
        feature: Feature,
    ) -> Result<Option<Feature>, IncompatibleChild> {
        let mut root: Option<Feature> = None;
        while let Some(top) = self.open.last() {
            if top.can_add(&feature) {
                break;
            }
            if let Some(closed) = self.close_top()? {
                root = Some(closed);
            }
        }
        self.open.push(feature);
        Ok(root)
    }

    /// Close everything that is still open
    ///
    /// Returns the bottommost feature with all descendants attached, or None
    /// if nothing was open.
    ///
    pub fn finish(
        &mut self,
    ) -> Result<Option<Feature>, IncompatibleChild> {
        while self.open.len() > 1 {
            self.close_top()?;
        }
        self.close_top()
    }
}
