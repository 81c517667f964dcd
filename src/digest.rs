use rayon::prelude::*;
use serde::Serialize;

use crate::dna_sequence::DnaSequence;
use crate::overhang::{self, EndInfo};
use crate::restriction_enzyme::{CutSite, RestrictionEnzyme};

/// One interval of a digested molecule, bounded by cuts and/or the
/// natural sequence ends. `end < start` (or `end == start` on a circle)
/// signifies a fragment wrapping the origin. An end without an enzyme is
/// a natural, non-enzymatic boundary.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
    pub length: usize,
    pub left_enzyme: Option<String>,
    pub right_enzyme: Option<String>,
    pub left_end: EndInfo,
    pub right_end: EndInfo,
}

impl Fragment {
    pub fn wraps(&self) -> bool {
        self.end <= self.start && self.length > 0
    }
}

/// All cut sites of all enzymes on the sequence, sorted ascending by
/// coordinate. Per-enzyme scans run in parallel; the merge is a stable
/// sort, so enzymes cutting the same coordinate keep their input order
/// and remain distinct sites.
pub fn cut_sites(dna: &DnaSequence, enzymes: &[RestrictionEnzyme]) -> Vec<CutSite> {
    let mut sites: Vec<CutSite> = enzymes
        .par_iter()
        .flat_map(|re| re.get_sites(dna))
        .collect();
    sites.sort_by_key(|site| site.position);
    sites
}

/// Digest the sequence with the given enzymes and partition it into
/// ordered fragments. An empty sequence yields no fragments.
pub fn digest(dna: &DnaSequence, enzymes: &[RestrictionEnzyme]) -> Vec<Fragment> {
    if dna.is_empty() {
        return vec![];
    }
    let sites = cut_sites(dna, enzymes);
    if dna.is_circular() {
        partition_circular(dna.len(), &sites)
    } else {
        partition_linear(dna.len(), &sites)
    }
}

fn cut_end(site: &CutSite) -> (Option<String>, EndInfo) {
    (
        Some(site.enzyme.name.to_owned()),
        overhang::end_info(&site.enzyme),
    )
}

// Linear molecules fall into the n+1 intervals delimited by 0, the
// sorted cuts, and the sequence length; the two outermost ends are
// natural.
fn partition_linear(len: usize, sites: &[CutSite]) -> Vec<Fragment> {
    let mut fragments = Vec::with_capacity(sites.len() + 1);
    for i in 0..=sites.len() {
        let (start, left_enzyme, left_end) = match i.checked_sub(1).and_then(|i| sites.get(i)) {
            Some(site) => {
                let (enzyme, end) = cut_end(site);
                (site.position, enzyme, end)
            }
            None => (0, None, EndInfo::natural()),
        };
        let (end, right_enzyme, right_end) = match sites.get(i) {
            Some(site) => {
                let (enzyme, end) = cut_end(site);
                (site.position, enzyme, end)
            }
            None => (len, None, EndInfo::natural()),
        };
        fragments.push(Fragment {
            start,
            end,
            length: end - start,
            left_enzyme,
            right_enzyme,
            left_end,
            right_end,
        });
    }
    fragments
}

// Circular molecules fall into the n intervals between consecutive cuts,
// the last one wrapping the origin. Zero cuts leave the circle intact; a
// single cut yields a single fragment whose two ends stem from the same
// enzyme.
fn partition_circular(len: usize, sites: &[CutSite]) -> Vec<Fragment> {
    if sites.is_empty() {
        return vec![Fragment {
            start: 0,
            end: 0,
            length: len,
            left_enzyme: None,
            right_enzyme: None,
            left_end: EndInfo::natural(),
            right_end: EndInfo::natural(),
        }];
    }
    (0..sites.len())
        .map(|i| {
            let left = &sites[i];
            let right = &sites[(i + 1) % sites.len()];
            // Only the last interval wraps back to the first cut; sites
            // are sorted, so any earlier interval with equal boundary
            // coordinates is an empty one between same-coordinate cuts
            let length = if i + 1 == sites.len() {
                len - left.position + right.position
            } else {
                right.position - left.position
            };
            let (left_enzyme, left_end) = cut_end(left);
            let (right_enzyme, right_end) = cut_end(right);
            Fragment {
                start: left.position,
                end: right.position,
                length,
                left_enzyme,
                right_enzyme,
                left_end,
                right_end,
            }
        })
        .collect()
}

/// The literal bases of a fragment, following the wraparound for
/// circular molecules.
pub fn fragment_sequence(dna: &DnaSequence, fragment: &Fragment) -> Vec<u8> {
    let forward = dna.forward();
    if fragment.end > fragment.start {
        forward[fragment.start..fragment.end].to_vec()
    } else if dna.is_circular() && fragment.length > 0 {
        forward[fragment.start..]
            .iter()
            .chain(forward[..fragment.end].iter())
            .copied()
            .collect()
    } else {
        vec![]
    }
}

pub fn fragment_lengths_total(fragments: &[Fragment]) -> usize {
    fragments.iter().map(|fragment| fragment.length).sum()
}
