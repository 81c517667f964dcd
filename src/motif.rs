use crate::iupac_code::IupacCode;

/// Precompute a motif as a fixed symbol sequence for matching.
pub fn compile(motif: &str) -> Vec<IupacCode> {
    motif.bytes().map(IupacCode::from_letter).collect()
}

#[inline(always)]
fn matches_at(sequence: &[u8], motif: &[IupacCode], start: usize) -> bool {
    motif
        .iter()
        .zip(&sequence[start..start + motif.len()])
        .all(|(code, &base)| !code.subset(IupacCode::from_letter(base)).is_empty())
}

/// All starting offsets where the motif matches the sequence.
/// An empty motif, or one longer than the sequence, matches nowhere.
pub fn find_all_matches(sequence: &[u8], motif: &[IupacCode]) -> Vec<usize> {
    if motif.is_empty() || motif.len() > sequence.len() {
        return vec![];
    }
    (0..=sequence.len() - motif.len())
        .filter(|&start| matches_at(sequence, motif, start))
        .collect()
}

/// Circular variant: also finds motifs straddling the origin, each
/// exactly once. Matches are reported by their starting offset in
/// `[0, sequence.len())`.
pub fn find_matches_circular(sequence: &[u8], motif: &[IupacCode]) -> Vec<usize> {
    let n = sequence.len();
    if motif.is_empty() || motif.len() > n {
        return vec![];
    }
    (0..n)
        .filter(|&start| {
            motif
                .iter()
                .enumerate()
                .all(|(j, code)| !code.subset(IupacCode::from_letter(sequence[(start + j) % n])).is_empty())
        })
        .collect()
}
