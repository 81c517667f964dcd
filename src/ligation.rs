use itertools::Itertools;
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;

use crate::digest::Fragment;
use crate::iupac_code::{self, reverse_complement};
use crate::overhang::{self, EndInfo, TheoreticalEnd};
use crate::restriction_enzyme::RestrictionEnzyme;

// Overhangs longer than this no longer improve the ranking terms.
const MAX_SCORED_OVERHANG: usize = 8;

/// Options for ligation-compatibility analysis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CompatOptions {
    pub include_blunt: bool,
    pub min_overhang: usize,
    pub require_directional: bool,
}

impl Default for CompatOptions {
    fn default() -> Self {
        Self {
            include_blunt: false,
            min_overhang: 1,
            require_directional: false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Left => write!(f, "left"),
            Side::Right => write!(f, "right"),
        }
    }
}

/// A fragment end tagged with its origin, the unit of the pairwise sweep.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EndRef {
    pub fragment: usize,
    pub side: Side,
    pub position: usize,
    pub enzyme: Option<String>,
    pub info: EndInfo,
}

/// A compatible end pair with its descriptive heuristics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CompatibilityResult {
    pub end_a: EndRef,
    pub end_b: EndRef,
    pub compatible: bool,
    pub directional: bool,
    pub gc_a: f64,
    pub gc_b: f64,
    pub tm_a: f64,
    pub tm_b: f64,
    pub strength: f64,
    pub note: String,
}

/// A theoretical enzyme pairing, judged from cut geometry alone. The
/// heuristics are computed over the overhang templates; `N` placeholders
/// contribute to neither GC% nor Tm.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnzymePairResult {
    pub end_a: TheoreticalEnd,
    pub end_b: TheoreticalEnd,
    pub compatible: bool,
    pub directional: bool,
    pub gc_a: f64,
    pub gc_b: f64,
    pub tm_a: f64,
    pub tm_b: f64,
    pub strength: f64,
    pub note: String,
}

/// Can the two literal ends anneal? Symmetric in its arguments: two
/// sticky ends ligate iff they carry the same overhang kind, equal
/// lengths of at least `min_overhang`, and mutually reverse-complementary
/// sequences; blunt pairs only when `include_blunt` is set.
pub fn compatible_concrete(a: &EndInfo, b: &EndInfo, options: &CompatOptions) -> bool {
    match (a.is_sticky(), b.is_sticky()) {
        (false, false) => options.include_blunt,
        (true, true) => {
            let seq_a = a.sticky_seq.as_deref().unwrap_or_default();
            let seq_b = b.sticky_seq.as_deref().unwrap_or_default();
            a.overhang == b.overhang
                && a.overhang_len == b.overhang_len
                && a.overhang_len >= options.min_overhang
                && seq_a.eq_ignore_ascii_case(&reverse_complement(seq_b))
        }
        _ => false,
    }
}

/// Theoretical counterpart of [`compatible_concrete`], over the
/// sequence-independent enzyme templates: literal equality is replaced
/// by column-wise ambiguity-set intersection, since templates may carry
/// ambiguity codes or `N` placeholders.
pub fn compatible_theoretical(a: &TheoreticalEnd, b: &TheoreticalEnd, options: &CompatOptions) -> bool {
    match (a.k > 0, b.k > 0) {
        (false, false) => options.include_blunt,
        (true, true) => {
            a.kind == b.kind
                && a.k == b.k
                && a.k >= options.min_overhang
                && matches!(iupac_code::columns_compatible(&a.template, &b.template), Ok(true))
        }
        _ => false,
    }
}

/// An overhang forces a single ligation orientation iff it differs from
/// its own reverse complement.
pub fn is_directional(overhang: &str) -> bool {
    !overhang.eq_ignore_ascii_case(&reverse_complement(overhang))
}

pub fn gc_percent(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq
        .bytes()
        .map(|c| c.to_ascii_uppercase())
        .filter(|&c| c == b'G' || c == b'C')
        .count() as f64;
    gc / seq.len() as f64 * 100.0
}

/// Wallace-rule melting temperature, 2·(A+T) + 4·(G+C). Only meaningful
/// for short oligomers such as overhangs; not a general Tm model.
pub fn melting_temp(seq: &str) -> f64 {
    let mut at = 0;
    let mut gc = 0;
    for c in seq.bytes().map(|c| c.to_ascii_uppercase()) {
        match c {
            b'A' | b'T' => at += 1,
            b'G' | b'C' => gc += 1,
            _ => {}
        }
    }
    2.0 * at as f64 + 4.0 * gc as f64
}

/// Ranking score in [0, 1] combining GC closeness to 50%, normalized Tm,
/// normalized overhang length and a directionality bonus, with fixed
/// weights 0.2/0.3/0.3/0.2. A heuristic ranking aid for sorting candidate
/// pairs, not a thermodynamic prediction.
pub fn strength_score(gc: f64, tm: f64, overhang_len: usize, directional: bool) -> f64 {
    let gc_term = (1.0 - (gc - 50.0).abs() / 50.0).clamp(0.0, 1.0);
    let tm_term = (tm / (4.0 * MAX_SCORED_OVERHANG as f64)).clamp(0.0, 1.0);
    let len_term = (overhang_len as f64 / MAX_SCORED_OVERHANG as f64).clamp(0.0, 1.0);
    let dir_term = if directional { 1.0 } else { 0.0 };
    0.2 * gc_term + 0.3 * tm_term + 0.3 * len_term + 0.2 * dir_term
}

/// The four ends of every fragment pair boundary, tagged for analysis.
pub fn fragment_ends(fragments: &[Fragment]) -> Vec<EndRef> {
    fragments
        .iter()
        .enumerate()
        .flat_map(|(i, fragment)| {
            [
                EndRef {
                    fragment: i,
                    side: Side::Left,
                    position: fragment.start,
                    enzyme: fragment.left_enzyme.to_owned(),
                    info: fragment.left_end.to_owned(),
                },
                EndRef {
                    fragment: i,
                    side: Side::Right,
                    position: fragment.end,
                    enzyme: fragment.right_enzyme.to_owned(),
                    info: fragment.right_end.to_owned(),
                },
            ]
        })
        .collect()
}

fn pair_note(info: &EndInfo, directional: bool) -> String {
    if !info.is_sticky() {
        return "Blunt-blunt ligation".to_string();
    }
    let direction = if directional {
        "directional"
    } else {
        "non-directional (palindromic)"
    };
    format!(
        "{}, {} nt overhang, {}",
        info.overhang, info.overhang_len, direction
    )
}

/// Concrete compatibility over every unordered pair of ends across all
/// fragments. Pairs are checked in parallel; the result keeps the
/// deterministic enumeration order and contains compatible pairs only.
pub fn analyze_fragments(fragments: &[Fragment], options: &CompatOptions) -> Vec<CompatibilityResult> {
    let ends = fragment_ends(fragments);
    let pairs: Vec<(usize, usize)> = (0..ends.len()).tuple_combinations().collect();
    pairs
        .par_iter()
        .filter_map(|&(i, j)| {
            let end_a = &ends[i];
            let end_b = &ends[j];
            if !compatible_concrete(&end_a.info, &end_b.info, options) {
                return None;
            }
            let directional = end_a
                .info
                .sticky_seq
                .as_deref()
                .is_some_and(is_directional);
            if options.require_directional && !directional {
                return None;
            }
            let seq_a = end_a.info.sticky_seq.as_deref().unwrap_or_default();
            let seq_b = end_b.info.sticky_seq.as_deref().unwrap_or_default();
            let gc_a = gc_percent(seq_a);
            let gc_b = gc_percent(seq_b);
            let tm_a = melting_temp(seq_a);
            let tm_b = melting_temp(seq_b);
            let strength = strength_score(
                (gc_a + gc_b) / 2.0,
                (tm_a + tm_b) / 2.0,
                end_a.info.overhang_len,
                directional,
            );
            let note = pair_note(&end_a.info, directional);
            Some(CompatibilityResult {
                end_a: end_a.to_owned(),
                end_b: end_b.to_owned(),
                compatible: true,
                directional,
                gc_a,
                gc_b,
                tm_a,
                tm_b,
                strength,
                note,
            })
        })
        .collect()
}

/// Judge two enzymes' intrinsic ends against each other, without any
/// digest.
pub fn analyze_enzyme_pair(
    a: &RestrictionEnzyme,
    b: &RestrictionEnzyme,
    options: &CompatOptions,
) -> EnzymePairResult {
    let end_a = overhang::theoretical_end(a);
    let end_b = overhang::theoretical_end(b);
    let compatible = compatible_theoretical(&end_a, &end_b, options);
    let directional = compatible && end_a.k > 0 && !end_a.palindromic;
    let note = if !compatible {
        if (end_a.k == 0) != (end_b.k == 0) {
            "One blunt, one sticky - incompatible".to_string()
        } else if end_a.k == 0 {
            "Both blunt".to_string()
        } else if end_a.kind != end_b.kind {
            "Overhang types don't match (5' vs 3')".to_string()
        } else if end_a.k != end_b.k {
            format!("Overhang lengths don't match ({} vs {})", end_a.k, end_b.k)
        } else {
            "Overhang templates cannot anneal".to_string()
        }
    } else if end_a.k == 0 {
        "Both blunt".to_string()
    } else if a.name == b.name {
        "Same enzyme - always compatible".to_string()
    } else if end_a.template.contains('N') || end_b.template.contains('N') {
        "Potentially compatible (length and type match, need sequence verification)".to_string()
    } else {
        pair_note(
            &EndInfo {
                overhang: end_a.kind,
                overhang_len: end_a.k,
                sticky_seq: Some(end_a.template.to_owned()),
            },
            directional,
        )
    };
    let gc_a = gc_percent(&end_a.template);
    let gc_b = gc_percent(&end_b.template);
    let tm_a = melting_temp(&end_a.template);
    let tm_b = melting_temp(&end_b.template);
    let strength = strength_score((gc_a + gc_b) / 2.0, (tm_a + tm_b) / 2.0, end_a.k, directional);
    EnzymePairResult {
        end_a,
        end_b,
        compatible,
        directional,
        gc_a,
        gc_b,
        tm_a,
        tm_b,
        strength,
        note,
    }
}

/// Theoretical compatibility over every unordered enzyme pair, including
/// each enzyme against itself.
pub fn analyze_enzymes(
    enzymes: &[RestrictionEnzyme],
    options: &CompatOptions,
) -> Vec<EnzymePairResult> {
    let pairs: Vec<(usize, usize)> = (0..enzymes.len())
        .flat_map(|i| (i..enzymes.len()).map(move |j| (i, j)))
        .collect();
    pairs
        .par_iter()
        .map(|&(i, j)| analyze_enzyme_pair(&enzymes[i], &enzymes[j], options))
        .filter(|result| result.compatible)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest;
    use crate::dna_sequence::DnaSequence;
    use crate::restriction_enzyme::OverhangKind;

    fn sticky(kind: OverhangKind, seq: &str) -> EndInfo {
        EndInfo {
            overhang: kind,
            overhang_len: seq.len(),
            sticky_seq: Some(seq.to_string()),
        }
    }

    fn enzyme(name: &str, site: &str, top: isize, bottom: isize, kind: OverhangKind) -> RestrictionEnzyme {
        RestrictionEnzyme::new(name, site, Some(top), Some(bottom), kind).unwrap()
    }

    #[test]
    fn test_compatible_concrete_sticky() {
        let options = CompatOptions::default();
        let a = sticky(OverhangKind::FivePrime, "AATT");
        let b = sticky(OverhangKind::FivePrime, "AATT");
        assert!(compatible_concrete(&a, &b, &options));
        // Non-palindromic overhang against its reverse complement
        let a = sticky(OverhangKind::FivePrime, "ACTG");
        let b = sticky(OverhangKind::FivePrime, "CAGT");
        assert!(compatible_concrete(&a, &b, &options));
        // ... but not against itself
        assert!(!compatible_concrete(&a, &a, &options));
    }

    #[test]
    fn test_compatible_concrete_rejections() {
        let options = CompatOptions::default();
        let aatt_5 = sticky(OverhangKind::FivePrime, "AATT");
        let aatt_3 = sticky(OverhangKind::ThreePrime, "AATT");
        let gatc_5 = sticky(OverhangKind::FivePrime, "GATC");
        let blunt = EndInfo::natural();
        // Overhang kind must match
        assert!(!compatible_concrete(&aatt_5, &aatt_3, &options));
        // Sequences must be complementary
        assert!(!compatible_concrete(&aatt_5, &gatc_5, &options));
        // Sticky never ligates blunt
        assert!(!compatible_concrete(&aatt_5, &blunt, &options));
        // Lengths must match
        let at = sticky(OverhangKind::FivePrime, "AT");
        assert!(!compatible_concrete(&aatt_5, &at, &options));
    }

    #[test]
    fn test_compatible_concrete_blunt_and_min_overhang() {
        let blunt = EndInfo::natural();
        let mut options = CompatOptions::default();
        assert!(!compatible_concrete(&blunt, &blunt, &options));
        options.include_blunt = true;
        assert!(compatible_concrete(&blunt, &blunt, &options));

        let at = sticky(OverhangKind::FivePrime, "AT");
        options.min_overhang = 3;
        assert!(!compatible_concrete(&at, &at, &options));
        options.min_overhang = 2;
        assert!(compatible_concrete(&at, &at, &options));
    }

    #[test]
    fn test_compatible_concrete_symmetry() {
        let options = CompatOptions {
            include_blunt: true,
            ..CompatOptions::default()
        };
        let ends = [
            sticky(OverhangKind::FivePrime, "AATT"),
            sticky(OverhangKind::FivePrime, "ACTG"),
            sticky(OverhangKind::FivePrime, "CAGT"),
            sticky(OverhangKind::ThreePrime, "TGCA"),
            sticky(OverhangKind::FivePrime, "AT"),
            EndInfo::natural(),
        ];
        for a in &ends {
            for b in &ends {
                assert_eq!(
                    compatible_concrete(a, b, &options),
                    compatible_concrete(b, a, &options)
                );
            }
        }
    }

    #[test]
    fn test_is_directional() {
        assert!(!is_directional("AATT"));
        assert!(!is_directional("GATC"));
        assert!(!is_directional("CATG"));
        assert!(is_directional("ACTG"));
        assert!(!is_directional("AGCT"));
        assert!(!is_directional("CTAG"));
        assert!(is_directional("AATC"));
    }

    #[test]
    fn test_heuristics() {
        assert_eq!(gc_percent(""), 0.0);
        assert_eq!(gc_percent("AATT"), 0.0);
        assert_eq!(gc_percent("GATC"), 50.0);
        assert_eq!(gc_percent("GGCC"), 100.0);
        assert_eq!(melting_temp("AATT"), 8.0);
        assert_eq!(melting_temp("GATC"), 12.0);
        assert_eq!(melting_temp("GGCC"), 16.0);
        assert_eq!(melting_temp("NN"), 0.0);
    }

    #[test]
    fn test_strength_score_bounds() {
        for (gc, tm, len, dir) in [
            (0.0, 0.0, 0, false),
            (50.0, 16.0, 4, true),
            (100.0, 64.0, 12, true),
        ] {
            let score = strength_score(gc, tm, len, dir);
            assert!((0.0..=1.0).contains(&score), "score {score} out of range");
        }
        // Directionality adds its fixed bonus
        let base = strength_score(50.0, 12.0, 4, false);
        assert!((strength_score(50.0, 12.0, 4, true) - base - 0.2).abs() < 1e-12);
    }

    #[test]
    fn test_analyze_fragments_ecori() {
        let ecori = enzyme("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime);
        let dna = DnaSequence::from_sequence("ATGCGAATTCGCTAGCGAATTCAT");
        let fragments = digest(&dna, &[ecori]);
        assert_eq!(fragments.len(), 3);

        let results = analyze_fragments(&fragments, &CompatOptions::default());
        // Four AATT ends, all mutually compatible: C(4,2) pairs
        assert_eq!(results.len(), 6);
        for result in &results {
            assert!(result.compatible);
            assert!(!result.directional);
            assert_eq!(result.gc_a, 0.0);
            assert_eq!(result.tm_a, 8.0);
            assert!(result.note.contains("5' overhang"));
        }

        // Palindromic overhangs disappear under a directional-only filter
        let options = CompatOptions {
            require_directional: true,
            ..CompatOptions::default()
        };
        assert!(analyze_fragments(&fragments, &options).is_empty());
    }

    #[test]
    fn test_analyze_fragments_blunt_natural_ends() {
        let ecori = enzyme("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime);
        let dna = DnaSequence::from_sequence("ATGCGAATTCGCTAGC");
        let fragments = digest(&dna, &[ecori]);
        let options = CompatOptions {
            include_blunt: true,
            ..CompatOptions::default()
        };
        let results = analyze_fragments(&fragments, &options);
        // One sticky AATT pair plus the two natural blunt outer ends
        assert_eq!(results.len(), 2);
        assert!(results.iter().any(|r| r.note == "Blunt-blunt ligation"));
    }

    #[test]
    fn test_theoretical_isoschizomer_compatibility() {
        let options = CompatOptions::default();
        let ecori = enzyme("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime);
        let mfei = enzyme("MfeI", "CAATTG", 1, 5, OverhangKind::FivePrime);
        let bamhi = enzyme("BamHI", "GGATCC", 1, 5, OverhangKind::FivePrime);
        let psti = enzyme("PstI", "CTGCAG", 5, 1, OverhangKind::ThreePrime);

        // EcoRI and MfeI both leave AATT
        let result = analyze_enzyme_pair(&ecori, &mfei, &options);
        assert!(result.compatible);
        assert!(!result.directional);

        let result = analyze_enzyme_pair(&ecori, &bamhi, &options);
        assert!(!result.compatible);

        // Same length but opposite overhang polarity
        let result = analyze_enzyme_pair(&ecori, &psti, &options);
        assert!(!result.compatible);
        assert_eq!(result.note, "Overhang types don't match (5' vs 3')");
    }

    #[test]
    fn test_theoretical_ambiguous_templates() {
        let options = CompatOptions::default();
        let hinfi = enzyme("HinfI", "GANTC", 1, 4, OverhangKind::FivePrime);
        let result = analyze_enzyme_pair(&hinfi, &hinfi, &options);
        assert!(result.compatible);
        assert_eq!(result.end_a.template, "ANT");

        // Type IIS templates are all N and can in principle anneal to any
        // overhang of the same kind and length
        let bsai = enzyme("BsaI", "GGTCTC", 7, 11, OverhangKind::FivePrime);
        let ecori = enzyme("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime);
        let result = analyze_enzyme_pair(&bsai, &ecori, &options);
        assert!(result.compatible);
        assert!(result.note.contains("need sequence verification"));
    }

    #[test]
    fn test_theoretical_matches_concrete_for_resolved_templates() {
        // For enzymes whose overhang lies fully inside an unambiguous
        // site, the two formulations must agree
        let options = CompatOptions::default();
        let pairs = [
            ("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime),
            ("BamHI", "GGATCC", 1, 5, OverhangKind::FivePrime),
            ("PstI", "CTGCAG", 5, 1, OverhangKind::ThreePrime),
            ("NdeI", "CATATG", 2, 4, OverhangKind::FivePrime),
        ];
        for a in &pairs {
            for b in &pairs {
                let re_a = enzyme(a.0, a.1, a.2, a.3, a.4);
                let re_b = enzyme(b.0, b.1, b.2, b.3, b.4);
                let concrete = compatible_concrete(
                    &overhang::end_info(&re_a),
                    &overhang::end_info(&re_b),
                    &options,
                );
                let theoretical = compatible_theoretical(
                    &overhang::theoretical_end(&re_a),
                    &overhang::theoretical_end(&re_b),
                    &options,
                );
                assert_eq!(concrete, theoretical, "{} vs {}", a.0, b.0);
            }
        }
    }

    #[test]
    fn test_analyze_enzymes_batch() {
        let options = CompatOptions::default();
        let enzymes = [
            enzyme("EcoRI", "GAATTC", 1, 5, OverhangKind::FivePrime),
            enzyme("MfeI", "CAATTG", 1, 5, OverhangKind::FivePrime),
            enzyme("BamHI", "GGATCC", 1, 5, OverhangKind::FivePrime),
        ];
        let results = analyze_enzymes(&enzymes, &options);
        // EcoRI-EcoRI, EcoRI-MfeI, MfeI-MfeI, BamHI-BamHI
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.compatible));
    }
}
