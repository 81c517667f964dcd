use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dna_sequence::DnaSequence;
use crate::error::RedigestError;
use crate::iupac_code::{self, IupacCode};
use crate::motif;

/// Kind of end left behind by a double-strand cut.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OverhangKind {
    #[serde(rename = "5'")]
    FivePrime,
    #[serde(rename = "3'")]
    ThreePrime,
    #[serde(rename = "blunt")]
    Blunt,
    #[default]
    #[serde(rename = "unknown")]
    Unknown,
}

impl OverhangKind {
    #[inline(always)]
    pub fn is_sticky(&self) -> bool {
        matches!(self, OverhangKind::FivePrime | OverhangKind::ThreePrime)
    }
}

impl fmt::Display for OverhangKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OverhangKind::FivePrime => write!(f, "5' overhang"),
            OverhangKind::ThreePrime => write!(f, "3' overhang"),
            OverhangKind::Blunt => write!(f, "blunt"),
            OverhangKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// An immutable restriction enzyme descriptor.
///
/// `cut_top` and `cut_bottom` are 0-based offsets from the start of the
/// recognition site, both measured on the top-strand axis. Either may lie
/// outside the site itself (Type IIS enzymes). `None` means the cut
/// geometry is unknown; such enzymes produce no cut sites.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestrictionEnzyme {
    pub name: String,
    pub site: String,
    pub cut_top: Option<isize>,
    pub cut_bottom: Option<isize>,
    pub overhang: OverhangKind,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(skip)]
    site_codes: Vec<IupacCode>,
    #[serde(skip)]
    is_palindromic: bool,
}

/// One located cut, keyed by (position, enzyme). Multiple enzymes cutting
/// the same coordinate stay distinct sites.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CutSite {
    pub position: usize,
    pub enzyme: RestrictionEnzyme,
}

impl RestrictionEnzyme {
    pub fn new(
        name: &str,
        site: &str,
        cut_top: Option<isize>,
        cut_bottom: Option<isize>,
        overhang: OverhangKind,
    ) -> Result<Self, RedigestError> {
        let mut ret = Self {
            name: name.to_string(),
            site: site.to_string(),
            cut_top,
            cut_bottom,
            overhang,
            note: None,
            site_codes: vec![],
            is_palindromic: false,
        };
        ret.normalize()?;
        Ok(ret)
    }

    /// Uppercases and validates the recognition site and precomputes the
    /// derived matching fields. Must be called once after deserialization.
    pub fn normalize(&mut self) -> Result<(), RedigestError> {
        if self.site.is_empty() {
            return Err(RedigestError::InvalidInput(format!(
                "enzyme '{}' has an empty recognition site",
                self.name
            )));
        }
        if let Some(bad) = self.site.bytes().find(|&c| !IupacCode::is_valid_letter(c)) {
            return Err(RedigestError::InvalidInput(format!(
                "enzyme '{}' has invalid symbol '{}' in recognition site '{}'",
                self.name, bad as char, self.site
            )));
        }
        self.site = self.site.to_uppercase();
        self.site_codes = motif::compile(&self.site);
        self.is_palindromic = self.site == iupac_code::reverse_complement(&self.site);
        Ok(())
    }

    #[inline(always)]
    pub fn is_palindromic(&self) -> bool {
        self.is_palindromic
    }

    /// Overhang length implied by the cut geometry, 0 for blunt or
    /// unknown enzymes.
    pub fn overhang_len(&self) -> usize {
        if !self.overhang.is_sticky() {
            return 0;
        }
        match (self.cut_top, self.cut_bottom) {
            (Some(top), Some(bottom)) => top.abs_diff(bottom),
            _ => 0,
        }
    }

    /// All cut sites this enzyme produces on the sequence: one per motif
    /// occurrence, at the top-strand cut coordinate. Circular sequences
    /// wrap the coordinate; on linear sequences cuts falling outside
    /// `[0, len]` are discarded.
    // TODO scan the reverse strand for non-palindromic recognition sites
    pub fn get_sites(&self, seq: &DnaSequence) -> Vec<CutSite> {
        let cut_top = match self.cut_top {
            Some(cut_top) => cut_top,
            None => return vec![],
        };
        if seq.is_empty() {
            return vec![];
        }
        let forward = seq.forward();
        let occurrences = if seq.is_circular() {
            motif::find_matches_circular(forward, &self.site_codes)
        } else {
            motif::find_all_matches(forward, &self.site_codes)
        };
        let len = seq.len() as isize;
        occurrences
            .iter()
            .filter_map(|&offset| {
                let position = offset as isize + cut_top;
                if seq.is_circular() {
                    Some(position.rem_euclid(len) as usize)
                } else if (0..=len).contains(&position) {
                    Some(position as usize)
                } else {
                    None
                }
            })
            .map(|position| CutSite {
                position,
                enzyme: self.to_owned(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna_sequence::DnaSequence;

    fn ecori() -> RestrictionEnzyme {
        RestrictionEnzyme::new("EcoRI", "GAATTC", Some(1), Some(5), OverhangKind::FivePrime)
            .unwrap()
    }

    #[test]
    fn test_restriction_enzyme() {
        let re = ecori();
        assert!(re.is_palindromic());
        assert_eq!(re.overhang_len(), 4);
        let seq = DnaSequence::from_sequence("GAATTC");
        let sites = re.get_sites(&seq);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].position, 1);
    }

    #[test]
    fn test_restriction_enzyme_sites() {
        let re = ecori();
        let seq = DnaSequence::from_sequence("GAATTCGAATTC");
        let sites = re.get_sites(&seq);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0].position, 1);
        assert_eq!(sites[1].position, 7);
    }

    #[test]
    fn test_site_normalized_uppercase() {
        let re =
            RestrictionEnzyme::new("EcoRI", "gaattc", Some(1), Some(5), OverhangKind::FivePrime)
                .unwrap();
        assert_eq!(re.site, "GAATTC");
    }

    #[test]
    fn test_invalid_site_rejected() {
        assert!(RestrictionEnzyme::new("Bad", "", Some(1), Some(5), OverhangKind::FivePrime)
            .is_err());
        assert!(
            RestrictionEnzyme::new("Bad", "GAXTTC", Some(1), Some(5), OverhangKind::FivePrime)
                .is_err()
        );
    }

    #[test]
    fn test_no_cut_offset_no_sites() {
        let re =
            RestrictionEnzyme::new("NoCut", "GAATTC", None, None, OverhangKind::Unknown).unwrap();
        let seq = DnaSequence::from_sequence("GAATTC");
        assert!(re.get_sites(&seq).is_empty());
    }

    #[test]
    fn test_type_iis_cut_outside_linear_range_discarded() {
        // BsaI cuts 1 nt downstream of GGTCTC; at the end of a linear
        // sequence the cut coordinate would exceed the length
        let re = RestrictionEnzyme::new("BsaI", "GGTCTC", Some(7), Some(11), OverhangKind::FivePrime)
            .unwrap();
        let seq = DnaSequence::from_sequence("AAGGTCTC");
        assert!(re.get_sites(&seq).is_empty());
        let seq = DnaSequence::from_sequence("AAGGTCTCTTTT");
        let sites = re.get_sites(&seq);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].position, 9);
    }

    #[test]
    fn test_type_iis_cut_wraps_on_circular() {
        let re = RestrictionEnzyme::new("BsaI", "GGTCTC", Some(7), Some(11), OverhangKind::FivePrime)
            .unwrap();
        let mut seq = DnaSequence::from_sequence("AAGGTCTC");
        seq.set_circular(true);
        let sites = re.get_sites(&seq);
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].position, 1); // (2 + 7) mod 8
    }

    #[test]
    fn test_nonpalindromic() {
        let re = RestrictionEnzyme::new("SapI", "GCTCTTC", Some(8), Some(11), OverhangKind::FivePrime)
            .unwrap();
        assert!(!re.is_palindromic());
        assert_eq!(re.overhang_len(), 3);
    }
}
