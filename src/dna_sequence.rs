use anyhow::Result;
use bio::io::fasta;
use serde::{Deserialize, Serialize};
use std::{fs::File, ops::Range};

use crate::iupac_code::IupacCode;

type DNAstring = Vec<u8>;

/// A nucleotide sequence with a circularity flag. The sequence is stored
/// uppercase; symbols outside the IUPAC alphabet are replaced by `N` on
/// construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DnaSequence {
    seq: DNAstring,
    name: Option<String>,
    circular: bool,
}

impl DnaSequence {
    pub fn from_sequence(sequence: &str) -> DnaSequence {
        Self::from_u8(sequence.as_bytes())
    }

    pub fn from_u8(s: &[u8]) -> DnaSequence {
        Self {
            seq: Self::validate_dna_sequence(s),
            name: None,
            circular: false,
        }
    }

    pub fn from_fasta_file(filename: &str) -> Result<Vec<DnaSequence>> {
        let file = File::open(filename)?;
        Ok(fasta::Reader::new(file)
            .records()
            .filter_map(|record| record.ok())
            .map(|record| DnaSequence::from_fasta_record(&record))
            .collect())
    }

    pub fn from_fasta_record(record: &fasta::Record) -> DnaSequence {
        let mut ret = Self::from_u8(record.seq());
        ret.name = Some(record.id().to_string());
        ret
    }

    pub fn validate_dna_sequence(v: &[u8]) -> DNAstring {
        v.iter()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| {
                if IupacCode::is_valid_letter(*c) {
                    c.to_ascii_uppercase()
                } else {
                    b'N'
                }
            })
            .collect()
    }

    #[inline(always)]
    pub fn forward(&self) -> &[u8] {
        &self.seq
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn name(&self) -> &Option<String> {
        &self.name
    }

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    #[inline(always)]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    pub fn set_circular(&mut self, is_circular: bool) {
        self.circular = is_circular;
    }

    #[inline(always)]
    pub fn get_base_or_n(&self, i: usize) -> u8 {
        let i = if self.circular && !self.seq.is_empty() {
            i % self.len()
        } else {
            i
        };
        self.seq.get(i).unwrap_or(&b'N').to_owned()
    }

    /// Bases in `range`, wrapping around the origin for circular
    /// sequences when `range.end` exceeds the length.
    pub fn get_range_safe(&self, range: Range<usize>) -> Option<DNAstring> {
        let Range { start, end } = range;
        if start >= end {
            return Some(vec![]);
        }
        if self.circular {
            if start >= self.len() || end - start > self.len() {
                return None;
            }
            Some((start..end).map(|i| self.seq[i % self.len()]).collect())
        } else {
            if end > self.len() {
                return None;
            }
            Some(self.seq[start..end].to_vec())
        }
    }
}
