use enzymes::Enzymes;
use lazy_static::lazy_static;

pub mod digest;
pub mod dna_sequence;
pub mod enzymes;
pub mod error;
pub mod iupac_code;
pub mod ligation;
pub mod motif;
pub mod overhang;
pub mod restriction_enzyme;

lazy_static! {
    // Builtin restriction enzyme table, read-only
    pub static ref ENZYMES: Enzymes = Enzymes::default();
}
