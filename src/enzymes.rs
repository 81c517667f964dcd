use anyhow::{Context, Result};
use std::fs;

use crate::restriction_enzyme::RestrictionEnzyme;

const BUILTIN_ENZYMES_JSON: &str = include_str!("../assets/enzymes.json");

/// A read-only restriction enzyme table. Built once, then shared by
/// reference across digestions.
#[derive(Clone, Debug)]
pub struct Enzymes {
    restriction_enzymes: Vec<RestrictionEnzyme>,
    max_re_length: usize,
    has_nonpalindromic_restriction_enzymes: bool,
}

impl Enzymes {
    fn new(json_text: &str) -> Result<Self> {
        let rows: Vec<RestrictionEnzyme> = serde_json::from_str(json_text)?;
        let mut restriction_enzymes = Vec::with_capacity(rows.len());
        for mut re in rows {
            let name = re.name.to_owned();
            re.normalize()
                .with_context(|| format!("Bad restriction enzyme '{name}'"))?;
            restriction_enzymes.push(re);
        }
        let max_re_length = restriction_enzymes
            .iter()
            .map(|re| re.site.len())
            .max()
            .unwrap_or(0);
        let has_nonpalindromic_restriction_enzymes = restriction_enzymes
            .iter()
            .any(|re| !re.is_palindromic());
        Ok(Self {
            restriction_enzymes,
            max_re_length,
            has_nonpalindromic_restriction_enzymes,
        })
    }

    pub fn restriction_enzymes(&self) -> &Vec<RestrictionEnzyme> {
        &self.restriction_enzymes
    }

    pub fn restriction_enzymes_by_name(&self, names: &[&str]) -> Vec<RestrictionEnzyme> {
        self.restriction_enzymes
            .iter()
            .filter(|re| names.contains(&re.name.as_str()))
            .cloned()
            .collect()
    }

    pub fn get(&self, name: &str) -> Option<&RestrictionEnzyme> {
        self.restriction_enzymes
            .iter()
            .find(|re| re.name == name)
    }

    #[inline(always)]
    pub fn max_re_length(&self) -> usize {
        self.max_re_length
    }

    #[inline(always)]
    pub fn has_nonpalindromic_restriction_enzymes(&self) -> bool {
        self.has_nonpalindromic_restriction_enzymes
    }
}

impl Default for Enzymes {
    fn default() -> Self {
        Enzymes::new(BUILTIN_ENZYMES_JSON).unwrap()
    }
}

pub fn load_restriction_enzymes_from_json_text(json_text: &str) -> Result<Vec<RestrictionEnzyme>> {
    Ok(Enzymes::new(json_text)?.restriction_enzymes)
}

pub fn load_restriction_enzymes_from_path(path: &str) -> Result<Vec<RestrictionEnzyme>> {
    let text = fs::read_to_string(path)?;
    load_restriction_enzymes_from_json_text(&text)
}
