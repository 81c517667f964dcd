use serde::{Deserialize, Serialize};

use crate::iupac_code;
use crate::restriction_enzyme::{OverhangKind, RestrictionEnzyme};

/// One cut-derived end of a fragment. `sticky_seq` holds the exposed
/// single-stranded bases read 5'→3'; it is absent for blunt or unknown
/// ends and its length always equals `overhang_len` otherwise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EndInfo {
    pub overhang: OverhangKind,
    pub overhang_len: usize,
    pub sticky_seq: Option<String>,
}

impl EndInfo {
    /// A non-enzymatic end, as on the outer boundaries of a linear
    /// molecule.
    pub fn natural() -> Self {
        Self {
            overhang: OverhangKind::Blunt,
            overhang_len: 0,
            sticky_seq: None,
        }
    }

    #[inline(always)]
    pub fn is_sticky(&self) -> bool {
        self.overhang_len > 0 && self.sticky_seq.as_ref().is_some_and(|s| !s.is_empty())
    }
}

/// The overhang an enzyme produces by construction, independent of any
/// concrete sequence. Where the cut geometry leaves the recognition site
/// (Type IIS), the template carries `N` placeholders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TheoreticalEnd {
    pub enzyme: String,
    pub kind: OverhangKind,
    pub k: usize,
    pub template: String,
    pub palindromic: bool,
}

// The exposed bases lie on the top-strand axis immediately after the
// top cut for a 5' overhang and immediately before it for a 3'
// overhang. Offsets outside the site itself read as N.
fn overhang_window(enzyme: &RestrictionEnzyme) -> Option<String> {
    let (top, bottom) = match (enzyme.cut_top, enzyme.cut_bottom) {
        (Some(top), Some(bottom)) if top != bottom => (top, bottom),
        _ => return None,
    };
    let k = top.abs_diff(bottom) as isize;
    let lo = match enzyme.overhang {
        OverhangKind::FivePrime => top,
        OverhangKind::ThreePrime => top - k,
        OverhangKind::Blunt | OverhangKind::Unknown => return None,
    };
    let site = enzyme.site.as_bytes();
    Some(
        (lo..lo + k)
            .map(|i| {
                usize::try_from(i)
                    .ok()
                    .and_then(|i| site.get(i).copied())
                    .unwrap_or(b'N') as char
            })
            .collect(),
    )
}

/// End descriptor for a cut made by this enzyme. Deterministic; invoked
/// once for the fragment ending at a cut and once for the fragment
/// starting there, yielding the same descriptor for both.
pub fn end_info(enzyme: &RestrictionEnzyme) -> EndInfo {
    match overhang_window(enzyme) {
        Some(seq) => EndInfo {
            overhang: enzyme.overhang,
            overhang_len: seq.len(),
            sticky_seq: Some(seq),
        },
        None => EndInfo {
            overhang: enzyme.overhang,
            overhang_len: 0,
            sticky_seq: None,
        },
    }
}

/// Sequence-independent end template for an enzyme, cacheable per enzyme.
pub fn theoretical_end(enzyme: &RestrictionEnzyme) -> TheoreticalEnd {
    let template = overhang_window(enzyme).unwrap_or_default();
    let palindromic = template == iupac_code::reverse_complement(&template);
    TheoreticalEnd {
        enzyme: enzyme.name.to_owned(),
        kind: enzyme.overhang,
        k: template.len(),
        template,
        palindromic,
    }
}
