use redigest::digest::{digest, fragment_lengths_total, Fragment};
use redigest::dna_sequence::DnaSequence;
use redigest::ligation::{analyze_fragments, CompatOptions, CompatibilityResult};
use redigest::overhang::EndInfo;
use redigest::restriction_enzyme::{CutSite, RestrictionEnzyme};
use redigest::ENZYMES;
use serde::Serialize;
use std::env;

#[derive(Serialize)]
struct DigestReport {
    sequence_name: Option<String>,
    sequence_length: usize,
    circular: bool,
    enzymes: Vec<String>,
    cut_sites: Vec<CutSiteSummary>,
    fragments: Vec<Fragment>,
    compatibility: Vec<CompatibilityResult>,
}

#[derive(Serialize)]
struct CutSiteSummary {
    enzyme: String,
    position: usize,
}

fn usage() {
    eprintln!(
        "Usage:\n  \
  redigest_cli [options] --enzymes NAME[,NAME...] SEQUENCE|FILE.fasta\n  \
  redigest_cli --list-enzymes\n\n\
Options:\n  \
  --circular            treat the sequence as a circular molecule\n  \
  --include-blunt       report blunt-blunt ligation pairs\n  \
  --min-overhang N      minimum overhang length for sticky ends (default 1)\n  \
  --directional-only    only report directional (non-palindromic) pairs\n  \
  --json                print the full report as JSON"
    );
}

fn list_enzymes() {
    for re in ENZYMES.restriction_enzymes() {
        let cuts = match (re.cut_top, re.cut_bottom) {
            (Some(top), Some(bottom)) => format!("{top}/{bottom}"),
            _ => "?".to_string(),
        };
        println!("{:<10} {:<10} {:<7} {}", re.name, re.site, cuts, re.overhang);
    }
}

fn load_sequence(input: &str) -> Result<DnaSequence, String> {
    let lower = input.to_lowercase();
    if [".fasta", ".fa", ".txt"].iter().any(|ext| lower.ends_with(ext)) {
        let mut seqs = DnaSequence::from_fasta_file(input)
            .map_err(|e| format!("Could not read '{input}': {e}"))?;
        if seqs.is_empty() {
            return Err(format!("No sequence records in '{input}'"));
        }
        Ok(seqs.remove(0))
    } else {
        Ok(DnaSequence::from_sequence(input))
    }
}

fn pick_enzymes(names: &str) -> Result<Vec<RestrictionEnzyme>, String> {
    let mut picked = vec![];
    for name in names.split(',').filter(|n| !n.is_empty()) {
        match ENZYMES.get(name) {
            Some(re) => picked.push(re.to_owned()),
            None => {
                return Err(format!(
                    "Enzyme '{name}' not found; try --list-enzymes for the builtin table"
                ))
            }
        }
    }
    if picked.is_empty() {
        return Err("No enzymes given".to_string());
    }
    Ok(picked)
}

fn end_label(info: &EndInfo, enzyme: &Option<String>) -> String {
    let enzyme = enzyme.as_deref().unwrap_or("natural");
    match &info.sticky_seq {
        Some(seq) => format!("{enzyme} {} {seq}", info.overhang),
        None => format!("{enzyme} {}", info.overhang),
    }
}

fn print_report(dna: &DnaSequence, sites: &[CutSite], fragments: &[Fragment], pairs: &[CompatibilityResult]) {
    let topology = if dna.is_circular() { "circular" } else { "linear" };
    let name = dna.name().as_deref().unwrap_or("(unnamed)");
    println!("Sequence: {name}, {} bp, {topology}", dna.len());

    println!("\nCut sites ({}):", sites.len());
    for site in sites {
        println!("  {:<10} @ {}", site.enzyme.name, site.position);
    }

    println!("\nFragments ({}):", fragments.len());
    for (i, fragment) in fragments.iter().enumerate() {
        println!(
            "  #{i} [{}..{}) {} bp  left: {}  right: {}",
            fragment.start,
            fragment.end,
            fragment.length,
            end_label(&fragment.left_end, &fragment.left_enzyme),
            end_label(&fragment.right_end, &fragment.right_enzyme),
        );
    }
    println!("  total {} bp", fragment_lengths_total(fragments));

    println!("\nCompatible end pairs ({}):", pairs.len());
    for pair in pairs {
        println!(
            "  frag{}:{} ({}) <-> frag{}:{} ({})  {}  strength {:.2}",
            pair.end_a.fragment,
            pair.end_a.side,
            end_label(&pair.end_a.info, &pair.end_a.enzyme),
            pair.end_b.fragment,
            pair.end_b.side,
            end_label(&pair.end_b.info, &pair.end_b.enzyme),
            pair.note,
            pair.strength,
        );
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let mut circular = false;
    let mut json = false;
    let mut options = CompatOptions::default();
    let mut enzyme_names: Option<String> = None;
    let mut sequence_input: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                usage();
                return Ok(());
            }
            "--list-enzymes" => {
                list_enzymes();
                return Ok(());
            }
            "--circular" => circular = true,
            "--json" => json = true,
            "--include-blunt" => options.include_blunt = true,
            "--directional-only" => options.require_directional = true,
            "--min-overhang" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or("--min-overhang needs a value".to_string())?;
                options.min_overhang = value
                    .parse()
                    .map_err(|_| format!("Bad --min-overhang value '{value}'"))?;
            }
            "--enzymes" => {
                i += 1;
                enzyme_names = Some(
                    args.get(i)
                        .ok_or("--enzymes needs a value".to_string())?
                        .to_owned(),
                );
            }
            other if other.starts_with("--") => {
                return Err(format!("Unknown option '{other}'"));
            }
            other => {
                if sequence_input.replace(other.to_owned()).is_some() {
                    return Err("More than one sequence given".to_string());
                }
            }
        }
        i += 1;
    }

    let sequence_input = match sequence_input {
        Some(s) => s,
        None => {
            usage();
            return Err("No sequence given".to_string());
        }
    };
    let enzyme_names = enzyme_names.ok_or("No enzymes given, use --enzymes".to_string())?;

    let mut dna = load_sequence(&sequence_input)?;
    dna.set_circular(circular);
    let enzymes = pick_enzymes(&enzyme_names)?;

    let sites = redigest::digest::cut_sites(&dna, &enzymes);
    let fragments = digest(&dna, &enzymes);
    let pairs = analyze_fragments(&fragments, &options);

    if json {
        let report = DigestReport {
            sequence_name: dna.name().to_owned(),
            sequence_length: dna.len(),
            circular: dna.is_circular(),
            enzymes: enzymes.iter().map(|re| re.name.to_owned()).collect(),
            cut_sites: sites
                .iter()
                .map(|site| CutSiteSummary {
                    enzyme: site.enzyme.name.to_owned(),
                    position: site.position,
                })
                .collect(),
            fragments,
            compatibility: pairs,
        };
        let text = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Could not serialize report: {e}"))?;
        println!("{text}");
    } else {
        print_report(&dna, &sites, &fragments, &pairs);
    }
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();
    if let Err(e) = run(&args) {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
