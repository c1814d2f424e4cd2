// Keyword-driven ESG classification and narrative assembly.
//
// Category A/B/C comes from counting fixed high-risk and low-risk keyword
// hits (case-insensitive substring containment). Narrative fields scan an
// ordered list of (keyword, fragment) pairs, cap the results, and fall back
// to a fixed default list so no field is ever empty.
use crate::extract;
use crate::types::{EsgCategory, SustainabilityProfile};

const HIGH_RISK_KEYWORDS: &[&str] = &[
    "resettlement",
    "displacement",
    "indigenous",
    "protected area",
    "critical habitat",
    "cultural heritage",
    "large scale",
    "significant impact",
];

const LOW_RISK_KEYWORDS: &[&str] = &[
    "minimal impact",
    "no displacement",
    "existing infrastructure",
    "brownfield",
    "rehabilitation",
    "upgrade only",
];

// Ordered (keyword, fragment) tables; evaluation order is the priority.
const ACCESSIBILITY_FRAGMENTS: &[(&str, &str)] = &[
    ("low-floor", "Low-floor buses improve accessibility for elderly and disabled passengers"),
    ("wheelchair", "Wheelchair-accessible vehicles included in fleet specifications"),
    ("audio", "Audio announcements enhance accessibility for visually impaired"),
    ("women", "Women's safety features considered in design"),
    ("affordable", "Fare structure maintains affordability for low-income users"),
];

const ACCESSIBILITY_DEFAULTS: &[&str] = &[
    "New electric buses will include low-floor design for accessibility",
    "Route planning to prioritize underserved communities",
    "Fare integration to maintain affordability",
];

const POLICY_BASE: &[&str] = &[
    "Aligned with National Climate Action Plan and NDC commitments",
    "Supports national sustainable transport objectives",
    "Consistent with EBRD Green Economy Transition approach",
];

const RISK_FRAGMENTS: &[(&str, &str)] = &[
    ("land acquisition", "Land acquisition delays for depot expansion"),
    ("procurement", "Procurement complexity for e-bus technology"),
    ("capacity", "Institutional capacity constraints for project management"),
    ("tariff", "Electricity tariff volatility affecting operating costs"),
    ("supply chain", "Supply chain risks for battery and component sourcing"),
];

const RISK_DEFAULTS: &[&str] = &[
    "Grid capacity constraints may limit charging infrastructure deployment",
    "Foreign exchange risk on USD-denominated repayments",
    "Technology obsolescence risk for early-generation e-buses",
    "Labor transition risk for diesel maintenance workforce",
];

const MITIGATION_FRAGMENTS: &[(&str, &str)] = &[
    ("training", "Comprehensive training program for operators and maintenance staff"),
    ("pilot", "Pilot phase to test technology before full deployment"),
    ("guarantee", "Performance guarantees from equipment suppliers"),
    ("insurance", "Insurance coverage for key operational risks"),
    ("monitoring", "Robust M&E framework with clear KPIs"),
];

const MITIGATION_DEFAULTS: &[&str] = &[
    "Technical assistance for grid capacity assessment and planning",
    "Phased deployment approach to manage technology risk",
    "Capacity building program for city transport authority",
    "Worker retraining program for diesel mechanics to EV maintenance",
];

/// Build the ESG profile from sustainability text and the phase-1 baseline
/// CO2 figure. Fully deterministic: identical text yields identical output.
pub fn build_sustainability_profile(
    text: &str,
    baseline_co2_tons: f64,
    default_reduction_pct: f64,
) -> SustainabilityProfile {
    let lower = text.to_lowercase();

    let co2_reduction_tons = if baseline_co2_tons > 0.0 {
        let reduction_pct =
            extract::extract_reduction_pct(text).unwrap_or(default_reduction_pct);
        Some(baseline_co2_tons * (reduction_pct / 100.0))
    } else {
        None
    };

    SustainabilityProfile {
        category: determine_category(&lower),
        co2_reduction_tons,
        pm25_reduction: pm25_reduction(text),
        accessibility_notes: fragments_or_default(&lower, ACCESSIBILITY_FRAGMENTS, ACCESSIBILITY_DEFAULTS, 3),
        policy_alignment_notes: policy_notes(&lower),
        key_risks: fragments_or_default(&lower, RISK_FRAGMENTS, RISK_DEFAULTS, 4),
        mitigations: fragments_or_default(&lower, MITIGATION_FRAGMENTS, MITIGATION_DEFAULTS, 4),
    }
}

/// Two or more high-risk hits make category A; failing that, two or more
/// low-risk hits make category C; everything else defaults to B.
fn determine_category(lower: &str) -> EsgCategory {
    let high = HIGH_RISK_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    let low = LOW_RISK_KEYWORDS.iter().filter(|kw| lower.contains(*kw)).count();
    if high >= 2 {
        EsgCategory::A
    } else if low >= 2 {
        EsgCategory::C
    } else {
        EsgCategory::B
    }
}

fn pm25_reduction(text: &str) -> String {
    match extract::extract_pm25_pct(text) {
        Some(pct) => format!("{pct}% reduction in PM2.5 emissions"),
        None => "Estimated 25-40% reduction in local PM2.5 emissions from fleet electrification"
            .to_string(),
    }
}

fn fragments_or_default(
    lower: &str,
    table: &[(&str, &str)],
    defaults: &[&str],
    cap: usize,
) -> String {
    let matched: Vec<&str> = table
        .iter()
        .filter(|(kw, _)| lower.contains(kw))
        .map(|(_, fragment)| *fragment)
        .take(cap)
        .collect();
    if matched.is_empty() {
        defaults[..defaults.len().min(cap)].join("; ")
    } else {
        matched.join("; ")
    }
}

fn policy_notes(lower: &str) -> String {
    let mut alignments: Vec<&str> = POLICY_BASE.to_vec();
    if lower.contains("paris") {
        alignments.push("Contributes to Paris Agreement goals");
    }
    if lower.contains("sdg") || lower.contains("sustainable development") {
        alignments.push("Advances SDG 11 (Sustainable Cities) and SDG 13 (Climate Action)");
    }
    alignments[..alignments.len().min(4)].join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_high_risk_hits_make_category_a() {
        let p = build_sustainability_profile(
            "The corridor requires resettlement of informal settlements and crosses a protected area.",
            0.0,
            35.0,
        );
        assert_eq!(p.category, EsgCategory::A);
    }

    #[test]
    fn two_low_risk_hits_make_category_c() {
        let p = build_sustainability_profile(
            "Works are limited to existing infrastructure on a brownfield site.",
            0.0,
            35.0,
        );
        assert_eq!(p.category, EsgCategory::C);
    }

    #[test]
    fn mixed_or_empty_text_defaults_to_b() {
        assert_eq!(build_sustainability_profile("", 0.0, 35.0).category, EsgCategory::B);
        // One high-risk hit is not enough for A.
        let p = build_sustainability_profile("Some displacement is possible.", 0.0, 35.0);
        assert_eq!(p.category, EsgCategory::B);
    }

    #[test]
    fn co2_reduction_uses_extracted_or_default_percentage() {
        let p = build_sustainability_profile(
            "The project targets a 40% reduction in CO2 emissions.",
            18_200.0,
            35.0,
        );
        assert_eq!(p.co2_reduction_tons, Some(18_200.0 * 0.40));

        let p = build_sustainability_profile("No numbers here.", 18_200.0, 35.0);
        assert_eq!(p.co2_reduction_tons, Some(18_200.0 * 0.35));

        // Without a baseline there is nothing to scale.
        let p = build_sustainability_profile("40% reduction in CO2", 0.0, 35.0);
        assert_eq!(p.co2_reduction_tons, None);
    }

    #[test]
    fn narrative_fields_never_empty() {
        let p = build_sustainability_profile("", 0.0, 35.0);
        assert!(!p.pm25_reduction.is_empty());
        assert!(!p.accessibility_notes.is_empty());
        assert!(!p.policy_alignment_notes.is_empty());
        assert!(!p.key_risks.is_empty());
        assert!(!p.mitigations.is_empty());
        // Defaults are capped lists joined with "; ".
        assert_eq!(p.key_risks.matches("; ").count(), 3);
        assert_eq!(p.accessibility_notes.matches("; ").count(), 2);
    }

    #[test]
    fn keyword_fragments_respect_order_and_cap() {
        let text = "Plans include wheelchair access, audio announcements, low-floor \
                    vehicles and affordable fares.";
        let p = build_sustainability_profile(text, 0.0, 35.0);
        let notes: Vec<&str> = p.accessibility_notes.split("; ").collect();
        assert_eq!(notes.len(), 3);
        // Table order, not text order: low-floor entries come first.
        assert!(notes[0].starts_with("Low-floor"));
        assert!(notes[1].starts_with("Wheelchair"));
        assert!(notes[2].starts_with("Audio"));
    }

    #[test]
    fn policy_notes_pick_up_paris_and_sdg() {
        let p = build_sustainability_profile(
            "Aligned with the Paris Agreement and the SDG agenda.",
            0.0,
            35.0,
        );
        assert!(p.policy_alignment_notes.contains("Paris Agreement goals"));
        // Cap of 4 drops the SDG addition when Paris already matched.
        assert!(!p.policy_alignment_notes.contains("SDG 11"));
        assert_eq!(p.policy_alignment_notes.matches("; ").count(), 3);
    }

    #[test]
    fn classification_is_idempotent() {
        let text = "Resettlement near a cultural heritage site; 30% cut in emissions; training and pilot phases planned.";
        let a = build_sustainability_profile(text, 12_000.0, 35.0);
        let b = build_sustainability_profile(text, 12_000.0, 35.0);
        assert_eq!(a.category, b.category);
        assert_eq!(a.co2_reduction_tons, b.co2_reduction_tons);
        assert_eq!(a.key_risks, b.key_risks);
        assert_eq!(a.mitigations, b.mitigations);
    }
}
