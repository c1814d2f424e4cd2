// Builders for the two upstream text parses: the need assessment and the
// sector profile baseline. Both are pure functions of their input text;
// every field is extracted independently and failure to find one field
// never blocks another.
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extract;
use crate::types::{NeedSummary, SectorProfile};
use crate::util::split_sentences;

// Countries of operation recognised in need-assessment text.
const COUNTRIES: &[&str] = &[
    "Kenya", "Nigeria", "South Africa", "Egypt", "Morocco", "Ghana",
    "Ethiopia", "Tanzania", "Uganda", "Rwanda", "Senegal", "Ivory Coast",
    "Poland", "Romania", "Bulgaria", "Ukraine", "Turkey", "Kazakhstan",
    "Uzbekistan", "Georgia", "Armenia", "Azerbaijan", "Mongolia",
    "Jordan", "Lebanon", "Tunisia", "Albania", "Serbia", "Montenegro",
    "North Macedonia", "Bosnia", "Kosovo", "Moldova", "Belarus",
    "Tajikistan", "Kyrgyzstan", "Turkmenistan",
];

static PROJECT_NAME_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r#"(?i)(?:project|programme|program)[\s:]+["']?([^"'\n.]{10,80})["']?"#)
            .unwrap(),
        Regex::new(r#"(?i)(?:titled?|named?|called)[\s:]+["']?([^"'\n.]{10,80})["']?"#).unwrap(),
        // Names ending in a transport keyword.
        Regex::new(
            r"(?i)([A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\s+(?:E-Bus|Electric Bus|Fleet|Transport|Infrastructure)\s*(?:Project|Programme|Program)?)",
        )
        .unwrap(),
    ]
});

/// Parse need-assessment text (email/minutes content) into headline facts.
pub fn parse_need_assessment(text: &str) -> NeedSummary {
    let mut result = NeedSummary::default();
    if text.trim().is_empty() {
        return result;
    }

    result.requested_amount_usd = extract::extract_money_usd(text);

    let lower = text.to_lowercase();
    result.country = COUNTRIES
        .iter()
        .find(|c| lower.contains(&c.to_lowercase()))
        .map(|c| c.to_string());

    for pattern in PROJECT_NAME_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                result.project_name = Some(m.as_str().trim().chars().take(100).collect());
                break;
            }
        }
    }

    // Problem summary: first three substantive sentences.
    let sentences: Vec<String> = split_sentences(text)
        .into_iter()
        .filter(|s| s.len() > 20)
        .collect();
    if !sentences.is_empty() {
        let mut summary = sentences[..sentences.len().min(3)].join(". ");
        if !summary.ends_with('.') {
            summary.push('.');
        }
        result.problem_summary = Some(summary);
    }

    result
}

// Sentences mentioning any of these feed the profile's notes field.
const NOTE_KEYWORDS: &[&str] = &[
    "challenge", "issue", "problem", "goal", "target", "plan", "upgrade", "moderniz",
];

/// Parse sector-profile text into a fleet/operations baseline.
pub fn build_sector_profile(text: &str) -> SectorProfile {
    let mut profile = SectorProfile::default();
    if text.trim().is_empty() {
        return profile;
    }

    profile.fleet_total = extract::extract_fleet_total(text);
    profile.fleet_diesel = extract::extract_fleet_diesel(text);
    profile.fleet_hybrid = extract::extract_fleet_hybrid(text);
    profile.fleet_electric = extract::extract_fleet_electric(text);
    profile.depots = extract::extract_depots(text);
    profile.daily_ridership = extract::extract_daily_ridership(text);
    profile.annual_opex_usd = extract::extract_annual_opex_usd(text);
    profile.annual_co2_tons = extract::extract_annual_co2_tons(text);

    let key_notes: Vec<String> = text
        .split('.')
        .map(str::trim)
        .filter(|s| {
            let lower = s.to_lowercase();
            s.len() > 20 && NOTE_KEYWORDS.iter().any(|kw| lower.contains(kw))
        })
        .take(3)
        .map(str::to_string)
        .collect();
    if !key_notes.is_empty() {
        profile.notes = Some(key_notes.join(". "));
    }

    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTOR_TEXT: &str = "The city operates 320 buses in total, of which \
        280 diesel buses, 28 hybrid buses and EV buses: 12, served from 4 depots. \
        The network carries 250,000 passengers daily with annual operating costs \
        of $14.5 million, emitting 18,200 tons of CO2 per year. A key challenge \
        is the ageing diesel fleet. The city plans to modernize depots by 2030.";

    #[test]
    fn sector_profile_extracts_all_fields_independently() {
        let p = build_sector_profile(SECTOR_TEXT);
        assert_eq!(p.fleet_total, Some(320));
        assert_eq!(p.fleet_diesel, Some(280));
        assert_eq!(p.fleet_hybrid, Some(28));
        assert_eq!(p.fleet_electric, Some(12));
        assert_eq!(p.depots, Some(4));
        assert_eq!(p.daily_ridership, Some(250_000));
        assert_eq!(p.annual_opex_usd, Some(14_500_000.0));
        assert_eq!(p.annual_co2_tons, Some(18_200.0));
        let notes = p.notes.expect("keyword sentences should be captured");
        assert!(notes.contains("challenge"));
        assert!(notes.contains("modernize"));
    }

    #[test]
    fn empty_text_yields_empty_profile() {
        let p = build_sector_profile("   ");
        assert!(p.fleet_total.is_none());
        assert!(p.annual_co2_tons.is_none());
        assert!(p.notes.is_none());
    }

    #[test]
    fn partial_extraction_is_accepted() {
        // Sub-counts need not reconcile with the total; missing fields stay None.
        let p = build_sector_profile("A fleet of 100 buses, including 90 diesel buses.");
        assert_eq!(p.fleet_total, Some(100));
        assert_eq!(p.fleet_diesel, Some(90));
        assert!(p.fleet_electric.is_none());
        assert!(p.daily_ridership.is_none());
    }

    #[test]
    fn need_assessment_headline_facts() {
        let text = "The Ministry of Transport of Kenya requests $50 million for the \
            Nairobi Electric Bus Project. The current diesel fleet causes severe air \
            quality problems in the metropolitan area. Service reliability has declined \
            for five consecutive years.";
        let need = parse_need_assessment(text);
        assert_eq!(need.requested_amount_usd, Some(50_000_000.0));
        assert_eq!(need.country.as_deref(), Some("Kenya"));
        assert!(need.project_name.is_some());
        let summary = need.problem_summary.unwrap();
        assert!(summary.starts_with("The Ministry"));
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn project_name_resolves_from_lowercase_titles() {
        // No "project:"/"titled" phrasing, so only the keyword pattern can
        // resolve the name; it must not require title case.
        let need = parse_need_assessment(
            "approval sought for the downtown e-bus project. Details to follow.",
        );
        assert_eq!(
            need.project_name.as_deref(),
            Some("approval sought for the downtown e-bus project")
        );
    }

    #[test]
    fn need_assessment_empty_input() {
        let need = parse_need_assessment("");
        assert!(need.project_name.is_none());
        assert!(need.country.is_none());
        assert!(need.problem_summary.is_none());
        assert!(need.requested_amount_usd.is_none());
    }
}
