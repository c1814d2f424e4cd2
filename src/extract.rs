// Numeric field extraction from unstructured proposal text.
//
// Every extractor walks an ordered list of regex patterns (keyword-before-
// number and number-before-keyword orderings) and returns the first numeric
// match. Thousands separators, decimal points, a trailing `%` and mixed case
// are all tolerated. Nothing in here ever fails: no match, empty text, or a
// non-numeric capture all resolve to `None` (or the caller's default), and a
// capture that does not parse is silently skipped in favour of the next
// pattern.
use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback values used when a field cannot be extracted from text.
///
/// Passed explicitly into the builders instead of living as module-level
/// constants, so tests and callers can override them per case.
#[derive(Debug, Clone)]
pub struct ExtractionDefaults {
    pub principal_usd: f64,
    pub availability_pct: f64,
    pub frequency_minutes: f64,
    pub co2_reduction_pct: f64,
    pub opex_per_bus_usd: f64,
    pub ridership_per_bus: f64,
}

impl Default for ExtractionDefaults {
    fn default() -> Self {
        ExtractionDefaults {
            principal_usd: 50_000_000.0,
            availability_pct: 85.0,
            frequency_minutes: 15.0,
            co2_reduction_pct: 35.0,
            opex_per_bus_usd: 45_000.0,
            ridership_per_bus: 500.0,
        }
    }
}

fn re(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).unwrap()
}

/// Try each `(pattern, multiplier)` pair in order; return the first capture
/// group that parses as a number, scaled by the pattern's multiplier.
fn scan(patterns: &[(Regex, f64)], text: &str) -> Option<f64> {
    if text.trim().is_empty() {
        return None;
    }
    for (pattern, multiplier) in patterns {
        if let Some(caps) = pattern.captures(text) {
            if let Some(m) = caps.get(1) {
                let cleaned = m.as_str().replace([',', ' '], "");
                if let Ok(v) = cleaned.parse::<f64>() {
                    return Some(v * multiplier);
                }
                // Non-numeric capture: fall through to the next pattern.
            }
        }
    }
    None
}

fn scan_count(patterns: &[(Regex, f64)], text: &str) -> Option<i64> {
    scan(patterns, text).map(|v| v as i64)
}

static FLEET_TOTAL: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"(?:total|fleet|operates?)\s*(?:of)?\s*([\d,]+)\s*(?:buses|bus|vehicles)"), 1.0),
        (re(r"([\d,]+)\s*(?:buses|bus|vehicles)\s*(?:in\s+)?(?:total|fleet|operation)"), 1.0),
        (re(r"fleet\s*(?:size|of)?\s*:?\s*([\d,]+)"), 1.0),
    ]
});

static FLEET_DIESEL: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"diesel\s*(?:buses|fleet)?\s*:?\s*([\d,]+)"), 1.0),
        (re(r"([\d,]+)[ \t]+(?:diesel|conventional)\s*(?:buses|bus|vehicles)"), 1.0),
    ]
});

static FLEET_HYBRID: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"hybrid\s*(?:buses|fleet)?\s*:?\s*([\d,]+)"), 1.0),
        (re(r"([\d,]+)[ \t]+hybrid\s*(?:buses|bus|vehicles)"), 1.0),
    ]
});

static FLEET_ELECTRIC: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"(?:electric|e-bus|EV)\s*(?:buses|fleet)?\s*:?\s*([\d,]+)"), 1.0),
        (re(r"([\d,]+)[ \t]+(?:electric|e-bus|EV)\s*(?:buses|bus|vehicles)"), 1.0),
    ]
});

static DEPOTS: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"(?:depots?|terminals?|garages?)\s*:?\s*([\d,]+)"), 1.0),
        (re(r"([\d,]+)[ \t]+(?:depots?|terminals?|garages?)"), 1.0),
    ]
});

static RIDERSHIP: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (
            re(r"([\d,]+(?:\.\d+)?)\s*(?:million|M)\s*(?:passengers?|riders?|ridership)\s*(?:per\s+)?(?:day|daily)"),
            1_000_000.0,
        ),
        (
            re(r"(?:daily|per\s+day)\s+(?:passengers?|riders?|ridership)\s*(?:of)?\s*:?\s*([\d,]+(?:\.\d+)?)\s*(?:million|M)"),
            1_000_000.0,
        ),
        (
            re(r"(?:daily|per\s+day)\s+(?:passengers?|riders?|ridership)\s*(?:of)?\s*:?\s*([\d,]+)"),
            1.0,
        ),
        (re(r"([\d,]+)\s*(?:passengers?|riders?)\s*(?:per\s+)?(?:day|daily)"), 1.0),
    ]
});

static OPEX: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (
            re(r"(?:annual|yearly)\s*(?:operating|operational)?\s*(?:costs?|expenses?|opex)\s*(?:of)?\s*:?\s*\$?\s*([\d,]+(?:\.\d+)?)\s*(?:million|M)"),
            1_000_000.0,
        ),
        (
            re(r"\$?\s*([\d,]+(?:\.\d+)?)\s*(?:million|M)\s*(?:annual|yearly)?\s*(?:operating|operational)?\s*(?:costs?|opex)"),
            1_000_000.0,
        ),
        (re(r"opex\s*:?\s*\$?\s*([\d,]+(?:\.\d+)?)\s*(?:million|M)"), 1_000_000.0),
        (re(r"opex\s*:?\s*\$?\s*([\d,]+(?:\.\d+)?)"), 1.0),
    ]
});

static CO2: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"([\d,]+(?:\.\d+)?)\s*(?:tons?|tonnes?)\s*(?:of\s+)?(?:CO2|carbon)"), 1.0),
        (re(r"(?:CO2|carbon)\s*(?:emissions?)?\s*(?:of)?\s*:?\s*([\d,]+(?:\.\d+)?)\s*(?:tons?|tonnes?)"), 1.0),
        (re(r"(?:annual|yearly)\s*(?:CO2|carbon)\s*:?\s*([\d,]+(?:\.\d+)?)"), 1.0),
    ]
});

// Dollar amounts with million/billion suffixes, "$"/"USD" markers in either
// position. Millions are tried first; billions only match on their suffix.
static MONEY: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"\$\s*([\d,]+(?:\.\d+)?)\s*(?:million|m\b)"), 1_000_000.0),
        (re(r"usd\s*([\d,]+(?:\.\d+)?)\s*(?:million|m\b)"), 1_000_000.0),
        (re(r"([\d,]+(?:\.\d+)?)\s*(?:million|m\b)\s*(?:usd|dollars?)"), 1_000_000.0),
        (re(r"\$\s*([\d,]+(?:\.\d+)?)\s*(?:billion|b\b)"), 1_000_000_000.0),
        (re(r"([\d,]+(?:\.\d+)?)\s*(?:billion|b\b)\s*(?:usd|dollars?)"), 1_000_000_000.0),
    ]
});

// Principal hints in financial-data text only ever use the million forms.
static PRINCIPAL: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"\$\s*([\d,]+(?:\.\d+)?)\s*(?:million|m\b)"), 1_000_000.0),
        (re(r"usd\s*([\d,]+(?:\.\d+)?)\s*(?:million|m\b)"), 1_000_000.0),
        (re(r"([\d,]+(?:\.\d+)?)\s*(?:million|m\b)\s*(?:usd|dollars?)"), 1_000_000.0),
    ]
});

static REDUCTION_PCT: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"(\d+(?:\.\d+)?)\s*%?\s*(?:reduction|decrease|cut)\s*(?:in\s+)?(?:CO2|carbon|emissions?)"), 1.0),
        (re(r"(?:reduce|decrease|cut)\s*(?:CO2|carbon|emissions?)?\s*(?:by\s+)?(\d+(?:\.\d+)?)\s*%"), 1.0),
    ]
});

static PM25_PCT: Lazy<Vec<(Regex, f64)>> = Lazy::new(|| {
    vec![
        (re(r"PM2?\.?5\s*(?:reduction|decrease)?\s*(?:of\s+)?(\d+(?:\.\d+)?)\s*%"), 1.0),
        (re(r"(\d+(?:\.\d+)?)\s*%\s*(?:reduction|decrease)\s*(?:in\s+)?PM2?\.?5"), 1.0),
    ]
});

pub fn extract_fleet_total(text: &str) -> Option<i64> {
    scan_count(&FLEET_TOTAL, text)
}

pub fn extract_fleet_diesel(text: &str) -> Option<i64> {
    scan_count(&FLEET_DIESEL, text)
}

pub fn extract_fleet_hybrid(text: &str) -> Option<i64> {
    scan_count(&FLEET_HYBRID, text)
}

pub fn extract_fleet_electric(text: &str) -> Option<i64> {
    scan_count(&FLEET_ELECTRIC, text)
}

pub fn extract_depots(text: &str) -> Option<i64> {
    scan_count(&DEPOTS, text)
}

pub fn extract_daily_ridership(text: &str) -> Option<i64> {
    scan_count(&RIDERSHIP, text)
}

pub fn extract_annual_opex_usd(text: &str) -> Option<f64> {
    scan(&OPEX, text)
}

pub fn extract_annual_co2_tons(text: &str) -> Option<f64> {
    scan(&CO2, text)
}

/// Dollar amount scaled to absolute USD (million/billion suffixes).
pub fn extract_money_usd(text: &str) -> Option<f64> {
    scan(&MONEY, text)
}

/// Principal override from financial-data text, or the caller's default.
pub fn extract_principal(text: &str, default: f64) -> f64 {
    scan(&PRINCIPAL, text).unwrap_or(default)
}

/// CO2 reduction target percentage, if one is stated.
pub fn extract_reduction_pct(text: &str) -> Option<f64> {
    scan(&REDUCTION_PCT, text)
}

/// PM2.5 reduction percentage, if one is stated.
pub fn extract_pm25_pct(text: &str) -> Option<f64> {
    scan(&PM25_PCT, text)
}

/// Look for a number adjacent to any of `keywords` (either ordering, with an
/// optional `%` suffix). Falls back to `default` when nothing matches.
pub fn keyword_metric(text: &str, keywords: &[&str], default: f64) -> f64 {
    if text.trim().is_empty() {
        return default;
    }
    for keyword in keywords {
        let kw = regex::escape(keyword);
        let patterns = [
            re(&format!(r"{kw}\s*[:\-]?\s*([\d.]+)\s*%?")),
            re(&format!(r"([\d.]+)\s*%?\s*{kw}")),
        ];
        for pattern in &patterns {
            if let Some(caps) = pattern.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Ok(v) = m.as_str().parse::<f64>() {
                        return v;
                    }
                }
            }
        }
    }
    default
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fleet_counts_both_orderings() {
        assert_eq!(extract_fleet_total("The city operates 320 buses."), Some(320));
        assert_eq!(extract_fleet_total("Fleet size: 1,240"), Some(1240));
        assert_eq!(extract_fleet_diesel("280 diesel buses remain"), Some(280));
        assert_eq!(extract_fleet_diesel("Diesel: 280"), Some(280));
        assert_eq!(extract_fleet_electric("EV buses: 12"), Some(12));
        assert_eq!(extract_depots("served from 4 depots"), Some(4));
    }

    #[test]
    fn ridership_scales_millions() {
        assert_eq!(
            extract_daily_ridership("carries 1.2 million passengers per day"),
            Some(1_200_000)
        );
        assert_eq!(
            extract_daily_ridership("around 250,000 passengers daily"),
            Some(250_000)
        );
    }

    #[test]
    fn money_handles_markers_and_suffixes() {
        assert_eq!(extract_money_usd("requesting $50 million"), Some(50_000_000.0));
        assert_eq!(extract_money_usd("USD 75.5 million loan"), Some(75_500_000.0));
        assert_eq!(extract_money_usd("a $1.2 billion programme"), Some(1_200_000_000.0));
        assert_eq!(extract_money_usd("120 million USD envelope"), Some(120_000_000.0));
        assert_eq!(extract_money_usd("no figures here"), None);
    }

    #[test]
    fn opex_and_co2() {
        assert_eq!(
            extract_annual_opex_usd("annual operating costs of $14.5 million"),
            Some(14_500_000.0)
        );
        assert_eq!(
            extract_annual_co2_tons("emitting 18,200 tons of CO2 annually"),
            Some(18_200.0)
        );
    }

    #[test]
    fn keyword_metric_falls_back_to_default() {
        assert_eq!(keyword_metric("availability: 91%", &["availability"], 85.0), 91.0);
        assert_eq!(keyword_metric("fleet uptime 88 %", &["uptime"], 85.0), 88.0);
        assert_eq!(keyword_metric("", &["availability"], 85.0), 85.0);
        assert_eq!(keyword_metric("nothing relevant", &["availability"], 85.0), 85.0);
    }

    #[test]
    fn empty_text_never_matches() {
        assert_eq!(extract_fleet_total(""), None);
        assert_eq!(extract_money_usd("   "), None);
    }
}
