// Concept note assembly.
//
// Pure function from the structured analysis outputs to a fixed-order
// Markdown document. Every section renders its heading even when its input
// is empty; missing data degrades to an explicit pending placeholder, never
// to an omitted section or a panic.
use chrono::Utc;

use crate::benchmarks::{international_benchmarks, peer_deal_structures};
use crate::finance::{cashflow_schedule, sort_options_for_display};
use crate::types::{
    BaselineKpi, EsgCategory, FinancialOption, GapAnalysisItem, NeedSummary, SectorProfile,
    SustainabilityProfile,
};
use crate::util::{format_int, format_millions, format_number};

pub struct ReportInputs<'a> {
    pub case_name: &'a str,
    pub country: &'a str,
    pub sector: &'a str,
    pub need: &'a NeedSummary,
    pub profile: &'a SectorProfile,
    pub gaps: &'a [GapAnalysisItem],
    pub kpis: &'a [BaselineKpi],
    pub options: &'a [FinancialOption],
    pub sustainability: Option<&'a SustainabilityProfile>,
}

/// Render the full concept note as Markdown.
pub fn generate_concept_note(inputs: &ReportInputs) -> String {
    let mut sorted_options = inputs.options.to_vec();
    sort_options_for_display(&mut sorted_options);

    let sections = [
        build_header(inputs),
        build_executive_summary(inputs, &sorted_options),
        build_need_assessment(inputs.need),
        build_sector_profile(inputs.profile),
        build_gap_analysis(inputs.gaps),
        build_kpis(inputs.kpis),
        build_financial_options(&sorted_options),
        build_comparable_deals(),
        build_sustainability(inputs.sustainability),
        build_recommendation(&sorted_options),
    ];
    sections.join("\n\n")
}

fn build_header(inputs: &ReportInputs) -> String {
    let date_str = Utc::now().format("%B %d, %Y");
    format!(
        "# Concept Note\n\n\
         **Project:** {}  \n\
         **Country:** {}  \n\
         **Sector:** {}  \n\
         **Date:** {}  \n\
         **Status:** Concept Review Phase\n\n\
         ---",
        non_empty(inputs.case_name, "Untitled Project"),
        non_empty(inputs.country, "Not specified"),
        non_empty(inputs.sector, "Not specified"),
        date_str
    )
}

fn non_empty<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn build_executive_summary(inputs: &ReportInputs, sorted: &[FinancialOption]) -> String {
    let principal = sorted
        .first()
        .map(|o| o.principal_amount_usd)
        .unwrap_or(0.0);
    let principal_str = if principal > 0.0 {
        format_millions(principal)
    } else {
        "amount to be determined".to_string()
    };
    let best_option = sorted
        .first()
        .map(|o| o.name.as_str())
        .unwrap_or("to be determined");
    let problem = inputs
        .need
        .problem_summary
        .as_deref()
        .unwrap_or("addressing urban transport modernization needs");

    format!(
        "## 1. Executive Summary\n\n\
         This Concept Note presents **{}** in **{}** for financing consideration.\n\n\
         **Financing Request:** {}\n\n\
         **Project Objective:** {}\n\n\
         **Recommended Financing Structure:** Based on the 60/40 scoring methodology \
         (60% repayment capacity, 40% rate competitiveness), the analysis indicates \
         **{}** as the preferred option.\n\n\
         This project supports the Green Economy Transition mandate and the country's \
         climate commitments.",
        non_empty(inputs.case_name, "the proposed project"),
        non_empty(inputs.country, "the country"),
        principal_str,
        problem,
        best_option
    )
}

fn build_need_assessment(need: &NeedSummary) -> String {
    let problem = need
        .problem_summary
        .as_deref()
        .unwrap_or("The project addresses critical urban transport infrastructure needs.");
    let amount_str = match need.requested_amount_usd {
        Some(amount) if amount > 0.0 => format_millions(amount),
        _ => "To be determined".to_string(),
    };

    format!(
        "## 2. Need Assessment\n\n\
         ### 2.1 Problem Statement\n{problem}\n\n\
         ### 2.2 Requested Financing\n**Amount:** {amount_str}\n\n\
         ### 2.3 Expected Outcomes\n\
         - Modernization of urban bus fleet\n\
         - Reduction in carbon emissions and local air pollution\n\
         - Improved public transport service quality\n\
         - Enhanced financial sustainability of transport operations"
    )
}

fn opt_count(v: Option<i64>) -> String {
    v.map(|n| format_int(n)).unwrap_or_else(|| "N/A".to_string())
}

fn build_sector_profile(profile: &SectorProfile) -> String {
    let ridership = opt_count(profile.daily_ridership);
    let opex = match profile.annual_opex_usd {
        Some(v) if v > 0.0 => format!("${:.1}M", v / 1e6),
        _ => "N/A".to_string(),
    };
    let co2 = profile
        .annual_co2_tons
        .map(|v| format_number(v, 0))
        .unwrap_or_else(|| "N/A".to_string());
    let notes = profile.notes.as_deref().unwrap_or(
        "Fleet requires significant modernization to meet climate targets and service quality standards.",
    );

    format!(
        "## 3. Sector Profile - Baseline\n\n\
         ### 3.1 Fleet Composition\n\n\
         | Metric | Current Value |\n\
         |--------|---------------|\n\
         | Total Fleet | {} buses |\n\
         | Diesel Buses | {} |\n\
         | Hybrid Buses | {} |\n\
         | Electric Buses | {} |\n\
         | Depots | {} |\n\n\
         ### 3.2 Operational Metrics\n\n\
         | Metric | Current Value |\n\
         |--------|---------------|\n\
         | Daily Ridership | {} passengers |\n\
         | Annual OPEX | {} |\n\
         | Annual CO2 Emissions | {} tons |\n\n\
         ### 3.3 Key Observations\n{}",
        opt_count(profile.fleet_total),
        opt_count(profile.fleet_diesel),
        opt_count(profile.fleet_hybrid),
        opt_count(profile.fleet_electric),
        opt_count(profile.depots),
        ridership,
        opex,
        co2,
        notes
    )
}

fn build_gap_analysis(gaps: &[GapAnalysisItem]) -> String {
    if gaps.is_empty() {
        return "## 4. Gap Analysis\n\n\
                *Gap analysis pending - requires sector profile data.*"
            .to_string();
    }

    let rows: Vec<String> = gaps
        .iter()
        .map(|g| {
            format!(
                "| {} | {} | {} | {} | {} | {} |",
                g.indicator, g.local_value, g.benchmark_city, g.benchmark_value, g.gap_delta,
                g.comparability
            )
        })
        .collect();

    let city_context: Vec<String> = international_benchmarks()
        .iter()
        .map(|b| format!("- **{}** ({}): {}", b.city, b.country, b.notes))
        .collect();

    format!(
        "## 4. Gap Analysis\n\n\
         Comparison with international peer cities to identify improvement opportunities.\n\n\
         | Indicator | Local Value | Benchmark City | Benchmark Value | Gap | Comparability |\n\
         |-----------|-------------|----------------|-----------------|-----|---------------|\n\
         {}\n\n\
         ### 4.1 Key Findings\n\
         - Significant electrification gap compared to leading cities\n\
         - Opportunity to leapfrog to zero-emission technology\n\
         - Infrastructure gaps addressable through project investments\n\n\
         ### 4.2 Benchmark City Context\n\
         {}",
        rows.join("\n"),
        city_context.join("\n")
    )
}

fn build_kpis(kpis: &[BaselineKpi]) -> String {
    if kpis.is_empty() {
        return "## 5. Baseline KPIs\n\n\
                *KPI analysis pending - requires operational data.*"
            .to_string();
    }

    let rows: Vec<String> = kpis
        .iter()
        .map(|k| {
            format!(
                "| {} | {} | {} | {} | {} |",
                k.name, k.baseline_value, k.unit, k.target_value, k.category
            )
        })
        .collect();

    format!(
        "## 5. Baseline KPIs\n\n\
         Key performance indicators for project monitoring and evaluation.\n\n\
         | KPI | Baseline | Unit | Target | Category |\n\
         |-----|----------|------|--------|----------|\n\
         {}\n\n\
         ### 5.1 Monitoring Framework\n\
         Progress against targets will be monitored through:\n\
         - Quarterly operational reports\n\
         - Annual environmental audits\n\
         - Mid-term and completion evaluations",
        rows.join("\n")
    )
}

fn option_label(idx: usize) -> char {
    (b'A' + idx as u8) as char
}

fn build_financial_options(sorted: &[FinancialOption]) -> String {
    if sorted.is_empty() {
        return "## 6. Financing Options and Trade-offs\n\n\
                *Financial analysis pending - requires input data.*"
            .to_string();
    }

    let summary_rows: Vec<String> = sorted
        .iter()
        .enumerate()
        .map(|(idx, opt)| {
            format!(
                "| {} | {} | {}y / {}y grace | {:.2}% | {:.1} | {} | {} |",
                option_label(idx),
                opt.name,
                opt.tenor_years,
                opt.grace_period_years,
                opt.all_in_rate_bps / 100.0,
                opt.total_score,
                opt.pros,
                opt.cons
            )
        })
        .collect();

    let narratives: Vec<String> = sorted
        .iter()
        .enumerate()
        .map(|(idx, opt)| {
            let pros_short = opt.pros.split(';').next().unwrap_or("").trim();
            let cons_short = opt.cons.split(';').next().unwrap_or("").trim();
            format!(
                "- **Option {}** ({}): {}. Trade-off: {}.",
                option_label(idx),
                opt.name,
                pros_short,
                cons_short
            )
        })
        .collect();

    let details: Vec<String> = sorted
        .iter()
        .enumerate()
        .map(|(idx, opt)| option_detail(idx, opt))
        .collect();

    format!(
        "## 6. Financing Options and Trade-offs\n\n\
         The following financing structures have been identified for this project. Scores \
         are based on a 60/40 weighting of repayment capacity (60%) and interest rate \
         attractiveness (40%).\n\n\
         ### 6.1 Summary Comparison\n\n\
         | Option | Instrument | Tenor / Grace | All-in Rate | Total Score | Key Benefits | Key Trade-offs |\n\
         |--------|------------|---------------|-------------|-------------|--------------|----------------|\n\
         {}\n\n\
         ### Decision Framework\n\n\
         Based on the scoring, **{}** currently ranks highest. However, the choice involves \
         important trade-offs:\n\n\
         {}\n\n\
         **The review committee is invited to select the most appropriate option or request \
         a variation based on policy and risk considerations.**\n\n\
         {}",
        summary_rows.join("\n"),
        sorted[0].name,
        narratives.join("\n"),
        details.join("\n\n")
    )
}

fn option_detail(idx: usize, opt: &FinancialOption) -> String {
    let principal_str = if opt.principal_amount_usd > 0.0 {
        format!("${:.0}M", opt.principal_amount_usd / 1e6)
    } else {
        "N/A".to_string()
    };
    let schedule = cashflow_schedule(
        opt.principal_amount_usd,
        opt.tenor_years,
        opt.grace_period_years,
        opt.all_in_rate_bps,
    );

    format!(
        "### 6.{} Option {}: {}\n\n\
         | Parameter | Value |\n\
         |-----------|-------|\n\
         | Instrument Type | {} |\n\
         | Principal Amount | {} |\n\
         | Tenor | {} years |\n\
         | Grace Period | {} years |\n\
         | All-in Rate | {:.0} bps |\n\
         | Indicative Total Interest | ${} |\n\
         | Indicative Total Repayment | ${} |\n\n\
         **Scoring (60% Repayment / 40% Rate):**\n\
         - Repayment Score: **{:.1}**/100\n\
         - Rate Score: **{:.1}**/100\n\
         - **Total Score: {:.1}/100**\n\n\
         **Key Benefits:** {}\n\n\
         **Key Trade-offs:** {}",
        idx + 2,
        option_label(idx),
        opt.name,
        opt.instrument_type,
        principal_str,
        opt.tenor_years,
        opt.grace_period_years,
        opt.all_in_rate_bps,
        format_number(schedule.total_interest, 0),
        format_number(schedule.total_repayment, 0),
        opt.repayment_score,
        opt.rate_score,
        opt.total_score,
        opt.pros,
        opt.cons
    )
}

fn build_comparable_deals() -> String {
    let rows: Vec<String> = peer_deal_structures()
        .iter()
        .map(|d| {
            format!(
                "| {} | {} | {} | {} | {}y / {}y | {:.0} | {} |",
                d.deal_name,
                d.country,
                d.year,
                format_millions(d.amount_usd),
                d.tenor_years,
                d.grace_years,
                d.rate_bps,
                d.lender
            )
        })
        .collect();

    format!(
        "## 7. Comparable Transactions\n\n\
         Recent peer deals in the region and sector, for pricing context.\n\n\
         | Deal | Country | Year | Amount | Tenor / Grace | Rate (bps) | Lender |\n\
         |------|---------|------|--------|---------------|------------|--------|\n\
         {}",
        rows.join("\n")
    )
}

fn category_blurb(category: EsgCategory) -> &'static str {
    match category {
        EsgCategory::A => "Significant potential impacts requiring comprehensive assessment",
        EsgCategory::B => "Moderate impacts, manageable through standard mitigation measures",
        EsgCategory::C => "Minimal or no adverse impacts",
    }
}

fn build_sustainability(sustainability: Option<&SustainabilityProfile>) -> String {
    let Some(s) = sustainability else {
        return "## 8. Sustainability & ESG\n\n\
                *Sustainability assessment pending - requires ESG documentation.*"
            .to_string();
    };

    let co2_str = match s.co2_reduction_tons {
        Some(v) if v > 0.0 => format!("{} tons/year", format_number(v, 0)),
        _ => "To be quantified".to_string(),
    };

    format!(
        "## 8. Sustainability & ESG\n\n\
         ### 8.1 Environmental & Social Category\n\
         **Category {}** - {}\n\n\
         ### 8.2 Environmental Benefits\n\n\
         | Impact Area | Expected Outcome |\n\
         |-------------|------------------|\n\
         | CO2 Reduction | {} |\n\
         | Air Quality (PM2.5) | {} |\n\n\
         ### 8.3 Social Impact\n{}\n\n\
         ### 8.4 Policy Alignment\n{}\n\n\
         ### 8.5 Key Risks\n{}\n\n\
         ### 8.6 Mitigation Measures\n{}",
        s.category,
        category_blurb(s.category),
        co2_str,
        s.pm25_reduction,
        s.accessibility_notes,
        s.policy_alignment_notes,
        s.key_risks,
        s.mitigations
    )
}

fn build_recommendation(sorted: &[FinancialOption]) -> String {
    let best = sorted
        .first()
        .map(|o| o.name.as_str())
        .unwrap_or("the preferred financing structure (pending analysis)");

    format!(
        "## 9. Recommendation\n\n\
         ### 9.1 Preferred Option\n\
         Based on the 60/40 scoring analysis, **{best}** achieves the highest combined \
         score and is recommended for further development.\n\n\
         ### 9.2 Next Steps\n\
         1. Review committee decision\n\
         2. If approved, proceed to detailed appraisal phase\n\
         3. Engage with government counterparts on preferred structure\n\
         4. Initiate due diligence and environmental assessment\n\n\
         ### 9.3 Decision Required\n\
         **The review committee is asked to choose one of the presented options or propose \
         an alternative structure.**\n\n\
         ---\n\n\
         *This Concept Note was generated by the concept review tool. All figures are \
         preliminary and subject to verification during appraisal.*"
    )
}
