use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Fleet and operations baseline extracted from the sector profile text.
///
/// Every field is extracted independently; absence of one never blocks
/// another, and `None` means "not found in the text", not zero. The fleet
/// sub-counts are not validated against `fleet_total` -- partial or
/// inconsistent extractions are accepted as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorProfile {
    pub fleet_total: Option<i64>,
    pub fleet_diesel: Option<i64>,
    pub fleet_hybrid: Option<i64>,
    pub fleet_electric: Option<i64>,
    pub depots: Option<i64>,
    pub daily_ridership: Option<i64>,
    pub annual_opex_usd: Option<f64>,
    pub annual_co2_tons: Option<f64>,
    pub notes: Option<String>,
}

/// Headline facts parsed out of the need-assessment document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeedSummary {
    pub project_name: Option<String>,
    pub country: Option<String>,
    pub problem_summary: Option<String>,
    pub requested_amount_usd: Option<f64>,
}

/// One row of the benchmark comparison. Values are display strings computed
/// once at creation time; raw numbers are never stored on the record.
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct GapAnalysisItem {
    #[tabled(rename = "Indicator")]
    pub indicator: String,
    #[tabled(rename = "Local")]
    pub local_value: String,
    #[tabled(rename = "Benchmark City")]
    pub benchmark_city: String,
    #[tabled(rename = "Benchmark")]
    pub benchmark_value: String,
    #[tabled(rename = "Gap")]
    pub gap_delta: String,
    #[tabled(rename = "Comparability")]
    pub comparability: String,
    #[tabled(skip)]
    pub comment: String,
}

/// Baseline/target KPI pair. The target is derived from the baseline by a
/// fixed policy ratio at creation time and never recomputed afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct BaselineKpi {
    #[tabled(rename = "KPI")]
    pub name: String,
    #[tabled(rename = "Baseline")]
    pub baseline_value: String,
    #[tabled(rename = "Unit")]
    pub unit: String,
    #[tabled(rename = "Target")]
    pub target_value: String,
    #[tabled(rename = "Category")]
    pub category: String,
    #[tabled(skip)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    SovereignLoan,
    GuaranteedSubnational,
    CoFinancing,
}

impl fmt::Display for InstrumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InstrumentType::SovereignLoan => "sovereign_loan",
            InstrumentType::GuaranteedSubnational => "guaranteed_subnational",
            InstrumentType::CoFinancing => "co_financing",
        };
        f.write_str(s)
    }
}

/// A scored financing instrument. `total_score` is always
/// `0.6 * repayment_score + 0.4 * rate_score`, rounded to one decimal;
/// the three score fields are only ever written together.
#[derive(Debug, Clone, Serialize, Deserialize, Tabled)]
pub struct FinancialOption {
    #[tabled(rename = "Option")]
    pub name: String,
    #[tabled(rename = "Instrument")]
    pub instrument_type: InstrumentType,
    #[tabled(rename = "Currency")]
    pub currency: String,
    #[tabled(rename = "Tenor (y)")]
    pub tenor_years: u32,
    #[tabled(rename = "Grace (y)")]
    pub grace_period_years: u32,
    #[tabled(rename = "Rate (bps)")]
    pub all_in_rate_bps: f64,
    #[tabled(skip)]
    pub principal_amount_usd: f64,
    #[tabled(rename = "Repayment")]
    pub repayment_score: f64,
    #[tabled(rename = "Rate Score")]
    pub rate_score: f64,
    #[tabled(rename = "Total")]
    pub total_score: f64,
    #[tabled(skip)]
    pub pros: String,
    #[tabled(skip)]
    pub cons: String,
}

/// Environmental/social impact category (EBRD-style classification).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EsgCategory {
    A,
    B,
    C,
}

impl fmt::Display for EsgCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EsgCategory::A => f.write_str("A"),
            EsgCategory::B => f.write_str("B"),
            EsgCategory::C => f.write_str("C"),
        }
    }
}

/// ESG narrative assembled from keyword lookups over the sustainability
/// text. The list fields are semicolon-joined fragments, never empty --
/// a fixed default list fills in when no keyword matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SustainabilityProfile {
    pub category: EsgCategory,
    pub co2_reduction_tons: Option<f64>,
    pub pm25_reduction: String,
    pub accessibility_notes: String,
    pub policy_alignment_notes: String,
    pub key_risks: String,
    pub mitigations: String,
}

/// One entry of the per-phase reasoning log shown to reviewers. Advisory
/// documentation of a run; never consumed by other components.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThinkingStep {
    pub step: u32,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseStatus {
    New,
    InReview,
    Approved,
    Rejected,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CaseStatus::New => "NEW",
            CaseStatus::InReview => "IN_REVIEW",
            CaseStatus::Approved => "APPROVED",
            CaseStatus::Rejected => "REJECTED",
        };
        f.write_str(s)
    }
}

/// The six named free-text inputs attached to a case. Empty string is a
/// valid, always-handled value for every slot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaseDocuments {
    pub need_assessment_text: String,
    pub sector_profile_text: String,
    pub benchmark_text: String,
    pub ops_fleet_text: String,
    pub financial_data_text: String,
    pub sustainability_text: String,
}

/// A single financing-proposal review unit, tracked end-to-end.
///
/// The four phase flags are independent booleans checked individually by
/// the workflow guard ("phase 3 requires phase 2 complete"). All derived
/// artifacts are owned by the case and replaced wholesale when their phase
/// re-runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Case {
    pub id: u64,
    pub name: String,
    pub country: String,
    pub sector: String,
    pub status: CaseStatus,
    pub documents: CaseDocuments,

    pub phase1_completed: bool,
    pub phase2_completed: bool,
    pub phase3_completed: bool,
    pub phase4_completed: bool,
    pub phase1_thinking: Option<String>,
    pub phase2_thinking: Option<String>,
    pub phase3_thinking: Option<String>,
    pub phase4_thinking: Option<String>,

    pub need_summary: Option<NeedSummary>,
    pub sector_profile: Option<SectorProfile>,
    pub gap_items: Vec<GapAnalysisItem>,
    pub kpis: Vec<BaselineKpi>,
    pub financial_options: Vec<FinancialOption>,
    pub sustainability: Option<SustainabilityProfile>,
    pub concept_note_markdown: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Case {
    pub fn new(id: u64, name: String, country: String, sector: String) -> Self {
        let now = Utc::now();
        Case {
            id,
            name,
            country,
            sector,
            status: CaseStatus::New,
            documents: CaseDocuments::default(),
            phase1_completed: false,
            phase2_completed: false,
            phase3_completed: false,
            phase4_completed: false,
            phase1_thinking: None,
            phase2_thinking: None,
            phase3_thinking: None,
            phase4_thinking: None,
            need_summary: None,
            sector_profile: None,
            gap_items: Vec::new(),
            kpis: Vec::new(),
            financial_options: Vec::new(),
            sustainability: None,
            concept_note_markdown: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn phase_completed(&self, phase: u8) -> bool {
        match phase {
            1 => self.phase1_completed,
            2 => self.phase2_completed,
            3 => self.phase3_completed,
            4 => self.phase4_completed,
            _ => false,
        }
    }
}
