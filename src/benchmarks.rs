// Fixed reference datasets standing in for external market-data systems.
//
// The core reads these fresh on every invocation and treats them as a
// versionless snapshot; there is no fetching or caching. Peer-city figures
// are derived from IEA Global EV Outlook and city transport reports.
use serde::Serialize;
use std::fmt;

/// One peer city used in gap analysis.
#[derive(Debug, Clone)]
pub struct CityBenchmark {
    pub city: &'static str,
    pub country: &'static str,
    pub electrification_pct: f64,
    pub cost_per_bus_usd: f64,
    pub daily_ridership_per_bus: i64,
    pub depot_coverage_per_100_buses: f64,
    pub comparability: &'static str,
    pub notes: &'static str,
}

pub fn international_benchmarks() -> Vec<CityBenchmark> {
    vec![
        CityBenchmark {
            city: "Shenzhen",
            country: "China",
            electrification_pct: 100.0,
            cost_per_bus_usd: 32_000.0,
            daily_ridership_per_bus: 850,
            depot_coverage_per_100_buses: 2.5,
            comparability: "strong",
            notes: "First major city to achieve 100% e-bus fleet (2017)",
        },
        CityBenchmark {
            city: "London",
            country: "UK",
            electrification_pct: 35.0,
            cost_per_bus_usd: 45_000.0,
            daily_ridership_per_bus: 620,
            depot_coverage_per_100_buses: 1.8,
            comparability: "strong",
            notes: "Target: 100% zero-emission by 2034",
        },
        CityBenchmark {
            city: "Santiago",
            country: "Chile",
            electrification_pct: 20.0,
            cost_per_bus_usd: 38_000.0,
            daily_ridership_per_bus: 720,
            depot_coverage_per_100_buses: 1.5,
            comparability: "illustrative",
            notes: "Largest e-bus fleet in Latin America",
        },
        CityBenchmark {
            city: "Bogota",
            country: "Colombia",
            electrification_pct: 14.0,
            cost_per_bus_usd: 36_000.0,
            daily_ridership_per_bus: 680,
            depot_coverage_per_100_buses: 1.2,
            comparability: "illustrative",
            notes: "TransMilenio BRT electrification ongoing",
        },
    ]
}

/// Median all-in rates (basis points) for recent comparable transactions,
/// per instrument class.
#[derive(Debug, Clone)]
pub struct PeerMedianRates {
    pub sovereign_median: f64,
    pub subnational_median: f64,
    pub blended_median: f64,
    pub commercial_median: f64,
}

pub fn peer_median_rates() -> PeerMedianRates {
    PeerMedianRates {
        sovereign_median: 175.0,
        subnational_median: 280.0,
        blended_median: 200.0,
        commercial_median: 450.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxRisk {
    Low,
    Medium,
    High,
}

impl fmt::Display for FxRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FxRisk::Low => f.write_str("low"),
            FxRisk::Medium => f.write_str("medium"),
            FxRisk::High => f.write_str("high"),
        }
    }
}

/// Repayment capacity indicators for the sovereign and the city authority.
#[derive(Debug, Clone)]
pub struct RepaymentIndicators {
    pub sovereign_dscr: f64,
    pub sovereign_fx_risk: FxRisk,
    pub sovereign_debt_ratio: f64,
    pub city_dscr: f64,
    pub city_fx_risk: FxRisk,
    pub city_debt_ratio: f64,
}

pub fn repayment_indicators() -> RepaymentIndicators {
    RepaymentIndicators {
        sovereign_dscr: 1.8,
        sovereign_fx_risk: FxRisk::Medium,
        sovereign_debt_ratio: 0.55,
        city_dscr: 1.4,
        city_fx_risk: FxRisk::High,
        city_debt_ratio: 0.35,
    }
}

/// Base market rates. Display-only: the all-in green rate appears in the
/// phase-3 reasoning log but plays no part in option scoring.
#[derive(Debug, Clone)]
pub struct MarketRates {
    pub eur_swap_10y: f64,
    pub green_bond_spread_10y: f64,
}

impl MarketRates {
    pub fn all_in_green_rate(&self) -> f64 {
        self.eur_swap_10y + self.green_bond_spread_10y
    }

    pub fn all_in_green_rate_pct(&self) -> f64 {
        self.all_in_green_rate() * 100.0
    }
}

pub fn market_rates() -> MarketRates {
    MarketRates {
        eur_swap_10y: 0.02,
        green_bond_spread_10y: 0.006,
    }
}

/// A comparable transaction shown in the concept note for context.
#[derive(Debug, Clone, Serialize)]
pub struct PeerDeal {
    pub deal_name: &'static str,
    pub country: &'static str,
    pub year: u32,
    pub amount_usd: f64,
    pub instrument: &'static str,
    pub tenor_years: u32,
    pub grace_years: u32,
    pub rate_bps: f64,
    pub lender: &'static str,
}

pub fn peer_deal_structures() -> Vec<PeerDeal> {
    vec![
        PeerDeal {
            deal_name: "Lagos BRT Modernization",
            country: "Nigeria",
            year: 2023,
            amount_usd: 200_000_000.0,
            instrument: "sovereign_loan",
            tenor_years: 20,
            grace_years: 5,
            rate_bps: 185.0,
            lender: "AfDB",
        },
        PeerDeal {
            deal_name: "Addis Ababa Light Rail Extension",
            country: "Ethiopia",
            year: 2022,
            amount_usd: 150_000_000.0,
            instrument: "sovereign_loan",
            tenor_years: 25,
            grace_years: 7,
            rate_bps: 165.0,
            lender: "World Bank",
        },
        PeerDeal {
            deal_name: "Cape Town MyCiTi Fleet",
            country: "South Africa",
            year: 2023,
            amount_usd: 100_000_000.0,
            instrument: "municipal_bond",
            tenor_years: 15,
            grace_years: 3,
            rate_bps: 320.0,
            lender: "Development Bank of Southern Africa",
        },
        PeerDeal {
            deal_name: "Cairo E-Bus Pilot",
            country: "Egypt",
            year: 2024,
            amount_usd: 75_000_000.0,
            instrument: "blended_finance",
            tenor_years: 18,
            grace_years: 4,
            rate_bps: 210.0,
            lender: "EBRD + GCF",
        },
    ]
}
