// Baseline KPI derivation.
//
// Targets come from a fixed policy table applied to extracted baselines:
//   CO2 emissions          x0.65   (35% reduction)
//   Opex per bus           x0.85
//   Ridership per bus      x1.20
//   Electrification rate   +30pp, capped at 100
//   Fleet availability     +5pp, capped at 98 (baseline default 85)
//   Service frequency      -3min, floored at 5 (baseline default 15)
//   CO2 per 1000 pax       x0.60
// A KPI whose inputs are missing is silently skipped; no partial records.
use crate::extract::{keyword_metric, ExtractionDefaults};
use crate::types::{BaselineKpi, SectorProfile};
use crate::util::format_number;

pub fn build_baseline_kpis(
    ops_fleet_text: &str,
    profile: &SectorProfile,
    defaults: &ExtractionDefaults,
) -> Vec<BaselineKpi> {
    let mut kpis = Vec::new();

    let fleet_total = profile.fleet_total.unwrap_or(0);
    let fleet_electric = profile.fleet_electric.unwrap_or(0);
    let daily_ridership = profile.daily_ridership.unwrap_or(0);
    let annual_opex = profile.annual_opex_usd.unwrap_or(0.0);
    let annual_co2 = profile.annual_co2_tons.unwrap_or(0.0);

    if annual_co2 > 0.0 {
        let target = annual_co2 * 0.65;
        kpis.push(BaselineKpi {
            name: "Annual CO2 Emissions".to_string(),
            baseline_value: format_number(annual_co2, 0),
            unit: "tons/year".to_string(),
            target_value: format_number(target, 0),
            category: "environment".to_string(),
            notes: "Target: 35% reduction through fleet electrification".to_string(),
        });
    }

    if fleet_total > 0 && annual_opex > 0.0 {
        let cost_per_bus = annual_opex / fleet_total as f64;
        kpis.push(BaselineKpi {
            name: "Operating Cost per Bus".to_string(),
            baseline_value: format_number(cost_per_bus, 0),
            unit: "USD/year".to_string(),
            target_value: format_number(cost_per_bus * 0.85, 0),
            category: "operations".to_string(),
            notes: "Target: 15% reduction through efficiency and electrification".to_string(),
        });
    }

    if fleet_total > 0 && daily_ridership > 0 {
        let ridership_per_bus = daily_ridership as f64 / fleet_total as f64;
        kpis.push(BaselineKpi {
            name: "Daily Ridership per Bus".to_string(),
            baseline_value: format_number(ridership_per_bus, 0),
            unit: "passengers/day".to_string(),
            target_value: format_number(ridership_per_bus * 1.20, 0),
            category: "operations".to_string(),
            notes: "Target: 20% increase through improved service quality".to_string(),
        });
    }

    if fleet_total > 0 {
        let electrification_pct = (fleet_electric as f64 / fleet_total as f64) * 100.0;
        let target = (electrification_pct + 30.0).min(100.0);
        kpis.push(BaselineKpi {
            name: "Fleet Electrification Rate".to_string(),
            baseline_value: format!("{electrification_pct:.1}"),
            unit: "%".to_string(),
            target_value: format!("{target:.1}"),
            category: "environment".to_string(),
            notes: "Target: 30 percentage point increase over project period".to_string(),
        });
    }

    let availability = keyword_metric(
        ops_fleet_text,
        &["availability", "uptime"],
        defaults.availability_pct,
    );
    kpis.push(BaselineKpi {
        name: "Fleet Availability".to_string(),
        baseline_value: format!("{availability:.1}"),
        unit: "%".to_string(),
        target_value: format!("{:.1}", (availability + 5.0).min(98.0)),
        category: "operations".to_string(),
        notes: "Target: 5 percentage point improvement".to_string(),
    });

    let frequency = keyword_metric(
        ops_fleet_text,
        &["frequency", "headway", "minutes"],
        defaults.frequency_minutes,
    );
    kpis.push(BaselineKpi {
        name: "Average Service Frequency".to_string(),
        baseline_value: format!("{frequency:.0}"),
        unit: "minutes".to_string(),
        target_value: format!("{:.0}", (frequency - 3.0).max(5.0)),
        category: "service".to_string(),
        notes: "Target: Reduce average wait time by 3 minutes".to_string(),
    });

    if annual_co2 > 0.0 && daily_ridership > 0 {
        let annual_ridership = daily_ridership as f64 * 365.0;
        let emissions_per_1k = (annual_co2 / annual_ridership) * 1000.0;
        kpis.push(BaselineKpi {
            name: "CO2 per 1000 Passengers".to_string(),
            baseline_value: format!("{emissions_per_1k:.2}"),
            unit: "tons".to_string(),
            target_value: format!("{:.2}", emissions_per_1k * 0.60),
            category: "environment".to_string(),
            notes: "Target: 40% reduction per passenger through electrification".to_string(),
        });
    }

    kpis
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> SectorProfile {
        SectorProfile {
            fleet_total: Some(320),
            fleet_electric: Some(12),
            daily_ridership: Some(250_000),
            annual_opex_usd: Some(14_400_000.0),
            annual_co2_tons: Some(18_200.0),
            ..SectorProfile::default()
        }
    }

    fn find<'a>(kpis: &'a [BaselineKpi], name: &str) -> &'a BaselineKpi {
        kpis.iter().find(|k| k.name == name).expect(name)
    }

    #[test]
    fn co2_kpi_uses_65_percent_target() {
        let kpis = build_baseline_kpis("", &full_profile(), &Default::default());
        let co2 = find(&kpis, "Annual CO2 Emissions");
        assert_eq!(co2.baseline_value, "18,200");
        assert_eq!(co2.target_value, "11,830");
        assert_eq!(co2.unit, "tons/year");
        assert_eq!(co2.category, "environment");
    }

    #[test]
    fn ratio_kpis_derive_from_fleet_total() {
        let kpis = build_baseline_kpis("", &full_profile(), &Default::default());
        let opex = find(&kpis, "Operating Cost per Bus");
        assert_eq!(opex.baseline_value, "45,000");
        assert_eq!(opex.target_value, "38,250");

        let ridership = find(&kpis, "Daily Ridership per Bus");
        assert_eq!(ridership.baseline_value, "781");
        assert_eq!(ridership.target_value, "938"); // 781.25 * 1.2 = 937.5 -> even

        let elec = find(&kpis, "Fleet Electrification Rate");
        assert_eq!(elec.baseline_value, "3.8"); // 12/320 = 3.75%
        assert_eq!(elec.target_value, "33.8");
    }

    #[test]
    fn electrification_target_caps_at_100() {
        let profile = SectorProfile {
            fleet_total: Some(100),
            fleet_electric: Some(90),
            ..SectorProfile::default()
        };
        let kpis = build_baseline_kpis("", &profile, &Default::default());
        let elec = find(&kpis, "Fleet Electrification Rate");
        assert_eq!(elec.baseline_value, "90.0");
        assert_eq!(elec.target_value, "100.0");
    }

    #[test]
    fn availability_and_frequency_always_emitted_with_defaults() {
        let profile = SectorProfile::default();
        let kpis = build_baseline_kpis("", &profile, &Default::default());
        // No fleet, ridership or emissions data: only the two defaulted KPIs.
        assert_eq!(kpis.len(), 2);

        let avail = find(&kpis, "Fleet Availability");
        assert_eq!(avail.baseline_value, "85.0");
        assert_eq!(avail.target_value, "90.0");

        let freq = find(&kpis, "Average Service Frequency");
        assert_eq!(freq.baseline_value, "15");
        assert_eq!(freq.target_value, "12");
    }

    #[test]
    fn availability_extracted_from_ops_text_caps_at_98() {
        let kpis = build_baseline_kpis(
            "fleet availability: 96% with average headway of 8 minutes",
            &SectorProfile::default(),
            &Default::default(),
        );
        let avail = find(&kpis, "Fleet Availability");
        assert_eq!(avail.baseline_value, "96.0");
        assert_eq!(avail.target_value, "98.0");

        let freq = find(&kpis, "Average Service Frequency");
        assert_eq!(freq.baseline_value, "8");
        assert_eq!(freq.target_value, "5");
    }

    #[test]
    fn per_passenger_emissions_kpi() {
        let kpis = build_baseline_kpis("", &full_profile(), &Default::default());
        let per_pax = find(&kpis, "CO2 per 1000 Passengers");
        // 18,200 / (250,000 * 365) * 1000 = 0.1995...
        assert_eq!(per_pax.baseline_value, "0.20");
        assert_eq!(per_pax.target_value, "0.12");
    }
}
