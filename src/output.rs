use crate::error::ReviewError;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &str, rows: &[T]) -> Result<(), ReviewError> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), ReviewError> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_text(path: &str, content: &str) -> Result<(), ReviewError> {
    std::fs::write(path, content)?;
    Ok(())
}

/// Print a Markdown-style preview of up to `max_rows` rows.
pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BaselineKpi;

    #[test]
    fn csv_export_serializes_all_rows() {
        let rows = vec![
            BaselineKpi {
                name: "Annual CO2 Emissions".to_string(),
                baseline_value: "18,200".to_string(),
                unit: "tons/year".to_string(),
                target_value: "11,830".to_string(),
                category: "environment".to_string(),
                notes: "Target: 35% reduction through fleet electrification".to_string(),
            },
            BaselineKpi {
                name: "Fleet Availability".to_string(),
                baseline_value: "85.0".to_string(),
                unit: "%".to_string(),
                target_value: "90.0".to_string(),
                category: "operations".to_string(),
                notes: "Target: 5 percentage point improvement".to_string(),
            },
        ];

        let path = std::env::temp_dir().join("concept_review_kpis_test.csv");
        let path_str = path.to_str().unwrap();
        write_csv(path_str, &rows).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        // Header plus one line per row.
        assert_eq!(content.lines().count(), 3);
        assert!(content.contains("Annual CO2 Emissions"));
        assert!(content.contains("\"18,200\""));
    }

    #[test]
    fn json_export_round_trips_a_case_record() {
        let mut case = crate::types::Case::new(
            7,
            "Metro E-Bus Programme".to_string(),
            "Kenya".to_string(),
            "Urban Transport".to_string(),
        );
        case.documents.need_assessment_text = "Requesting $50 million.".to_string();

        let path = std::env::temp_dir().join("concept_review_case_record_test.json");
        let path_str = path.to_str().unwrap();
        write_json(path_str, &case).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let parsed: crate::types::Case = serde_json::from_str(&content).unwrap();
        assert_eq!(parsed.id, 7);
        assert_eq!(parsed.name, "Metro E-Bus Programme");
        assert_eq!(parsed.documents.need_assessment_text, "Requesting $50 million.");
    }
}
