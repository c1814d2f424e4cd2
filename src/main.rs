// Entry point and high-level CLI flow.
//
// A small menu-driven console for walking financing proposals through the
// four-phase review:
// - Option [1] creates a case, [2] lists cases, [3] attaches documents.
// - Option [4] runs a phase and prints the agent thinking log.
// - Option [5] previews the derived tables, [6] exports everything to files.
// - Option [7] records the committee decision, [8] saves and exits.
mod benchmarks;
mod error;
mod extract;
mod finance;
mod gaps;
mod kpis;
mod output;
mod profile;
mod report;
mod store;
mod sustainability;
mod types;
mod util;
mod workflow;

use extract::ExtractionDefaults;
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use store::CaseStore;

const STORE_PATH: &str = "cases.json";

// In-memory store shared across menu handlers; loaded once at startup and
// saved explicitly on exit.
static APP_STATE: Lazy<Mutex<CaseStore>> = Lazy::new(|| {
    let store = CaseStore::load(Path::new(STORE_PATH)).unwrap_or_else(|e| {
        eprintln!("Warning: could not load {}: {}. Starting empty.", STORE_PATH, e);
        CaseStore::new()
    });
    Mutex::new(store)
});

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    read_line("Enter choice: ")
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

fn read_case_id() -> Option<u64> {
    match read_line("Case id: ").parse() {
        Ok(id) => Some(id),
        Err(_) => {
            println!("Invalid case id.\n");
            None
        }
    }
}

/// Handle option [1]: register a new review case.
fn handle_create_case() {
    let name = read_line("Project name: ");
    let country = read_line("Country: ");
    let sector = read_line("Sector: ");
    if name.is_empty() || country.is_empty() {
        println!("Project name and country are required.\n");
        return;
    }
    let sector = if sector.is_empty() {
        "Urban Transport".to_string()
    } else {
        sector
    };
    let mut store = APP_STATE.lock().unwrap();
    let id = store.create_case(name, country, sector);
    println!("Created case {}.\n", id);
}

/// Handle option [2]: list all cases with status and phase progress.
fn handle_list_cases() {
    let store = APP_STATE.lock().unwrap();
    if store.is_empty() {
        println!("No cases yet.\n");
        return;
    }
    for case in store.iter() {
        let phases: String = (1..=4)
            .map(|p| if case.phase_completed(p) { format!("{} ", p) } else { "- ".to_string() })
            .collect();
        println!(
            "[{}] {} ({}, {}) status={} phases=[{}]",
            case.id,
            case.name,
            case.country,
            case.sector,
            case.status,
            phases.trim_end()
        );
    }
    println!("");
}

const DOCUMENT_SLOTS: [&str; 6] = [
    "Need assessment",
    "Sector profile",
    "Benchmark notes",
    "Operations & fleet data",
    "Financial data",
    "Sustainability & ESG",
];

/// Handle option [3]: attach a text document to one of the six named slots.
fn handle_attach_document() {
    let Some(id) = read_case_id() else { return };
    for (i, slot) in DOCUMENT_SLOTS.iter().enumerate() {
        println!("[{}] {}", i + 1, slot);
    }
    let slot: usize = match read_line("Document slot: ").parse() {
        Ok(n @ 1..=6) => n,
        _ => {
            println!("Invalid slot.\n");
            return;
        }
    };
    let path = read_line("Path to text file: ");
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read {}: {}\n", path, e);
            return;
        }
    };

    let mut store = APP_STATE.lock().unwrap();
    match store.get_mut(id) {
        Ok(case) => {
            let docs = &mut case.documents;
            match slot {
                1 => docs.need_assessment_text = text,
                2 => docs.sector_profile_text = text,
                3 => docs.benchmark_text = text,
                4 => docs.ops_fleet_text = text,
                5 => docs.financial_data_text = text,
                _ => docs.sustainability_text = text,
            }
            case.updated_at = chrono::Utc::now();
            println!("Attached {} ({} chars).\n", DOCUMENT_SLOTS[slot - 1], case_doc_len(case, slot));
        }
        Err(e) => println!("{}\n", e),
    }
}

fn case_doc_len(case: &types::Case, slot: usize) -> usize {
    let docs = &case.documents;
    match slot {
        1 => docs.need_assessment_text.len(),
        2 => docs.sector_profile_text.len(),
        3 => docs.benchmark_text.len(),
        4 => docs.ops_fleet_text.len(),
        5 => docs.financial_data_text.len(),
        _ => docs.sustainability_text.len(),
    }
}

/// Handle option [4]: run a review phase and print its thinking log.
fn handle_run_phase() {
    let Some(id) = read_case_id() else { return };
    let phase: u8 = match read_line("Phase (1-4): ").parse() {
        Ok(p) => p,
        Err(_) => {
            println!("Invalid phase.\n");
            return;
        }
    };

    let mut store = APP_STATE.lock().unwrap();
    let case = match store.get_mut(id) {
        Ok(c) => c,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };

    match workflow::run_phase(case, phase, &ExtractionDefaults::default()) {
        Ok(()) => {
            println!(
                "\nPhase {} complete: {}\n",
                phase,
                workflow::PHASE_TITLES[(phase - 1) as usize]
            );
            let log = match phase {
                1 => &case.phase1_thinking,
                2 => &case.phase2_thinking,
                3 => &case.phase3_thinking,
                _ => &case.phase4_thinking,
            };
            if let Some(log) = log {
                println!("{}", log);
            }
        }
        Err(e) => println!("Error: {}\n", e),
    }
}

/// Handle option [5]: print Markdown previews of the derived tables.
fn handle_show_case() {
    let Some(id) = read_case_id() else { return };
    let store = APP_STATE.lock().unwrap();
    let case = match store.get(id) {
        Ok(c) => c,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };

    println!(
        "\nCase {}: {} ({}, {}) status={}\n",
        case.id, case.name, case.country, case.sector, case.status
    );

    println!("Gap Analysis vs International Benchmarks");
    output::preview_table_rows(&case.gap_items, 10);

    println!("Baseline KPIs");
    output::preview_table_rows(&case.kpis, 10);

    println!("Financing Options (ranked by total score)");
    let mut ranked = case.financial_options.clone();
    finance::sort_options_for_display(&mut ranked);
    output::preview_table_rows(&ranked, 10);

    if let Some(sust) = &case.sustainability {
        println!("Sustainability: Category {}", sust.category);
        if let Some(tons) = sust.co2_reduction_tons {
            println!("Expected CO2 reduction: {} tons/year", util::format_number(tons, 0));
        }
        println!("");
    }
}

/// Handle option [6]: export the concept note, tables and thinking logs.
fn handle_export() {
    let Some(id) = read_case_id() else { return };
    let store = APP_STATE.lock().unwrap();
    let case = match store.get(id) {
        Ok(c) => c,
        Err(e) => {
            println!("{}\n", e);
            return;
        }
    };

    println!("Exporting case {} outputs...\n", id);

    if let Some(note) = &case.concept_note_markdown {
        let file = format!("case{}_concept_note.md", id);
        if let Err(e) = output::write_text(&file, note) {
            eprintln!("Write error: {}", e);
        } else {
            println!("Concept note written to {}", file);
        }
    } else {
        println!("No concept note yet; run phase 4 first.");
    }

    let gaps_file = format!("case{}_gap_analysis.csv", id);
    if let Err(e) = output::write_csv(&gaps_file, &case.gap_items) {
        eprintln!("Write error: {}", e);
    }
    let kpi_file = format!("case{}_kpis.csv", id);
    if let Err(e) = output::write_csv(&kpi_file, &case.kpis) {
        eprintln!("Write error: {}", e);
    }
    let options_file = format!("case{}_financial_options.csv", id);
    if let Err(e) = output::write_csv(&options_file, &case.financial_options) {
        eprintln!("Write error: {}", e);
    }
    println!(
        "Tables written to {}, {}, {}",
        gaps_file, kpi_file, options_file
    );

    let record_file = format!("case{}_record.json", id);
    if let Err(e) = output::write_json(&record_file, case) {
        eprintln!("Write error: {}", e);
    } else {
        println!("Full case record written to {}", record_file);
    }

    let logs: Vec<&String> = [
        &case.phase1_thinking,
        &case.phase2_thinking,
        &case.phase3_thinking,
        &case.phase4_thinking,
    ]
    .iter()
    .filter_map(|l| l.as_ref())
    .collect();
    if !logs.is_empty() {
        let combined = logs
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join("\n---\n\n");
        let log_file = format!("case{}_thinking_logs.md", id);
        if let Err(e) = output::write_text(&log_file, &combined) {
            eprintln!("Write error: {}", e);
        } else {
            println!("Thinking logs written to {}", log_file);
        }
    }
    println!("");
}

/// Handle option [7]: record the committee decision on a case.
fn handle_record_decision() {
    let Some(id) = read_case_id() else { return };
    let decision = read_line("Decision (approve/reject): ");
    let mut store = APP_STATE.lock().unwrap();
    match store.record_decision(id, &decision) {
        Ok(status) => println!("Case {} is now {}.\n", id, status),
        Err(e) => println!("Error: {}\n", e),
    }
}

fn save_store() {
    let store = APP_STATE.lock().unwrap();
    if let Err(e) = store.save(Path::new(STORE_PATH)) {
        eprintln!("Failed to save {}: {}", STORE_PATH, e);
    } else {
        println!("Saved {} case(s) to {}.", store.len(), STORE_PATH);
    }
}

fn main() {
    loop {
        println!("Concept Review Workflow:");
        println!("[1] Create case");
        println!("[2] List cases");
        println!("[3] Attach document");
        println!("[4] Run phase");
        println!("[5] Show case tables");
        println!("[6] Export outputs");
        println!("[7] Record decision");
        println!("[8] Save & exit\n");
        match read_choice().as_str() {
            "1" => handle_create_case(),
            "2" => handle_list_cases(),
            "3" => handle_attach_document(),
            "4" => handle_run_phase(),
            "5" => handle_show_case(),
            "6" => handle_export(),
            "7" => handle_record_decision(),
            "8" => {
                save_store();
                println!("Exiting the program.");
                break;
            }
            _ => {
                println!("Invalid choice. Please enter 1-8.\n");
            }
        }
    }
}
