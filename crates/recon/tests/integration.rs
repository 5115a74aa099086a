use std::path::PathBuf;

use gradex_recon::config::{FileList, GradexConfig};
use gradex_recon::engine::{
    load_flag_cells, load_input_records, load_reference_records, load_rename_entries, run,
};
use gradex_recon::model::{CohortData, GradexInput, GradexReport, MatricInput};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn concat<T>(files: &FileList, mut load: impl FnMut(&str, &str, usize) -> Vec<T>) -> Vec<T> {
    let mut out = Vec::new();
    for path in files.paths() {
        let rows = load(path, &read(path), out.len());
        out.extend(rows);
    }
    out
}

fn load_and_run(config_toml: &str) -> GradexReport {
    let config = GradexConfig::from_toml(config_toml).unwrap();
    let mut input = GradexInput::default();

    if let Some(ref m) = config.matric {
        input.matric = Some(MatricInput {
            inputs: concat(&m.ingest, |ds, csv, first| load_input_records(ds, csv, first).unwrap()),
            references: concat(&m.checked, |ds, csv, first| {
                load_reference_records(ds, csv, first).unwrap()
            }),
        });
    }

    if let Some(ref r) = config.rename {
        input.rename = Some(concat(&r.file, |ds, csv, first| {
            load_rename_entries(ds, csv, first).unwrap()
        }));
    }

    if let Some(ref t) = config.tally {
        let mut cohorts = Vec::new();
        for c in &t.cohorts {
            let mut data = CohortData::new(c.name.clone(), t.columns.len());
            for path in c.files.paths() {
                load_flag_cells(path, &read(path), &t.columns, &mut data).unwrap();
            }
            cohorts.push(data);
        }
        input.cohorts = Some(cohorts);
    }

    run(&config, &input).unwrap()
}

fn fixture_report() -> GradexReport {
    load_and_run(&read("gradex.toml"))
}

// -------------------------------------------------------------------------
// Matriculation check
// -------------------------------------------------------------------------

#[test]
fn matric_key_then_stem_fallback() {
    let report = fixture_report();
    let m = report.matric.expect("matric report");

    assert_eq!(m.summary.inputs, 5);
    assert_eq!(m.summary.references, 4);
    assert_eq!(m.summary.matched_by_key, 2);
    // S2032740 differs only in case; found through "hopper.final.pdf" ~ "hopper.pdf"
    assert_eq!(m.summary.recovered_by_stem, 1);
    assert_eq!(m.recovered[0].stem, "hopper");
    assert_eq!(m.summary.unmatched, 2);

    assert_eq!(m.misses[0].row, 3);
    assert_eq!(m.misses[0].matriculation, None);
    assert_eq!(m.misses[0].original_stem.as_deref(), Some("goto"));
    assert_eq!(m.misses[0].filename_stem.as_deref(), Some("B123459"));

    assert_eq!(m.misses[1].row, 4);
    assert_eq!(m.misses[1].matriculation.as_deref(), Some("s2032742"));
}

#[test]
fn matric_concatenated_ingest_reports() {
    let toml = r#"
name = "Two ingest reports"

[matric]
ingest  = ["ingest-report.csv", "ingest-report.csv"]
checked = "checked.csv"
"#;
    let report = load_and_run(toml);
    let m = report.matric.unwrap();
    assert_eq!(m.summary.inputs, 10);
    assert_eq!(m.summary.matched_by_key, 4);
    assert_eq!(m.summary.unmatched, 4);
    let rows: Vec<usize> = m.misses.iter().map(|x| x.row).collect();
    assert_eq!(rows, vec![3, 4, 8, 9]);
}

// -------------------------------------------------------------------------
// Rename check
// -------------------------------------------------------------------------

#[test]
fn rename_log_reconciles() {
    let report = fixture_report();
    let r = report.rename.expect("rename report");

    assert_eq!(r.trim_chars, 60);
    assert_eq!(r.before_count, 4);
    assert_eq!(r.after_count, 5);
    assert_eq!(r.misses.len(), 1);
    assert_eq!(r.misses[0].row, 3);
    assert_eq!(r.misses[0].expected, "B12346O.pdf");
}

#[test]
fn rename_with_wrong_trim_misses_everything() {
    let toml = r#"
name = "Bad trim"

[rename]
file = "beforeafter.csv"
trim_chars = 10
"#;
    let r = load_and_run(toml).rename.unwrap();
    assert_eq!(r.misses.len(), 4);
}

// -------------------------------------------------------------------------
// Quality tally
// -------------------------------------------------------------------------

#[test]
fn tally_per_cohort_and_overall() {
    let report = fixture_report();
    let t = report.tally.expect("tally report");

    assert_eq!(t.overall.name, "Overall");
    assert_eq!(t.overall.n, 7);
    let overall: Vec<Option<u32>> = t.overall.columns.iter().map(|c| c.percent).collect();
    assert_eq!(overall, vec![Some(71), Some(67), Some(57)]);

    let third = &t.cohorts[0];
    assert_eq!(third.name, "Third year");
    assert_eq!(third.n, 4);
    let pcts: Vec<Option<u32>> = third.columns.iter().map(|c| c.percent).collect();
    assert_eq!(pcts, vec![Some(75), Some(75), Some(75)]);

    let msc = &t.cohorts[1];
    assert_eq!(msc.n, 3);
    assert_eq!(msc.columns[0].label, "Good scan");
    assert_eq!(msc.columns[0].percent, Some(67));
    // one blank heading cell: 1 of 2 counted
    assert_eq!(msc.columns[1].tally.counted, 2);
    assert_eq!(msc.columns[1].percent, Some(50));
    assert_eq!(msc.columns[2].percent, Some(33));
}

#[test]
fn tally_custom_column() {
    let toml = r#"
name = "Rotation"

[tally]
columns = [{ column = "ScanRotated", label = "Rotated" }]

[[tally.cohorts]]
name = "Checked"
files = "checked.csv"
"#;
    let t = load_and_run(toml).tally.unwrap();
    assert_eq!(t.cohorts[0].columns[0].label, "Rotated");
    assert_eq!(t.cohorts[0].columns[0].tally.hits, 1);
    assert_eq!(t.cohorts[0].columns[0].percent, Some(25));
}

// -------------------------------------------------------------------------
// Report shape
// -------------------------------------------------------------------------

#[test]
fn report_serializes_enabled_sections_only() {
    let toml = r#"
name = "Rename only"

[rename]
file = "beforeafter.csv"
"#;
    let report = load_and_run(toml);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["meta"]["config_name"], "Rename only");
    assert!(json.get("rename").is_some());
    assert!(json.get("matric").is_none());
    assert!(json.get("tally").is_none());
    assert_eq!(report.miss_count(), 1);
}

#[test]
fn tally_json_flattens_counts() {
    let report = fixture_report();
    let json = serde_json::to_value(report.tally.unwrap()).unwrap();
    let first = &json["cohorts"][0]["columns"][0];
    assert_eq!(first["column"], "ScanPerfect");
    assert_eq!(first["hits"], 3);
    assert_eq!(first["counted"], 4);
    assert_eq!(first["percent"], 75);
}
