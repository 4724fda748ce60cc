//! Integration tests for the preprocessing pipeline.
//!
//! These tests run the pipeline end to end against a fixture file and
//! generated datasets, writing outputs into temporary directories.

use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tabprep::{
    CleaningPolicy, ColumnRole, FeatureHeader, FitStrategy, Pipeline, PipelineConfig,
    PipelineStage, PrepError, Preprocessor, load_csv, run_exploratory,
};

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn churn_fixture() -> PathBuf {
    fixtures_path().join("churn_sample.csv")
}

/// Config for the fixture with the ID column left out.
fn fixture_config(output_dir: &Path) -> tabprep::PipelineConfigBuilder {
    PipelineConfig::builder()
        .input_path(churn_fixture())
        .output_dir(output_dir)
        .column_role("customerID", ColumnRole::Skip)
}

/// Write a 100-row churn dataset with unique rows.
///
/// `Churn` is "Yes" exactly when `plan` is "basic", so alignment between
/// feature and target files can be checked from the outputs alone.
fn write_generated_dataset(dir: &Path) -> PathBuf {
    let plans = ["basic", "plus", "premium", "family"];
    let mut csv = String::from("tenure,charges,plan,region,Churn\n");
    for i in 0..100 {
        let plan = plans[i % plans.len()];
        let charges = if i % 9 == 0 {
            String::new()
        } else {
            format!("{:.2}", 20.0 + (i as f64) * 1.25)
        };
        let region = if i % 11 == 0 { "" } else if i % 2 == 0 { "north" } else { "south" };
        let churn = if plan == "basic" { "Yes" } else { "No" };
        csv.push_str(&format!("{},{},{},{},{}\n", i, charges, plan, region, churn));
    }

    let path = dir.join("generated.csv");
    fs::write(&path, csv).unwrap();
    path
}

fn column_f64(df: &DataFrame, name: &str) -> Vec<f64> {
    df.column(name)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn column_str(df: &DataFrame, name: &str) -> Vec<String> {
    df.column(name)
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect()
}

// ============================================================================
// Fixture Pipeline Tests
// ============================================================================

#[test]
fn test_full_pipeline_on_fixture() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("processed_data");
    let config = fixture_config(&out_dir).build().unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();
    let summary = &result.summary;

    assert_eq!(summary.rows_loaded, 22);
    assert_eq!(summary.cleaning.duplicates_removed, 2);
    assert_eq!(summary.cleaning.rows_after, 20);
    assert_eq!(summary.train_rows, 16);
    assert_eq!(summary.test_rows, 4);
    assert_eq!(
        summary.numeric_columns,
        vec!["SeniorCitizen", "tenure", "MonthlyCharges"]
    );
    assert_eq!(summary.categorical_columns, vec!["gender", "Contract"]);
    assert_eq!(summary.skipped_columns, vec!["customerID", "PaperlessBilling"]);
    assert_eq!(
        summary.feature_names,
        vec![
            "SeniorCitizen",
            "tenure",
            "MonthlyCharges",
            "gender_Female",
            "gender_Male",
            "Contract_Month-to-month",
            "Contract_One year",
            "Contract_Two year",
        ]
    );

    let x_train = load_csv(&result.outputs.x_train).unwrap();
    let x_test = load_csv(&result.outputs.x_test).unwrap();
    let y_train = load_csv(&result.outputs.y_train).unwrap();
    let y_test = load_csv(&result.outputs.y_test).unwrap();

    assert_eq!(x_train.shape(), (16, 8));
    assert_eq!(x_test.shape(), (4, 8));
    assert_eq!(y_train.shape(), (16, 1));
    assert_eq!(y_test.shape(), (4, 1));
    assert_eq!(y_test.get_column_names()[0].as_str(), "Churn");

    // Imputed and encoded output has no gaps
    assert_eq!(tabprep::utils::total_null_count(&x_train), 0);
    assert_eq!(tabprep::utils::total_null_count(&x_test), 0);
}

#[test]
fn test_missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig::builder()
        .input_path(dir.path().join("nope.csv"))
        .output_dir(dir.path())
        .build()
        .unwrap();

    let err = Pipeline::builder().config(config).build().unwrap().run().unwrap_err();

    assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    assert!(matches!(err.root(), PrepError::FileNotFound(_)));
}

#[test]
fn test_missing_target_column() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path()).target_column("Exited").build().unwrap();

    let err = Pipeline::builder().config(config).build().unwrap().run().unwrap_err();

    assert!(matches!(err.root(), PrepError::ColumnNotFound(c) if c == "Exited"));
    // Nothing was written
    assert!(!dir.path().join("X_train.csv").exists());
}

#[test]
fn test_drop_missing_and_duplicates_policy() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path())
        .cleaning_policy(CleaningPolicy::DropMissingAndDuplicates)
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    // Three rows have a gap, two more are repeats
    assert_eq!(result.summary.cleaning.missing_removed, 3);
    assert_eq!(result.summary.cleaning.duplicates_removed, 2);
    assert_eq!(result.summary.train_rows + result.summary.test_rows, 17);
}

#[test]
fn test_ordinal_header_and_optional_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path())
        .feature_header(FeatureHeader::Ordinal)
        .save_preprocessor(true)
        .emit_report(true)
        .build()
        .unwrap();

    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    let header = fs::read_to_string(&result.outputs.x_train)
        .unwrap()
        .lines()
        .next()
        .unwrap()
        .to_string();
    assert_eq!(header, "0,1,2,3,4,5,6,7");

    let preprocessor_path = result.outputs.preprocessor.clone().unwrap();
    let restored = Preprocessor::load_json(&preprocessor_path).unwrap();
    assert_eq!(
        restored.feature_names().unwrap(),
        result.summary.feature_names
    );

    let report_path = result.outputs.report.clone().unwrap();
    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report["train_rows"], 16);
    assert_eq!(report["cleaning_policy"], "drop_duplicates");
}

#[test]
fn test_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = fixture_config(dir.path())
        .fit_strategy(FitStrategy::TrainOnly)
        .random_seed(7)
        .build()
        .unwrap();

    let path = dir.path().join("prep.json");
    fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();
    let loaded = PipelineConfig::from_json_file(&path).unwrap();

    assert_eq!(loaded.fit_strategy, FitStrategy::TrainOnly);
    assert_eq!(loaded.random_seed, 7);
    assert_eq!(loaded.column_roles.get("customerID"), Some(&ColumnRole::Skip));
}

// ============================================================================
// Generated Dataset Tests
// ============================================================================

#[test]
fn test_hundred_rows_split_80_20_and_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_generated_dataset(dir.path());

    let run = |name: &str| {
        let config = PipelineConfig::builder()
            .input_path(&input)
            .output_dir(dir.path().join(name))
            .build()
            .unwrap();
        Pipeline::builder().config(config).build().unwrap().run().unwrap()
    };

    let first = run("first");
    let second = run("second");

    let x_train = load_csv(&first.outputs.x_train).unwrap();
    let x_test = load_csv(&first.outputs.x_test).unwrap();
    let y_train = load_csv(&first.outputs.y_train).unwrap();
    let y_test = load_csv(&first.outputs.y_test).unwrap();

    assert_eq!(x_train.height(), 80);
    assert_eq!(y_train.height(), 80);
    assert_eq!(x_test.height(), 20);
    assert_eq!(y_test.height(), 20);

    // Same seed, same membership and same bytes
    for (a, b) in first.outputs.all().iter().zip(second.outputs.all()) {
        assert_eq!(fs::read_to_string(a).unwrap(), fs::read_to_string(b).unwrap());
    }
}

#[test]
fn test_different_seed_changes_membership() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_generated_dataset(dir.path());

    let tenure_test = |seed: u64| {
        let config = PipelineConfig::builder()
            .input_path(&input)
            .output_dir(dir.path().join(format!("seed_{}", seed)))
            .random_seed(seed)
            .feature_header(FeatureHeader::Named)
            .build()
            .unwrap();
        let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();
        column_f64(&load_csv(&result.outputs.x_test).unwrap(), "tenure")
    };

    assert_ne!(tenure_test(42), tenure_test(1));
}

#[test]
fn test_rows_stay_aligned_in_output_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_generated_dataset(dir.path());

    for strategy in [FitStrategy::FullDataset, FitStrategy::TrainOnly] {
        let config = PipelineConfig::builder()
            .input_path(&input)
            .output_dir(dir.path().join(format!("{:?}", strategy)))
            .fit_strategy(strategy)
            .build()
            .unwrap();
        let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

        for (x_path, y_path) in [
            (&result.outputs.x_train, &result.outputs.y_train),
            (&result.outputs.x_test, &result.outputs.y_test),
        ] {
            let basic = column_f64(&load_csv(x_path).unwrap(), "plan_basic");
            let churn = column_str(&load_csv(y_path).unwrap(), "Churn");
            assert_eq!(basic.len(), churn.len());
            for (flag, label) in basic.iter().zip(&churn) {
                assert_eq!(*flag == 1.0, label == "Yes", "{:?}", strategy);
            }
        }
    }
}

#[test]
fn test_fit_strategies_produce_same_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_generated_dataset(dir.path());
    let df = load_csv(&input).unwrap();

    let process = |strategy: FitStrategy| {
        let config = PipelineConfig::builder()
            .input_path(&input)
            .fit_strategy(strategy)
            .build()
            .unwrap();
        Pipeline::builder()
            .config(config)
            .build()
            .unwrap()
            .process(df.clone())
            .unwrap()
    };

    let full = process(FitStrategy::FullDataset);
    let train_only = process(FitStrategy::TrainOnly);

    assert_eq!(full.split.test_indices, train_only.split.test_indices);

    // Standardized training columns are centered only when fitted on them
    let train_mean = train_only
        .split
        .x_train
        .column("tenure")
        .unwrap()
        .f64()
        .unwrap()
        .mean()
        .unwrap();
    assert!(train_mean.abs() < 1e-9);
}

#[test]
fn test_standardized_columns_on_full_fit() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_generated_dataset(dir.path());
    let df = load_csv(&input).unwrap();

    let features = df.drop("Churn").unwrap();
    let mut preprocessor = Preprocessor::build(&features, &PipelineConfig::default()).unwrap();
    let x = preprocessor.fit_transform(&features).unwrap();

    for name in ["tenure", "charges"] {
        let ca = x.column(name).unwrap().f64().unwrap();
        assert!(ca.mean().unwrap().abs() < 1e-9, "{} mean", name);
        assert!((ca.std(0).unwrap() - 1.0).abs() < 1e-9, "{} std", name);
    }
}

#[test]
fn test_progress_stages_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let stages = Arc::new(Mutex::new(Vec::new()));
    let stages_clone = Arc::clone(&stages);

    Pipeline::builder()
        .config(fixture_config(dir.path()).build().unwrap())
        .on_progress(move |update| {
            stages_clone.lock().unwrap().push(update.stage);
        })
        .build()
        .unwrap()
        .run()
        .unwrap();

    let mut seen = stages.lock().unwrap().clone();
    seen.dedup();
    assert_eq!(
        seen,
        vec![
            PipelineStage::Loading,
            PipelineStage::Cleaning,
            PipelineStage::Splitting,
            PipelineStage::Building,
            PipelineStage::Transforming,
            PipelineStage::Partitioning,
            PipelineStage::Persisting,
            PipelineStage::Complete,
        ]
    );
}

// ============================================================================
// Awkward Inputs
// ============================================================================

#[test]
fn test_blank_column_is_skipped_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut csv = String::from("tenure,notes,Churn\n");
    for i in 0..10 {
        csv.push_str(&format!("{},,{}\n", i, if i % 2 == 0 { "Yes" } else { "No" }));
    }
    let input = dir.path().join("blank_notes.csv");
    fs::write(&input, csv).unwrap();

    let config = PipelineConfig::builder()
        .input_path(&input)
        .output_dir(dir.path().join("out"))
        .build()
        .unwrap();
    let result = Pipeline::builder().config(config).build().unwrap().run().unwrap();

    assert_eq!(result.summary.skipped_columns, vec!["notes"]);
    assert_eq!(result.summary.feature_names, vec!["tenure"]);
    assert_eq!(load_csv(&result.outputs.x_train).unwrap().shape(), (8, 1));
}

#[test]
fn test_clashing_output_names_are_made_unique() {
    let df = df![
        "plan" => ["a", "b", "a", "b", "a", "b", "a", "b", "a", "b"],
        "plan_a" => [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0],
        "Churn" => ["Yes", "No", "Yes", "No", "Yes", "No", "Yes", "No", "Yes", "No"],
    ]
    .unwrap();

    let processed = Pipeline::builder()
        .config(PipelineConfig::default())
        .build()
        .unwrap()
        .process(df)
        .unwrap();

    assert_eq!(
        processed.summary.feature_names,
        vec!["plan_a", "plan_a_1", "plan_b"]
    );
    assert_eq!(processed.split.x_train.width(), 3);
    assert_eq!(processed.split.x_test.height(), 2);
}

// ============================================================================
// Exploratory Entry Point
// ============================================================================

#[test]
fn test_exploratory_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cleaned_data.csv");

    let outcome = run_exploratory(&path).unwrap();

    assert_eq!(column_str(&outcome.cleaned, "Name"), vec!["Alice", "Bob"]);
    assert_eq!(column_str(&outcome.cleaned, "City"), vec!["Delhi", "Mumbai"]);
    assert_eq!(column_f64(&outcome.cleaned, "Age"), vec![25.0, 30.0]);

    let written = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines, vec!["Name,Age,City", "Alice,25,Delhi", "Bob,30,Mumbai"]);
}
