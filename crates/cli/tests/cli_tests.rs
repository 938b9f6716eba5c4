//! CLI integration tests

use std::process::Command;

fn salary(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "salary-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = salary(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Salary Predictor"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("options"), "Should show options command");
    assert!(stdout.contains("health"), "Should show health command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = salary(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("salary"), "Should show binary name");
}

/// Test predict subcommand help
#[test]
fn test_predict_help() {
    let output = salary(&["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Predict help should succeed");
    assert!(stdout.contains("--age"), "Should show age option");
    assert!(stdout.contains("--job-title"), "Should show job-title option");
    assert!(stdout.contains("--model"), "Should show model option");
    assert!(
        stdout.contains("--artifact-dir"),
        "Should show artifact-dir option"
    );
}

/// Test predict requires its categorical inputs
#[test]
fn test_predict_missing_arguments() {
    let output = salary(&["predict", "--age", "30"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Predict without inputs should fail");
    assert!(stderr.contains("--education"), "Should name the missing option");
}

/// Test options works offline as JSON
#[test]
fn test_options_json() {
    let output = salary(&["--format", "json", "options"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Options should succeed");
    let catalog: serde_json::Value =
        serde_json::from_str(&stdout).expect("Options output should be JSON");
    assert_eq!(catalog["job_titles"].as_array().unwrap().len(), 60);
    assert_eq!(catalog["models"][0]["name"], "Linear Regression");
}

/// Test local prediction against a missing artifact directory fails cleanly
#[test]
fn test_predict_local_missing_artifacts() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = salary(&[
        "predict",
        "--education",
        "PhD",
        "--job-title",
        "CEO",
        "--gender",
        "Female",
        "--artifact-dir",
        dir.path().to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Missing artifacts should fail");
    assert!(stderr.contains("Artifacts unavailable"));
}

/// Test an unknown model is rejected before any prediction
#[test]
fn test_predict_local_unknown_model() {
    let dir = tempfile::TempDir::new().unwrap();
    let output = salary(&[
        "predict",
        "--education",
        "PhD",
        "--job-title",
        "CEO",
        "--gender",
        "Female",
        "--model",
        "Gradient Boosting",
        "--artifact-dir",
        dir.path().to_str().unwrap(),
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success(), "Unknown model should fail");
    assert!(stderr.contains("Unknown model"));
}

/// Write a complete artifact directory under the default file names
fn write_artifacts(dir: &std::path::Path) {
    let files = [
        (
            "linear_regression_model.json",
            r#"{"coef": [1000, 500, 2000, 4000, 0, 0, 0], "intercept": 60000}"#,
        ),
        (
            "random_forest_regression_model.json",
            r#"{"n_features_in_": 7, "estimators_": [{"children_left": [1, -1, -1],
                "children_right": [2, -1, -1], "feature": [3, -2, -2],
                "threshold": [0.5, -2.0, -2.0],
                "value": [[[60000.0]], [[40000.0]], [[80000.0]]]}]}"#,
        ),
        (
            "job_title_mean_salary_map.json",
            r#"{"Data Scientist": 90000, "Receptionist": 30000}"#,
        ),
        ("scaler_age.json", r#"{"mean": [40.0], "scale": [10.0]}"#),
        ("scaler_years_experience.json", r#"{"mean": [10.0], "scale": [5.0]}"#),
        ("scaler_job_title_mean_encoded.json", r#"{"mean": [60000], "scale": [20000]}"#),
    ];
    for (name, contents) in files {
        std::fs::write(dir.join(name), contents).unwrap();
    }
}

fn predict_data_scientist(dir: &std::path::Path, model: &str) -> std::process::Output {
    salary(&[
        "--format",
        "json",
        "predict",
        "--age",
        "30",
        "--education",
        "Bachelor's",
        "--experience",
        "5",
        "--job-title",
        "Data Scientist",
        "--gender",
        "Male",
        "--model",
        model,
        "--artifact-dir",
        dir.to_str().unwrap(),
    ])
}

/// Test a local prediction from a complete artifact directory
#[test]
fn test_predict_local_from_artifact_dir() {
    let dir = tempfile::TempDir::new().unwrap();
    write_artifacts(dir.path());

    let output = predict_data_scientist(dir.path(), "linear");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Local predict should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let prediction: serde_json::Value =
        serde_json::from_str(&stdout).expect("Predict output should be JSON");
    assert_eq!(prediction["model"], "Linear Regression");
    assert_eq!(prediction["predicted_salary"], 63500.0);
    assert_eq!(
        prediction["features"],
        serde_json::json!([-1.0, 1.0, -1.0, 1.5, 0.0, 1.0, 0.0])
    );

    let output = predict_data_scientist(dir.path(), "rf");
    assert!(output.status.success(), "Forest predict should succeed");
    let prediction: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("Predict output should be JSON");
    assert_eq!(prediction["model"], "Random Forest Regression");
    assert_eq!(prediction["predicted_salary"], 80000.0);
}
