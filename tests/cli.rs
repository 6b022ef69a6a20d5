//! End-to-end runs of the `lcsmooth` binary on JSON grids in a temp dir.

use std::path::{Path, PathBuf};
use std::process::Command;

use approx::assert_abs_diff_eq;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lcsmooth"))
}

/// Writes a 1x2 two-class grid per step.
fn write_inputs(dir: &Path, steps: &[[f64; 4]]) -> Vec<PathBuf> {
    steps
        .iter()
        .enumerate()
        .map(|(t, values)| {
            let path = dir.join(format!("lc_{}.json", 2001 + t));
            let json = serde_json::json!({
                "rows": 1,
                "cols": 2,
                "n_classes": 2,
                "values": values,
            });
            std::fs::write(&path, json.to_string()).unwrap();
            path
        })
        .collect()
}

fn write_config(dir: &Path, inputs: &[PathBuf], extra: &str) -> PathBuf {
    let list: Vec<String> = inputs
        .iter()
        .map(|p| format!("{:?}", p.display().to_string()))
        .collect();
    let toml = format!(
        "[io]\ninputs = [{}]\n{extra}\n\n[sweep]\nconcurrency = 2\nblock_rows = 1\n",
        list.join(", ")
    );
    let path = dir.join("lcsmooth.toml");
    std::fs::write(&path, toml).unwrap();
    path
}

fn read_values(path: &Path) -> Vec<f64> {
    let text = std::fs::read_to_string(path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    v["values"]
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x.as_f64().unwrap())
        .collect()
}

const STEPS: [[f64; 4]; 3] = [
    [0.9, 0.1, 0.2, 0.8],
    [0.5, 0.5, 0.3, 0.7],
    [0.2, 0.8, 0.1, 0.9],
];

// ---------------------------------------------------------------------------
// 1. smooth writes one suffixed output per input
// ---------------------------------------------------------------------------
#[test]
fn smooth_writes_suffixed_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), &STEPS);
    let cfg = write_config(dir.path(), &inputs, "");

    let status = bin().args(["smooth", "-c"]).arg(&cfg).status().unwrap();
    assert!(status.success());

    for t in 0..3 {
        let out = dir.path().join(format!("lc_{}_hmm.json", 2001 + t));
        let values = read_values(&out);
        assert_eq!(values.len(), 4);
        for pixel in values.chunks(2) {
            assert_abs_diff_eq!(pixel[0] + pixel[1], 1.0, epsilon = 1e-9);
        }
    }
}

#[test]
fn smooth_respects_output_dir_override() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), &STEPS);
    let cfg = write_config(dir.path(), &inputs, "");
    let out_dir = dir.path().join("out");

    let status = bin()
        .args(["smooth", "--method", "forward", "--jobs", "-1", "-c"])
        .arg(&cfg)
        .arg("--output-dir")
        .arg(&out_dir)
        .status()
        .unwrap();
    assert!(status.success());
    assert!(out_dir.join("lc_2003_hmm.json").is_file());
    assert!(!dir.path().join("lc_2003_hmm.json").exists());
}

// ---------------------------------------------------------------------------
// 2. class assignment
// ---------------------------------------------------------------------------
#[test]
fn assign_class_writes_codes() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), &STEPS);
    let cfg = write_config(
        dir.path(),
        &inputs,
        "assign_class = true\nclass_labels = [11, 42]",
    );

    let status = bin().args(["smooth", "-c"]).arg(&cfg).status().unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(dir.path().join("lc_2001_hmm.json")).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    let codes: Vec<u64> = v["codes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x.as_u64().unwrap())
        .collect();
    assert_eq!(codes.len(), 2);
    assert!(codes.iter().all(|c| *c == 11 || *c == 42));
    // The second pixel leans to class 1 at every step.
    assert_eq!(codes[1], 42);
}

// ---------------------------------------------------------------------------
// 3. estimate
// ---------------------------------------------------------------------------
#[test]
fn estimate_writes_stochastic_matrix() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), &STEPS);
    let cfg = write_config(dir.path(), &inputs, "");
    let out = dir.path().join("matrix.json");

    let status = bin()
        .args(["estimate", "-c"])
        .arg(&cfg)
        .arg("-o")
        .arg(&out)
        .status()
        .unwrap();
    assert!(status.success());

    let text = std::fs::read_to_string(&out).unwrap();
    let v: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(v["n_classes"], 2);
    assert_eq!(v["prior"], "self-transition");
    for row in v["rows"].as_array().unwrap() {
        let s: f64 = row
            .as_array()
            .unwrap()
            .iter()
            .map(|x| x.as_f64().unwrap())
            .sum();
        assert_abs_diff_eq!(s, 1.0, epsilon = 1e-9);
    }
}

// ---------------------------------------------------------------------------
// 4. failures exit non-zero without writing
// ---------------------------------------------------------------------------
#[test]
fn single_step_fails_in_estimation() {
    let dir = tempfile::tempdir().unwrap();
    let inputs = write_inputs(dir.path(), &STEPS[..1]);
    let cfg = write_config(dir.path(), &inputs, "");

    let output = bin().args(["smooth", "-c"]).arg(&cfg).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("estimation stage"), "{stderr}");
    assert!(!dir.path().join("lc_2001_hmm.json").exists());
}

#[test]
fn mismatched_extent_fails_before_output() {
    let dir = tempfile::tempdir().unwrap();
    let mut inputs = write_inputs(dir.path(), &STEPS[..2]);
    let odd = dir.path().join("lc_odd.json");
    std::fs::write(
        &odd,
        r#"{"rows":2,"cols":1,"n_classes":2,"values":[0.5,0.5,0.5,0.5]}"#,
    )
    .unwrap();
    inputs.push(odd);
    let cfg = write_config(dir.path(), &inputs, "");

    let output = bin().args(["smooth", "-c"]).arg(&cfg).output().unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("input stage"), "{stderr}");
    assert!(!dir.path().join("lc_2001_hmm.json").exists());
}
