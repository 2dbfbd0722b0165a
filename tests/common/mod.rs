#![allow(dead_code)]

use assert_cmd::cargo;
use std::fs;
use std::path::Path;

pub fn dupesweep() -> assert_cmd::Command {
    assert_cmd::Command::new(cargo::cargo_bin!("dupesweep"))
}

pub fn create_file(dir: &Path, name: &str, content: &[u8]) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Run a JSON scan of `dir` with extra arguments and parse the output
pub fn scan_json(dir: &Path, extra: &[&str]) -> serde_json::Value {
    let output = dupesweep()
        .arg(dir)
        .args(extra)
        .arg("--format")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).unwrap()
}

/// File names of every duplicate in a JSON report
pub fn duplicate_names(json: &serde_json::Value) -> Vec<String> {
    json["pairs"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| file_name(&p["duplicate"]))
        .collect()
}

pub fn file_name(value: &serde_json::Value) -> String {
    value.as_str().unwrap().rsplit('/').next().unwrap().to_string()
}
