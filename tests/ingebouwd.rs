// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>
//
// ingebouwd CLI tests

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A full synthetic run environment: kernel build tree, vulns checkout,
/// cve-check report, and the two output directories.
struct Fixture {
    root: TempDir,
    build_dir: PathBuf,
    vulns_dir: PathBuf,
    report_path: PathBuf,
    analysis_dir: PathBuf,
    filtered_dir: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let build_dir = root.path().join("build");
        let vulns_dir = root.path().join("vulns");
        let analysis_dir = root.path().join("analysis");
        let filtered_dir = root.path().join("filtered");
        for dir in [&build_dir, &vulns_dir, &analysis_dir, &filtered_dir] {
            fs::create_dir_all(dir).unwrap();
        }

        let report_path = root.path().join("cve-check.json");

        Self {
            root,
            build_dir,
            vulns_dir,
            report_path,
            analysis_dir,
            filtered_dir,
        }
    }

    fn write_cmd_file(&self, rel: &str, content: &str) {
        let path = self.build_dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn write_vulns_record(&self, year: &str, cve_id: &str, program_files: &[&str]) {
        let dir = self.vulns_dir.join("cve").join("published").join(year);
        fs::create_dir_all(&dir).unwrap();

        let files: Vec<Value> = program_files.iter().map(|f| Value::from(*f)).collect();
        let record = serde_json::json!({
            "containers": {
                "cna": {
                    "affected": [
                        {
                            "product": "Linux",
                            "vendor": "Linux",
                            "defaultStatus": "affected",
                            "programFiles": files
                        }
                    ]
                }
            },
            "dataType": "CVE_RECORD",
            "dataVersion": "5.0"
        });
        fs::write(
            dir.join(format!("{cve_id}.json")),
            serde_json::to_string_pretty(&record).unwrap(),
        )
        .unwrap();
    }

    fn write_report(&self, content: &str) {
        fs::write(&self.report_path, content).unwrap();
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(cargo::cargo_bin!("ingebouwd"));
        cmd.arg("--vulns-path")
            .arg(&self.vulns_dir)
            .arg("--input-cve-check")
            .arg(&self.report_path)
            .arg("--input-build-kernel-path")
            .arg(&self.build_dir)
            .arg("--output-path-analysis")
            .arg(&self.analysis_dir)
            .arg("--output-path-cve-check")
            .arg(&self.filtered_dir);
        cmd
    }

    fn read_json(&self, path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }
}

const REPORT: &str = r#"{
    "version": "1",
    "package": [
        {
            "name": "linux-yocto",
            "layer": "meta",
            "issue": [
                {"id": "CVE-2024-1111", "status": "Unpatched", "summary": "usb bug",
                 "link": "https://nvd.nist.gov/vuln/detail/CVE-2024-1111",
                 "scorev2": "0.0", "scorev3": "7.8", "scorev4": null,
                 "detail": "version-in-range"},
                {"id": "CVE-2024-2222", "status": "Unpatched", "summary": "net bug",
                 "link": "https://nvd.nist.gov/vuln/detail/CVE-2024-2222",
                 "scorev2": "0.0", "scorev3": "5.5", "scorev4": null,
                 "detail": "version-in-range"},
                {"id": "CVE-2023-3333", "status": "Unpatched", "summary": "unknown",
                 "link": "https://nvd.nist.gov/vuln/detail/CVE-2023-3333",
                 "scorev2": "0.0", "scorev3": "4.4", "scorev4": null,
                 "detail": "version-in-range"},
                {"id": "CVE-2022-4444", "status": "Patched", "summary": "old bug",
                 "link": "https://nvd.nist.gov/vuln/detail/CVE-2022-4444",
                 "scorev2": "0.0", "scorev3": "5.5", "scorev4": null,
                 "detail": "version-not-in-range"}
            ]
        },
        {
            "name": "openssl",
            "layer": "meta",
            "issue": [
                {"id": "CVE-2024-9999", "status": "Unpatched", "summary": "tls bug",
                 "link": "https://nvd.nist.gov/vuln/detail/CVE-2024-9999",
                 "scorev2": "0.0", "scorev3": "9.8", "scorev4": null,
                 "detail": "version-in-range"}
            ]
        }
    ]
}"#;

#[test]
fn no_args_shows_error() {
    let mut cmd = Command::new(cargo::cargo_bin!("ingebouwd"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("--vulns-path"));
}

#[test]
fn help_flag_shows_usage() {
    let mut cmd = Command::new(cargo::cargo_bin!("ingebouwd"));

    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("kernel build tree"));
}

#[test]
fn missing_build_tree_is_fatal() {
    let fixture = Fixture::new();
    fixture.write_report(REPORT);

    let mut cmd = Command::new(cargo::cargo_bin!("ingebouwd"));
    cmd.arg("--vulns-path")
        .arg(&fixture.vulns_dir)
        .arg("--input-cve-check")
        .arg(&fixture.report_path)
        .arg("--input-build-kernel-path")
        .arg(fixture.root.path().join("no-such-build"))
        .arg("--output-path-analysis")
        .arg(&fixture.analysis_dir)
        .arg("--output-path-cve-check")
        .arg(&fixture.filtered_dir);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn malformed_report_is_fatal() {
    let fixture = Fixture::new();
    fixture.write_report(r#"{"version": "1"}"#);

    fixture
        .command()
        .assert()
        .failure()
        .stderr(predicate::str::contains("package"));
}

#[test]
fn full_pipeline_partitions_and_filters() {
    let fixture = Fixture::new();
    fixture.write_report(REPORT);

    // CVE-2024-1111 touches a compiled file, CVE-2024-2222 touches one that
    // was never built, CVE-2023-3333 has no vulns record at all.
    let build = fixture.build_dir.display().to_string();
    fixture.write_cmd_file(
        "drivers/usb/core/hub.o.cmd",
        &format!(
            "source_drivers/usb/core/hub.o := {build}/drivers/usb/core/hub.c\n\
             deps_drivers/usb/core/hub.o := \\\n  {build}/include/linux/usb.h \\\n  include/linux/slab.h \\\n  $(wildcard include/config/usb.h)\n"
        ),
    );
    fixture.write_vulns_record("2024", "CVE-2024-1111", &["drivers/usb/core/hub.c"]);
    fixture.write_vulns_record("2024", "CVE-2024-2222", &["drivers/net/ethernet/bar.c"]);

    fixture
        .command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpatched kernel CVEs: 3"))
        .stdout(predicate::str::contains(
            "CVEs with affected files from the vulns repo: 2",
        ))
        .stdout(predicate::str::contains(
            "CVEs without affected files (kept as applicable): 1",
        ))
        .stdout(predicate::str::contains(
            "Total CVEs affecting this kernel build: 2",
        ))
        .stdout(predicate::str::contains(
            "Kernel CVEs ignored: 1, kept as Unpatched: 2",
        ));

    // Applicable map: the matched CVE with its files, the unresolved CVE
    // with an empty list
    let remaining = fixture.read_json(&fixture.analysis_dir.join("kernel_remaining_cves.json"));
    assert_eq!(
        remaining,
        serde_json::json!({
            "CVE-2023-3333": [],
            "CVE-2024-1111": ["drivers/usb/core/hub.c"]
        })
    );

    // Inapplicable map: the CVE whose files were never compiled
    let removed = fixture.read_json(&fixture.analysis_dir.join("kernel_removed_cves.json"));
    assert_eq!(
        removed,
        serde_json::json!({
            "CVE-2024-2222": ["drivers/net/ethernet/bar.c"]
        })
    );

    // Filtered report: only the inapplicable CVE was demoted
    let filtered = fixture.read_json(&fixture.filtered_dir.join("kernel_filtered.json"));
    let issues = &filtered["package"][0]["issue"];
    assert_eq!(issues[0]["status"], "Unpatched");
    assert_eq!(issues[1]["status"], "Ignored");
    assert_eq!(issues[1]["detail"], "cve-not-compiled-in-kernel");
    assert!(issues[1]["description"]
        .as_str()
        .unwrap()
        .contains("not affecting the current kernel build"));
    assert_eq!(issues[2]["status"], "Unpatched");
    assert_eq!(issues[3]["status"], "Patched");

    // Other packages are untouched
    let input: Value = serde_json::from_str(REPORT).unwrap();
    assert_eq!(filtered["package"][1], input["package"][1]);
}

#[test]
fn empty_build_tree_demotes_every_resolved_cve() {
    let fixture = Fixture::new();
    fixture.write_report(REPORT);
    fixture.write_vulns_record("2024", "CVE-2024-1111", &["drivers/usb/core/hub.c"]);
    fixture.write_vulns_record("2024", "CVE-2024-2222", &["drivers/net/ethernet/bar.c"]);

    fixture
        .command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Unique compiled source files found: 0"))
        .stdout(predicate::str::contains(
            "Kernel CVEs ignored: 2, kept as Unpatched: 1",
        ));

    // Applicable and inapplicable ids partition the unpatched set
    let remaining = fixture.read_json(&fixture.analysis_dir.join("kernel_remaining_cves.json"));
    let removed = fixture.read_json(&fixture.analysis_dir.join("kernel_removed_cves.json"));

    let mut all_ids: Vec<String> = remaining
        .as_object()
        .unwrap()
        .keys()
        .chain(removed.as_object().unwrap().keys())
        .cloned()
        .collect();
    all_ids.sort();
    assert_eq!(all_ids, vec!["CVE-2023-3333", "CVE-2024-1111", "CVE-2024-2222"]);
    assert!(remaining.as_object().unwrap().keys().all(|k| !removed
        .as_object()
        .unwrap()
        .contains_key(k)));
}

#[test]
fn kernel_package_name_is_configurable() {
    let fixture = Fixture::new();
    fixture.write_report(
        r#"{"package": [{"name": "linux-custom", "issue": [
            {"id": "CVE-2024-1111", "status": "Unpatched", "summary": "a",
             "link": "x", "scorev2": null, "scorev3": null, "scorev4": null,
             "detail": "version-in-range"}
        ]}]}"#,
    );

    fixture
        .command()
        .arg("--kernel-package")
        .arg("linux-custom")
        .assert()
        .success()
        .stdout(predicate::str::contains("Unpatched kernel CVEs: 1"));
}
