// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use crate::models::report::{CheckReport, CveRecord};
use crate::utils::write_json_file;

/// Detail value written into demoted issues.
pub const IGNORED_DETAIL: &str = "cve-not-compiled-in-kernel";

/// Description attached to demoted issues.
pub const IGNORED_DESCRIPTION: &str =
    "ingebouwd detected that this CVE is not affecting the current kernel build.";

/// The status cve-check assigns to issues that have no fix in the tracked
/// version. Compared exactly, after trimming surrounding whitespace.
pub const UNPATCHED_STATUS: &str = "Unpatched";

/// Load a cve-check report and return every issue of the kernel package
/// whose status is "Unpatched".
///
/// # Errors
///
/// Fails if the file cannot be read or lacks the top-level "package" list;
/// neither is recoverable.
pub fn load_unpatched(report_path: &Path, kernel_package: &str) -> Result<Vec<CveRecord>> {
    let raw = fs::read_to_string(report_path)
        .with_context(|| format!("Failed reading cve-check report {}", report_path.display()))?;

    let report: CheckReport = serde_json::from_str(&raw).with_context(|| {
        format!(
            "Invalid cve-check report {} (expected a top-level 'package' list)",
            report_path.display()
        )
    })?;

    let mut unpatched = Vec::new();
    for package in &report.package {
        if package.name != kernel_package {
            continue;
        }
        for issue in &package.issue {
            if issue.status.trim() != UNPATCHED_STATUS {
                continue;
            }
            unpatched.push(issue.clone());
        }
    }

    Ok(unpatched)
}

/// Counts reported by the filtered-report generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCounts {
    /// Unpatched kernel issues demoted to "Ignored"
    pub ignored: usize,
    /// Unpatched kernel issues kept as-is because they are applicable
    pub kept: usize,
}

/// Rewrite the original cve-check report so that every unpatched kernel
/// issue that is NOT applicable to this build is marked "Ignored", with an
/// explanatory detail and description. Everything else is carried through
/// untouched.
///
/// The document is mutated as a JSON value rather than through the typed
/// model so fields this tool does not know about survive the round trip.
///
/// # Errors
///
/// Fails if the input cannot be read, lacks the top-level "package" list,
/// or the output cannot be written.
pub fn generate_filtered_report(
    report_path: &Path,
    kernel_package: &str,
    unpatched_ids: &BTreeSet<String>,
    enabled_cves: &BTreeMap<String, Vec<String>>,
    output_path: &Path,
) -> Result<FilterCounts> {
    let raw = fs::read_to_string(report_path)
        .with_context(|| format!("Failed reading cve-check report {}", report_path.display()))?;
    let mut document: Value = serde_json::from_str(&raw)
        .with_context(|| format!("Invalid cve-check report {}", report_path.display()))?;

    let packages = document
        .get_mut("package")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| {
            anyhow!(
                "Invalid cve-check report {} (missing 'package')",
                report_path.display()
            )
        })?;

    let mut counts = FilterCounts { ignored: 0, kept: 0 };

    for package in packages.iter_mut() {
        if package.get("name").and_then(Value::as_str) != Some(kernel_package) {
            continue;
        }
        let Some(issues) = package.get_mut("issue").and_then(Value::as_array_mut) else {
            continue;
        };

        for issue in issues.iter_mut() {
            let Some(id) = issue.get("id").and_then(Value::as_str).map(String::from) else {
                continue;
            };
            if !unpatched_ids.contains(&id) {
                continue;
            }
            if enabled_cves.contains_key(&id) {
                counts.kept += 1;
                continue;
            }

            let Some(entry) = issue.as_object_mut() else {
                continue;
            };
            entry.insert("status".to_string(), Value::from("Ignored"));
            entry.insert("detail".to_string(), Value::from(IGNORED_DETAIL));
            entry.insert("description".to_string(), Value::from(IGNORED_DESCRIPTION));
            counts.ignored += 1;
        }
    }

    write_json_file(output_path, &document)?;

    Ok(counts)
}
