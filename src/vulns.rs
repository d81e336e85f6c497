// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use log::{debug, warn};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::report::CveRecord;
use crate::models::VulnsRecord;

/// The product name kernel CVE records carry in their affected entries.
pub const KERNEL_PRODUCT: &str = "Linux";

/// Build the path of a CVE's record in the vulns repository. Published
/// records are sharded by the year component of the id.
fn record_path(vulns_path: &Path, cve_id: &str, year: &str) -> PathBuf {
    vulns_path
        .join("cve")
        .join("published")
        .join(year)
        .join(format!("{cve_id}.json"))
}

/// For each unpatched CVE, load its record from the vulns repository and
/// collect the program files the kernel project reports as affected.
///
/// Missing or malformed records are expected (the vulns repository does not
/// cover every id cve-check knows about) and make that CVE unresolved: it
/// is left out of the returned map, which by policy keeps it applicable.
pub fn get_affected_files(
    vulns_path: &Path,
    unpatched_cves: &[CveRecord],
) -> BTreeMap<String, Vec<String>> {
    let mut results: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for entry in unpatched_cves {
        let cve_id = &entry.id;
        if cve_id.is_empty() {
            continue;
        }

        let Some(year) = cve_id.split('-').nth(1) else {
            debug!("Malformed CVE id, no year component: {cve_id}");
            continue;
        };

        let cve_file = record_path(vulns_path, cve_id, year);
        if !cve_file.is_file() {
            debug!("Missing vulns entry for {cve_id}");
            continue;
        }

        let record: VulnsRecord = match fs::read_to_string(&cve_file)
            .map_err(anyhow::Error::from)
            .and_then(|raw| serde_json::from_str(&raw).map_err(anyhow::Error::from))
        {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed parsing {}: {e}", cve_file.display());
                continue;
            }
        };

        let mut affected_files: BTreeSet<String> = BTreeSet::new();
        for product in &record.containers.cna.affected {
            if product.product != KERNEL_PRODUCT {
                continue;
            }
            affected_files.extend(product.program_files.iter().cloned());
        }

        if affected_files.is_empty() {
            continue;
        }

        debug!("{cve_id}:");
        for file in &affected_files {
            debug!("  - {file}");
        }
        results.insert(cve_id.clone(), affected_files.into_iter().collect());
    }

    results
}
