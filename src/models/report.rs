// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use serde::{Deserialize, Serialize};

/// A cve-check report: a list of packages, each with a list of CVE issues.
///
/// Deserialization fails when the top-level "package" list is absent, which
/// is exactly the malformed-input condition the tool cannot recover from.
#[derive(Debug, Deserialize)]
pub struct CheckReport {
    pub package: Vec<Package>,
}

#[derive(Debug, Deserialize)]
pub struct Package {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issue: Vec<CveRecord>,
}

/// One vulnerability entry inside a package's issue list. The scores are
/// emitted as strings or null by cve-check, never numbers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CveRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub scorev2: Option<String>,
    #[serde(default)]
    pub scorev3: Option<String>,
    #[serde(default)]
    pub scorev4: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
