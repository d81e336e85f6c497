// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use serde::Deserialize;

/// The subset of a CVE v5 record this tool reads. Every field defaults so
/// that sparse or hand-edited records still deserialize; a record missing
/// all of them simply contributes no affected files.
#[derive(Debug, Default, Deserialize)]
pub struct VulnsRecord {
    #[serde(default)]
    pub containers: Containers,
}

#[derive(Debug, Default, Deserialize)]
pub struct Containers {
    #[serde(default)]
    pub cna: CnaData,
}

#[derive(Debug, Default, Deserialize)]
pub struct CnaData {
    #[serde(default)]
    pub affected: Vec<AffectedProduct>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AffectedProduct {
    #[serde(default)]
    pub product: String,
    #[serde(rename = "programFiles", default)]
    pub program_files: Vec<String>,
}
