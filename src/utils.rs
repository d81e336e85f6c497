// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::fs;
use std::path::Path;

/// Serialize a value as multi-line JSON with 4-space indentation and a
/// trailing newline. Map keys come out in sorted order, so output is
/// deterministic across runs.
pub fn to_pretty_json<T: Serialize>(value: &T) -> Result<String> {
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut output = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut output, formatter);

    value
        .serialize(&mut serializer)
        .context("Error serializing JSON")?;

    let mut json = String::from_utf8(output).context("Error converting JSON to string")?;
    if !json.ends_with('\n') {
        json.push('\n');
    }

    Ok(json)
}

/// Serialize a value and write it to a file. Failure to write an output
/// artifact is fatal to the run.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = to_pretty_json(value)?;
    fs::write(path, json).with_context(|| format!("Failed writing {}", path.display()))?;
    Ok(())
}
