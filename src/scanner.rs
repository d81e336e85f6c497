// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use log::warn;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;
use walkdir::WalkDir;

use crate::models::ScanError;

// Assignment lines written by the kernel build system into each .o.cmd
// file. The deps_ value runs to the end of the file, with physical lines
// joined by trailing backslashes.
static SOURCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^source_(\S+)\s*:=\s*(\S+\.c)").unwrap());
static DEPS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?ms)^deps_\S+\s*:=\s*(.*)").unwrap());

/// What a single .o.cmd file declares: the object key (relative to the
/// build root), the .c file it was compiled from (verbatim, as the compiler
/// saw it), and every header it pulled in.
#[derive(Debug, Default)]
pub struct CmdRecord {
    pub object: Option<String>,
    pub source: Option<String>,
    pub headers: BTreeSet<String>,
}

/// Scan the kernel build tree and return every source file (.c and .h)
/// referenced across all compiled objects, as recorded in the .o.cmd files.
///
/// Records that cannot be read are skipped with a warning; the scan never
/// aborts on a single bad record. The result is sorted and deduplicated so
/// downstream matching is deterministic.
pub fn build_compiled_sources(build_root: &Path) -> Vec<String> {
    let mut sources: BTreeSet<String> = BTreeSet::new();

    for entry in WalkDir::new(build_root).into_iter().filter_map(Result::ok) {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if !path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(".o.cmd"))
        {
            continue;
        }

        match parse_cmd_file(path, build_root) {
            Ok(record) => {
                if let Some(source) = record.source {
                    sources.insert(source);
                }
                sources.extend(record.headers);
            }
            Err(e) => warn!("{e}"),
        }
    }

    sources.into_iter().collect()
}

/// Parse a single .o.cmd file from disk.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text.
pub fn parse_cmd_file(cmd_path: &Path, build_root: &Path) -> Result<CmdRecord, ScanError> {
    let raw = fs::read_to_string(cmd_path).map_err(|source| ScanError::UnreadableRecord {
        path: cmd_path.to_path_buf(),
        source,
    })?;

    Ok(parse_cmd_record(&raw, build_root))
}

/// Extract the source assignment and the dependency list from the raw text
/// of a bookkeeping record. A record with no recognizable lines yields an
/// empty `CmdRecord`.
pub fn parse_cmd_record(raw: &str, build_root: &Path) -> CmdRecord {
    let mut record = CmdRecord::default();

    if let Some(caps) = SOURCE_REGEX.captures(raw) {
        record.object = Some(caps[1].to_string());
        record.source = Some(caps[2].to_string());
    }

    if let Some(caps) = DEPS_REGEX.captures(raw) {
        let deps = caps[1].replace("\\\n", " ");
        for token in deps.split_whitespace() {
            // Skip $(wildcard ...) and other make macro expressions
            if token.starts_with("$(") {
                continue;
            }
            if !token.ends_with(".h") {
                continue;
            }

            let token_path = Path::new(token);
            if token_path.is_absolute() {
                record.headers.insert(token.to_string());
            } else {
                let resolved = normalize_path(&build_root.join(token_path));
                record.headers.insert(resolved.to_string_lossy().into_owned());
            }
        }
    }

    record
}

/// Collapse "." and ".." segments lexically, without touching the
/// filesystem. Relative dependency tokens are recorded against the build
/// root, which may not exist by the time the record is parsed.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                // ".." directly under the root collapses away
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}
