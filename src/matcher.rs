// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use std::collections::BTreeMap;

/// A source path as reported by the vulnerability database, used as a
/// suffix probe against the compiled-source set.
///
/// Affected-file paths are project-relative ("drivers/usb/foo.c") while
/// compiled paths are build-tree-absolute, so the comparison is a literal
/// string suffix check. A short relative path can align with an unrelated
/// absolute path that happens to share its trailing characters; the match
/// is deliberately recall-biased. Swapping this type for a component-wise
/// comparison changes the policy without touching any caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSuffix<'a>(&'a str);

impl<'a> SourceSuffix<'a> {
    #[must_use]
    pub fn new(path: &'a str) -> Self {
        Self(path)
    }

    /// Only .c and .h files can correspond to compiled sources; anything
    /// else (Makefiles, .S, documentation) never matches.
    #[must_use]
    pub fn is_source(&self) -> bool {
        self.0.ends_with(".c") || self.0.ends_with(".h")
    }

    /// Whether a compiled path refers to this affected file.
    #[must_use]
    pub fn matches(&self, compiled_path: &str) -> bool {
        compiled_path.ends_with(self.0)
    }
}

/// For each CVE with affected files, check whether any of them was compiled
/// into this build. On the first matching file the CVE is recorded in
/// `enabled_cves` with its full affected-file list and the rest of its
/// files are not tested.
///
/// `enabled_cves` arrives pre-seeded with the CVEs that have no affected
/// file data at all: those cannot be proven absent and stay applicable.
pub fn map_cves_to_compiled_sources(
    affected_files_by_cve: &BTreeMap<String, Vec<String>>,
    compiled_sources: &[String],
    enabled_cves: &mut BTreeMap<String, Vec<String>>,
) {
    for (cve_id, affected_files) in affected_files_by_cve {
        let compiled_in = affected_files
            .iter()
            .map(|file| SourceSuffix::new(file))
            .filter(SourceSuffix::is_source)
            .any(|suffix| compiled_sources.iter().any(|src| suffix.matches(src)));

        if compiled_in {
            enabled_cves.insert(cve_id.clone(), affected_files.clone());
        }
    }
}
