// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;

/// Filter unpatched kernel CVEs down to the ones compiled into a build.
///
/// ingebouwd cross-references the affected files of every unpatched kernel
/// CVE in a cve-check report against the source and header files the build
/// system actually compiled, as recorded in the .o.cmd files of a kernel
/// build tree. CVEs whose affected files were never compiled are demoted to
/// "Ignored" in the filtered report.
///
/// "ingebouwd" means "built-in" in Dutch.
///
/// Example:
///
///   ingebouwd --vulns-path ~/vulns \
///       --input-cve-check tmp/deploy/cve/linux-yocto_cve.json \
///       --input-build-kernel-path tmp/work-shared/linux/kernel-build-artifacts \
///       --output-path-analysis tmp/deploy/cve \
///       --output-path-cve-check tmp/deploy/cve
#[derive(Parser, Debug)]
#[clap(author, version, about, verbatim_doc_comment)]
pub struct Args {
    /// Path to the kernel vulns repository root
    #[clap(long, value_name = "DIR")]
    pub vulns_path: PathBuf,

    /// Path to the cve-check report to filter
    #[clap(long, value_name = "FILE")]
    pub input_cve_check: PathBuf,

    /// Path to the kernel build tree
    #[clap(long, value_name = "DIR")]
    pub input_build_kernel_path: PathBuf,

    /// Directory where the applicable/inapplicable CVE maps are written
    #[clap(long, value_name = "DIR")]
    pub output_path_analysis: PathBuf,

    /// Directory where the filtered cve-check report is written
    #[clap(long, value_name = "DIR")]
    pub output_path_cve_check: PathBuf,

    /// Filename for the filtered cve-check report
    #[clap(long, default_value = "kernel_filtered.json")]
    pub output_filename_cve_check: String,

    /// Filename for the applicable-CVE map
    #[clap(long, default_value = "kernel_remaining_cves.json")]
    pub output_filename_remaining_cves: String,

    /// Filename for the inapplicable-CVE map
    #[clap(long, default_value = "kernel_removed_cves.json")]
    pub output_filename_removed_cves: String,

    /// Name of the kernel package in the cve-check report
    #[clap(long, default_value = "linux-yocto")]
    pub kernel_package: String,

    /// Enable verbose output
    #[clap(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Check that every input and output path exists and is of the right
    /// kind. Any violation is fatal.
    pub fn validate(&self) -> Result<()> {
        if !self.input_build_kernel_path.is_dir() {
            return Err(anyhow!(
                "Kernel build path is not a directory: {}",
                self.input_build_kernel_path.display()
            ));
        }
        if !self.input_cve_check.is_file() {
            return Err(anyhow!(
                "CVE check input file does not exist: {}",
                self.input_cve_check.display()
            ));
        }
        if !self.vulns_path.is_dir() {
            return Err(anyhow!(
                "Vulns path is not a directory: {}",
                self.vulns_path.display()
            ));
        }
        if !self.output_path_analysis.is_dir() {
            return Err(anyhow!(
                "Output path for analysis results is not a directory: {}",
                self.output_path_analysis.display()
            ));
        }
        if !self.output_path_cve_check.is_dir() {
            return Err(anyhow!(
                "Output path for the filtered cve-check report is not a directory: {}",
                self.output_path_cve_check.display()
            ));
        }

        Ok(())
    }
}
