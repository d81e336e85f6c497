// SPDX-License-Identifier: GPL-2.0-only
//
// ingebouwd - filter unpatched kernel CVEs down to the ones whose affected
// files were actually compiled into a specific kernel build
//
// "ingebouwd" means "built-in" in Dutch
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::{OwoColorize, Stream::Stdout};
use std::collections::{BTreeMap, BTreeSet};

use ingebouwd::models::Args;
use ingebouwd::{matcher, report, scanner, utils, vulns};

/// Initialize and configure the logging system
fn initialize_logging(verbose: bool) {
    let logging_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    env_logger::builder()
        .format_timestamp(None)
        .filter_level(logging_level)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    initialize_logging(args.verbose);
    args.validate()?;

    // Step 1: load the "Unpatched" CVEs from the cve-check report
    let unpatched = report::load_unpatched(&args.input_cve_check, &args.kernel_package)?;
    println!(
        "Unpatched kernel CVEs: {}",
        unpatched.len().if_supports_color(Stdout, |x| x.cyan())
    );

    // Step 2: for each CVE, get the affected program files from the vulns repo
    let affected_files = vulns::get_affected_files(&args.vulns_path, &unpatched);
    println!(
        "CVEs with affected files from the vulns repo: {}",
        affected_files.len().if_supports_color(Stdout, |x| x.cyan())
    );

    // Step 3: CVEs without affected-file data cannot be proven absent from
    // the build and are kept as applicable up front
    let unpatched_ids: BTreeSet<String> = unpatched
        .iter()
        .filter(|cve| !cve.id.is_empty())
        .map(|cve| cve.id.clone())
        .collect();
    let mut enabled_cves: BTreeMap<String, Vec<String>> = unpatched_ids
        .iter()
        .filter(|id| !affected_files.contains_key(*id))
        .map(|id| (id.clone(), Vec::new()))
        .collect();
    println!(
        "CVEs without affected files (kept as applicable): {}",
        enabled_cves.len().if_supports_color(Stdout, |x| x.cyan())
    );

    // Step 4: build the compiled source list from the .o.cmd records
    println!("Scanning .o.cmd files for compiled sources...");
    let compiled_sources = scanner::build_compiled_sources(&args.input_build_kernel_path);
    println!(
        "Unique compiled source files found: {}",
        compiled_sources.len().if_supports_color(Stdout, |x| x.cyan())
    );

    // Step 5: match CVE program files against the compiled sources
    matcher::map_cves_to_compiled_sources(&affected_files, &compiled_sources, &mut enabled_cves);
    println!(
        "Total CVEs affecting this kernel build: {}",
        enabled_cves.len().if_supports_color(Stdout, |x| x.green())
    );

    // Step 6: write the analysis artifacts and the filtered report
    let remaining_path = args
        .output_path_analysis
        .join(&args.output_filename_remaining_cves);
    utils::write_json_file(&remaining_path, &enabled_cves)
        .context("Failed writing the applicable-CVE map")?;
    println!("Wrote applicable CVEs to: {}", remaining_path.display());

    let removed_cves: BTreeMap<&String, &Vec<String>> = affected_files
        .iter()
        .filter(|(id, _)| !enabled_cves.contains_key(*id))
        .collect();
    let removed_path = args
        .output_path_analysis
        .join(&args.output_filename_removed_cves);
    utils::write_json_file(&removed_path, &removed_cves)
        .context("Failed writing the inapplicable-CVE map")?;
    println!("Wrote inapplicable CVEs to: {}", removed_path.display());

    let filtered_path = args
        .output_path_cve_check
        .join(&args.output_filename_cve_check);
    let counts = report::generate_filtered_report(
        &args.input_cve_check,
        &args.kernel_package,
        &unpatched_ids,
        &enabled_cves,
        &filtered_path,
    )?;
    println!("Wrote filtered cve-check report to: {}", filtered_path.display());
    println!(
        "Kernel CVEs ignored: {}, kept as Unpatched: {}",
        counts.ignored.if_supports_color(Stdout, |x| x.cyan()),
        counts.kept.if_supports_color(Stdout, |x| x.cyan())
    );

    Ok(())
}
