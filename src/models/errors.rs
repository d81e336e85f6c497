// SPDX-License-Identifier: GPL-2.0-only
//
// Copyright (c) 2025 - Sasha Levin <sashal@kernel.org>

use std::path::PathBuf;
use thiserror::Error;

/// Error types for the build-tree scanner
#[derive(Error, Debug)]
pub enum ScanError {
    /// A bookkeeping record that could not be read (permissions, encoding)
    #[error("Failed to read {}: {source}", .path.display())]
    UnreadableRecord {
        path: PathBuf,
        source: std::io::Error,
    },
}
