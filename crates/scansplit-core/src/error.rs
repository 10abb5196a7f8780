// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scansplit.
//
// The detection pipeline itself never fails on image content (an empty page
// simply yields no photos). Errors only come from configuration and from the
// decode/encode collaborators around the pipeline.

use thiserror::Error;

/// Top-level error type for all Scansplit operations.
#[derive(Debug, Error)]
pub enum ScanSplitError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanSplitError>;
