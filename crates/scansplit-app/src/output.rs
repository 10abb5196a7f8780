// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output layout: `<out>/<stem>_split/photo_NN.jpg`, plus `_debug/` images
// when diagnostics were collected.

use std::path::{Path, PathBuf};

use scansplit_core::error::Result;
use scansplit_imaging::SplitOutput;
use scansplit_imaging::codec::save_jpeg;

/// Sub-directory of a split folder holding debug images.
pub const DEBUG_DIR: &str = "_debug";

/// File name of the photo at 1-based `index`.
pub fn photo_file_name(index: usize) -> String {
    format!("photo_{index:02}.jpg")
}

/// Folder receiving the photos of `input`.
pub fn split_dir(out_root: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    out_root.join(format!("{stem}_split"))
}

/// Write every photo (and debug image) of one page. Returns the number of
/// photos written.
pub fn write_split(dir: &Path, split: &SplitOutput, quality: u8) -> Result<usize> {
    for photo in &split.photos {
        save_jpeg(&dir.join(photo_file_name(photo.index)), &photo.image, quality)?;
    }

    if let Some(diagnostics) = &split.diagnostics {
        let debug_dir = dir.join(DEBUG_DIR);
        save_jpeg(
            &debug_dir.join("00_page_oriented.jpg"),
            &diagnostics.oriented,
            quality,
        )?;
        save_jpeg(&debug_dir.join("01_overlay.jpg"), &diagnostics.overlay, quality)?;
        for step in &diagnostics.steps {
            save_jpeg(
                &debug_dir.join(format!("step_{}.jpg", step.name)),
                &step.image.to_rgb(),
                quality,
            )?;
        }
    }
    Ok(split.photos.len())
}
