// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scansplit: split multi-photo flatbed scans into individual photos.
//
// Entry point. Initialises logging, loads the splitter configuration and
// processes every input file in turn.

mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use scansplit_core::SplitConfig;
use scansplit_core::error::Result;
use scansplit_imaging::PhotoSplitter;
use scansplit_imaging::codec::{self, DEFAULT_JPEG_QUALITY};
use tracing::{error, info, warn};

#[derive(Debug, Parser)]
#[command(name = "scansplit")]
#[command(about = "Find, deskew and trim the individual photos on flatbed scans")]
#[command(version)]
struct Cli {
    /// Scanned pages to split.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory receiving one `<stem>_split` folder per input.
    #[arg(long, short, default_value = "_extracted")]
    out_dir: PathBuf,

    /// JSON file with splitter settings; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the oriented page, a box overlay and intermediate masks
    /// into `_debug/`.
    #[arg(long)]
    debug: bool,

    /// JPEG quality of the written images.
    #[arg(
        long,
        default_value_t = DEFAULT_JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100)
    )]
    jpeg_quality: u8,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "scansplit failed");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> Result<SplitConfig> {
    let mut config = match &cli.config {
        Some(path) => SplitConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => SplitConfig::default(),
    };
    if cli.debug {
        config.diagnostics = true;
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<()> {
    let splitter = PhotoSplitter::new(load_config(cli)?)?;
    info!(
        inputs = cli.inputs.len(),
        out_dir = %cli.out_dir.display(),
        "Scansplit starting"
    );

    let mut total = 0;
    for input in &cli.inputs {
        let page = match codec::open_page(input) {
            Ok(page) => page,
            Err(err) => {
                warn!(input = %input.display(), error = %err, "Skipping unreadable file");
                continue;
            }
        };

        let split = splitter.split(&page);
        let dir = output::split_dir(&cli.out_dir, input);
        let written = output::write_split(&dir, &split, cli.jpeg_quality)?;
        if written == 0 {
            warn!(input = %input.display(), "No photos detected");
        } else {
            info!(
                input = %input.display(),
                photos = written,
                dir = %dir.display(),
                "Photos written"
            );
        }
        total += written;
    }

    info!(photos = total, "Scansplit finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_and_flags() {
        let cli = Cli::try_parse_from(["scansplit", "a.jpg", "b.png"]).expect("parse");
        assert_eq!(cli.inputs.len(), 2);
        assert_eq!(cli.out_dir, PathBuf::from("_extracted"));
        assert_eq!(cli.jpeg_quality, 95);
        assert!(!cli.debug);

        let cli = Cli::try_parse_from(["scansplit", "--debug", "--jpeg-quality", "80", "a.jpg"])
            .expect("parse");
        assert!(cli.debug && cli.jpeg_quality == 80);
        assert!(load_config(&cli).expect("config").diagnostics);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(Cli::try_parse_from(["scansplit"]).is_err());
        assert!(Cli::try_parse_from(["scansplit", "--jpeg-quality", "0", "a.jpg"]).is_err());
    }

    #[test]
    fn config_file_is_validated() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("split.json");
        std::fs::write(&path, r#"{ "crop_padding": 4 }"#).expect("write");
        let arg = path.to_string_lossy().into_owned();
        let cli = Cli::try_parse_from(["scansplit", "--config", arg.as_str(), "a.jpg"])
            .expect("parse");
        assert_eq!(load_config(&cli).expect("config").crop_padding, 4);

        std::fs::write(&path, r#"{ "close_kernel": 6 }"#).expect("write");
        assert!(load_config(&cli).is_err());
    }

    #[test]
    fn unreadable_inputs_are_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bogus = dir.path().join("notes.jpg");
        std::fs::write(&bogus, b"plain text").expect("write");
        let out = dir.path().join("out");
        let cli = Cli {
            inputs: vec![bogus, dir.path().join("missing.png")],
            out_dir: out.clone(),
            config: None,
            debug: false,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        };
        run(&cli).expect("skips, does not fail");
        assert!(!out.exists());
    }
}
