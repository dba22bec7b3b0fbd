/*
 * DLSS Archiver v1.0.0
 * Copyright (c) 2026 DLSS Archiver Contributors.
 * Licensed under the MIT License.
 */

use crate::{
    builder::ArchiveBuilder,
    config::{Config, Mode},
    error::ArchiveError,
    record::build_record,
    timestamp::extract_timestamp_details,
    ui::Ui,
    verification::AuthenticodeVerifier,
    *,
};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::Path;

pub fn build_command() -> Command {
    let binary_name = std::env::args()
        .next()
        .and_then(|p| {
            Path::new(&p)
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| APP_BIN_NAME.to_string());

    let input_arg = |help: &'static str| {
        Arg::new("input")
            .required(true)
            .help(help)
            .index(1)
    };
    let allow_invalid_arg = Arg::new("allow_invalid")
        .long("allow-invalid")
        .action(ArgAction::SetTrue)
        .help("Admit DLLs whose embedded signature does not validate");

    Command::new(APP_NAME)
        .bin_name(binary_name)
        .version(APP_VERSION)
        .author(APP_AUTHOR)
        .about(APP_ABOUT)
        .disable_version_flag(true)
        .help_template("{about-with-newline}{usage-heading} {usage}\n\n{all-args}\n")
        .subcommand_required(false)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("build")
                .about("Validate and package every input zip, then write the manifest and notes")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help(format!("Output directory, reset on every run [default: {}]", DEFAULT_OUTPUT_DIR)),
                )
                .arg(
                    Arg::new("input")
                        .short('i')
                        .long("input")
                        .value_name("DIR")
                        .help(format!("Directory searched for input zips [default: {}]", DEFAULT_INPUT_DIR)),
                )
                .arg(
                    Arg::new("manifest")
                        .short('m')
                        .long("manifest")
                        .value_name("URL|PATH")
                        .help("Baseline manifest to reconcile against [default: published archive]"),
                )
                .arg(
                    Arg::new("release_url")
                        .long("release-url")
                        .value_name("URL")
                        .help("Prefix of the download URLs written to the manifest"),
                )
                .arg(
                    Arg::new("allow_description")
                        .long("allow-description")
                        .value_name("TEXT")
                        .action(ArgAction::Append)
                        .help("File description of a stable build (repeatable, replaces the defaults)"),
                )
                .arg(
                    Arg::new("jobs")
                        .short('j')
                        .long("jobs")
                        .value_name("N")
                        .value_parser(value_parser!(usize))
                        .help(format!("Parallel downloads [default: {}]", DEFAULT_JOBS)),
                )
                .arg(
                    Arg::new("timeout")
                        .long("timeout")
                        .value_name("SECS")
                        .value_parser(value_parser!(u64))
                        .help(format!("Network timeout in seconds [default: {}]", DEFAULT_TIMEOUT_SECS)),
                )
                .arg(
                    Arg::new("offline")
                        .long("offline")
                        .action(ArgAction::SetTrue)
                        .help("Skip downloading missing baseline archives"),
                )
                .arg(allow_invalid_arg.clone()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Print the provenance record of a single DLL")
                .arg_required_else_help(true)
                .arg(input_arg("Path to the DLL"))
                .arg(allow_invalid_arg),
        )
        .subcommand(
            Command::new("verify")
                .about("Check the embedded Authenticode signature of a DLL")
                .arg_required_else_help(true)
                .arg(input_arg("Path to the DLL to verify")),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Set verbosity level (-v for verbose, -vv for more verbose, -vvv for debug)"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Suppress all output except errors"),
        )
        .arg(
            Arg::new("version_custom")
                .short('V')
                .long("version")
                .action(ArgAction::SetTrue)
                .help("Print version information"),
        )
}

pub fn run() -> Result<(), ArchiveError> {
    let matches = build_command().get_matches();
    run_with(&matches)
}

pub fn run_with(matches: &ArgMatches) -> Result<(), ArchiveError> {
    if matches.get_flag("version_custom") {
        let mut ui = Ui::new(false, false, false, false, true);
        ui.enable_colors_if_supported();
        ui.print_version_info();
        return Ok(());
    }

    let verbosity_level = matches.get_count("verbose");
    let quiet = matches.get_flag("quiet");
    let mut ui = Ui::from_verbosity_level(verbosity_level, quiet, true);
    ui.enable_colors_if_supported();
    ui.print_banner();

    if matches.subcommand().is_none() {
        return Err(ArchiveError::Config("No command provided".into()));
    }

    let config = Config::from_matches(matches, &ui)?;
    match config.mode {
        Mode::Build(build) => {
            ui.print_mode_header("BUILD MODE");
            let report = ArchiveBuilder::new(build).run(&ui)?;
            if ui.verbose {
                eprintln!();
            }
            report.print(&ui);
        }
        Mode::Inspect {
            input,
            allow_invalid,
        } => {
            ui.print_mode_header("INSPECT MODE");
            inspect(&input, allow_invalid, &ui)?;
        }
        Mode::Verify { input } => {
            ui.print_mode_header("VERIFICATION MODE");
            ui.info(&format!("Verifying: {}", input.display()));
            match AuthenticodeVerifier::verify(&input) {
                Ok(()) => ui.success("Signature valid."),
                Err(e) => {
                    ui.verbose(&format!("Verification failed: {}", e));
                    return Err(ArchiveError::SignatureInvalid(input));
                }
            }
        }
    }
    Ok(())
}

fn inspect(input: &Path, allow_invalid: bool, ui: &Ui) -> Result<(), ArchiveError> {
    let record = build_record(input, allow_invalid)?;
    let details = extract_timestamp_details(input)?;
    ui.very_verbose(&format!(
        "Reserved timestamp attributes skipped: {}",
        details.reserved_attributes
    ));

    let signed = match record.signed_timestamp.time() {
        Some(time) => time.to_rfc3339(),
        None => "unknown".to_string(),
    };
    let source = record
        .signed_timestamp
        .source()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());

    ui.print_summary(
        "Provenance Record",
        &[
            ("File", input.display().to_string()),
            ("Version", record.display_version.clone()),
            ("Ordering key", record.ordering_key().to_string()),
            ("Description", record.description.clone()),
            ("MD5", record.content_hash.clone()),
            ("Size", format!("{} bytes", record.file_size_bytes)),
            ("Signature", if record.signature_valid { "valid" } else { "INVALID" }.to_string()),
            ("Signed", signed),
            ("Timestamp source", source),
            ("Archive name", record.archive_file_name()),
        ],
    );
    Ok(())
}
