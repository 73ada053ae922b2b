//! `zsync`: reconstructs a target file from a control file, local seeds,
//! and mirror URLs.

use std::fs;
use std::path::{Path, PathBuf};

use control::{codec, TargetDescription};
use tracing::{info, warn};
use transfer::{Coordinator, TransferError, VerifyOutcome};
use url::Url;
use zsync_core::ExitCode;

use crate::args::ClientArgs;
use crate::http::HttpFetcher;

/// Runs the client end to end.
pub fn run(args: ClientArgs) -> ExitCode {
    let fetcher = HttpFetcher::new();

    let (control_bytes, referer) = match load_control(&args, &fetcher) {
        Ok(pair) => pair,
        Err(message) => {
            eprintln!("zsync: {message}");
            return ExitCode::Fatal;
        }
    };

    let mut target = match codec::parse(control_bytes.as_slice()) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("zsync: bad control file: {err}");
            return ExitCode::Fatal;
        }
    };

    if let Err(message) = resolve_urls(&mut target, referer.as_deref()) {
        eprintln!("zsync: {message}");
        return ExitCode::Fatal;
    }

    let outfile = match resolve_outfile(&args, &target) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("zsync: {message}");
            return ExitCode::UsageOrVerification;
        }
    };

    run_with_target(args, target, outfile, fetcher)
}

fn run_with_target(args: ClientArgs, target: TargetDescription, outfile: PathBuf, mut fetcher: HttpFetcher) -> ExitCode {
    let work_dir = outfile.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));

    let mut coordinator = match Coordinator::new(target, work_dir) {
        Ok(coordinator) => coordinator,
        Err(err) => {
            eprintln!("zsync: could not create a temporary file in {}: {err}", work_dir.display());
            return ExitCode::Fatal;
        }
    };

    let mut seeds = args.seeds.clone();
    if outfile.exists() {
        seeds.push(outfile.clone());
    }
    let part_path = part_path_for(&outfile);
    if part_path.exists() {
        seeds.push(part_path);
    }

    info!(count = seeds.len(), "scanning seeds");
    coordinator.ingest_seeds(seeds);

    let status = coordinator.status();
    info!(needed = status.needed_blocks, total = status.total_blocks, "seed scan complete");

    if let Err(err) = coordinator.adopt_as_part(&outfile) {
        eprintln!("zsync: {err}");
        return ExitCode::Fatal;
    }

    if coordinator.status().needed_blocks > 0 {
        if let Err(err) = coordinator.fetch_and_receive(&mut fetcher) {
            for warning in coordinator.warnings() {
                warn!(?warning, "non-fatal warning during fetch");
            }
            eprintln!("zsync: {err}");
            return exit_code_for(&err);
        }
    }

    match coordinator.verify() {
        Ok(VerifyOutcome::NoWholeFileHash) => {
            info!("no whole-file hash to check; trusting block-level verification");
        }
        Ok(VerifyOutcome::Verified) => {
            info!("whole-file hash verified");
        }
        Err(err) => {
            eprintln!("zsync: {err}");
            return exit_code_for(&err);
        }
    }

    if let Err(err) = coordinator.install(&outfile) {
        eprintln!("zsync: failed to install {}: {err}", outfile.display());
        return ExitCode::Fatal;
    }

    info!(path = %outfile.display(), "reconstruction complete");
    ExitCode::Success
}

fn exit_code_for(err: &TransferError) -> ExitCode {
    match err {
        TransferError::WholeFileHashMismatch => ExitCode::UsageOrVerification,
        _ => ExitCode::Fatal,
    }
}

fn load_control(args: &ClientArgs, fetcher: &HttpFetcher) -> Result<(Vec<u8>, Option<String>), String> {
    if let Ok(url) = Url::parse(&args.control) {
        if url.scheme() == "http" || url.scheme() == "https" {
            let bytes = fetcher.get_whole(&args.control).map_err(|err| err.to_string())?;
            let referer = args.referer.clone().or_else(|| Some(args.control.clone()));
            return Ok((bytes, referer));
        }
    }
    let bytes = fs::read(&args.control).map_err(|err| format!("cannot read {}: {err}", args.control))?;
    Ok((bytes, args.referer.clone()))
}

fn resolve_urls(target: &mut TargetDescription, referer: Option<&str>) -> Result<(), String> {
    let base = referer.and_then(|r| Url::parse(r).ok());
    for url in &mut target.urls {
        if Url::parse(url).is_ok() {
            continue;
        }
        let Some(base) = &base else {
            return Err(format!("relative URL {url} with no referer URL to resolve it against; pass -u"));
        };
        let resolved = base
            .join(url)
            .map_err(|err| format!("cannot resolve relative URL {url}: {err}"))?;
        *url = resolved.to_string();
    }
    Ok(())
}

fn resolve_outfile(args: &ClientArgs, target: &TargetDescription) -> Result<PathBuf, String> {
    if let Some(outfile) = &args.outfile {
        return Ok(outfile.clone());
    }
    target
        .filename
        .clone()
        .map(PathBuf::from)
        .ok_or_else(|| "-o OUTFILE is required: the control file carried no Filename: header".to_string())
}

fn part_path_for(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}
