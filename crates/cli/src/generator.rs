//! `zsyncmake`: reads a data file and emits its `.zsync` control file.

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use control::{codec, generate, GeneratorOptions};
use tracing::{info, warn};
use zsync_core::ExitCode;

use crate::args::GeneratorArgs;

/// Runs the generator end to end, writing diagnostics to `stderr`.
pub fn run(args: GeneratorArgs) -> ExitCode {
    let input_name = args.input.as_deref().and_then(|p| p.file_name()).map(|n| n.to_string_lossy().into_owned());

    let filename = args.filename.clone().or_else(|| input_name.clone());

    let mut urls = args.urls.clone();
    if urls.is_empty() {
        match &filename {
            Some(name) => {
                warn!(url = %name, "no -u given; recording the input filename as a relative URL");
                urls.push(name.clone());
            }
            None => {
                eprintln!("zsyncmake: at least one -u URL is required when reading from stdin without -f");
                return ExitCode::UsageOrVerification;
            }
        }
    }

    let outfile = match resolve_outfile(&args) {
        Ok(path) => path,
        Err(message) => {
            eprintln!("zsyncmake: {message}");
            return ExitCode::UsageOrVerification;
        }
    };

    let mtime = args.input.as_deref().and_then(source_mtime);

    let options = GeneratorOptions {
        blocksize: args.blocksize,
        filename,
        urls,
        mtime,
    };

    let source: Box<dyn Read> = match &args.input {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(file),
            Err(err) => {
                eprintln!("zsyncmake: cannot open {}: {err}", path.display());
                return ExitCode::Fatal;
            }
        },
        None => Box::new(io::stdin()),
    };

    let target = match generate(source, &options) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("zsyncmake: {err}");
            return ExitCode::Fatal;
        }
    };

    info!(blocks = target.block_count(), length = target.length, "generated checksum table");

    let result = File::create(&outfile).and_then(|mut file| {
        codec::emit(&mut file, &target).map_err(io::Error::other)?;
        file.flush()
    });

    match result {
        Ok(()) => {
            info!(path = %outfile.display(), "wrote control file");
            ExitCode::Success
        }
        Err(err) => {
            eprintln!("zsyncmake: failed to write {}: {err}", outfile.display());
            ExitCode::Fatal
        }
    }
}

fn resolve_outfile(args: &GeneratorArgs) -> Result<PathBuf, String> {
    if let Some(outfile) = &args.outfile {
        return Ok(outfile.clone());
    }
    match &args.input {
        Some(path) => {
            let mut name = path.as_os_str().to_os_string();
            name.push(".zsync");
            Ok(PathBuf::from(name))
        }
        None => Err("-o OUTFILE is required when reading from stdin".to_string()),
    }
}

fn source_mtime(path: &Path) -> Option<i64> {
    let metadata = std::fs::metadata(path).ok()?;
    let modified = metadata.modified().ok()?;
    let secs = modified.duration_since(SystemTime::UNIX_EPOCH).ok()?.as_secs();
    i64::try_from(secs).ok()
}
