//! `zsyncrange`: given a control file and a candidate seed, reports the
//! byte ranges a client would still need to download without touching the
//! network.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};

use control::{codec, TargetDescription};
use matchscan::{scan_bytes, BlockSink, NeededSet};
use zindex::BlockIndex;
use zsync_core::ExitCode;

use crate::args::PlannerArgs;

struct RecordingSink {
    source_offsets: BTreeMap<u32, usize>,
}

impl BlockSink for RecordingSink {
    fn write_block(&mut self, _block_id: u32, _data: &[u8]) -> io::Result<()> {
        Ok(())
    }

    fn note_match(&mut self, block_id: u32, source_offset: usize) {
        self.source_offsets.insert(block_id, source_offset);
    }
}

/// Runs the planner, writing the JSON plan to stdout.
pub fn run(args: PlannerArgs) -> ExitCode {
    let control_bytes = match fs::read(&args.control) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("zsyncrange: cannot read {}: {err}", args.control.display());
            return ExitCode::Fatal;
        }
    };
    let target = match codec::parse(control_bytes.as_slice()) {
        Ok(target) => target,
        Err(err) => {
            eprintln!("zsyncrange: bad control file: {err}");
            return ExitCode::Fatal;
        }
    };

    let seed_data = match fs::read(&args.seed) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("zsyncrange: cannot read {}: {err}", args.seed.display());
            return ExitCode::Fatal;
        }
    };

    let mut index = BlockIndex::build(&target);
    let mut needed = NeededSet::full(target.block_count());
    let mut sink = RecordingSink {
        source_offsets: BTreeMap::new(),
    };
    scan_bytes(&seed_data, &target, &mut index, &mut needed, &mut sink);

    let reuse = coalesce_reuse(&target, &sink.source_offsets);
    let download = needed.byte_ranges(target.blocksize, target.length);

    if let Err(err) = write_plan(&mut io::stdout(), &target, &reuse, &download) {
        eprintln!("zsyncrange: {err}");
        return ExitCode::Fatal;
    }
    ExitCode::Success
}

/// Merges per-block matches into coalesced `(dst, src, len)` triples
/// wherever consecutive blocks matched from consecutive seed offsets.
fn coalesce_reuse(target: &TargetDescription, source_offsets: &BTreeMap<u32, usize>) -> Vec<(u64, u64, u64)> {
    let mut reuse: Vec<(u64, u64, u64)> = Vec::new();
    for (&block_id, &source_offset) in source_offsets {
        let dst = target.block_byte_range(block_id).start;
        let len = u64::from(target.block_len(block_id));
        let src = source_offset as u64;

        if let Some(last) = reuse.last_mut() {
            if last.0 + last.2 == dst && last.1 + last.2 == src {
                last.2 += len;
                continue;
            }
        }
        reuse.push((dst, src, len));
    }
    reuse
}

fn write_plan<W: Write>(
    writer: &mut W,
    target: &TargetDescription,
    reuse: &[(u64, u64, u64)],
    download: &[(u64, u64)],
) -> io::Result<()> {
    write!(writer, "{{\"length\":{}", target.length)?;

    write!(writer, ",\"checksum\":{{")?;
    if let Some(sha1) = target.whole_file_sha1 {
        write!(writer, "\"SHA-1\":\"{}\"", hex(&sha1))?;
    }
    write!(writer, "}}")?;

    write!(writer, ",\"reuse\":[")?;
    for (i, (dst, src, len)) in reuse.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(writer, "[{dst},{src},{len}]")?;
    }
    write!(writer, "]")?;

    write!(writer, ",\"download\":[")?;
    for (i, (lo, hi)) in download.iter().enumerate() {
        if i > 0 {
            write!(writer, ",")?;
        }
        write!(writer, "[{lo},{hi}]")?;
    }
    writeln!(writer, "]}}")
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
