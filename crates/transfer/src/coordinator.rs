//! Orchestrates the full reconstruction lifecycle: seed ingestion, byte-range
//! derivation, block submission from remote data, and final whole-file
//! verification.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use checksums::strong::{block_prefix, Md4, Sha1, StrongDigest};
use control::{StrongAlgorithm, TargetDescription};
use matchscan::{scan, BlockSink, NeededSet};
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};
use tstore::TargetStore;
use zindex::BlockIndex;

use crate::error::{Result, TransferError, Warning};
use crate::fetcher::RangeFetcher;
use crate::receiver::split_into_blocks;
use crate::verify::VerifyOutcome;

/// A snapshot of how much of the target is still outstanding.
#[derive(Clone, Copy, Debug)]
pub struct Status {
    /// Total number of blocks in the target.
    pub total_blocks: u32,
    /// Number of blocks not yet verified present.
    pub needed_blocks: u32,
}

impl Status {
    /// Fraction of blocks already verified present, in `[0.0, 1.0]`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.total_blocks == 0 {
            return 1.0;
        }
        let done = self.total_blocks - self.needed_blocks;
        f64::from(done) / f64::from(self.total_blocks)
    }
}

/// Drives a single reconstruction run from parsed control-file metadata to
/// an installed output file.
pub struct Coordinator {
    target: TargetDescription,
    index: BlockIndex,
    needed: NeededSet,
    store: TargetStore,
    seeded_paths: HashSet<PathBuf>,
    failed_urls: HashSet<String>,
    warnings: Vec<Warning>,
}

impl Coordinator {
    /// Initializes a coordinator for `target`, creating the temporary
    /// target file inside `work_dir`.
    pub fn new(target: TargetDescription, work_dir: &Path) -> Result<Self> {
        let index = BlockIndex::build(&target);
        let needed = NeededSet::full(target.block_count());
        let store = TargetStore::create_in(work_dir, target.blocksize, target.length)?;
        Ok(Self {
            target,
            index,
            needed,
            store,
            seeded_paths: HashSet::new(),
            failed_urls: HashSet::new(),
            warnings: Vec::new(),
        })
    }

    /// Current needed/total block counts.
    #[must_use]
    pub fn status(&self) -> Status {
        Status {
            total_blocks: self.target.block_count(),
            needed_blocks: self.needed.count(),
        }
    }

    /// Warnings accumulated so far (unreadable seeds, rejected blocks,
    /// failed URLs). None of these are fatal.
    #[must_use]
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Path of the in-progress temporary file, if not yet taken.
    #[must_use]
    pub fn store_path(&self) -> Option<&Path> {
        self.store.path()
    }

    /// Streams `path` through the match scanner, writing any confirmed
    /// blocks into the target store. Paths are deduplicated by their
    /// string form, so the same seed given twice (e.g. both as an
    /// explicit `-i` seed and as the existing output file) is only
    /// scanned once. A seed that cannot be opened or read is skipped
    /// with a warning rather than aborting the run.
    pub fn ingest_seed(&mut self, path: &Path) {
        if !self.seeded_paths.insert(path.to_path_buf()) {
            return;
        }
        match File::open(path) {
            Ok(file) => match scan(file, &self.target, &mut self.index, &mut self.needed, &mut self.store) {
                Ok(matched) => {
                    debug!(path = %path.display(), matched, "seed scan complete");
                }
                Err(err) => self.warnings.push(Warning::SeedUnreadable {
                    path: path.display().to_string(),
                    reason: err.to_string(),
                }),
            },
            Err(err) => self.warnings.push(Warning::SeedUnreadable {
                path: path.display().to_string(),
                reason: err.to_string(),
            }),
        }
    }

    /// Ingests every seed in order, stopping early once nothing remains
    /// needed.
    pub fn ingest_seeds<I: IntoIterator<Item = PathBuf>>(&mut self, paths: I) {
        for path in paths {
            if self.needed.is_empty() {
                break;
            }
            self.ingest_seed(&path);
        }
    }

    /// Renames the in-progress temporary file to `<output>.part` so a
    /// future run (or this one, on completion) can find it at a stable
    /// path. Returns the new path.
    pub fn adopt_as_part(&mut self, output: &Path) -> Result<PathBuf> {
        let part_path = part_path_for(output);
        self.store.rename_to(part_path.clone())?;
        Ok(part_path)
    }

    /// While blocks remain needed and at least one URL has not failed,
    /// picks a URL at random among the survivors, derives the needed byte
    /// ranges, and fetches+verifies them through `fetcher`.
    pub fn fetch_and_receive(&mut self, fetcher: &mut dyn RangeFetcher) -> Result<()> {
        while !self.needed.is_empty() {
            let live_urls: Vec<&String> = self
                .target
                .urls
                .iter()
                .filter(|u| !self.failed_urls.contains(*u))
                .collect();
            let Some(&url) = live_urls.choose(&mut rand::thread_rng()) else {
                return Err(TransferError::NoUsableUrls {
                    still_needed: self.needed.count(),
                });
            };
            let url = url.clone();

            let ranges = self.needed.byte_ranges(self.target.blocksize, self.target.length);
            let mut url_failed = false;

            for (lo, hi) in ranges {
                if !self.needed_range_still_open(lo, hi) {
                    continue;
                }
                match fetcher.fetch_range(&url, lo, hi) {
                    Ok(data) => self.receive(lo, &data),
                    Err(err) => {
                        self.warnings.push(Warning::UrlFailed {
                            url: url.clone(),
                            reason: err.to_string(),
                        });
                        self.failed_urls.insert(url.clone());
                        url_failed = true;
                        break;
                    }
                }
            }

            if url_failed {
                continue;
            }
        }
        Ok(())
    }

    fn needed_range_still_open(&self, lo: u64, hi: u64) -> bool {
        let blocksize = u64::from(self.target.blocksize);
        let first = (lo / blocksize) as u32;
        let last = (hi / blocksize) as u32;
        (first..=last).any(|id| self.needed.contains(id))
    }

    /// Splits a fetched buffer into whole blocks and submits each to the
    /// strong-hash verifier. A block that fails verification is discarded
    /// and stays needed; the URL is not penalized for a single bad block.
    fn receive(&mut self, start_offset: u64, data: &[u8]) {
        for (block_id, bytes) in split_into_blocks(&self.target, start_offset, data) {
            if !self.needed.contains(block_id) {
                continue;
            }
            if confirm(&self.target, block_id, &bytes) {
                let logical_len = self.target.block_len(block_id) as usize;
                match self.store.write_block(block_id, &bytes[..logical_len]) {
                    Ok(()) => {
                        self.needed.remove(block_id);
                        self.index.remove(block_id);
                    }
                    Err(_) => self.warnings.push(Warning::BlockRejected { block_id }),
                }
            } else {
                self.warnings.push(Warning::BlockRejected { block_id });
            }
        }
    }

    /// Truncates the store to the target's exact length and compares its
    /// SHA-1 against the control file's declared whole-file hash, if any.
    pub fn verify(&mut self) -> Result<VerifyOutcome> {
        self.store.finalize()?;
        let Some(expected) = self.target.whole_file_sha1 else {
            return Ok(VerifyOutcome::NoWholeFileHash);
        };

        let path = self
            .store
            .path()
            .expect("store handle not yet taken at verify time")
            .to_path_buf();
        let mut file = File::open(&path)?;
        let mut hasher = Sha1::new();
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        let actual: [u8; 20] = hasher.finalize();

        if actual == expected {
            info!("whole-file hash verified");
            Ok(VerifyOutcome::Verified)
        } else {
            warn!("whole-file hash mismatch");
            Err(TransferError::WholeFileHashMismatch)
        }
    }

    /// Atomically installs the reconstructed file at `output`: an existing
    /// file is hard-linked aside as `.zs-old` (or renamed aside if
    /// hard-linking isn't possible), then the temp file is renamed into
    /// place. Restores the modification time if the control file supplied
    /// one.
    pub fn install(&mut self, output: &Path) -> Result<()> {
        if output.exists() {
            let aside = old_aside_path(output);
            if fs::hard_link(output, &aside).is_err() {
                fs::rename(output, &aside)?;
            } else {
                fs::remove_file(output)?;
            }
        }

        self.store.rename_to(output.to_path_buf())?;

        if let Some(mtime) = self.target.mtime {
            set_mtime(output, mtime)?;
        }
        Ok(())
    }
}

fn confirm(target: &TargetDescription, block_id: u32, window: &[u8]) -> bool {
    let Some(block) = target.blocks.get(block_id as usize) else {
        return false;
    };
    let prefix_len = usize::from(target.strong_bytes);
    let candidate = match target.strong_algorithm {
        StrongAlgorithm::Md4 => block_prefix::<Md4>(window, prefix_len),
        StrongAlgorithm::Sha1 => block_prefix::<Sha1>(window, prefix_len),
    };
    candidate == block.strong_prefix
}

fn part_path_for(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}

fn old_aside_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".zs-old");
    output.with_file_name(name)
}

fn set_mtime(path: &Path, unix_secs: i64) -> std::io::Result<()> {
    let accessed = std::time::SystemTime::now();
    let modified = if unix_secs >= 0 {
        std::time::UNIX_EPOCH + std::time::Duration::from_secs(unix_secs as u64)
    } else {
        std::time::UNIX_EPOCH
    };
    let file = File::open(path)?;
    file.set_modified(modified)?;
    let _ = accessed;
    Ok(())
}
