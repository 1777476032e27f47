use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use odbstat_pack::{Garbage, GarbageCounter, GarbageReporter, PackDatabase};
use odbstat_types::{is_loose_suffix, ObjectId};
use tracing::{debug, trace};

use crate::disk::on_disk_bytes;
use crate::error::{StoreError, StoreResult};
use crate::report::{Report, VerboseDetails};

/// Running totals threaded through a scan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanAccumulator {
    pub loose_count: u64,
    pub loose_size_bytes: u64,
    pub prune_packable: u64,
    pub garbage: u64,
}

/// What a single bucket entry turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum Classified<'a> {
    Loose { suffix: &'a str, bytes: u64 },
    Malformed,
    /// Listed by the directory but gone by the time we looked. Unlike other
    /// `lstat` failures this is not garbage: a concurrent writer removed it.
    Vanished,
}

/// Walks the 256 fan-out buckets of a loose-object directory.
///
/// The scan never writes to the store. Missing buckets are normal and
/// skipped; malformed entries are garbage and only reported and counted
/// when `verbose` is set.
#[derive(Clone, Debug)]
pub struct LooseObjectScanner {
    root: PathBuf,
}

impl LooseObjectScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Scan every bucket and build a [`Report`].
    ///
    /// `packs` is only consulted when `verbose` is set. Garbage from both
    /// the loose scan and the pack layer goes to `reporter` as it is found
    /// and is counted in the report.
    pub fn scan(
        &self,
        verbose: bool,
        packs: &mut dyn PackDatabase,
        reporter: &mut dyn GarbageReporter,
    ) -> StoreResult<Report> {
        let mut counter = GarbageCounter::new(reporter);
        let mut acc = ScanAccumulator::default();

        for bucket in 0..=u8::MAX {
            self.scan_bucket(bucket, verbose, packs, &mut counter, &mut acc)?;
        }

        if !verbose {
            return Ok(Report {
                count: acc.loose_count,
                size_bytes: acc.loose_size_bytes,
                details: None,
            });
        }

        let mut details = VerboseDetails::default();
        for summary in packs.summaries(&mut counter) {
            if !summary.local {
                continue;
            }
            details.in_pack += u64::from(summary.object_count);
            details.size_pack_bytes += summary.total_size();
            details.packs += 1;
        }
        acc.garbage = counter.count();
        details.prune_packable = acc.prune_packable;
        details.garbage = acc.garbage;

        debug!(
            loose = acc.loose_count,
            garbage = acc.garbage,
            packs = details.packs,
            "scanned {:?}",
            self.root
        );
        Ok(Report {
            count: acc.loose_count,
            size_bytes: acc.loose_size_bytes,
            details: Some(details),
        })
    }

    fn scan_bucket(
        &self,
        bucket: u8,
        verbose: bool,
        packs: &mut dyn PackDatabase,
        reporter: &mut dyn GarbageReporter,
        acc: &mut ScanAccumulator,
    ) -> StoreResult<()> {
        let prefix = format!("{bucket:02x}");
        let dir = self.root.join(&prefix);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                trace!("skipping bucket {:?}: {}", dir, e);
                return Ok(());
            }
        };

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("unreadable entry in {:?}: {}", dir, e);
                    continue;
                }
            };
            let name = entry.file_name();

            match classify(&dir, &name) {
                Classified::Vanished => {
                    debug!("{:?} disappeared during scan", dir.join(&name));
                }
                Classified::Malformed => {
                    if verbose {
                        reporter.report(&Garbage::unrecognized(dir.join(&name)));
                    }
                }
                Classified::Loose { suffix, bytes } => {
                    acc.loose_count += 1;
                    acc.loose_size_bytes += bytes;
                    if !verbose {
                        continue;
                    }
                    let id = object_id_from_parts(&prefix, suffix)?;
                    if packs.contains_object(&id, reporter) {
                        acc.prune_packable += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

fn classify<'a>(bucket_dir: &Path, name: &'a OsStr) -> Classified<'a> {
    let Some(suffix) = name.to_str().filter(|s| is_loose_suffix(s)) else {
        return Classified::Malformed;
    };
    match fs::symlink_metadata(bucket_dir.join(suffix)) {
        Ok(meta) if meta.file_type().is_file() => Classified::Loose {
            suffix,
            bytes: on_disk_bytes(&meta),
        },
        Ok(_) => Classified::Malformed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => Classified::Vanished,
        Err(_) => Classified::Malformed,
    }
}

/// Rebuild the id of a loose object from its bucket and file name.
///
/// Both parts have already been validated as hex by the time the scanner
/// calls this, so a failure is an [`StoreError::InternalInvariant`].
pub fn object_id_from_parts(prefix: &str, suffix: &str) -> StoreResult<ObjectId> {
    ObjectId::from_loose_parts(prefix, suffix).map_err(|e| {
        StoreError::InternalInvariant(format!("cannot decode loose object {prefix}/{suffix}: {e}"))
    })
}
