//! The archive phase.
//!
//! Inserts every object that was recompiled or whose marker moved since the
//! last run, deletes the standalone file once it is inside the archive, and
//! creates the archive from whatever objects exist when it is missing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use incbuild_cache::{needs_archive, BuildCache};

use crate::error::BuildError;
use crate::report::{ArchiveOutcome, BuildEvent, Reporter};
use crate::scan::{list_objects, object_file_name};
use crate::toolchain::Toolchain;

/// Fixed inputs of the archive phase.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveSettings<'a> {
    /// Directory holding the objects.
    pub output_dir: &'a Path,
    /// Full path of the archive.
    pub archive: &'a Path,
    /// Extension of object files, without the dot.
    pub object_extension: &'a str,
    /// Whether members of removed sources are deleted.
    pub prune: bool,
}

/// Result of the archive phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    /// Object file names inserted one by one.
    pub archived: Vec<String>,
    /// Members deleted because their source is gone.
    pub pruned: Vec<String>,
    /// Final state of the archive.
    pub outcome: ArchiveOutcome,
}

/// Brings the archive in line with the fresh records.
///
/// `fresh` holds this run's records, `previous` the last run's, and
/// `compiled` the file names of the sources compiled this run. Their objects
/// are always inserted; other objects only when their marker moved. Objects
/// in the output directory with no matching source are never inserted
/// individually, but they do end up in a bootstrapped archive.
pub fn update_archive(
    fresh: &BuildCache,
    previous: &BuildCache,
    compiled: &[String],
    settings: &ArchiveSettings<'_>,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<ArchiveReport, BuildError> {
    let archive_name = display_name(settings.archive);
    let existed = settings.archive.exists();
    let by_stem = keys_by_stem(fresh);
    let recompiled: HashSet<String> = compiled
        .iter()
        .filter_map(|file| stem_of(Path::new(file)))
        .collect();

    let pruned = if settings.prune && existed {
        prune_members(fresh, previous, &by_stem, settings, toolchain, reporter)?
    } else {
        Vec::new()
    };

    let mut archived = Vec::new();
    for object in list_objects(settings.output_dir, settings.object_extension)? {
        let name = display_name(&object);
        let Some(stem) = stem_of(&object) else {
            continue;
        };
        let Some(key) = by_stem.get(stem.as_str()) else {
            tracing::debug!(object = %object.display(), "no matching source, leaving alone");
            continue;
        };
        let Some(current) = fresh.get(key) else {
            continue;
        };
        if !needs_archive(previous.get(key), current, recompiled.contains(&stem)) {
            continue;
        }

        reporter.report(BuildEvent::InsertStarted(name.clone()));
        if let Err(e) = toolchain.archive(settings.archive, std::slice::from_ref(&object)) {
            reporter.report(BuildEvent::InsertFailed(name.clone()));
            return Err(BuildError::Archive {
                context: format!("failed to add {name} to library"),
                source: e,
            });
        }
        std::fs::remove_file(&object).map_err(|e| BuildError::io(&object, e))?;
        reporter.report(BuildEvent::Inserted(name.clone()));
        archived.push(name);
    }

    let outcome = if settings.archive.exists() {
        if archived.is_empty() && pruned.is_empty() {
            ArchiveOutcome::UpToDate
        } else if existed {
            ArchiveOutcome::Updated
        } else {
            ArchiveOutcome::Created
        }
    } else {
        bootstrap(&archive_name, &by_stem, settings, toolchain, reporter)?
    };

    reporter.report(BuildEvent::ArchiveFinished {
        archive: archive_name,
        outcome,
    });

    Ok(ArchiveReport {
        archived,
        pruned,
        outcome,
    })
}

fn prune_members(
    fresh: &BuildCache,
    previous: &BuildCache,
    by_stem: &HashMap<String, &str>,
    settings: &ArchiveSettings<'_>,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<Vec<String>, BuildError> {
    let mut members: Vec<String> = previous
        .keys_missing_from(fresh)
        .into_iter()
        .filter(|key| {
            previous
                .get(key)
                .is_some_and(|r| !r.object_marker.is_none())
        })
        .filter_map(|key| stem_of(Path::new(key)))
        .filter(|stem| !by_stem.contains_key(stem))
        .map(|stem| object_file_name(&stem, settings.object_extension))
        .collect();
    members.sort();
    members.dedup();

    if members.is_empty() {
        return Ok(members);
    }

    tracing::info!(?members, "pruning archive members of removed sources");
    toolchain
        .remove_members(settings.archive, &members)
        .map_err(|e| BuildError::Archive {
            context: format!(
                "failed to remove stale members from {}",
                display_name(settings.archive)
            ),
            source: e,
        })?;
    reporter.report(BuildEvent::Pruned(members.clone()));
    Ok(members)
}

fn bootstrap(
    archive_name: &str,
    by_stem: &HashMap<String, &str>,
    settings: &ArchiveSettings<'_>,
    toolchain: &mut dyn Toolchain,
    reporter: &mut dyn Reporter,
) -> Result<ArchiveOutcome, BuildError> {
    let objects = list_objects(settings.output_dir, settings.object_extension)?;
    if objects.is_empty() {
        tracing::debug!(archive = archive_name, "no objects, archive not created");
        return Ok(ArchiveOutcome::Empty);
    }

    reporter.report(BuildEvent::Creating(archive_name.to_string()));
    if let Err(e) = toolchain.archive(settings.archive, &objects) {
        reporter.report(BuildEvent::CreateFailed(archive_name.to_string()));
        return Err(BuildError::Archive {
            context: format!("failed to create library {archive_name}"),
            source: e,
        });
    }

    for object in objects
        .iter()
        .filter(|o| stem_of(o).is_some_and(|s| by_stem.contains_key(&s)))
    {
        std::fs::remove_file(object).map_err(|e| BuildError::io(object, e))?;
    }

    Ok(ArchiveOutcome::Created)
}

fn keys_by_stem(records: &BuildCache) -> HashMap<String, &str> {
    records
        .iter()
        .filter_map(|(key, _)| stem_of(Path::new(key)).map(|stem| (stem, key)))
        .collect()
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem().map(|s| s.to_string_lossy().into_owned())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Full path of the archive for a request.
pub fn archive_path(output_dir: &Path, archive_name: &str) -> PathBuf {
    output_dir.join(archive_name)
}
