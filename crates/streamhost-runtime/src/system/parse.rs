//! Output parsing for external commands.
//!
//! Kept in one module so call sites ask typed questions ("which PIDs",
//! "which top-level directory") instead of string-matching raw output.

use std::path::{Path, PathBuf};

/// First line of `which`/`where` output naming an existing file.
///
/// `where` on Windows may list several matches; the first existing one wins.
pub fn first_existing_path(stdout: &str) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// PIDs from `tasklist /FI "IMAGENAME eq <image>"` output.
///
/// Rows look like `stremio-service.exe   1234 Console   1   25,000 K`.
/// The "INFO: No tasks are running" banner yields no rows.
pub fn tasklist_pids(stdout: &str, image: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let name = columns.next()?;
            if !name.eq_ignore_ascii_case(image) {
                return None;
            }
            columns.next()?.parse().ok()
        })
        .collect()
}

/// PIDs from `pgrep` output (one per line).
pub fn pgrep_pids(stdout: &str) -> Vec<u32> {
    stdout
        .lines()
        .filter_map(|line| line.trim().parse().ok())
        .collect()
}

/// Whether a Flatpak listing (`flatpak info`, `flatpak ps`) mentions `app_id`.
pub fn mentions_app_id(stdout: &str, app_id: &str) -> bool {
    stdout
        .split_whitespace()
        .any(|word| word == app_id)
}

/// Marker printed by the registry query script when the service is found.
pub const REGISTRY_FOUND_MARKER: &str = "FOUND";

pub fn registry_query_found(stdout: &str) -> bool {
    stdout.lines().any(|line| line.trim() == REGISTRY_FOUND_MARKER)
}

/// Top-level directory of a tar listing (`tar -tJf`).
///
/// Returns `None` when entries sit at the archive root or the archive
/// spans more than one top-level directory.
pub fn tar_top_level_dir(listing: &str) -> Option<String> {
    let mut top: Option<&str> = None;
    let entries = listing
        .lines()
        .map(|line| line.trim().trim_start_matches("./"))
        .filter(|entry| !entry.is_empty());
    for entry in entries {
        // "dir/" lists the directory itself
        let (first, _) = entry.split_once('/')?;
        if first.is_empty() {
            return None;
        }
        match top {
            None => top = Some(first),
            Some(existing) if existing == first => {}
            Some(_) => return None,
        }
    }
    top.map(str::to_string)
}

/// Whether `path` points inside a Flatpak deployment, which must be
/// launched through `flatpak run` rather than executed directly.
pub fn is_flatpak_deployment(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str().eq_ignore_ascii_case("flatpak"))
}
