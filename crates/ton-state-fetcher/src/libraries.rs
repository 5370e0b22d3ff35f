//! Library cell discovery.
//!
//! Contracts may keep their code in the masterchain library store and
//! reference it by hash. The emulator cannot resolve those references on its
//! own, so every library the account code (or a deploying message's
//! `init.code`) points at is fetched up front.

use ton_replay_types::{LibraryTable, ReplayError, Result, StateCodec};

use crate::source::LibraryDirectory;

/// Collect library hashes referenced from the given code cells, in first-seen
/// order, without duplicates.
pub fn referenced_libraries<'a>(
    codec: &dyn StateCodec,
    code_cells: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<[u8; 32]>> {
    let mut hashes: Vec<[u8; 32]> = Vec::new();
    for code in code_cells {
        for hash in codec.library_refs(code)? {
            if !hashes.contains(&hash) {
                hashes.push(hash);
            }
        }
    }
    Ok(hashes)
}

/// Fetch every hash in `wanted` not already in `table`. A library the
/// directory does not return is an upstream failure.
pub async fn fetch_libraries(
    directory: &dyn LibraryDirectory,
    wanted: &[[u8; 32]],
    table: &mut LibraryTable,
) -> Result<()> {
    let missing: Vec<[u8; 32]> = wanted
        .iter()
        .filter(|hash| !table.contains(hash))
        .copied()
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    tracing::debug!(count = missing.len(), "fetching library cells");
    for (hash, code) in directory.libraries(&missing).await? {
        table.insert(hash, code);
    }

    if let Some(absent) = missing.iter().find(|hash| !table.contains(hash)) {
        return Err(ReplayError::upstream(
            "library directory",
            format!("library {} was not returned", hex::encode(absent)),
        ));
    }
    Ok(())
}
