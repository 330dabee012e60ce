//! aggregate::emit — write one contrast's maps and record them.
use std::path::Path;

use tracing::debug;

use crate::{
    aggregate::errors::AggregateResult,
    contrasts::ResolvedContrast,
    engine::ContrastMaps,
    results::{ContrastOutputs, ResultAssembler},
    store::{MapStore, output_path},
};

/// Name every produced map, register the paths, then write the maps.
///
/// Paths are registered before anything is written so a duplicate output
/// path fails without overwriting an earlier contrast's files.
pub(crate) fn emit_contrast<S: MapStore>(
    store: &S, output_dir: &Path, assembler: &mut ResultAssembler, contrast: &ResolvedContrast,
    maps: ContrastMaps,
) -> AggregateResult<()> {
    let outputs: ContrastOutputs = maps
        .kinds()
        .map(|kind| (kind, output_path(output_dir, &contrast.name, kind, store.extension())))
        .collect();
    assembler.push(&contrast.name, contrast.stat, outputs.clone())?;

    for (kind, map) in maps {
        if let Some(path) = outputs.get(&kind) {
            store.write(path, &map)?;
        }
    }
    debug!(contrast = %contrast.name, stat = %contrast.stat, kinds = outputs.len(), "wrote contrast maps");
    Ok(())
}
