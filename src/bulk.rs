/// Loading many manifest files and fetching their live state
use std::path::Path;

use tracing::{debug, info};

use crate::clusters::{ClusterClient, ClusterResource};
use crate::error::Result;
use crate::manifests::Manifest;
use crate::resources::Resource;

/// Load the resources of every file, in file order then document order.
///
/// Stops at the first file that fails to load.
pub fn from_files<P: AsRef<Path>>(files: &[P]) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();

    for file in files {
        let manifest = Manifest::from_file(file)?;
        resources.extend(manifest.into_resources());
    }

    debug!("Loaded {} resource(s) from {} file(s)", resources.len(), files.len());
    Ok(resources)
}

/// Fetch the live cluster state of every resource declared in the files.
///
/// The result mirrors the order of [`from_files`]. Resources are read one
/// after another; the first failure aborts the whole batch.
pub async fn from_cluster<P: AsRef<Path>>(
    client: &dyn ClusterClient,
    files: &[P],
) -> Result<Vec<Resource>> {
    let declared = from_files(files)?;
    let mut live = Vec::with_capacity(declared.len());

    for resource in declared {
        let mut handle = ClusterResource::from_resource(client, resource)?;
        handle.read().await?;

        if let Some(current) = handle.into_resource() {
            live.push(current);
        }
    }

    info!("Read {} resource(s) from cluster", live.len());
    Ok(live)
}
