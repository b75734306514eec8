use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;

use blobpack_core::chunking::assembler::reassemble_blob;
use blobpack_core::container::{container_name, ContainerMode};
use blobpack_core::manifest::Manifest;

use crate::config::Config;
use crate::storage::JsonManifestFile;

/// Rebuild every file in the manifest from its container into `dest`.
pub async fn run_unpack(config: &Config, dest: &str) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = JsonManifestFile::new(&config.manifest_path).load().await?;
    let dest = Path::new(dest);
    let written = unpack_manifest(&manifest, &config.output_dir, &config.container_mode(), dest).await?;

    println!("Unpacked {} files into {}", written.len(), dest.display());
    Ok(())
}

/// Write each blob's reconstructed bytes to `dest/<file_name>`.
pub async fn unpack_manifest(
    manifest: &Manifest,
    container_dir: &Path,
    mode: &ContainerMode,
    dest: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    check_file_names(manifest)?;

    tokio::fs::create_dir_all(dest)
        .await
        .map_err(|e| format!("failed to create {}: {e}", dest.display()))?;

    let combined = match mode {
        ContainerMode::Combined { name } => Some(read_container(&container_dir.join(name)).await?),
        ContainerMode::PerFile => None,
    };

    let mut written = Vec::with_capacity(manifest.len());
    for blob in manifest.iter() {
        let data = match &combined {
            Some(container) => reassemble_blob(container, blob)?,
            None => {
                let path = container_dir.join(container_name(&blob.file_name)?);
                reassemble_blob(&read_container(&path).await?, blob)?
            }
        };

        let out = dest.join(&blob.file_name);
        tokio::fs::write(&out, &data)
            .await
            .map_err(|e| format!("failed to write {}: {e}", out.display()))?;
        info!("Rebuilt {} ({} bytes)", out.display(), data.len());
        written.push(out);
    }
    Ok(written)
}

/// Every blob must name a plain file, and no two blobs may name the same one.
fn check_file_names(manifest: &Manifest) -> Result<(), String> {
    let mut seen = HashSet::new();
    for blob in manifest.iter() {
        let name = blob.file_name.as_str();
        if Path::new(name).file_name() != Some(OsStr::new(name)) {
            return Err(format!("refusing to unpack '{name}': not a plain file name"));
        }
        if !seen.insert(name) {
            return Err(format!(
                "refusing to unpack: more than one blob is named '{name}'"
            ));
        }
    }
    Ok(())
}

async fn read_container(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("container not found: {}", path.display()).into());
    }
    Ok(tokio::fs::read(path)
        .await
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?)
}
