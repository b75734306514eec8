use blobpack_core::manifest::Manifest;

use crate::config::Config;
use crate::storage::JsonManifestFile;

/// Print the blobs recorded in the manifest.
pub async fn run_inspect(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let manifest = JsonManifestFile::new(&config.manifest_path).load().await?;

    println!("Manifest: {}", config.manifest_path.display());
    println!("==========");
    for line in manifest_lines(&manifest) {
        println!("{line}");
    }
    Ok(())
}

/// Summary lines for each blob plus a totals line.
fn manifest_lines(manifest: &Manifest) -> Vec<String> {
    if manifest.is_empty() {
        return vec!["Blobs: (none)".to_string()];
    }

    let mut lines = Vec::with_capacity(manifest.len() * 4 + 2);
    for blob in manifest.iter() {
        let first_id = blob.chunks.first().map(|c| c.id.to_string()).unwrap_or_else(|| "-".into());
        let last_id = blob.chunks.last().map(|c| c.id.to_string()).unwrap_or_else(|| "-".into());
        lines.push(format!("  {}", blob.file_name));
        lines.push(format!("    Size:    {} bytes", blob.total_size()));
        lines.push(format!("    Chunks:  {} (ids {first_id}..{last_id})", blob.chunks.len()));
        lines.push(format!("    Version: {}", blob.version));
    }

    lines.push(String::new());
    lines.push(format!(
        "Total: {} blobs, {} chunks, {} bytes",
        manifest.len(),
        manifest.chunk_count(),
        manifest.total_bytes()
    ));
    lines
}
