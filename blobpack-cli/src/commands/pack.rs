use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use blobpack_core::pipeline::Pipeline;
use blobpack_core::traits::enumerator::FileEnumerator;

use crate::config::Config;
use crate::storage::{JsonManifestFile, WalkDirEnumerator};

/// Chunk every file under the input directory, then write the manifest and
/// the containers.
pub async fn run_pack(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if !config.input_dir.is_dir() {
        return Err(format!("input directory not found: {}", config.input_dir.display()).into());
    }

    let files = WalkDirEnumerator::new(&config.input_dir).enumerate()?;
    info!(
        "Packing {} files from {} (chunk size {} bytes)",
        files.len(),
        config.input_dir.display(),
        config.chunk_size
    );

    // Progress bar.
    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
            .map_err(|e| format!("progress bar template error: {e}"))?
            .progress_chars("#>-"),
    );

    let progress = pb.clone();
    let pipeline = Pipeline::new(config.pack_config()).on_blob(move |blob| {
        progress.set_message(blob.file_name.clone());
        progress.inc(1);
    });

    let sink = JsonManifestFile::new(&config.manifest_path);
    let report = pipeline.pack(&files, &sink).await?;
    pb.finish_with_message("All files chunked");

    info!("Pack complete!");
    println!();
    println!("Pack complete:");
    println!("  Files:       {}", report.files());
    println!("  Chunks:      {}", report.chunks());
    println!("  Bytes:       {}", report.bytes());
    println!("  Manifest:    {}", sink.path().display());
    println!("  Containers:  {}", report.containers.len());
    for path in &report.containers {
        println!("    {}", path.display());
    }

    Ok(())
}
