//! Run orchestration: fan out one chunking task per file, fan in, version,
//! lay out, persist the manifest, write containers.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::chunking::coordinator::ChunkCoordinator;
use crate::chunking::splitter::chunk_file;
use crate::config::PackConfig;
use crate::container::{assign_positions, write_containers};
use crate::error::{BlobPackError, Result};
use crate::manifest::{Blob, Manifest};
use crate::traits::enumerator::FileEnumerator;
use crate::traits::sink::ManifestSink;

/// Outcome of a complete run.
#[derive(Debug)]
pub struct PackReport {
    /// Final manifest; chunk data has been released.
    pub manifest: Manifest,
    /// Containers written, in write order.
    pub containers: Vec<PathBuf>,
}

impl PackReport {
    pub fn files(&self) -> usize {
        self.manifest.len()
    }

    pub fn chunks(&self) -> usize {
        self.manifest.chunk_count()
    }

    pub fn bytes(&self) -> u64 {
        self.manifest.total_bytes()
    }
}

type BlobCallback = Arc<dyn Fn(&Blob) + Send + Sync>;

pub struct Pipeline {
    config: PackConfig,
    on_blob: Option<BlobCallback>,
}

impl Pipeline {
    pub fn new(config: PackConfig) -> Self {
        Self {
            config,
            on_blob: None,
        }
    }

    /// Called once per file, in manifest order, after its blob is sealed.
    pub fn on_blob(mut self, callback: impl Fn(&Blob) + Send + Sync + 'static) -> Self {
        self.on_blob = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &PackConfig {
        &self.config
    }

    /// Chunk and version every file, returning a manifest whose chunks still
    /// hold their data and whose positions match the configured layout.
    ///
    /// Each file is read on its own blocking task. Handles are joined in input
    /// order, so manifest order is input order whatever order the tasks finish
    /// in. Every task is joined even after a failure; the first failure in
    /// input order is returned.
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<Manifest> {
        self.config.validate()?;

        let coordinator = Arc::new(ChunkCoordinator::new());
        let block_size = self.config.chunk_size;

        let handles: Vec<_> = files
            .into_iter()
            .map(|path| {
                let coordinator = Arc::clone(&coordinator);
                let task_path = path.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    chunk_file(&task_path, block_size, &coordinator)
                });
                (path, handle)
            })
            .collect();

        let mut manifest = Manifest::new();
        let mut first_error = None;

        for (path, handle) in handles {
            let outcome = handle
                .await
                .map_err(|e| BlobPackError::Task(format!("chunking {}: {e}", path.display())))
                .and_then(|result| result);

            match outcome {
                Ok(mut blob) if first_error.is_none() => {
                    blob.seal();
                    if let Some(callback) = &self.on_blob {
                        callback(&blob);
                    }
                    manifest.push(blob);
                }
                Ok(_) => {}
                Err(e) => {
                    error!(file = %path.display(), error = %e, "chunking failed");
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        let reserved = coordinator.snapshot()?.stream_position;
        let laid_out: u64 = manifest.iter().map(Blob::record_bytes).sum();
        if laid_out != reserved {
            return Err(BlobPackError::InvalidData(format!(
                "coordinator reserved {reserved} stream bytes but manifest holds {laid_out}"
            )));
        }

        let longest = assign_positions(&mut manifest, &self.config.mode);
        debug!(
            chunks = manifest.chunk_count(),
            reserved,
            longest_container = longest,
            "assigned container positions"
        );
        Ok(manifest)
    }

    /// Full run: enumerate, chunk, hand the manifest to `sink`, write containers.
    pub async fn pack<E, S>(&self, enumerator: &E, sink: &S) -> Result<PackReport>
    where
        E: FileEnumerator + ?Sized,
        S: ManifestSink + Sync + ?Sized,
    {
        let files = enumerator.enumerate()?;
        info!(files = files.len(), "starting run");

        let manifest = self.run(files).await?;
        sink.persist(&manifest).await?;

        let config = self.config.clone();
        let (manifest, containers) = tokio::task::spawn_blocking(move || {
            let mut manifest = manifest;
            let containers = write_containers(&mut manifest, &config)?;
            Ok::<_, BlobPackError>((manifest, containers))
        })
        .await
        .map_err(|e| BlobPackError::Task(format!("writing containers: {e}")))??;

        info!(
            files = manifest.len(),
            chunks = manifest.chunk_count(),
            containers = containers.len(),
            "run complete"
        );
        Ok(PackReport {
            manifest,
            containers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::chunking::assembler::reassemble_blob;
    use crate::chunking::hasher::{chunk_checksum, digest_hex};
    use crate::config::ContainerMode;
    use crate::manifest::serialization;

    struct MemorySink {
        stored: Mutex<Option<Vec<u8>>>,
    }

    impl MemorySink {
        fn new() -> Self {
            Self {
                stored: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ManifestSink for MemorySink {
        async fn persist(&self, manifest: &Manifest) -> Result<()> {
            let bytes = serialization::to_json(manifest)?;
            *self.stored.lock().unwrap() = Some(bytes);
            Ok(())
        }
    }

    fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, data).unwrap();
        path
    }

    fn per_file_pipeline(dir: &Path, chunk_size: usize) -> Pipeline {
        Pipeline::new(PackConfig::new(dir.join("out"), ContainerMode::PerFile).with_chunk_size(chunk_size))
    }

    fn sample(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect()
    }

    #[tokio::test]
    async fn test_abcdefghi_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "letters.txt", b"ABCDEFGHI");
        let pipeline = per_file_pipeline(dir.path(), 4);

        let manifest = pipeline.run(vec![path]).await.unwrap();
        let blob = &manifest.blobs[0];

        let sizes: Vec<u32> = blob.chunks.iter().map(|c| c.size).collect();
        assert_eq!(sizes, vec![4, 4, 1]);
        let parts: [&[u8]; 3] = [b"ABCD", b"EFGH", b"I"];
        let expected: Vec<String> = parts.iter().map(|d| chunk_checksum(d)).collect();
        let got: Vec<String> = blob.chunks.iter().map(|c| c.checksum.clone()).collect();
        assert_eq!(got, expected);
        assert_eq!(blob.version, digest_hex(expected.concat().as_bytes()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ids_globally_unique_and_increasing_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let files: Vec<PathBuf> = (0..12)
            .map(|i| write_file(dir.path(), &format!("f{i}.bin"), &sample(300 + i * 97, i as u8)))
            .collect();
        let pipeline = per_file_pipeline(dir.path(), 16);

        let manifest = pipeline.run(files.clone()).await.unwrap();

        let mut ids = HashSet::new();
        for blob in manifest.iter() {
            assert!(blob.chunks.windows(2).all(|w| w[0].id < w[1].id));
            for chunk in &blob.chunks {
                assert!(ids.insert(chunk.id), "duplicate id {}", chunk.id);
            }
        }
        assert_eq!(ids.len(), manifest.chunk_count());
        assert_eq!(*ids.iter().min().unwrap(), 1);
        assert_eq!(*ids.iter().max().unwrap(), manifest.chunk_count() as u64);

        let names: Vec<&str> = manifest.iter().map(|b| b.file_name.as_str()).collect();
        let expected: Vec<String> = (0..12).map(|i| format!("f{i}.bin")).collect();
        assert_eq!(names, expected.iter().map(String::as_str).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_identical_files_share_digests_not_ids() {
        let dir = tempfile::tempdir().unwrap();
        let data = sample(1000, 3);
        let a = write_file(dir.path(), "a.dat", &data);
        let b = write_file(dir.path(), "b.dat", &data);
        let pipeline = per_file_pipeline(dir.path(), 128);

        let manifest = pipeline.run(vec![a, b]).await.unwrap();
        let (first, second) = (&manifest.blobs[0], &manifest.blobs[1]);

        assert_eq!(first.version, second.version);
        assert_eq!(first.chunk_checksums(), second.chunk_checksums());
        let first_ids: HashSet<u64> = first.chunks.iter().map(|c| c.id).collect();
        assert!(second.chunks.iter().all(|c| !first_ids.contains(&c.id)));
    }

    #[tokio::test]
    async fn test_version_tracks_content() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = sample(5000, 9);
        let path = write_file(dir.path(), "doc.txt", &data);
        let pipeline = per_file_pipeline(dir.path(), 512);

        let v1 = pipeline.run(vec![path.clone()]).await.unwrap().blobs[0].version.clone();
        let v2 = pipeline.run(vec![path.clone()]).await.unwrap().blobs[0].version.clone();
        assert_eq!(v1, v2);

        data[4321] ^= 0x01;
        fs::write(&path, &data).unwrap();
        let v3 = pipeline.run(vec![path]).await.unwrap().blobs[0].version.clone();
        assert_ne!(v1, v3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_combined_pack_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let specs = [("big.bin", 20_000), ("small.txt", 3), ("exact.bin", 4096), ("empty.txt", 0)];
        let inputs: Vec<(PathBuf, Vec<u8>)> = specs
            .iter()
            .enumerate()
            .map(|(i, (name, len))| {
                let data = sample(*len, i as u8);
                (write_file(dir.path(), name, &data), data)
            })
            .collect();
        let out = dir.path().join("out");
        let config = PackConfig::new(&out, ContainerMode::combined()).with_chunk_size(1024);
        let sink = MemorySink::new();

        let files: Vec<PathBuf> = inputs.iter().map(|(p, _)| p.clone()).collect();
        let report = Pipeline::new(config).pack(&files, &sink).await.unwrap();

        assert_eq!(report.files(), 4);
        assert_eq!(report.containers, vec![out.join("combined.blob")]);
        assert_eq!(report.bytes(), 20_000 + 3 + 4096);
        assert!(report.manifest.blobs[3].chunks.is_empty());
        assert_eq!(report.manifest.blobs[2].chunks.len(), 4);

        let container = fs::read(&report.containers[0]).unwrap();
        let expected_len: u64 = report.manifest.iter().map(Blob::record_bytes).sum();
        assert_eq!(container.len() as u64, expected_len);
        for (blob, (_, data)) in report.manifest.iter().zip(&inputs) {
            assert_eq!(&reassemble_blob(&container, blob).unwrap(), data);
        }

        let persisted = sink.stored.lock().unwrap().clone().unwrap();
        let decoded = serialization::from_json(&persisted).unwrap();
        assert_eq!(decoded, report.manifest);
    }

    #[tokio::test]
    async fn test_per_file_pack_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let a = sample(3000, 1);
        let b = sample(10, 2);
        let files = vec![write_file(dir.path(), "a.bin", &a), write_file(dir.path(), "b.txt", &b)];
        let out = dir.path().join("blob");
        let pipeline = Pipeline::new(PackConfig::new(&out, ContainerMode::PerFile).with_chunk_size(1000));

        let report = pipeline.pack(&files, &MemorySink::new()).await.unwrap();

        assert_eq!(report.containers, vec![out.join("a.blob"), out.join("b.blob")]);
        let a_bytes = fs::read(out.join("a.blob")).unwrap();
        assert_eq!(reassemble_blob(&a_bytes, &report.manifest.blobs[0]).unwrap(), a);
        let b_bytes = fs::read(out.join("b.blob")).unwrap();
        assert_eq!(report.manifest.blobs[1].chunks[0].position, 0);
        assert_eq!(reassemble_blob(&b_bytes, &report.manifest.blobs[1]).unwrap(), b);
    }

    #[tokio::test]
    async fn test_repeated_combined_runs_are_identical() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(dir.path(), "one.txt", &sample(777, 5)),
            write_file(dir.path(), "two.txt", &sample(2048, 6)),
        ];
        let config = PackConfig::new(dir.path().join("out"), ContainerMode::combined()).with_chunk_size(256);
        let pipeline = Pipeline::new(config);

        let first = pipeline.pack(&files, &MemorySink::new()).await.unwrap();
        let bytes_first = fs::read(&first.containers[0]).unwrap();
        let second = pipeline.pack(&files, &MemorySink::new()).await.unwrap();
        let bytes_second = fs::read(&second.containers[0]).unwrap();

        assert_eq!(bytes_first, bytes_second);
        let versions = |r: &PackReport| r.manifest.iter().map(|b| b.version.clone()).collect::<Vec<_>>();
        assert_eq!(versions(&first), versions(&second));
    }

    #[tokio::test]
    async fn test_missing_file_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.txt", b"fine");
        let missing = dir.path().join("missing.txt");
        let sink = MemorySink::new();
        let pipeline = Pipeline::new(PackConfig::new(dir.path().join("out"), ContainerMode::PerFile));

        let result = pipeline.pack(&vec![good, missing], &sink).await;
        assert!(matches!(result, Err(BlobPackError::Open { .. })));
        assert!(sink.stored.lock().unwrap().is_none());
        assert!(!dir.path().join("out").exists());
    }

    #[tokio::test]
    async fn test_on_blob_called_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let files = vec![
            write_file(dir.path(), "x.txt", b"x"),
            write_file(dir.path(), "y.txt", b"y"),
        ];
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let pipeline = Pipeline::new(PackConfig::new(dir.path().join("out"), ContainerMode::PerFile))
            .on_blob(move |blob| {
                assert!(blob.is_sealed());
                counter.fetch_add(1, Ordering::SeqCst);
            });

        pipeline.run(files).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let pipeline = Pipeline::new(PackConfig::default().with_chunk_size(0));
        assert!(matches!(pipeline.run(Vec::new()).await, Err(BlobPackError::Config(_))));
    }
}
