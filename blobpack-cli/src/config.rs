use std::env;
use std::path::PathBuf;

use blobpack_core::config::{ContainerMode, PackConfig};
use blobpack_core::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_INPUT_DIR, DEFAULT_MANIFEST_NAME, DEFAULT_OUTPUT_DIR,
};

/// CLI configuration loaded from environment variables, then command-line flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory walked for input files.
    pub input_dir: PathBuf,
    /// Directory containers are written to and read from.
    pub output_dir: PathBuf,
    /// Where the manifest JSON lives.
    pub manifest_path: PathBuf,
    /// Nominal chunk size in bytes.
    pub chunk_size: usize,
    /// Combined container name; `None` means one container per file.
    pub combined: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `BLOBPACK_INPUT_DIR` (default `files`)
    /// - `BLOBPACK_OUTPUT_DIR` (default `blob`)
    /// - `BLOBPACK_MANIFEST` (default `manifest.json`)
    /// - `BLOBPACK_CHUNK_SIZE` (default 4096)
    /// - `BLOBPACK_COMBINED`: combined container name; unset selects per-file mode.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let input_dir = lookup("BLOBPACK_INPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR));

        let output_dir = lookup("BLOBPACK_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let manifest_path = lookup("BLOBPACK_MANIFEST")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST_NAME));

        let chunk_size = lookup("BLOBPACK_CHUNK_SIZE")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        let combined = lookup("BLOBPACK_COMBINED").filter(|s| !s.is_empty());

        Self {
            input_dir,
            output_dir,
            manifest_path,
            chunk_size,
            combined,
        }
    }

    /// Apply command-line values on top of the environment.
    pub fn with_overrides(
        mut self,
        input: Option<String>,
        output: Option<String>,
        manifest: Option<String>,
        chunk_size: Option<usize>,
        combined: Option<String>,
    ) -> Self {
        if let Some(input) = input {
            self.input_dir = PathBuf::from(input);
        }
        if let Some(output) = output {
            self.output_dir = PathBuf::from(output);
        }
        if let Some(manifest) = manifest {
            self.manifest_path = PathBuf::from(manifest);
        }
        if let Some(chunk_size) = chunk_size {
            self.chunk_size = chunk_size;
        }
        if combined.is_some() {
            self.combined = combined;
        }
        self
    }

    pub fn container_mode(&self) -> ContainerMode {
        match &self.combined {
            Some(name) => ContainerMode::Combined { name: name.clone() },
            None => ContainerMode::PerFile,
        }
    }

    pub fn pack_config(&self) -> PackConfig {
        PackConfig::new(&self.output_dir, self.container_mode()).with_chunk_size(self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.input_dir, PathBuf::from("files"));
        assert_eq!(config.output_dir, PathBuf::from("blob"));
        assert_eq!(config.manifest_path, PathBuf::from("manifest.json"));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
        assert_eq!(config.container_mode(), ContainerMode::PerFile);
    }

    #[test]
    fn test_env_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("BLOBPACK_INPUT_DIR", "in"),
            ("BLOBPACK_CHUNK_SIZE", "8192"),
            ("BLOBPACK_COMBINED", "all.blob"),
        ]));
        assert_eq!(config.input_dir, PathBuf::from("in"));
        assert_eq!(config.chunk_size, 8192);
        assert_eq!(
            config.container_mode(),
            ContainerMode::Combined {
                name: "all.blob".to_string()
            }
        );
    }

    #[test]
    fn test_unparseable_chunk_size_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("BLOBPACK_CHUNK_SIZE", "lots")]));
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);
    }

    #[test]
    fn test_flags_override_env() {
        let config = Config::from_lookup(lookup_from(&[("BLOBPACK_OUTPUT_DIR", "env-out")]))
            .with_overrides(None, Some("flag-out".into()), None, Some(16), Some("c.blob".into()));
        assert_eq!(config.output_dir, PathBuf::from("flag-out"));
        assert_eq!(config.chunk_size, 16);

        let pack = config.pack_config();
        assert_eq!(pack.chunk_size, 16);
        assert_eq!(pack.output_dir, PathBuf::from("flag-out"));
        assert!(pack.mode.is_combined());
    }
}
