/// Nominal chunk size: 4 KiB.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Every container record starts with a little-endian `u32` length.
pub const LENGTH_PREFIX_LEN: u64 = 4;

/// Id handed to the first chunk admitted in a run.
pub const FIRST_CHUNK_ID: u64 = 1;

/// Extension of per-file containers.
pub const BLOB_EXTENSION: &str = "blob";

/// File name of the container used in combined mode.
pub const DEFAULT_COMBINED_NAME: &str = "combined.blob";

/// Directory containers are written into.
pub const DEFAULT_OUTPUT_DIR: &str = "blob";

/// Manifest file written at the end of a run.
pub const DEFAULT_MANIFEST_NAME: &str = "manifest.json";

/// Directory walked for input files when none is given.
pub const DEFAULT_INPUT_DIR: &str = "files";
