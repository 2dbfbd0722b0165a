use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use clap::ValueEnum;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{DupeError, Result};

/// Files are read and fed to the digest in blocks of this size
const BLOCK_SIZE: usize = 4096;

/// Default number of leading bytes that contribute to a fingerprint (1 MiB)
pub const DEFAULT_PREFIX_LIMIT: u64 = 1024 * 1024;

/// Digest over (a prefix of) a file's contents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.as_bytes() {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Digest used to fingerprint files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// BLAKE3, faster on large files
    Blake3,
}

enum Digester {
    Sha256(Sha256),
    Blake3(Box<blake3::Hasher>),
}

impl Digester {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Sha256 => Digester::Sha256(Sha256::new()),
            HashAlgorithm::Blake3 => Digester::Blake3(Box::new(blake3::Hasher::new())),
        }
    }

    fn update(&mut self, block: &[u8]) {
        match self {
            Digester::Sha256(h) => h.update(block),
            Digester::Blake3(h) => {
                h.update(block);
            }
        }
    }

    fn finalize(self) -> Fingerprint {
        match self {
            Digester::Sha256(h) => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&h.finalize());
                Fingerprint(bytes)
            }
            Digester::Blake3(h) => Fingerprint(*h.finalize().as_bytes()),
        }
    }
}

/// Computes fingerprints for single files.
///
/// Only the first `prefix_limit` bytes are hashed, so two large files that
/// share a prefix of that length are reported as duplicates even if they
/// diverge later. `None` hashes whole files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprinter {
    pub algorithm: HashAlgorithm,
    pub prefix_limit: Option<u64>,
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            prefix_limit: Some(DEFAULT_PREFIX_LIMIT),
        }
    }
}

impl Fingerprinter {
    pub fn new(algorithm: HashAlgorithm, prefix_limit: Option<u64>) -> Self {
        Self {
            algorithm,
            prefix_limit,
        }
    }

    /// Fingerprint the file at `path`
    pub fn fingerprint(&self, path: &Path) -> Result<Fingerprint> {
        self.digest_file(path).map_err(|source| DupeError::Fingerprint {
            path: path.to_path_buf(),
            source,
        })
    }

    fn digest_file(&self, path: &Path) -> io::Result<Fingerprint> {
        let file = File::open(path)?;
        let mut reader = file.take(self.prefix_limit.unwrap_or(u64::MAX));
        let mut buffer = [0u8; BLOCK_SIZE];
        let mut digester = Digester::new(self.algorithm);

        loop {
            let bytes_read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            digester.update(&buffer[..bytes_read]);
        }

        Ok(digester.finalize())
    }
}
