//! Checksum verification against `.sha256` / `.sha1` / `.md5` sidecars.

use jeka_util::errors::JekaError;
use md5::Md5;
use reqwest::Client;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::download;
use crate::layout::RepositorySpec;

/// Supported digest algorithms, in the order sidecars are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Sha256,
    Sha1,
    Md5,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Sha256, Algorithm::Sha1, Algorithm::Md5];

    pub fn extension(self) -> &'static str {
        match self {
            Algorithm::Sha256 => "sha256",
            Algorithm::Sha1 => "sha1",
            Algorithm::Md5 => "md5",
        }
    }

    /// Lowercase hex digest of `data`.
    pub fn hex(self, data: &[u8]) -> String {
        match self {
            Algorithm::Sha256 => format!("{:x}", Sha256::digest(data)),
            Algorithm::Sha1 => format!("{:x}", Sha1::digest(data)),
            Algorithm::Md5 => format!("{:x}", Md5::digest(data)),
        }
    }
}

/// Verify downloaded `data` against the first sidecar the repository serves.
///
/// A missing sidecar is logged and accepted.
pub async fn verify(
    client: &Client,
    repo: &RepositorySpec,
    file_url: &str,
    data: &[u8],
) -> Result<(), JekaError> {
    for algorithm in Algorithm::ALL {
        let sidecar = format!("{file_url}.{}", algorithm.extension());
        if let Some(content) = download::download_text(client, repo, &sidecar).await? {
            return check(algorithm, data, &content).map_err(|message| JekaError::RepositoryAccess {
                repository: repo.name.clone(),
                message: format!("{message} for {file_url}"),
            });
        }
    }
    tracing::warn!("No checksum sidecar found for {file_url}");
    Ok(())
}

/// Compare `data` with the hash in a sidecar file's content.
pub fn check(algorithm: Algorithm, data: &[u8], sidecar: &str) -> Result<(), String> {
    let expected = extract_hash(sidecar);
    let actual = algorithm.hex(data);
    if actual.eq_ignore_ascii_case(expected) {
        tracing::debug!(?algorithm, "checksum ok");
        Ok(())
    } else {
        Err(format!("{algorithm:?} mismatch: expected {expected}, got {actual}"))
    }
}

/// Sidecars hold either the bare hash or `hash  filename`.
fn extract_hash(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}
