//! Proving and verifying key management.
//!
//! Keys are held in a process-wide registry keyed by tree depth. Production
//! deployments register keys produced by a trusted setup (see the
//! `sema-keygen` binary); when nothing is registered for a depth, the
//! registry falls back to freshly generated development parameters so local
//! work never blocks on ceremony output.

use ark_bn254::Bn254;
use ark_groth16::{Groth16, PreparedVerifyingKey, ProvingKey, VerifyingKey};
use ark_serialize::CanonicalDeserialize;
use ark_snark::SNARK;
use ark_std::rand::thread_rng;
use sema_crypto::MembershipCircuit;
use sema_types::{SemaError, SemaResult, MAX_TREE_DEPTH, MIN_TREE_DEPTH};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, OnceLock, RwLock};
use tracing::{info, warn};

/// Base URL of the published trusted-setup artifacts.
pub const DEFAULT_ARTIFACT_BASE_URL: &str = "https://www.trusted-setup-pse.org/semaphore";

/// Locations of the circuit artifacts for one tree depth.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnarkArtifacts {
    /// Witness generator location (consumed by external tooling).
    pub wasm: String,
    /// Proving key location: a local file path or an http(s) URL.
    pub zkey: String,
}

impl SnarkArtifacts {
    /// Artifacts at explicit locations.
    pub fn new(wasm: impl Into<String>, zkey: impl Into<String>) -> Self {
        Self {
            wasm: wasm.into(),
            zkey: zkey.into(),
        }
    }

    /// Published artifact URLs for `depth`.
    pub fn default_for_depth(depth: usize) -> Self {
        Self {
            wasm: format!("{}/{}/semaphore.wasm", DEFAULT_ARTIFACT_BASE_URL, depth),
            zkey: format!("{}/{}/semaphore.zkey", DEFAULT_ARTIFACT_BASE_URL, depth),
        }
    }

    /// Whether the proving key lives behind a URL rather than on disk.
    pub fn is_remote(&self) -> bool {
        self.zkey.starts_with("http://") || self.zkey.starts_with("https://")
    }
}

/// Keys held for one depth. Verify-only registrations carry no proving key.
#[derive(Debug)]
pub(crate) struct DepthKeys {
    pub proving_key: Option<ProvingKey<Bn254>>,
    pub prepared_vk: PreparedVerifyingKey<Bn254>,
}

static KEY_REGISTRY: OnceLock<RwLock<HashMap<usize, Arc<DepthKeys>>>> = OnceLock::new();

fn registry() -> &'static RwLock<HashMap<usize, Arc<DepthKeys>>> {
    KEY_REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

pub(crate) fn check_depth(depth: usize) -> SemaResult<()> {
    if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
        return Err(SemaError::UnsupportedTreeDepth(depth));
    }
    Ok(())
}

fn lookup(depth: usize) -> SemaResult<Option<Arc<DepthKeys>>> {
    let map = registry()
        .read()
        .map_err(|_| SemaError::Artifact("key registry lock poisoned".into()))?;
    Ok(map.get(&depth).cloned())
}

fn insert(depth: usize, keys: DepthKeys) -> SemaResult<Arc<DepthKeys>> {
    let mut map = registry()
        .write()
        .map_err(|_| SemaError::Artifact("key registry lock poisoned".into()))?;
    let entry = map.entry(depth).or_insert_with(|| Arc::new(keys));
    Ok(entry.clone())
}

fn prepare(vk: &VerifyingKey<Bn254>) -> SemaResult<PreparedVerifyingKey<Bn254>> {
    Groth16::<Bn254>::process_vk(vk)
        .map_err(|e| SemaError::Artifact(format!("verifying key processing failed: {}", e)))
}

fn generate_development_keys(depth: usize) -> SemaResult<DepthKeys> {
    info!("Running circuit-specific setup for depth {}", depth);
    let mut rng = thread_rng();
    let circuit = MembershipCircuit::empty(depth);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng)
        .map_err(|e| SemaError::Artifact(format!("parameter setup failed: {}", e)))?;
    let prepared_vk = prepare(&vk)?;
    Ok(DepthKeys {
        proving_key: Some(pk),
        prepared_vk,
    })
}

/// Keys for `depth`, generating development parameters when nothing is
/// registered. Generation happens outside the lock; a concurrent first call
/// for the same depth wastes one setup run but both callers see one entry.
pub(crate) fn ensure_depth_keys(depth: usize) -> SemaResult<Arc<DepthKeys>> {
    check_depth(depth)?;

    if let Some(keys) = lookup(depth)? {
        return Ok(keys);
    }

    warn!(
        "No registered parameters for depth {}; generating development parameters. \
         Proofs made with these verify only against keys from this process.",
        depth
    );
    let keys = generate_development_keys(depth)?;
    insert(depth, keys)
}

/// Keys for `depth` from explicit artifact locations. Remote zkey URLs are
/// not fetched here; download the file and point the artifacts at it.
pub(crate) fn ensure_artifacts(depth: usize, artifacts: &SnarkArtifacts) -> SemaResult<Arc<DepthKeys>> {
    check_depth(depth)?;

    if let Some(keys) = lookup(depth)? {
        return Ok(keys);
    }

    if artifacts.is_remote() {
        return Err(SemaError::Artifact(format!(
            "proving key at {} must be downloaded before local proving",
            artifacts.zkey
        )));
    }

    let keys = load_proving_key_file(artifacts.zkey.as_ref())?;
    info!(
        "Loaded proving key for depth {} from {}",
        depth, artifacts.zkey
    );
    insert(depth, keys)
}

fn load_proving_key_file(path: &Path) -> SemaResult<DepthKeys> {
    let bytes = std::fs::read(path)
        .map_err(|e| SemaError::Artifact(format!("failed to read {}: {}", path.display(), e)))?;
    let pk = ProvingKey::<Bn254>::deserialize_compressed(&bytes[..]).map_err(|e| {
        SemaError::Artifact(format!(
            "failed to decode proving key {}: {}",
            path.display(),
            e
        ))
    })?;
    let prepared_vk = prepare(&pk.vk)?;
    Ok(DepthKeys {
        proving_key: Some(pk),
        prepared_vk,
    })
}

/// Register a trusted-setup proving key for `depth` from a `sema-keygen`
/// zkey file. Replaces nothing: the first registration for a depth wins.
pub fn register_proving_key_file(depth: usize, zkey_path: impl AsRef<Path>) -> SemaResult<()> {
    check_depth(depth)?;
    let path = zkey_path.as_ref();
    let keys = load_proving_key_file(path)?;
    insert(depth, keys)?;
    info!(
        "Registered proving key for depth {} from {}",
        depth,
        path.display()
    );
    Ok(())
}

/// Register a verifying key for `depth`. Verification works; local proving
/// for this depth will report that no proving key is available.
pub fn register_verifying_key_file(depth: usize, vkey_path: impl AsRef<Path>) -> SemaResult<()> {
    check_depth(depth)?;
    let path = vkey_path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|e| SemaError::Artifact(format!("failed to read {}: {}", path.display(), e)))?;
    let vk = VerifyingKey::<Bn254>::deserialize_compressed(&bytes[..]).map_err(|e| {
        SemaError::Artifact(format!(
            "failed to decode verifying key {}: {}",
            path.display(),
            e
        ))
    })?;
    let prepared_vk = prepare(&vk)?;
    insert(
        depth,
        DepthKeys {
            proving_key: None,
            prepared_vk,
        },
    )?;
    info!(
        "Registered verifying key for depth {} from {}",
        depth,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_bounds() {
        assert!(check_depth(15).is_err());
        assert!(check_depth(16).is_ok());
        assert!(check_depth(32).is_ok());
        assert!(matches!(
            check_depth(33),
            Err(SemaError::UnsupportedTreeDepth(33))
        ));
    }

    #[test]
    fn test_default_artifact_urls() {
        let artifacts = SnarkArtifacts::default_for_depth(20);
        assert_eq!(
            artifacts.zkey,
            "https://www.trusted-setup-pse.org/semaphore/20/semaphore.zkey"
        );
        assert_eq!(
            artifacts.wasm,
            "https://www.trusted-setup-pse.org/semaphore/20/semaphore.wasm"
        );
        assert!(artifacts.is_remote());
    }

    #[test]
    fn test_local_path_is_not_remote() {
        let artifacts = SnarkArtifacts::new("./semaphore.wasm", "./semaphore.zkey");
        assert!(!artifacts.is_remote());
    }

    #[test]
    fn test_remote_zkey_not_fetched() {
        let artifacts = SnarkArtifacts::default_for_depth(16);
        let err = ensure_artifacts(16, &artifacts).unwrap_err();
        assert!(matches!(err, SemaError::Artifact(_)));
    }

    #[test]
    fn test_register_missing_file() {
        let err = register_proving_key_file(17, "/nonexistent/semaphore.zkey").unwrap_err();
        assert!(matches!(err, SemaError::Artifact(_)));
    }

    #[test]
    fn test_register_rejects_bad_depth_before_io() {
        let err = register_proving_key_file(8, "/nonexistent/semaphore.zkey").unwrap_err();
        assert!(matches!(err, SemaError::UnsupportedTreeDepth(8)));
    }
}
