//! Remote proving over a Sindri-style HTTP API.
//!
//! The flow is submit-then-poll: `POST {base}/circuit/{id}/prove` returns a
//! job id, `GET {base}/proof/{job}/detail` reports its state. Polling is
//! bounded; a job that never becomes ready times out instead of hanging the
//! caller forever.

use super::ProverOutput;
use crate::inputs::CircuitInputs;
use ark_bn254::{Fq, Fq2, Fr, G1Affine, G2Affine};
use ark_groth16::Proof;
use async_trait::async_trait;
use reqwest::Client;
use sema_crypto::field_from_dec;
use sema_types::{SemaError, SemaResult, MAX_PROOF_POLLS, PROOF_POLL_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default proving service endpoint.
pub const DEFAULT_PROVER_API_URL: &str = "https://sindri.app/api/v1";

/// Connection settings for a remote proving service.
///
/// The API key is explicit configuration; there is no environment or global
/// fallback, so every prover instance states whose credential it uses.
#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteProverConfig {
    /// Service base URL.
    pub base_url: String,
    /// Bearer token for the service.
    pub api_key: String,
    /// Circuit identifier registered with the service.
    pub circuit_id: String,
    /// Pause between status polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Status polls before giving up.
    pub max_polls: u32,
    /// Per-request HTTP timeout, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for RemoteProverConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVER_API_URL.to_string(),
            api_key: String::new(),
            circuit_id: String::new(),
            poll_interval_ms: PROOF_POLL_INTERVAL_MS,
            max_polls: MAX_PROOF_POLLS,
            request_timeout_secs: 30,
        }
    }
}

impl RemoteProverConfig {
    /// Config for the default endpoint with the given credential and circuit.
    pub fn new(api_key: impl Into<String>, circuit_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            circuit_id: circuit_id.into(),
            ..Self::default()
        }
    }

    /// Override the service base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the polling interval.
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.poll_interval_ms = interval_ms;
        self
    }

    /// Override the polling ceiling.
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key.is_empty() {
            return Err("api_key must not be empty".to_string());
        }
        if self.circuit_id.is_empty() {
            return Err("circuit_id must not be empty".to_string());
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(format!("base_url must be http(s): {}", self.base_url));
        }
        if self.max_polls == 0 {
            return Err("max_polls must be at least 1".to_string());
        }
        Ok(())
    }
}

impl fmt::Debug for RemoteProverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteProverConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("circuit_id", &self.circuit_id)
            .field("poll_interval_ms", &self.poll_interval_ms)
            .field("max_polls", &self.max_polls)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Proving job state as reported by the service. Anything that is neither
/// ready nor failed counts as still pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum JobStatus {
    /// The proof is available.
    Ready,
    /// The service gave up on the job.
    Failed,
    /// Queued, in progress, or any state this client does not know.
    #[serde(other)]
    Pending,
}

/// Groth16 proof as remote services emit it: projective-style coordinate
/// arrays with a trailing scaling element this client ignores.
#[derive(Clone, Debug, Deserialize)]
pub struct ProofPayload {
    /// G1 point `a` as `[x, y, ...]`.
    pub pi_a: Vec<String>,
    /// G2 point `b` as `[[x.c0, x.c1], [y.c0, y.c1], ...]`.
    pub pi_b: Vec<Vec<String>>,
    /// G1 point `c` as `[x, y, ...]`.
    pub pi_c: Vec<String>,
}

/// One status response for a proving job.
#[derive(Clone, Debug, Deserialize)]
pub struct JobDetail {
    /// Current job state.
    pub status: JobStatus,
    /// Proof payload, present once the job is ready.
    #[serde(default)]
    pub proof: Option<ProofPayload>,
    /// Public signals as decimal strings, present once the job is ready.
    #[serde(default, rename = "public")]
    pub public_signals: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct CreateJobResponse {
    proof_id: Option<String>,
}

/// Transport to a proving service. [`HttpProofService`] is the real one;
/// tests substitute scripted implementations.
#[async_trait]
pub trait ProofService: Send + Sync {
    /// Submit serialized circuit inputs, returning the created job id.
    async fn create_job(&self, circuit_id: &str, proof_input: &str) -> SemaResult<String>;

    /// Fetch the current state of a proving job.
    async fn job_detail(&self, job_id: &str) -> SemaResult<JobDetail>;
}

/// HTTP transport to a proving service.
pub struct HttpProofService {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpProofService {
    /// Build a transport from connection settings.
    pub fn new(config: &RemoteProverConfig) -> SemaResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| SemaError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ProofService for HttpProofService {
    async fn create_job(&self, circuit_id: &str, proof_input: &str) -> SemaResult<String> {
        let url = format!("{}/circuit/{}/prove", self.base_url, circuit_id);
        debug!("HTTP POST: {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .form(&[("proof_input", proof_input)])
            .send()
            .await
            .map_err(|e| SemaError::Network(format!("proof submission failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SemaError::Network(format!(
                "proof submission returned {}",
                status
            )));
        }

        let body: CreateJobResponse = response
            .json()
            .await
            .map_err(|e| SemaError::MalformedProverResponse(format!("submission body: {}", e)))?;

        body.proof_id.ok_or_else(|| {
            SemaError::MalformedProverResponse("submission response is missing proof_id".into())
        })
    }

    async fn job_detail(&self, job_id: &str) -> SemaResult<JobDetail> {
        let url = format!("{}/proof/{}/detail", self.base_url, job_id);
        debug!("HTTP GET: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| SemaError::Network(format!("proof status query failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SemaError::Network(format!(
                "proof status query returned {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SemaError::MalformedProverResponse(format!("status body: {}", e)))
    }
}

/// Prover that delegates to a remote proving service.
pub struct RemoteProver {
    service: Arc<dyn ProofService>,
    circuit_id: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl RemoteProver {
    /// Prover over HTTP with the given settings.
    pub fn new(config: RemoteProverConfig) -> SemaResult<Self> {
        config.validate().map_err(SemaError::Config)?;
        let service = HttpProofService::new(&config)?;
        Ok(Self::with_service(Arc::new(service), &config))
    }

    /// Prover over a caller-supplied transport. The config contributes only
    /// the circuit id and polling parameters; validation is the caller's
    /// concern.
    pub fn with_service(service: Arc<dyn ProofService>, config: &RemoteProverConfig) -> Self {
        Self {
            service,
            circuit_id: config.circuit_id.clone(),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
        }
    }

    /// Submit the inputs and poll until the proof is ready, the job fails,
    /// or the polling ceiling is reached.
    ///
    /// Dropping the returned future stops polling immediately; the remote
    /// job itself is left to the service.
    pub async fn prove(&self, inputs: &CircuitInputs) -> SemaResult<ProverOutput> {
        let payload = inputs.to_prover_json()?;
        let job_id = self.service.create_job(&self.circuit_id, &payload).await?;
        debug!(
            "Submitted proof job {} for circuit {}",
            job_id, self.circuit_id
        );

        for tick in 0..self.max_polls {
            let detail = self.service.job_detail(&job_id).await?;
            match detail.status {
                JobStatus::Ready => {
                    info!("Proof job {} ready after {} polls", job_id, tick + 1);
                    return extract_output(detail);
                }
                JobStatus::Failed => {
                    warn!("Proof job {} failed", job_id);
                    return Err(SemaError::ProvingFailed(format!(
                        "remote job {} reported failure",
                        job_id
                    )));
                }
                JobStatus::Pending => {}
            }
            tokio::time::sleep(self.poll_interval).await;
        }

        Err(SemaError::ProofPollingTimeout(self.max_polls))
    }
}

fn extract_output(detail: JobDetail) -> SemaResult<ProverOutput> {
    let payload = detail.proof.ok_or_else(|| {
        SemaError::MalformedProverResponse("ready job is missing the proof object".into())
    })?;
    let public = detail.public_signals.ok_or_else(|| {
        SemaError::MalformedProverResponse("ready job is missing public signals".into())
    })?;

    let proof = Proof {
        a: parse_g1(&payload.pi_a, "pi_a")?,
        b: parse_g2(&payload.pi_b, "pi_b")?,
        c: parse_g1(&payload.pi_c, "pi_c")?,
    };

    let public_signals = public
        .iter()
        .enumerate()
        .map(|(i, value)| {
            field_from_dec::<Fr>(value).ok_or_else(|| {
                SemaError::MalformedProverResponse(format!(
                    "public signal {} is not a field decimal",
                    i
                ))
            })
        })
        .collect::<SemaResult<Vec<Fr>>>()?;

    if public_signals.len() < 2 {
        return Err(SemaError::MalformedProverResponse(format!(
            "expected at least 2 public signals, got {}",
            public_signals.len()
        )));
    }

    Ok(ProverOutput {
        proof,
        public_signals,
    })
}

fn parse_fq(value: &str, label: &str, index: usize) -> SemaResult<Fq> {
    field_from_dec(value).ok_or_else(|| {
        SemaError::MalformedProverResponse(format!(
            "{}[{}] is not a base-field decimal",
            label, index
        ))
    })
}

fn parse_g1(coords: &[String], label: &str) -> SemaResult<G1Affine> {
    if coords.len() < 2 {
        return Err(SemaError::MalformedProverResponse(format!(
            "{} must carry two coordinates",
            label
        )));
    }
    Ok(G1Affine::new_unchecked(
        parse_fq(&coords[0], label, 0)?,
        parse_fq(&coords[1], label, 1)?,
    ))
}

fn parse_g2(coords: &[Vec<String>], label: &str) -> SemaResult<G2Affine> {
    if coords.len() < 2 || coords[0].len() < 2 || coords[1].len() < 2 {
        return Err(SemaError::MalformedProverResponse(format!(
            "{} must carry two coordinate pairs",
            label
        )));
    }
    let x = Fq2::new(
        parse_fq(&coords[0][0], label, 0)?,
        parse_fq(&coords[0][1], label, 1)?,
    );
    let y = Fq2::new(
        parse_fq(&coords[1][0], label, 2)?,
        parse_fq(&coords[1][1], label, 3)?,
    );
    Ok(G2Affine::new_unchecked(x, y))
}
