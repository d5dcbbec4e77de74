//! Key generation tool for SEMA membership circuits.
//!
//! Generates Groth16 proving and verifying keys for one tree depth.
//!
//! Usage:
//!   cargo run --bin sema-keygen -- generate --output ./keys --depth 20
//!   cargo run --bin sema-keygen -- verify --vkey ./keys/20/semaphore.vkey

use ark_bn254::Bn254;
use ark_groth16::{Groth16, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;
use ark_std::rand::thread_rng;
use clap::{Parser, Subcommand};
use sema_crypto::MembershipCircuit;
use sema_types::{MAX_TREE_DEPTH, MIN_TREE_DEPTH};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::PathBuf;

const CIRCUIT_VERSION: &str = "1.0.0";

/// Key generation tool for SEMA membership proofs.
#[derive(Parser)]
#[command(name = "sema-keygen")]
#[command(about = "Generate Groth16 proving and verifying keys for SEMA membership circuits")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate new proving and verifying keys for one tree depth.
    Generate {
        /// Output directory for keys; files land under a per-depth subdirectory.
        #[arg(short, long, default_value = "./keys")]
        output: PathBuf,

        /// Merkle tree depth to generate keys for.
        #[arg(short, long, default_value_t = 16)]
        depth: usize,
    },

    /// Verify that a verifying key file decodes and matches an expected hash.
    Verify {
        /// Path to verifying key file.
        #[arg(short, long)]
        vkey: PathBuf,

        /// Expected verifying key hash (hex).
        #[arg(short, long)]
        expected_hash: Option<String>,
    },

    /// Show information about existing keys.
    Info {
        /// Directory containing per-depth key subdirectories.
        #[arg(short, long, default_value = "./keys")]
        keys_dir: PathBuf,
    },
}

fn compute_vk_hash(vk_bytes: &[u8]) -> String {
    let hash = blake3::hash(vk_bytes);
    hex::encode(hash.as_bytes())
}

fn generate_keys(output_dir: &PathBuf, depth: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("SEMA Key Generator v{}", CIRCUIT_VERSION);
    println!("==========================");
    println!("Circuit: membership");
    println!("Tree depth: {}", depth);
    println!();

    if !(MIN_TREE_DEPTH..=MAX_TREE_DEPTH).contains(&depth) {
        eprintln!(
            "Unsupported tree depth: {} (supported: {}..={})",
            depth, MIN_TREE_DEPTH, MAX_TREE_DEPTH
        );
        std::process::exit(1);
    }

    let depth_dir = output_dir.join(depth.to_string());
    fs::create_dir_all(&depth_dir)?;

    println!("Running trusted setup (circuit-specific)...");
    println!("This may take several minutes.");
    println!();

    let mut rng = thread_rng();
    let circuit = MembershipCircuit::empty(depth);
    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng)?;
    println!("Setup complete.");
    println!();

    // Serialize proving key
    let zkey_path = depth_dir.join("semaphore.zkey");
    let mut pk_bytes = Vec::new();
    pk.serialize_compressed(&mut pk_bytes)?;
    let mut zkey_file = File::create(&zkey_path)?;
    zkey_file.write_all(&pk_bytes)?;
    println!(
        "Proving key: {} ({} bytes)",
        zkey_path.display(),
        pk_bytes.len()
    );

    // Serialize verifying key
    let vkey_path = depth_dir.join("semaphore.vkey");
    let mut vk_bytes = Vec::new();
    vk.serialize_compressed(&mut vk_bytes)?;
    let mut vkey_file = File::create(&vkey_path)?;
    vkey_file.write_all(&vk_bytes)?;
    println!(
        "Verifying key: {} ({} bytes)",
        vkey_path.display(),
        vk_bytes.len()
    );

    // Compute VK hash
    let vk_hash = compute_vk_hash(&vk_bytes);
    let hash_path = depth_dir.join("semaphore.vkey.hash");
    let mut hash_file = File::create(&hash_path)?;
    writeln!(hash_file, "{}", vk_hash)?;
    println!("VK hash: {}", vk_hash);

    // Write metadata
    let meta_path = depth_dir.join("semaphore.meta.json");
    let metadata = serde_json::json!({
        "circuit": "membership",
        "version": CIRCUIT_VERSION,
        "tree_depth": depth,
        "vk_hash": vk_hash,
        "pk_size": pk_bytes.len(),
        "vk_size": vk_bytes.len(),
        "generated_at": chrono::Utc::now().to_rfc3339(),
    });
    let mut meta_file = File::create(&meta_path)?;
    serde_json::to_writer_pretty(&mut meta_file, &metadata)?;
    println!("Metadata: {}", meta_path.display());

    println!();
    println!("Key generation complete!");
    println!();
    println!("To use these keys:");
    println!("  1. Keep semaphore.zkey with services that generate proofs");
    println!("  2. Distribute semaphore.vkey to verifiers");
    println!(
        "  3. Register at startup: register_proving_key_file({}, {:?})",
        depth,
        zkey_path.display().to_string()
    );
    println!("  4. Check the VK hash matches on every host: {}", vk_hash);

    Ok(())
}

fn verify_key(
    vkey_path: &PathBuf,
    expected_hash: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying key: {}", vkey_path.display());

    let mut vk_bytes = Vec::new();
    let mut file = File::open(vkey_path)?;
    file.read_to_end(&mut vk_bytes)?;

    let actual_hash = compute_vk_hash(&vk_bytes);
    println!("VK hash: {}", actual_hash);
    println!("Size: {} bytes", vk_bytes.len());

    // Try to deserialize
    let _vk = VerifyingKey::<Bn254>::deserialize_compressed(&vk_bytes[..])?;
    println!("Deserialization: OK");

    if let Some(expected) = expected_hash {
        if actual_hash == expected {
            println!("Hash match: OK");
        } else {
            eprintln!("Hash MISMATCH!");
            eprintln!("  Expected: {}", expected);
            eprintln!("  Actual:   {}", actual_hash);
            std::process::exit(1);
        }
    }

    Ok(())
}

fn show_info(keys_dir: &PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    println!("SEMA Keys Info");
    println!("==============");
    println!("Directory: {}", keys_dir.display());
    println!();

    let mut found = false;
    for depth in MIN_TREE_DEPTH..=MAX_TREE_DEPTH {
        let meta_path = keys_dir.join(depth.to_string()).join("semaphore.meta.json");
        if !meta_path.exists() {
            continue;
        }
        found = true;

        let meta_content = fs::read_to_string(&meta_path)?;
        let metadata: serde_json::Value = serde_json::from_str(&meta_content)?;
        println!("Depth {}:", depth);
        println!("  Version: {}", metadata["version"]);
        println!("  VK hash: {}", metadata["vk_hash"]);
        println!("  PK size: {} bytes", metadata["pk_size"]);
        println!("  VK size: {} bytes", metadata["vk_size"]);
        println!("  Generated: {}", metadata["generated_at"]);
    }

    if !found {
        println!("No keys found. Run 'sema-keygen generate' first.");
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate { output, depth } => {
            generate_keys(&output, depth)?;
        }
        Commands::Verify {
            vkey,
            expected_hash,
        } => {
            verify_key(&vkey, expected_hash)?;
        }
        Commands::Info { keys_dir } => {
            show_info(&keys_dir)?;
        }
    }

    Ok(())
}
