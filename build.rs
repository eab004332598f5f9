//! Build script for the Spotify library client.
//!
//! Copies the `.env.example` configuration template into the user's local
//! data directory so it sits next to the `.env` the binary reads at startup.

use std::{env, fs, path::PathBuf};

fn main() {
    println!("cargo:rerun-if-changed=.env.example");

    // Sandboxed builds may not be able to write there; never fail the build for it.
    if let Err(e) = copy_env_template() {
        println!("cargo:warning=could not install .env.example: {}", e);
    }
}

/// Copies `.env.example` from the crate root to `<data_local_dir>/spotlib/`.
fn copy_env_template() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let env_example_path = manifest_dir.join(".env.example");

    if !env_example_path.is_file() {
        println!(
            "cargo:warning=.env.example not found at {}",
            env_example_path.display()
        );
        return Ok(());
    }

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("spotlib");
    fs::create_dir_all(&out_dir)?;

    let contents = fs::read_to_string(&env_example_path)?;
    fs::write(out_dir.join(".env.example"), contents)?;
    Ok(())
}
