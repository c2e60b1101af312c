use anyhow::Context;
use serde_json::json;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::cli::utils::{output_info, output_success};
use crate::cli::OutputFormat;
use crate::envfile::EnvFile;
use crate::keys;

const FRAMEWORK_TAG: &str = "app/framework";
const JWT_TAG: &str = "app/jwt";

pub fn handle(env_path: &Path, key_dir: &Path, output_format: OutputFormat) -> anyhow::Result<()> {
    let (env_file, created) = EnvFile::open_or_create(env_path)?;
    if created {
        output_info(
            &output_format,
            &format!("{} does not exist, creating it", env_path.display()),
        );
    }

    setup_framework(&env_file)?;
    let passphrase = setup_jwt_passphrase(&env_file)?;
    let generated = setup_key_pair(key_dir, &passphrase)?;

    output_success(
        &output_format,
        "Local env setup.",
        Some(json!({
            "env_file": env_path.display().to_string(),
            "generated_keys": generated,
        })),
    )
}

fn setup_framework(env_file: &EnvFile) -> anyhow::Result<()> {
    let mut config = env_file.get_config_for_tag(FRAMEWORK_TAG)?;
    config.set_if_missing("APP_ENV", || "prod".to_string());
    env_file.save_config_for_tag(FRAMEWORK_TAG, &config)?;
    Ok(())
}

/// Existing passphrase, or a new one written to the env file.
fn setup_jwt_passphrase(env_file: &EnvFile) -> anyhow::Result<String> {
    let mut config = env_file.get_config_for_tag(JWT_TAG)?;
    config.set_if_missing("JWT_PASSPHRASE", generate_passphrase);
    env_file.save_config_for_tag(JWT_TAG, &config)?;

    config
        .get("JWT_PASSPHRASE")
        .map(str::to_string)
        .context("JWT_PASSPHRASE missing after setup")
}

/// Creates whichever of `private.pem` / `public.pem` is missing; returns
/// the names of the files written.
fn setup_key_pair(key_dir: &Path, passphrase: &str) -> anyhow::Result<Vec<String>> {
    fs::create_dir_all(key_dir).with_context(|| format!("failed to create {}", key_dir.display()))?;

    let mut generated = Vec::new();

    let private_key = key_dir.join("private.pem");
    if !private_key.exists() {
        keys::generate_private_key(&private_key, passphrase)?;
        generated.push(private_key.display().to_string());
    }

    let public_key = key_dir.join("public.pem");
    if !public_key.exists() {
        keys::derive_public_key(&private_key, &public_key, passphrase)?;
        generated.push(public_key.display().to_string());
    }

    Ok(generated)
}

/// 64 hex characters (244 random bits, two v4 UUIDs).
fn generate_passphrase() -> String {
    format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple())
}
