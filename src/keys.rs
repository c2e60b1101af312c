//! RSA key material for token signing, produced and unlocked with the
//! `openssl` command line tool.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyGenError {
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command failed: {command}\nOutput:\n{output}")]
    CommandFailed { command: String, output: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

const OPENSSL: &str = "openssl";

/// 4096-bit RSA key, AES-256 encrypted with `passphrase`.
pub fn generate_private_key(private_key: &Path, passphrase: &str) -> Result<(), KeyGenError> {
    let args = vec![
        "genrsa".to_string(),
        "-aes256".to_string(),
        "-passout".to_string(),
        format!("pass:{}", passphrase),
        "-out".to_string(),
        private_key.display().to_string(),
        "4096".to_string(),
    ];
    run_openssl(&args)?;
    make_world_readable(private_key)
}

/// Writes the public half of `private_key` to `public_key`.
pub fn derive_public_key(private_key: &Path, public_key: &Path, passphrase: &str) -> Result<(), KeyGenError> {
    let args = vec![
        "rsa".to_string(),
        "-pubout".to_string(),
        "-passin".to_string(),
        format!("pass:{}", passphrase),
        "-in".to_string(),
        private_key.display().to_string(),
        "-out".to_string(),
        public_key.display().to_string(),
    ];
    run_openssl(&args)?;
    make_world_readable(public_key)
}

/// Unencrypted PEM of `private_key`, kept in memory only.
pub fn decrypt_private_key(private_key: &Path, passphrase: &str) -> Result<Vec<u8>, KeyGenError> {
    let args = vec![
        "rsa".to_string(),
        "-passin".to_string(),
        format!("pass:{}", passphrase),
        "-in".to_string(),
        private_key.display().to_string(),
    ];
    run_openssl(&args)
}

fn run_openssl(args: &[String]) -> Result<Vec<u8>, KeyGenError> {
    let command = describe_command(args);
    tracing::debug!(%command, "running openssl");

    let output = Command::new(OPENSSL)
        .args(args)
        .output()
        .map_err(|source| KeyGenError::Spawn {
            program: OPENSSL.to_string(),
            source,
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        return Err(KeyGenError::CommandFailed {
            command,
            output: combined.trim_end().to_string(),
        });
    }

    Ok(output.stdout)
}

/// Command line for logs and errors, with passphrases masked.
fn describe_command(args: &[String]) -> String {
    let masked: Vec<&str> = args
        .iter()
        .map(|arg| if arg.starts_with("pass:") { "pass:***" } else { arg.as_str() })
        .collect();
    format!("{} {}", OPENSSL, masked.join(" "))
}

#[cfg(unix)]
fn make_world_readable(path: &Path) -> Result<(), KeyGenError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o644))?;
    Ok(())
}

#[cfg(not(unix))]
fn make_world_readable(_path: &Path) -> Result<(), KeyGenError> {
    Ok(())
}
