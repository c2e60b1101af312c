//! Tagged `KEY=value` blocks inside dotenv files:
//!
//! ```text
//! ###> app/jwt ###
//! JWT_PASSPHRASE=...
//! ###< app/jwt ###
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvFileError {
    #[error("Config for tag '{0}' is empty")]
    EmptyConfig(String),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered key/value pairs of one block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvBlock {
    entries: Vec<(String, String)>,
}

impl EnvBlock {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when the key was added.
    pub fn set_if_missing(&mut self, key: &str, value: impl FnOnce() -> String) -> bool {
        if self.get(key).is_some() {
            return false;
        }
        self.entries.push((key.to_string(), value()));
        true
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn opening_tag(tag: &str) -> String {
    format!("###> {} ###", tag)
}

fn closing_tag(tag: &str) -> String {
    format!("###< {} ###", tag)
}

/// Byte range of the whole block, tags included.
fn block_range(content: &str, tag: &str) -> Option<(usize, usize)> {
    let open = opening_tag(tag);
    let close = closing_tag(tag);

    let start = content.find(&open)?;
    let close_at = content[start + open.len()..].find(&close)? + start + open.len();
    Some((start, close_at + close.len()))
}

/// Entries of the block named `tag`; empty when the block does not exist.
pub fn parse_block(content: &str, tag: &str) -> EnvBlock {
    let Some((start, end)) = block_range(content, tag) else {
        return EnvBlock::default();
    };
    let inner = &content[start + opening_tag(tag).len()..end - closing_tag(tag).len()];

    let entries = inner
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .collect();

    EnvBlock { entries }
}

/// Rewrites the block named `tag` with `block`, appending it when missing.
pub fn replace_block(content: &str, tag: &str, block: &EnvBlock) -> Result<String, EnvFileError> {
    if block.is_empty() {
        return Err(EnvFileError::EmptyConfig(tag.to_string()));
    }

    let replacement = format!("{}\n{}\n{}", opening_tag(tag), block.render(), closing_tag(tag));

    Ok(match block_range(content, tag) {
        Some((start, end)) => format!("{}{}{}", &content[..start], replacement, &content[end..]),
        None => format!("{}\n{}\n", content, replacement),
    })
}

/// A dotenv file edited block by block.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
}

impl EnvFile {
    /// Opens `path`, creating an empty file first when needed. The flag
    /// tells whether the file was created.
    pub fn open_or_create(path: impl AsRef<Path>) -> Result<(Self, bool), EnvFileError> {
        let path = path.as_ref().to_path_buf();
        let created = !path.exists();
        if created {
            fs::write(&path, "").map_err(|source| io_error(&path, source))?;
        }
        Ok((Self { path }, created))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_config_for_tag(&self, tag: &str) -> Result<EnvBlock, EnvFileError> {
        Ok(parse_block(&self.read()?, tag))
    }

    pub fn save_config_for_tag(&self, tag: &str, block: &EnvBlock) -> Result<(), EnvFileError> {
        let updated = replace_block(&self.read()?, tag, block)?;
        fs::write(&self.path, updated).map_err(|source| io_error(&self.path, source))
    }

    fn read(&self) -> Result<String, EnvFileError> {
        fs::read_to_string(&self.path).map_err(|source| io_error(&self.path, source))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> EnvFileError {
    EnvFileError::Io {
        path: path.display().to_string(),
        source,
    }
}
