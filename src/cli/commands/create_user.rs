use anyhow::Context;
use serde_json::json;
use std::io;

use crate::cli::utils::{output_success, prompt};
use crate::cli::OutputFormat;
use crate::database::models::NewUser;
use crate::database::{DatabaseManager, PgUserRepository, UserRepository};
use crate::security::hash_password;

pub async fn handle(
    username: Option<String>,
    password: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let (username, password) = read_credentials(username, password)?;
    let new_user = build_new_user(&username, &password)?;

    let pool = DatabaseManager::pool().await?;
    let user = PgUserRepository::new(pool)
        .create(new_user)
        .await
        .context("failed to create user")?;

    output_success(
        &output_format,
        "User created successfully.",
        Some(json!({ "user": { "id": user.id, "username": user.username } })),
    )
}

/// Prompts on stdin for whatever was not given on the command line.
fn read_credentials(username: Option<String>, password: Option<String>) -> anyhow::Result<(String, String)> {
    let mut stdin = io::stdin().lock();

    let username = match username {
        Some(username) => username,
        None => prompt("Please insert the username: ", &mut stdin)?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt("Please insert the password: ", &mut stdin)?,
    };

    Ok((username, password))
}

fn build_new_user(username: &str, password: &str) -> anyhow::Result<NewUser> {
    let username = username.trim();
    if username.is_empty() {
        anyhow::bail!("Username must not be empty");
    }
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    Ok(NewUser {
        username: username.to_string(),
        password: hash_password(password)?,
    })
}
