//! Credential command handlers (login, logout, status).

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use divvy_core::auth::credentials::{CredentialStore, FileCredentialStore, TokenBlob, mask_token};
use divvy_core::form::{FormField, FormState, Rule};

/// Sign-in form floor; anything shorter is a paste accident, not a token.
const MIN_TOKEN_LEN: usize = 10;

pub async fn login(username: &str) -> Result<()> {
    let store = FileCredentialStore::new();

    // Check if already signed in
    if let Some(existing) = store.get().await? {
        let masked = match TokenBlob::parse(&existing.password) {
            Ok(blob) => mask_token(&blob.refresh),
            Err(_) => "***".to_string(),
        };
        println!(
            "Already signed in as {} (refresh token: {masked})",
            existing.username
        );
        print!("Do you want to replace the existing credentials? [y/N] ");
        io::stdout().flush()?;

        let mut response = String::new();
        io::stdin().lock().read_line(&mut response)?;
        if !response.trim().eq_ignore_ascii_case("y") {
            println!("Login cancelled.");
            return Ok(());
        }
    }

    // Same rules the sign-in screen applies to its fields.
    let mut form = FormState::new();
    FormField::bind(
        &mut form,
        "access_token",
        vec![
            Rule::required("Access token is required"),
            Rule::min_length(MIN_TOKEN_LEN, "Access token looks too short"),
        ],
    );
    FormField::bind(
        &mut form,
        "refresh_token",
        vec![
            Rule::required("Refresh token is required"),
            Rule::min_length(MIN_TOKEN_LEN, "Refresh token looks too short"),
        ],
    );

    let access = prompt_line("Access token: ")?;
    form.set_value("access_token", access.trim());
    let refresh = prompt_line("Refresh token: ")?;
    form.set_value("refresh_token", refresh.trim());

    if !form.validate() {
        let message = ["access_token", "refresh_token"]
            .into_iter()
            .find_map(|field| form.error(field))
            .unwrap_or("Invalid input");
        anyhow::bail!("{message}");
    }

    let blob = TokenBlob {
        access: Some(form.value("access_token").to_string()),
        refresh: form.value("refresh_token").to_string(),
    };
    let password = blob.to_password()?;
    store
        .set(username, &password)
        .await
        .context("save credentials")?;

    println!();
    println!(
        "✓ Logged in as {username} (access token: {})",
        mask_token(form.value("access_token"))
    );
    println!("  Credentials saved to: {}", store.path().display());

    Ok(())
}

pub fn logout() -> Result<()> {
    let store = FileCredentialStore::new();
    let had_creds = store.clear()?;

    if had_creds {
        println!("✓ Logged out");
        println!("  Credentials removed from: {}", store.path().display());
    } else {
        println!("Not signed in (no credentials found).");
    }

    Ok(())
}

pub async fn status() -> Result<()> {
    let store = FileCredentialStore::new();
    let Some(entry) = store.get().await? else {
        println!("Not signed in (no credentials found).");
        return Ok(());
    };

    match TokenBlob::parse(&entry.password) {
        Ok(blob) => {
            println!("Signed in as {}", entry.username);
            if let Some(access) = blob.access.as_deref() {
                println!("  Access token:  {}", mask_token(access));
            }
            println!("  Refresh token: {}", mask_token(&blob.refresh));
        }
        Err(e) => {
            println!("Credential for {} is unusable ({e}).", entry.username);
            println!("  Run `divvy logout` to clear it.");
        }
    }
    println!("  Credentials file: {}", store.path().display());

    Ok(())
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input)
}
