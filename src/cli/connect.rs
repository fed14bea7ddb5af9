use std::io::Write;

use rand::distributions::Alphanumeric;
use rand::Rng;
use zeroize::Zeroize;

use crate::auth::{
    authorization_url, credentials_path, exchange_code, parse_redirect, save_credentials,
    Credentials, TOKEN_URL,
};
use crate::error::{ObjectifError, Result};
use crate::settings::{get_data_dir, load_settings};

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Interactive OAuth2 connect: print the consent URL, then trade the pasted
/// redirect URL for a token set stored in the data directory.
pub fn run() -> Result<()> {
    let settings = load_settings();

    let client_id = prompt("QuickBooks Client ID")?;
    if client_id.is_empty() {
        return Err(ObjectifError::Auth("client ID is required".to_string()));
    }
    let mut client_secret = rpassword::prompt_password("QuickBooks Client Secret: ")
        .map_err(|e| ObjectifError::Auth(format!("cannot read client secret: {e}")))?;
    if client_secret.is_empty() {
        return Err(ObjectifError::Auth("client secret is required".to_string()));
    }

    let state: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect();

    println!();
    println!("1) Open this URL in a browser and authorize the application:");
    println!();
    println!("   {}", authorization_url(&client_id, &state));
    println!();
    println!("2) After authorizing you will be redirected to a page that may");
    println!("   show an error — that is expected.");
    println!("3) Copy the full URL of that page (it contains code= and realmId=).");
    println!();

    let redirect = prompt("Redirect URL")?;
    let (code, realm_id) = parse_redirect(&redirect)?;

    let http = reqwest::blocking::Client::new();
    let tokens = exchange_code(&http, TOKEN_URL, &client_id, &client_secret, &code)?;

    let creds = Credentials {
        client_id,
        client_secret: client_secret.clone(),
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        realm_id,
        access_token_expires_at: tokens.access_token_expires_at,
        refresh_token_expires_at: tokens.refresh_token_expires_at,
    };
    client_secret.zeroize();

    let path = credentials_path(&get_data_dir());
    save_credentials(&creds, &path)?;

    println!();
    println!("Connected to QuickBooks ({}).", settings.environment);
    println!("  Realm ID:     {}", creds.realm_id);
    println!("  Credentials:  {}", path.display());
    println!();
    println!("Try: objectif fetch");

    Ok(())
}
