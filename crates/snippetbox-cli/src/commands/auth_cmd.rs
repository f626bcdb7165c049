use std::io::{self, BufRead, Write};

use snippetbox_core::auth::{parse_callback_code, OAuthProvider};
use snippetbox_core::store::SupabaseSnippetStore;

use crate::auth::{auth_client, clear_stored_session, load_stored_session};
use crate::cli::AuthCommands;
use crate::commands::common::load_client_config;
use crate::error::CliError;

pub async fn run_auth(command: AuthCommands) -> Result<(), CliError> {
    match command {
        AuthCommands::Login { provider } => run_login(provider.into()).await,
        AuthCommands::Status => {
            let config = load_client_config()?;
            let session = auth_client(&config)
                .map_err(|error| CliError::Auth(error.to_string()))?
                .restore_session()
                .await
                .map_err(|error| CliError::Auth(error.to_string()))?;

            if let Some(session) = session {
                let email_label = session.user.email.as_deref().unwrap_or("(no email)");
                println!(
                    "Signed in as {} (expires_at={})",
                    email_label, session.expires_at
                );
            } else {
                println!("Not signed in.");
            }
            Ok(())
        }
        AuthCommands::Logout => {
            let stored_session =
                load_stored_session().map_err(|error| CliError::Auth(error.to_string()))?;

            match (load_client_config(), stored_session) {
                (Ok(config), Some(session)) => {
                    auth_client(&config)
                        .map_err(|error| CliError::Auth(error.to_string()))?
                        .sign_out(&session.access_token)
                        .await
                        .map_err(|error| CliError::Auth(error.to_string()))?;
                }
                _ => {
                    clear_stored_session().map_err(|error| CliError::Auth(error.to_string()))?;
                }
            }

            println!("Signed out");
            Ok(())
        }
    }
}

async fn run_login(provider: OAuthProvider) -> Result<(), CliError> {
    let config = load_client_config()?;
    let client = auth_client(&config).map_err(|error| CliError::Auth(error.to_string()))?;
    let request = client.authorize(provider);

    println!("Open this URL in your browser to sign in with {}:", provider.as_str());
    println!();
    println!("  {}", request.url);
    println!();
    print!("Paste the URL you were redirected to (or just the code): ");
    io::stdout().flush()?;

    let mut pasted = String::new();
    io::stdin().lock().read_line(&mut pasted)?;
    let code = parse_callback_code(&pasted).map_err(|error| CliError::Auth(error.to_string()))?;

    let session = client
        .exchange_code(&code, &request.verifier)
        .await
        .map_err(|error| CliError::Auth(error.to_string()))?;

    let store = SupabaseSnippetStore::new(&config, Some(session.access_token.clone()))?;
    if let Err(error) = store.ensure_user_record(&session.user).await {
        tracing::warn!("Failed to record user profile: {}", error);
    }

    let email_label = session.user.email.as_deref().unwrap_or("(no email)");
    println!("Signed in as {email_label}");
    Ok(())
}
