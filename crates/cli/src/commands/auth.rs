use std::io::{BufRead, Write};

use clap::Subcommand;
use lapshop_client::types::RegisterRequest;
use lapshop_client::{AuthOutcome, LapShop, SessionState};
use secrecy::SecretString;

use super::CommandResult;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Sign in with username and password
    Login {
        #[arg(short, long)]
        username: String,
        /// Password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Create a new account
    Register {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        email: String,
        /// Password; prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the current session
    Whoami,
}

#[allow(clippy::print_stdout)]
pub async fn run(shop: &LapShop, action: AuthAction) -> CommandResult {
    match action {
        AuthAction::Login { username, password } => {
            let password = resolve_password(password)?;
            match shop.session().login(&username, &password).await {
                AuthOutcome::Success(profile) => {
                    println!("Signed in as {}", profile.username);
                    if shop.session().is_admin() {
                        println!("(admin)");
                    }
                }
                AuthOutcome::Failure { message } => {
                    return Err(format!("Login failed: {message}").into());
                }
            }
        }
        AuthAction::Register {
            username,
            email,
            password,
            full_name,
            phone,
        } => {
            let password = resolve_password(password)?;
            let request = RegisterRequest {
                username,
                password,
                email,
                full_name,
                phone,
                address: None,
                gender: None,
            };
            match shop.session().register(&request).await {
                AuthOutcome::Success(profile) => {
                    println!("Registered and signed in as {}", profile.username);
                }
                AuthOutcome::Failure { message } => {
                    return Err(format!("Registration failed: {message}").into());
                }
            }
        }
        AuthAction::Logout => {
            shop.session().logout().await;
            println!("Signed out");
        }
        AuthAction::Whoami => match shop.session().state() {
            SessionState::Authenticated(profile) => {
                println!("Signed in as {}", profile.username);
                if let Some(email) = &profile.email {
                    println!("Email: {email}");
                }
                if shop.session().is_admin() {
                    println!("Roles: admin");
                }
            }
            SessionState::Anonymous | SessionState::Authenticating => {
                println!("Not signed in");
            }
        },
    }

    Ok(())
}

/// Use the flag value when given, otherwise prompt on stdin.
#[allow(clippy::print_stdout)]
fn resolve_password(flag: Option<String>) -> Result<SecretString, std::io::Error> {
    if let Some(password) = flag {
        return Ok(SecretString::from(password));
    }
    print!("Password: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n'])))
}
