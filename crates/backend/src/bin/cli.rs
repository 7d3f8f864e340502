use anyhow::Context;
use clap::{Parser, Subcommand};
use reqwest::{header, redirect::Policy, Client, StatusCode};
use shared_types::{AddUserRequest, EventResponse, LoginRequest};

#[derive(Parser)]
#[command(name = "logbook-cli")]
#[command(about = "Admin and scripting CLI for the logbook server")]
#[command(
    long_about = "A command-line interface for a running logbook server.\n\n\
    Adds users to the directory, requests magic login links and exports\n\
    numeric events for a logged-in session."
)]
struct Cli {
    /// Logbook server URL to connect to.
    #[arg(
        short,
        long,
        default_value = "http://localhost:8080",
        env = "LOGBOOK_URL"
    )]
    base_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a user who may request magic links
    ///
    /// Requires the server's admin token. Fails if the server runs with a
    /// fixed ALLOWED_EMAILS list or the email is already registered.
    AddUser {
        /// Email address of the new user.
        #[arg(long)]
        email: String,

        /// Display name shown next to the user's events.
        #[arg(long)]
        username: String,

        /// Admin bearer token configured on the server as ADMIN_TOKEN.
        #[arg(long, env = "LOGBOOK_ADMIN_TOKEN", hide_env_values = true)]
        admin_token: String,
    },

    /// Ask the server to email a login link
    ///
    /// The server answers the same way whether or not the address is known.
    RequestLogin {
        /// Email address to send the link to.
        #[arg(long)]
        email: String,
    },

    /// Print events with a numeric value
    Events {
        /// Session token, i.e. the `token` parameter of a magic link.
        #[arg(long, env = "LOGBOOK_TOKEN", hide_env_values = true)]
        token: String,
    },
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

async fn add_user(
    client: &Client,
    base_url: &str,
    email: String,
    username: String,
    admin_token: &str,
) -> anyhow::Result<()> {
    let req = AddUserRequest { email, username };
    let response = client
        .post(endpoint(base_url, "/add-user"))
        .bearer_auth(admin_token)
        .json(&req)
        .send()
        .await?;

    match response.status() {
        StatusCode::CREATED => {
            println!("Added user {} ({})", req.email.trim(), req.username.trim());
            Ok(())
        }
        StatusCode::UNAUTHORIZED => anyhow::bail!("admin token rejected"),
        StatusCode::CONFLICT => anyhow::bail!("user {} already exists", req.email.trim()),
        status => {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("server returned {}: {}", status, body)
        }
    }
}

async fn request_login(client: &Client, base_url: &str, email: String) -> anyhow::Result<()> {
    let response = client
        .post(endpoint(base_url, "/login"))
        .form(&LoginRequest { email })
        .send()
        .await?;

    if !response.status().is_redirection() {
        anyhow::bail!("unexpected response: {}", response.status());
    }

    println!("If the address is registered, a login link is on its way.");
    Ok(())
}

async fn list_events(client: &Client, base_url: &str, token: &str) -> anyhow::Result<()> {
    let response = client
        .get(endpoint(base_url, "/events.json"))
        .header(header::COOKIE, format!("auth={}", token))
        .send()
        .await?;

    if response.status().is_redirection() {
        anyhow::bail!("session token is invalid or expired, request a new login link");
    }

    let events: Vec<EventResponse> = response
        .error_for_status()?
        .json()
        .await
        .context("Failed to parse events")?;

    if events.is_empty() {
        println!("No events found.");
    }
    for event in events {
        println!(
            "{} {:<16} {:>10} {}",
            event.recorded_at.format("%Y-%m-%d %H:%M"),
            event.tag,
            event.value_num,
            event.recorded_by
        );
        if !event.comment.is_empty() {
            println!("    {}", event.comment);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    // Redirects carry the answer (login gate, neutral login response)
    let client = Client::builder().redirect(Policy::none()).build()?;

    match cli.command {
        Commands::AddUser {
            email,
            username,
            admin_token,
        } => add_user(&client, &cli.base_url, email, username, &admin_token).await?,
        Commands::RequestLogin { email } => request_login(&client, &cli.base_url, email).await?,
        Commands::Events { token } => list_events(&client, &cli.base_url, &token).await?,
    }

    Ok(())
}
