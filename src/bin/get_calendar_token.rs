use calbridge::components::google_calendar::token::{InstalledFlow, PromptMode};
use calbridge::error::{env_error, other_error, BotResult};

const REDIRECT_URI: &str = "http://localhost:8080";

/// Standalone helper that walks the installed-app OAuth flow in a browser
/// and prints the refresh token to put into GOOGLE_REFRESH_TOKEN.
#[tokio::main]
async fn main() -> BotResult<()> {
    dotenvy::dotenv().ok();

    let client_id =
        std::env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
    let client_secret =
        std::env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;

    // Phase one: construct the flow
    let flow = InstalledFlow::new(client_id, client_secret, REDIRECT_URI.to_string());

    // Random state to tie the callback to this run
    let state = uuid::Uuid::new_v4().to_string();

    // Phase two: request access. Consent prompt is forced so Google issues
    // a refresh token even if the app was authorized before.
    let auth_url = flow.authorize_url(PromptMode::Consent, &state)?;

    println!("Opening browser for Google Calendar authorization...");
    webbrowser::open(auth_url.as_str())?;

    // Start local server to receive the callback
    let server = tiny_http::Server::http("0.0.0.0:8080")
        .map_err(|e| other_error(&format!("Failed to start callback server: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let url = request.url().to_string();

    let returned_state = url
        .split("state=")
        .nth(1)
        .and_then(|s| s.split('&').next());
    if returned_state != Some(state.as_str()) {
        return Err(other_error("State mismatch in authorization callback"));
    }

    let code = url
        .split("code=")
        .nth(1)
        .and_then(|s| s.split('&').next())
        .ok_or_else(|| other_error("No authorization code found in callback"))?;

    let tokens = flow.exchange_code(code).await?;

    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    match tokens.refresh_token {
        Some(refresh_token) => {
            println!("\nAuthorization complete. Add this to your .env:");
            println!("GOOGLE_REFRESH_TOKEN={}", refresh_token);
        }
        None => {
            return Err(other_error(
                "Google did not return a refresh token; revoke the app's access and retry",
            ));
        }
    }

    Ok(())
}
