use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Session cookie name set by the backend on login.
const SESSION_COOKIE: &str = "id";

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub email: String,
    pub password: String,
}

impl UserCredentials {
    pub fn parse(input: &str) -> Result<Self> {
        let Some((email, password)) = input.split_once(':') else {
            anyhow::bail!("Invalid credentials format. Expected email:password");
        };
        if email.is_empty() || password.is_empty() {
            anyhow::bail!("Invalid credentials format. Expected email:password");
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub session_cookie: String,
    pub label: String,
}

#[derive(Debug, Serialize)]
struct LoginForm<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginUser,
}

#[derive(Debug, Deserialize)]
struct LoginUser {
    id: String,
}

pub async fn login(
    client: &Client,
    base_url: &str,
    credentials: &UserCredentials,
    label: &str,
) -> Result<AuthenticatedUser> {
    let url = format!("{base_url}/login");

    let response = client
        .post(&url)
        .form(&LoginForm {
            email: &credentials.email,
            password: &credentials.password,
        })
        .send()
        .await
        .context("Failed to send login request")?;

    if !response.status().is_success() {
        anyhow::bail!("Login failed for {}: {}", credentials.email, response.status());
    }

    let session_cookie = response
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .context("No session cookie in response")?
        .value()
        .to_string();

    let login_response: LoginResponse = response
        .json()
        .await
        .context("Failed to parse login response")?;

    Ok(AuthenticatedUser {
        user_id: login_response.data.id,
        session_cookie,
        label: label.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_email_and_password() {
        let creds = UserCredentials::parse("jordan@creatorcompass.io:pa:ss").unwrap();
        assert_eq!(creds.email, "jordan@creatorcompass.io");
        assert_eq!(creds.password, "pa:ss");
    }

    #[test]
    fn rejects_missing_password() {
        assert!(UserCredentials::parse("jordan@creatorcompass.io").is_err());
        assert!(UserCredentials::parse("jordan@creatorcompass.io:").is_err());
    }
}
