//! HTTP client for a running keymem service

use clap::{Args, Subcommand};
use reqwest::{Client, Method};
use serde_json::{json, Value};

use crate::api::middleware::{KEY_HEADER, TOKEN_HEADER};

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Base URL of the service
    #[arg(long, env = "KEYMEM_URL", default_value = "http://localhost:8080")]
    pub url: String,

    /// Secret sent in the `key` header
    #[arg(long, env = "KEYMEM_KEY", default_value = "")]
    pub key: String,

    #[command(subcommand)]
    pub command: ClientCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClientCommand {
    /// List provisioned keys
    List,
    /// Provision a key, generating one unless given
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        secret: Option<String>,
    },
    /// Revoke a key
    Del { secret: String },
    /// Set uses and lifetime in days for a key
    Enable {
        secret: String,
        #[arg(long)]
        number: i64,
        #[arg(long)]
        expday: i64,
    },
    /// Show a key's label and entitlement
    Get { secret: String },
    /// Clear a key's entitlement
    Dis { secret: String },
    /// Show the caller's own key info
    Own,
    /// Show the caller's address and public key
    Address,
    /// Show the caller's entitlement expiry
    Expiry,
    /// Grant route uses to a key
    AddCount {
        secret: String,
        #[arg(long)]
        path: String,
        #[arg(long)]
        count: i64,
    },
    /// Raise only the cumulative route counter
    AddTotalCount {
        secret: String,
        #[arg(long)]
        path: String,
        #[arg(long)]
        count: i64,
    },
    /// Show the caller's quota on a route
    GetCount {
        #[arg(long)]
        path: String,
    },
    /// Mint a token scoped to a path
    Token {
        #[arg(long)]
        path: String,
    },
}

/// Status, body and `token` header of one call
#[derive(Debug, Clone)]
pub struct ClientResponse {
    pub status: u16,
    pub token: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone)]
pub struct KeymemClient {
    http: Client,
    base_url: String,
    key: String,
}

impl KeymemClient {
    pub fn new(base_url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            key: key.into(),
        }
    }

    pub async fn execute(&self, command: &ClientCommand) -> anyhow::Result<ClientResponse> {
        match command {
            ClientCommand::List => self.send(Method::GET, "/keymem/listkey", None).await,
            ClientCommand::Add { name, secret } => {
                let mut body = json!({ "name": name });
                if let Some(secret) = secret {
                    body["key"] = json!(secret);
                }
                self.send(Method::POST, "/keymem/addkey", Some(body)).await
            }
            ClientCommand::Del { secret } => {
                self.send(Method::POST, "/keymem/delkey", Some(json!({ "key": secret })))
                    .await
            }
            ClientCommand::Enable {
                secret,
                number,
                expday,
            } => {
                let body = json!({ "key": secret, "number": number, "expday": expday });
                self.send(Method::POST, "/keymem/enable", Some(body)).await
            }
            ClientCommand::Get { secret } => {
                self.send(Method::POST, "/keymem/getkey", Some(json!({ "key": secret })))
                    .await
            }
            ClientCommand::Dis { secret } => {
                self.send(Method::POST, "/keymem/diskey", Some(json!({ "key": secret })))
                    .await
            }
            ClientCommand::Own => self.send(Method::GET, "/keymem/getownkey", None).await,
            ClientCommand::Address => self.send(Method::GET, "/keymem/keyaddr", None).await,
            ClientCommand::Expiry => self.send(Method::GET, "/keymem/getkeyexpdate", None).await,
            ClientCommand::AddCount {
                secret,
                path,
                count,
            } => {
                let body = json!({ "key": secret, "reqpath": path, "count": count });
                self.send(Method::POST, "/keymem/addcount", Some(body)).await
            }
            ClientCommand::AddTotalCount {
                secret,
                path,
                count,
            } => {
                let body = json!({ "key": secret, "reqpath": path, "count": count });
                self.send(Method::POST, "/keymem/addtotalcount", Some(body))
                    .await
            }
            ClientCommand::GetCount { path } => {
                self.send(Method::POST, "/keymem/getcount", Some(json!({ "reqpath": path })))
                    .await
            }
            ClientCommand::Token { path } => {
                let path = if path.starts_with('/') {
                    path.clone()
                } else {
                    format!("/{}", path)
                };
                self.send(Method::PUT, &path, None).await
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> anyhow::Result<ClientResponse> {
        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header(KEY_HEADER, &self.key);

        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let token = response
            .headers()
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(ClientResponse {
            status,
            token,
            body,
        })
    }
}

pub async fn run(args: ClientArgs) -> anyhow::Result<()> {
    let client = KeymemClient::new(&args.url, &args.key);
    let response = client.execute(&args.command).await?;

    if let Some(token) = &response.token {
        println!("token: {}", token);
    }
    println!("{}", serde_json::to_string_pretty(&response.body)?);

    if response.status >= 400 {
        anyhow::bail!("request failed with status {}", response.status);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_list_sends_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keymem/listkey"))
            .and(header("key", "admin-secret"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "keys": []})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = KeymemClient::new(server.uri(), "admin-secret");
        let response = client.execute(&ClientCommand::List).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body["status"], "ok");
        assert!(response.token.is_none());
    }

    #[tokio::test]
    async fn test_enable_posts_entitlement() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/keymem/enable"))
            .and(body_json(json!({"key": "abc", "number": 3, "expday": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KeymemClient::new(format!("{}/", server.uri()), "admin");
        let command = ClientCommand::Enable {
            secret: "abc".to_string(),
            number: 3,
            expday: 7,
        };

        assert_eq!(client.execute(&command).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_add_omits_missing_secret() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/keymem/addkey"))
            .and(body_json(json!({"name": "svc"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = KeymemClient::new(server.uri(), "admin");
        let command = ClientCommand::Add {
            name: "svc".to_string(),
            secret: None,
        };

        assert_eq!(client.execute(&command).await.unwrap().status, 200);
    }

    #[tokio::test]
    async fn test_token_reads_header() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/v1/items"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("token", "abcd")
                    .set_body_json(json!({"status": "ok", "token": "abcd"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = KeymemClient::new(server.uri(), "k");
        let command = ClientCommand::Token {
            path: "v1/items".to_string(),
        };
        let response = client.execute(&command).await.unwrap();

        assert_eq!(response.token.as_deref(), Some("abcd"));
        assert_eq!(response.body["token"], "abcd");
    }

    #[tokio::test]
    async fn test_error_body_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/keymem/getownkey"))
            .respond_with(ResponseTemplate::new(403).set_body_json(
                json!({"status": "error", "message": "Access denied", "code": "access_denied"}),
            ))
            .mount(&server)
            .await;

        let client = KeymemClient::new(server.uri(), "nope");
        let response = client.execute(&ClientCommand::Own).await.unwrap();

        assert_eq!(response.status, 403);
        assert_eq!(response.body["code"], "access_denied");
    }
}
