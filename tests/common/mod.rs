use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Bring the schema up to date before the server starts.
        let status = Command::new("target/debug/ecogov-api")
            .arg("migrate")
            .status()
            .context("failed to run migrations")?;
        anyhow::ensure!(status.success(), "migrate exited with {}", status);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        let mut cmd = Command::new("target/debug/ecogov-api");
        cmd.env("ECOGOV_API_PORT", port.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL and JWT_SECRET
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Posts one GraphQL operation and returns the full response body.
pub async fn graphql(
    server: &TestServer,
    token: Option<&str>,
    query: &str,
    variables: Value,
) -> Result<Value> {
    let client = reqwest::Client::new();
    let mut request = client
        .post(format!("{}/graphql", server.base_url))
        .json(&json!({ "query": query, "variables": variables }));
    if let Some(token) = token {
        request = request.bearer_auth(token);
    }
    let response = request.send().await?;
    Ok(response.json().await?)
}

pub async fn login(server: &TestServer, email: &str, password: &str) -> Result<String> {
    let body = graphql(
        server,
        None,
        "mutation($email: String!, $password: String!) { \
            login(email: $email, password: $password) { token user { id email } } \
         }",
        json!({ "email": email, "password": password }),
    )
    .await?;
    body["data"]["login"]["token"]
        .as_str()
        .map(str::to_string)
        .with_context(|| format!("login failed: {}", body))
}

/// Token for the seeded administrator.
pub async fn admin_token(server: &TestServer) -> Result<String> {
    login(server, "admin@ecogov.local", "changeme").await
}

/// First error code of a GraphQL response, if any.
pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}

/// Unique suffix so test fixtures never collide across runs.
pub fn unique(prefix: &str) -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    format!("{}-{}", prefix, nanos)
}
