//! Implementation of the `index-patterns request` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::setup::Platform;
use crate::platform::{HttpRequest, Method};

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// HTTP method: GET, POST, PUT or DELETE
    pub method: String,

    /// Path with optional query string
    pub path: String,

    /// JSON request body
    #[arg(short, long)]
    pub body: Option<String>,

    /// Authenticated user
    #[arg(short, long)]
    pub user: Option<String>,
}

/// One request as written in a replay file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestSpec {
    pub method: Method,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

impl RequestSpec {
    pub fn to_request(&self) -> HttpRequest {
        let mut request = HttpRequest::new(self.method, &self.path);
        request.body.clone_from(&self.body);
        request.user.clone_from(&self.user);
        request
    }
}

#[derive(Debug, Serialize)]
pub struct RequestOutput {
    pub method: Method,
    pub path: String,
    pub status: u16,
    pub body: Value,
}

impl CommandOutput for RequestOutput {
    fn to_human(&self) -> String {
        format!(
            "{} {} -> {}\n{}",
            self.method,
            self.path,
            self.status,
            serde_json::to_string_pretty(&self.body).unwrap_or_default()
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn send(platform: &Platform, spec: &RequestSpec) -> RequestOutput {
    let response = platform.http.handle(spec.to_request()).await;
    RequestOutput {
        method: spec.method,
        path: spec.path.clone(),
        status: response.status,
        body: response.body,
    }
}

pub async fn execute(args: RequestArgs, config: &Config, json_mode: bool) -> Result<()> {
    let body = args
        .body
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Request body is not valid JSON")?;
    let spec = RequestSpec {
        method: args.method.parse()?,
        path: args.path,
        body,
        user: args.user,
    };

    let platform = Platform::bootstrap(config)?;
    output(&send(&platform, &spec).await, json_mode);
    Ok(())
}
