//! Implementation of the `index-patterns run` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::commands::request::{send, RequestOutput, RequestSpec};
use crate::cli::output::{list_table, output, render_list, truncate, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::setup::Platform;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// YAML or JSON file holding a list of requests
    pub file: PathBuf,

    /// Stop at the first response that is not 2xx
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(Debug, Serialize)]
pub struct RunOutput {
    pub responses: Vec<RequestOutput>,
    pub failed: usize,
}

impl CommandOutput for RunOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["#", "method", "path", "status", "body"]);
        for (n, response) in self.responses.iter().enumerate() {
            table.add_row(vec![
                (n + 1).to_string(),
                response.method.to_string(),
                response.path.clone(),
                response.status.to_string(),
                truncate(&response.body.to_string(), 60),
            ]);
        }
        format!(
            "{}\n{} failed",
            render_list("response", &table, self.responses.len()),
            self.failed
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Parse a replay file; YAML is a superset of JSON so one parser covers both
pub fn parse_requests(content: &str) -> Result<Vec<RequestSpec>> {
    serde_yaml::from_str(content).context("Failed to parse request file")
}

pub async fn replay(platform: &Platform, requests: &[RequestSpec], fail_fast: bool) -> RunOutput {
    let mut responses = Vec::with_capacity(requests.len());
    let mut failed = 0;
    for spec in requests {
        let response = send(platform, spec).await;
        let ok = (200..300).contains(&response.status);
        responses.push(response);
        if !ok {
            failed += 1;
            if fail_fast {
                break;
            }
        }
    }
    RunOutput { responses, failed }
}

pub async fn execute(args: RunArgs, config: &Config, json_mode: bool) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let requests = parse_requests(&content)?;

    let platform = Platform::bootstrap(config)?;
    let result = replay(&platform, &requests, args.fail_fast).await;
    let failed = result.failed;
    output(&result, json_mode);

    if failed > 0 {
        anyhow::bail!("{failed} request(s) failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Method;

    #[test]
    fn test_parse_requests_yaml() {
        let requests = parse_requests(
            r#"
- method: POST
  path: /api/index_patterns/index_pattern
  body:
    index_pattern:
      title: "logs-*"
- method: GET
  path: /api/index_patterns/default
"#,
        )
        .unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].method, Method::Post);
        assert!(requests[1].body.is_none());
    }

    #[tokio::test]
    async fn test_replay_fail_fast() {
        let platform = Platform::bootstrap(&Config::default()).unwrap();
        let requests = parse_requests(
            r#"[
              {"method": "GET", "path": "/api/index_patterns/index_pattern/missing"},
              {"method": "GET", "path": "/api/index_patterns/default"}
            ]"#,
        )
        .unwrap();

        let result = replay(&platform, &requests, true).await;
        assert_eq!(result.failed, 1);
        assert_eq!(result.responses.len(), 1);
        assert_eq!(result.responses[0].status, 404);

        let result = replay(&platform, &requests, false).await;
        assert_eq!(result.responses.len(), 2);
        assert_eq!(result.responses[1].status, 200);
    }
}
