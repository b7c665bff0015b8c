//! Implementation of the `index-patterns usage` command.

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::commands::run::{parse_requests, replay};
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::setup::Platform;

#[derive(Args, Debug)]
pub struct UsageArgs {
    /// Replay this request file before collecting
    #[arg(long)]
    pub seed: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub struct UsageOutput {
    pub collectors: BTreeMap<String, Value>,
}

impl CommandOutput for UsageOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["collector", "metric", "value"]);
        for (collector, payload) in &self.collectors {
            if let Value::Object(metrics) = payload {
                for (metric, value) in metrics {
                    table.add_row(vec![collector.clone(), metric.clone(), value.to_string()]);
                }
            }
        }
        render_list("collector", &table, self.collectors.len())
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.collectors).unwrap_or_default()
    }
}

pub async fn execute(args: UsageArgs, config: &Config, json_mode: bool) -> Result<()> {
    let platform = Platform::bootstrap(config)?;
    let Some(usage_collection) = platform.usage_collection.clone() else {
        bail!("Usage collection is disabled in configuration");
    };

    if let Some(seed) = args.seed {
        let content = tokio::fs::read_to_string(&seed).await?;
        replay(&platform, &parse_requests(&content)?, false).await;
    }

    let collectors = usage_collection
        .bulk_fetch(&platform.collector_fetch_context())
        .await;
    output(&UsageOutput { collectors }, json_mode);
    Ok(())
}
