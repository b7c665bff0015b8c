//! Implementation of the `index-patterns describe` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::Config;
use crate::infrastructure::setup::Platform;
use crate::platform::{Capabilities, HttpRequest};

#[derive(Args, Debug)]
pub struct DescribeArgs {
    /// Resolve capabilities for this user
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RouteRow {
    pub method: String,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct DescribeOutput {
    pub saved_object_types: Vec<String>,
    pub request_contexts: Vec<String>,
    pub routes: Vec<RouteRow>,
    pub expression_functions: Vec<String>,
    pub usage_collectors: Vec<String>,
    pub capabilities: Capabilities,
}

impl CommandOutput for DescribeOutput {
    fn to_human(&self) -> String {
        let mut routes = list_table(&["method", "path"]);
        for route in &self.routes {
            routes.add_row(vec![route.method.clone(), route.path.clone()]);
        }

        let mut lines = vec![
            format!("Saved object types: {}", self.saved_object_types.join(", ")),
            format!("Request contexts:   {}", self.request_contexts.join(", ")),
            format!("Expression functions: {}", self.expression_functions.join(", ")),
        ];
        if self.usage_collectors.is_empty() {
            lines.push("Usage collection:   disabled".to_string());
        } else {
            lines.push(format!("Usage collectors:   {}", self.usage_collectors.join(", ")));
        }
        lines.push(format!(
            "Management capability indexPatterns: {}",
            self.capabilities.is_enabled("management.kibana.indexPatterns")
        ));
        lines.push(String::new());
        lines.push(render_list("route", &routes, self.routes.len()));
        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub fn describe(platform: &Platform, user: Option<&str>) -> DescribeOutput {
    let mut request = HttpRequest::get("/");
    if let Some(user) = user {
        request = request.with_user(user);
    }

    DescribeOutput {
        saved_object_types: platform.saved_object_types.type_names(),
        request_contexts: platform.http.context_names(),
        routes: platform
            .http
            .routes()
            .into_iter()
            .map(|(method, path)| RouteRow {
                method: method.to_string(),
                path,
            })
            .collect(),
        expression_functions: platform.expressions.function_names(),
        usage_collectors: platform
            .usage_collection
            .as_ref()
            .map(|usage| usage.collector_types())
            .unwrap_or_default(),
        capabilities: platform.capabilities.resolve(&request),
    }
}

pub async fn execute(args: DescribeArgs, config: &Config, json_mode: bool) -> Result<()> {
    let platform = Platform::bootstrap(config)?;
    output(&describe(&platform, args.user.as_deref()), json_mode);
    Ok(())
}
