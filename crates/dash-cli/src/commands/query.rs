use anyhow::Context;
use dash_client::{Clients, Endpoint};
use dash_core::GraphqlRequest;
use serde_json::{Map, Value};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::QueryArgs;
use crate::output::output;

pub async fn handle(args: &QueryArgs, clients: &Clients, flags: &GlobalFlags) -> anyhow::Result<()> {
    let request = build_request(args)?;
    let endpoint = if args.system {
        Endpoint::System
    } else {
        Endpoint::Main
    };

    let data = clients
        .pipeline(endpoint)
        .execute(&request)
        .await
        .with_context(|| format!("{} failed on the {endpoint} endpoint", request.display_name()))?;
    output(&data, flags.format)
}

fn build_request(args: &QueryArgs) -> anyhow::Result<GraphqlRequest> {
    let mut request = GraphqlRequest::new(&args.query);
    if let Some(raw) = &args.variables {
        request = request.with_variables(parse_variables(raw)?);
    }
    if let Some(name) = &args.operation_name {
        request = request.operation_name(name);
    }
    Ok(request)
}

fn parse_variables(raw: &str) -> anyhow::Result<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw).context("--variables is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => anyhow::bail!("--variables must be a JSON object, got {other}"),
    }
}
