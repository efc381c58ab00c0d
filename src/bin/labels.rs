use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use workspaces_annotator::config::Config;
use workspaces_annotator::labeler;
use workspaces_annotator::secure_workload_client::SecureWorkloadClient;
use workspaces_annotator::workspaces_inventory_client::WorkspacesInventoryClient;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .init();
    run(service_fn(labels_handler)).await?;
    Ok(())
}

async fn labels_handler(_event: LambdaEvent<Value>) -> Result<Value, Error> {
    let config = Config::from_env()?;
    let inventory = WorkspacesInventoryClient::new(config.region.clone());
    let platform = SecureWorkloadClient::new(&config.secure_workload)?;
    labeler::run(&config, &inventory, &platform).await?;
    Ok(Value::Null)
}
