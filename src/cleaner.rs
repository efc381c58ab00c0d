use std::collections::HashSet;

use tracing::{error, info, warn};

use crate::annotation::write_csv;
use crate::config::Config;
use crate::error::AnnotatorError;
use crate::secure_workload_client::{SecureWorkloadClient, TaggedWorkspace, UploadAction};
use crate::workspaces_inventory_client::Describe;

pub async fn run(
    config: &Config,
    inventory: &impl Describe,
    platform: &SecureWorkloadClient,
) -> Result<(), AnnotatorError> {
    let tagged = platform
        .search_tagged_workspaces(config.region.name())
        .await?;
    let active: HashSet<String> = inventory
        .describe_desktops()
        .await?
        .into_iter()
        .map(|desktop| desktop.ip_address)
        .collect();

    let stale = stale_workspaces(tagged, &active);
    if stale.is_empty() {
        info!("no WorkSpaces have been terminated");
        return Ok(());
    }

    info!(
        "cleaning up {} stale workspace annotation(s): {}",
        stale.len(),
        serde_json::to_string(&stale)?
    );
    match platform
        .upload_annotations(&deletion_csv(&stale)?, UploadAction::Delete)
        .await
    {
        Ok(()) => info!("deleted {} annotation(s)", stale.len()),
        // A failed upload is reported, not raised; sensor deletion still runs.
        Err(err) => error!("failed to upload annotations: {}", err),
    }

    if config.delete_sensors {
        delete_terminated_sensors(platform, &stale).await;
    }
    Ok(())
}

pub fn stale_workspaces(
    tagged: Vec<TaggedWorkspace>,
    active: &HashSet<String>,
) -> Vec<TaggedWorkspace> {
    tagged
        .into_iter()
        .filter(|workspace| !active.contains(&workspace.ip))
        .collect()
}

fn deletion_csv(stale: &[TaggedWorkspace]) -> Result<Vec<u8>, AnnotatorError> {
    write_csv(
        &["ip", "Cloud Service"],
        stale
            .iter()
            .map(|workspace| vec![workspace.ip.clone(), workspace.cloud_service.clone()]),
    )
}

/// Each deletion is independent; one failure does not block the others.
async fn delete_terminated_sensors(platform: &SecureWorkloadClient, stale: &[TaggedWorkspace]) {
    for workspace in stale {
        match &workspace.host_uuid {
            Some(uuid) => match platform.delete_sensor(uuid).await {
                Ok(()) => info!("deleted sensor with uuid: {}", uuid),
                Err(err) => error!("failed to delete sensor with uuid {}: {}", uuid, err),
            },
            None => warn!("no sensor registered for ip: {}", workspace.ip),
        }
    }
}
