use tracing::{error, info};

use crate::annotation::{AnnotationBatch, AnnotationRecord};
use crate::config::Config;
use crate::error::AnnotatorError;
use crate::secure_workload_client::{SecureWorkloadClient, UploadAction};
use crate::workspaces_inventory_client::Describe;

const ACTIVE_STATES: [&str; 2] = ["AVAILABLE", "STOPPED"];

pub async fn run(
    config: &Config,
    inventory: &impl Describe,
    platform: &SecureWorkloadClient,
) -> Result<(), AnnotatorError> {
    let desktops = inventory.describe_desktops().await?;

    let mut records = Vec::<AnnotationRecord>::new();
    for desktop in desktops
        .iter()
        .filter(|desktop| ACTIVE_STATES.contains(&desktop.state.as_str()))
    {
        let mut record = AnnotationRecord::new(&desktop.ip_address, config.region.name());
        for attribute in &config.attributes {
            record.insert(attribute, &desktop.attribute(attribute)?);
        }
        if config.add_tags {
            for (key, value) in inventory.describe_resource_tags(&desktop.workspace_id).await? {
                record.insert(&key, &value);
            }
        }
        records.push(record);
    }

    if records.is_empty() {
        info!("no active WorkSpaces to annotate");
        return Ok(());
    }

    let batch = AnnotationBatch::new(records);
    match platform
        .upload_annotations(&batch.to_csv()?, UploadAction::Overwrite)
        .await
    {
        Ok(()) => info!(
            "uploaded {} annotation(s), action: {}",
            batch.len(),
            UploadAction::Overwrite.as_str()
        ),
        // A failed upload is reported, not raised.
        Err(err) => error!("failed to upload annotations: {}", err),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, SecureWorkloadConfig};
    use crate::error::AnnotatorError;
    use crate::labeler;
    use crate::secure_workload_client::SecureWorkloadClient;
    use crate::workspaces_inventory_client::WorkspacesInventoryClient;
    use rusoto_core::Region;
    use rusoto_mock::{
        MockCredentialsProvider, MockRequestDispatcher, MockResponseReader,
        MultipleMockRequestDispatcher, ReadMockResponse,
    };
    use rusoto_workspaces::WorkspacesClient;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: &str, attributes: Vec<String>) -> Config {
        Config {
            attributes,
            add_tags: false,
            delete_sensors: false,
            region: Region::UsEast1,
            secure_workload: SecureWorkloadConfig {
                url: url.to_string(),
                api_key: "key".to_string(),
                api_secret: "secret".to_string(),
                tenant: "Default".to_string(),
            },
        }
    }

    fn inventory(dir: &str) -> WorkspacesInventoryClient {
        WorkspacesInventoryClient::new_with_client(WorkspacesClient::new_with(
            MockRequestDispatcher::default().with_body(&MockResponseReader::read_response(
                dir,
                "describe_workspaces.json",
            )),
            MockCredentialsProvider,
            Default::default(),
        ))
    }

    #[tokio::test]
    async fn test_labels_active_workspaces() {
        let server = MockServer::start().await;
        // The fixture holds one AVAILABLE and one TERMINATED workspace, so
        // exactly one row is uploaded.
        Mock::given(method("POST"))
            .and(path("/openapi/v1/assets/cmdb/upload/Default"))
            .and(body_string_contains("overwrite"))
            .and(body_string_contains("IP,Cloud Service,Cloud,Location"))
            .and(body_string_contains("10.0.0.5,WorkSpaces,AWS,us-east-1"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&server.uri(), vec![]);
        let platform = SecureWorkloadClient::new(&config.secure_workload).unwrap();
        labeler::run(&config, &inventory("test_resources/valid"), &platform)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_tags_are_mirrored_into_the_uploaded_batch() {
        let server = MockServer::start().await;
        // Only the AVAILABLE workspace gets a tag lookup, so the dispatcher
        // serves the inventory page and then its tag list.
        let inventory = WorkspacesInventoryClient::new_with_client(WorkspacesClient::new_with(
            MultipleMockRequestDispatcher::new(vec![
                MockRequestDispatcher::default().with_body(&MockResponseReader::read_response(
                    "test_resources/valid",
                    "describe_workspaces.json",
                )),
                MockRequestDispatcher::default().with_body(&MockResponseReader::read_response(
                    "test_resources/valid",
                    "describe_tags.json",
                )),
            ]),
            MockCredentialsProvider,
            Default::default(),
        ));
        Mock::given(method("POST"))
            .and(path("/openapi/v1/assets/cmdb/upload/Default"))
            .and(body_string_contains(
                "IP,Cloud Service,Cloud,Location,Department,Owner",
            ))
            .and(body_string_contains(
                "10.0.0.5,WorkSpaces,AWS,us-east-1,finance,desktop-team",
            ))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = config(&server.uri(), vec![]);
        config.add_tags = true;
        let platform = SecureWorkloadClient::new(&config.secure_workload).unwrap();
        labeler::run(&config, &inventory, &platform).await.unwrap();
    }

    #[tokio::test]
    async fn test_no_qualifying_workspaces_uploads_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = config(&server.uri(), vec![]);
        let platform = SecureWorkloadClient::new(&config.secure_workload).unwrap();
        labeler::run(
            &config,
            &inventory("test_resources/valid_terminated"),
            &platform,
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_missing_attribute_is_fatal() {
        let server = MockServer::start().await;
        let config = config(&server.uri(), vec!["Department".to_string()]);
        let platform = SecureWorkloadClient::new(&config.secure_workload).unwrap();

        let result =
            labeler::run(&config, &inventory("test_resources/valid"), &platform).await;
        match result {
            Err(AnnotatorError::MissingAttribute(name)) => assert_eq!(name, "Department"),
            other => panic!("expected MissingAttribute, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_upload_failure_is_logged_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let config = config(&server.uri(), vec![]);
        let platform = SecureWorkloadClient::new(&config.secure_workload).unwrap();
        labeler::run(&config, &inventory("test_resources/valid"), &platform)
            .await
            .unwrap();
    }
}
