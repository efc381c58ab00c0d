use async_trait::async_trait;
use rusoto_core::Region;
use rusoto_workspaces::{Workspace, Workspaces, WorkspacesClient};

use rusoto_workspaces::{DescribeTagsRequest, DescribeWorkspacesRequest};
use std::convert::TryFrom;

use crate::error::AnnotatorError;

pub struct WorkspacesInventoryClient {
    client: WorkspacesClient,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VirtualDesktop {
    pub workspace_id: String,
    pub ip_address: String,
    pub state: String,
    pub user_name: Option<String>,
    pub computer_name: Option<String>,
    pub bundle_id: Option<String>,
    pub directory_id: Option<String>,
    pub subnet_id: Option<String>,
}

impl TryFrom<Workspace> for VirtualDesktop {
    type Error = AnnotatorError;

    fn try_from(workspace: Workspace) -> Result<Self, Self::Error> {
        Ok(VirtualDesktop {
            workspace_id: workspace.workspace_id.ok_or(AnnotatorError::NoneValue)?,
            ip_address: workspace.ip_address.ok_or(AnnotatorError::NoneValue)?,
            state: workspace.state.ok_or(AnnotatorError::NoneValue)?,
            user_name: workspace.user_name,
            computer_name: workspace.computer_name,
            bundle_id: workspace.bundle_id,
            directory_id: workspace.directory_id,
            subnet_id: workspace.subnet_id,
        })
    }
}

impl VirtualDesktop {
    pub fn attribute(&self, name: &str) -> Result<String, AnnotatorError> {
        let value = match name {
            "WorkspaceId" => Some(self.workspace_id.clone()),
            "IpAddress" => Some(self.ip_address.clone()),
            "State" => Some(self.state.clone()),
            "UserName" => self.user_name.clone(),
            "ComputerName" => self.computer_name.clone(),
            "BundleId" => self.bundle_id.clone(),
            "DirectoryId" => self.directory_id.clone(),
            "SubnetId" => self.subnet_id.clone(),
            _ => None,
        };
        value.ok_or_else(|| AnnotatorError::MissingAttribute(name.to_string()))
    }
}

#[async_trait]
pub trait Describe {
    async fn describe_desktops(&self) -> Result<Vec<VirtualDesktop>, AnnotatorError>;
    async fn describe_resource_tags(
        &self,
        resource_id: &str,
    ) -> Result<Vec<(String, String)>, AnnotatorError>;
}

#[async_trait]
impl Describe for WorkspacesInventoryClient {
    async fn describe_desktops(&self) -> Result<Vec<VirtualDesktop>, AnnotatorError> {
        let mut desktops = Vec::<VirtualDesktop>::new();
        let mut next_token: Option<String> = None;
        loop {
            let result = self
                .client
                .describe_workspaces(DescribeWorkspacesRequest {
                    next_token: next_token.clone(),
                    ..DescribeWorkspacesRequest::default()
                })
                .await?;
            for workspace in result.workspaces.ok_or(AnnotatorError::NoneValue)? {
                desktops.push(VirtualDesktop::try_from(workspace)?);
            }
            next_token = result.next_token;
            if next_token.is_none() {
                break;
            }
        }
        Ok(desktops)
    }

    async fn describe_resource_tags(
        &self,
        resource_id: &str,
    ) -> Result<Vec<(String, String)>, AnnotatorError> {
        let result = self
            .client
            .describe_tags(DescribeTagsRequest {
                resource_id: resource_id.to_string(),
            })
            .await?;

        let mut tags = Vec::new();
        for tag in result.tag_list.unwrap_or_default() {
            tags.push((tag.key, tag.value.ok_or(AnnotatorError::NoneValue)?));
        }
        Ok(tags)
    }
}

impl WorkspacesInventoryClient {
    pub fn new(region: Region) -> Self {
        WorkspacesInventoryClient {
            client: WorkspacesClient::new(region),
        }
    }

    pub fn new_with_client(client: WorkspacesClient) -> Self {
        WorkspacesInventoryClient { client }
    }
}
