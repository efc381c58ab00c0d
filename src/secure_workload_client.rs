use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::annotation::CLOUD_SERVICE;
use crate::config::SecureWorkloadConfig;
use crate::error::AnnotatorError;

type HmacSha256 = Hmac<Sha256>;

/// Hard ceiling on the inventory search; there is no pagination, so stale
/// records past this limit are never discovered.
const INVENTORY_SEARCH_LIMIT: u32 = 2000;

const UPLOAD_BOUNDARY: &str = "workspaces-annotator-upload";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S+0000";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadAction {
    Overwrite,
    Delete,
}

impl UploadAction {
    pub fn as_str(self) -> &'static str {
        match self {
            UploadAction::Overwrite => "overwrite",
            UploadAction::Delete => "delete",
        }
    }
}

/// An annotation row previously written for a workspace, as returned by the
/// inventory search. `host_uuid` is absent when no sensor is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedWorkspace {
    pub ip: String,
    #[serde(default)]
    pub host_uuid: Option<String>,
    #[serde(rename = "user_Cloud Service")]
    pub cloud_service: String,
    #[serde(rename = "user_Location", default)]
    pub location: Option<String>,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<TaggedWorkspace>,
}

pub struct SecureWorkloadClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    api_secret: String,
    tenant: String,
}

impl SecureWorkloadClient {
    pub fn new(config: &SecureWorkloadConfig) -> Result<Self, AnnotatorError> {
        // Appliances commonly present self-signed certificates.
        let http = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(SecureWorkloadClient {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
            tenant: config.tenant.clone(),
        })
    }

    pub async fn search_tagged_workspaces(
        &self,
        location: &str,
    ) -> Result<Vec<TaggedWorkspace>, AnnotatorError> {
        let payload = json!({
            "filter": {"type": "and", "filters": [
                {"type": "eq", "field": "user_Location", "value": location},
                {"type": "eq", "field": "user_Cloud Service", "value": CLOUD_SERVICE},
            ]},
            "scopeName": self.tenant,
            "dimensions": ["ip", "host_uuid", "user_Cloud Service", "user_Location"],
            "limit": INVENTORY_SEARCH_LIMIT,
        });
        let body = serde_json::to_vec(&payload)?;

        let response = self
            .send_signed(Method::POST, "/inventory/search", "application/json", body)
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        let parsed: SearchResponse = response.json().await?;
        Ok(parsed.results)
    }

    pub async fn upload_annotations(
        &self,
        csv: &[u8],
        action: UploadAction,
    ) -> Result<(), AnnotatorError> {
        let path = format!("/openapi/v1/assets/cmdb/upload/{}", self.tenant);
        let content_type = format!("multipart/form-data; boundary={}", UPLOAD_BOUNDARY);
        let body = multipart_body(csv, action.as_str());

        let response = self
            .send_signed(Method::POST, &path, &content_type, body)
            .await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    pub async fn delete_sensor(&self, uuid: &str) -> Result<(), AnnotatorError> {
        let path = format!("/openapi/v1/sensors/{}", uuid);
        let response = self.send_signed(Method::DELETE, &path, "", Vec::new()).await?;
        if !response.status().is_success() {
            return Err(unexpected_status(response).await);
        }
        Ok(())
    }

    async fn send_signed(
        &self,
        method: Method,
        path: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<reqwest::Response, AnnotatorError> {
        let checksum = hex::encode(Sha256::digest(&body));
        let timestamp = Utc::now().format(TIMESTAMP_FORMAT).to_string();
        let signature = sign(
            &self.api_secret,
            method.as_str(),
            path,
            &checksum,
            content_type,
            &timestamp,
        )?;

        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Id", &self.api_key)
            .header("Timestamp", &timestamp)
            .header("X-Tetration-Cksum", &checksum)
            .header("Authorization", signature)
            .body(body);
        if !content_type.is_empty() {
            request = request.header(CONTENT_TYPE, content_type);
        }
        Ok(request.send().await?)
    }
}

fn sign(
    secret: &str,
    method: &str,
    path: &str,
    checksum: &str,
    content_type: &str,
    timestamp: &str,
) -> Result<String, AnnotatorError> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| AnnotatorError::Signature)?;
    mac.update(
        format!(
            "{}\n{}\n{}\n{}\n{}",
            method, path, checksum, content_type, timestamp
        )
        .as_bytes(),
    );
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

fn multipart_body(csv: &[u8], action: &str) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"X-Tetration-Oper\"\r\n\r\n{}\r\n",
            UPLOAD_BOUNDARY, action
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"annotations.csv\"\r\nContent-Type: text/csv\r\n\r\n",
            UPLOAD_BOUNDARY
        )
        .as_bytes(),
    );
    body.extend_from_slice(csv);
    body.extend_from_slice(format!("\r\n--{}--\r\n", UPLOAD_BOUNDARY).as_bytes());
    body
}

async fn unexpected_status(response: reqwest::Response) -> AnnotatorError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    AnnotatorError::UnexpectedStatus { status, body }
}
