//! Cloudinary upload/destroy client.
//!
//! Uploads go to `{root_folder}/{folder}` as signed multipart requests.
//! Signatures are the SHA-256 hex digest of the alphabetically sorted
//! `key=value` parameters joined by `&`, followed by the API secret.

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use vyom_core::media::{MediaAsset, MediaError, MediaKind, MediaStore, MediaUpload};

/// Default Cloudinary API origin.
const DEFAULT_API_BASE: &str = "https://api.cloudinary.com";

/// Cloudinary account settings.
#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Folder every upload is placed under.
    pub root_folder: String,
    /// API origin, overridable for local fakes.
    pub api_base: String,
}

impl CloudinaryConfig {
    /// Load Cloudinary settings from environment variables.
    ///
    /// | Env Var                 | Required | Default                      |
    /// |-------------------------|----------|------------------------------|
    /// | `CLOUDINARY_NAME`       | **yes**  | --                           |
    /// | `CLOUDINARY_API_KEY`    | **yes**  | --                           |
    /// | `CLOUDINARY_API_SECRET` | **yes**  | --                           |
    /// | `MEDIA_ROOT_FOLDER`     | no       | `vyom-realm-backend`         |
    /// | `CLOUDINARY_API_BASE`   | no       | `https://api.cloudinary.com` |
    ///
    /// # Panics
    ///
    /// Panics if a required variable is missing.
    pub fn from_env() -> Self {
        let required = |name: &str| {
            std::env::var(name).unwrap_or_else(|_| panic!("{name} must be set in the environment"))
        };

        Self {
            cloud_name: required("CLOUDINARY_NAME"),
            api_key: required("CLOUDINARY_API_KEY"),
            api_secret: required("CLOUDINARY_API_SECRET"),
            root_folder: std::env::var("MEDIA_ROOT_FOLDER")
                .unwrap_or_else(|_| "vyom-realm-backend".into()),
            api_base: std::env::var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.into()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    duration: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// [`MediaStore`] backed by the Cloudinary REST API.
pub struct CloudinaryMediaStore {
    client: reqwest::Client,
    config: CloudinaryConfig,
}

impl CloudinaryMediaStore {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn endpoint(&self, kind: MediaKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.config.api_base,
            self.config.cloud_name,
            kind.resource_type(),
            action
        )
    }

    /// Turn a non-2xx response into a [`MediaError`]: client errors are
    /// rejections, everything else is an outage.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        let message = format!("{status}: {body}");
        if status.is_client_error() {
            Err(MediaError::Rejected(message))
        } else {
            Err(MediaError::Unavailable(message))
        }
    }
}

fn unavailable(err: reqwest::Error) -> MediaError {
    MediaError::Unavailable(err.to_string())
}

/// Sign request parameters.
pub fn sign(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaStore for CloudinaryMediaStore {
    async fn upload(&self, upload: MediaUpload) -> Result<MediaAsset, MediaError> {
        let folder = format!("{}/{}", self.config.root_folder, upload.folder);
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("folder", folder.as_str()), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let size = upload.bytes.len();
        let file = reqwest::multipart::Part::bytes(upload.bytes).file_name(upload.file_name);
        let form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("api_key", self.config.api_key.clone())
            .text("folder", folder.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .client
            .post(self.endpoint(upload.kind, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(unavailable)?;
        let body: UploadResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        tracing::info!(
            public_id = %body.public_id,
            folder = %folder,
            bytes = size,
            "Uploaded media asset",
        );

        Ok(MediaAsset {
            url: body.secure_url,
            public_id: body.public_id,
            duration: body.duration,
            kind: upload.kind,
        })
    }

    async fn delete(&self, public_id: &str, kind: MediaKind) -> Result<(), MediaError> {
        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", timestamp.as_str())],
            &self.config.api_secret,
        );

        let response = self
            .client
            .post(self.endpoint(kind, "destroy"))
            .form(&[
                ("public_id", public_id),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(unavailable)?;
        let body: DestroyResponse = Self::ensure_success(response)
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        match body.result.as_str() {
            // An asset that is already gone counts as deleted.
            "ok" | "not found" => {
                tracing::info!(public_id, result = %body.result, "Deleted media asset");
                Ok(())
            }
            other => Err(MediaError::Rejected(format!(
                "destroy of {public_id} returned '{other}'"
            ))),
        }
    }
}
