// service/storage_service.rs
use uuid::Uuid;

use crate::{dtos::uploaddtos::AudioUrlDto, service::error::ServiceError};

/// Storage collaborator: yields a durable URL for an uploaded audio file.
pub trait AudioStorage: Send + Sync {
    fn durable_url(&self, upload_path: Option<&str>, file_name: &str) -> Result<AudioUrlDto, ServiceError>;
}

/// Objects served from a public bucket under a fixed base URL.
#[derive(Debug, Clone)]
pub struct PublicBucketStorage {
    base_url: String,
}

impl PublicBucketStorage {
    pub fn new(base_url: impl Into<String>) -> Self {
        PublicBucketStorage {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl AudioStorage for PublicBucketStorage {
    fn durable_url(&self, upload_path: Option<&str>, file_name: &str) -> Result<AudioUrlDto, ServiceError> {
        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains('/') || file_name == "." || file_name == ".." {
            return Err(ServiceError::InvalidArgument("fileName is invalid".to_string()));
        }

        let folder = match upload_path.map(str::trim).filter(|p| !p.is_empty()) {
            Some(path) => {
                let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
                if segments.iter().any(|s| *s == ".." || *s == ".") {
                    return Err(ServiceError::InvalidArgument(
                        "uploadPath must not contain relative segments".to_string(),
                    ));
                }
                segments.join("/")
            }
            None => format!("anonymous/{}", Uuid::new_v4()),
        };

        let path = format!("{}/{}", folder, file_name);
        let encoded = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(AudioUrlDto {
            url: format!("{}/{}", self.base_url, encoded),
            path,
        })
    }
}
