use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AudioUrlRequestDto {
    pub upload_path: Option<String>,

    #[validate(length(min = 1, max = 255, message = "fileName must be between 1-255 characters"))]
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AudioUrlDto {
    pub path: String,
    pub url: String,
}
