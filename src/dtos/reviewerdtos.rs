use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertReviewerDto {
    #[validate(length(min = 1, max = 200, message = "name must be between 1-200 characters"))]
    pub name: String,

    #[validate(email(message = "email is invalid"))]
    pub email: String,

    #[validate(url(message = "avatarUrl must be a valid URL"))]
    pub avatar_url: Option<String>,
}
