pub mod payoutdtos;
pub mod referraldtos;
pub mod reviewdtos;
pub mod reviewerdtos;
pub mod settingsdtos;
pub mod submissiondtos;
pub mod uploaddtos;

use serde::Serialize;

/// Envelope for successful JSON responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub status: &'static str,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse { status: "success", data }
    }
}
