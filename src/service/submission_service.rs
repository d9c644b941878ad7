// service/submission_service.rs
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{reviewdb::ReviewExt, submissiondb::SubmissionExt, StoreHandle},
    dtos::submissiondtos::{
        ReviewLinkDto, StatusLookup, StatusLookupDto, SubmissionQueryDto, SubmissionStatusView,
    },
    models::{
        submissionmodel::{Submission, SubmissionStatus},
        usermodel::Caller,
    },
    service::{error::ServiceError, review_service::review_url},
};

pub struct SubmissionService {
    store: StoreHandle,
    app_url: String,
}

fn require_staff(caller: Option<&Caller>) -> Result<&Caller, ServiceError> {
    let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
    if !caller.is_reviewer_or_admin() {
        return Err(ServiceError::PermissionDenied(
            "Only reviewers and admins can view submissions".to_string(),
        ));
    }
    Ok(caller)
}

/// 1-based `page` of `limit` rows as `(limit, offset)`. `None` for page 0 or when the offset overflows i64.
fn page_window(page: usize, limit: usize) -> Option<(i64, i64)> {
    let limit = i64::try_from(limit).ok()?;
    let skipped = i64::try_from(page.checked_sub(1)?).ok()?;
    Some((limit, skipped.checked_mul(limit)?))
}

impl SubmissionService {
    pub fn new(store: StoreHandle, app_url: String) -> Self {
        Self { store, app_url }
    }

    pub async fn get(&self, caller: Option<&Caller>, submission_id: Uuid) -> Result<Submission, ServiceError> {
        let caller = require_staff(caller)?;

        let submission = self
            .store
            .get_submission(submission_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Submission {} not found", submission_id)))?;

        if !caller.is_admin() && submission.reviewer_id != caller.uid {
            return Err(ServiceError::PermissionDenied(
                "This submission is assigned to another reviewer".to_string(),
            ));
        }

        Ok(submission)
    }

    /// Account-less status check. Both token and email must match.
    pub async fn lookup_status(&self, lookup: StatusLookupDto) -> Result<StatusLookup, ServiceError> {
        lookup.validate()?;

        let submissions = self
            .store
            .find_submissions_by_tracking(lookup.tracking_token.trim(), lookup.uploader_email.trim())
            .await?;

        let mut views = Vec::with_capacity(submissions.len());
        for submission in &submissions {
            let review = self.review_link(submission).await?;
            views.push(SubmissionStatusView::new(submission, review));
        }

        match views.len() {
            0 => Err(ServiceError::NotFound(
                "No submission matches that tracking token and email".to_string(),
            )),
            1 => Ok(StatusLookup::Single {
                submission: views.remove(0),
            }),
            _ => Ok(StatusLookup::Multiple { submissions: views }),
        }
    }

    async fn review_link(&self, submission: &Submission) -> Result<Option<ReviewLinkDto>, ServiceError> {
        let review_id = match submission.review_id {
            Some(review_id) => review_id,
            None => return Ok(None),
        };

        let link = self.store.get_review(review_id).await?.map(|review| ReviewLinkDto {
            review_id: review.id,
            overall_score: review.overall_score,
            review_url: review_url(&self.app_url, review.id, &review.access_token),
        });

        Ok(link)
    }

    /// Reviewers only ever see their own assignments; admins may filter freely.
    pub async fn list(
        &self,
        caller: Option<&Caller>,
        query: SubmissionQueryDto,
    ) -> Result<Vec<Submission>, ServiceError> {
        let caller = require_staff(caller)?;
        query.validate()?;

        let status = query
            .status
            .as_deref()
            .map(str::parse::<SubmissionStatus>)
            .transpose()
            .map_err(ServiceError::InvalidArgument)?;

        let reviewer_id = if caller.is_admin() {
            query.reviewer_id.clone()
        } else {
            Some(caller.uid.clone())
        };

        let (limit, offset) = page_window(query.page.unwrap_or(1), query.limit.unwrap_or(20))
            .ok_or_else(|| ServiceError::InvalidArgument("page is out of range".to_string()))?;

        let submissions = self
            .store
            .list_submissions(reviewer_id.as_deref(), status, limit, offset)
            .await?;

        Ok(submissions)
    }

    /// Administrative move along the forward-only state machine. `Completed`
    /// is reserved for review completion.
    pub async fn update_status(
        &self,
        caller: Option<&Caller>,
        submission_id: Uuid,
        status: &str,
    ) -> Result<Submission, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_admin() {
            return Err(ServiceError::PermissionDenied(
                "Only admins can change submission status".to_string(),
            ));
        }

        let target: SubmissionStatus = status.parse().map_err(ServiceError::InvalidArgument)?;
        if target == SubmissionStatus::Completed {
            return Err(ServiceError::InvalidArgument(
                "Submissions are completed by submitting a review".to_string(),
            ));
        }

        let current = self
            .store
            .get_submission(submission_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Submission {} not found", submission_id)))?;

        if current.status == target {
            return Ok(current);
        }

        if !current.status.can_transition_to(target) {
            return Err(ServiceError::FailedPrecondition(format!(
                "Cannot move submission from {} to {}",
                current.status.to_str(),
                target.to_str()
            )));
        }

        let updated = self
            .store
            .update_submission_status(submission_id, current.status, target)
            .await?
            .ok_or_else(|| {
                ServiceError::FailedPrecondition("Submission status changed concurrently".to_string())
            })?;

        tracing::info!(
            "Submission {} moved from {} to {} by {}",
            submission_id,
            current.status.to_str(),
            target.to_str(),
            caller.uid
        );

        Ok(updated)
    }
}
