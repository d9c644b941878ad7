// service/payout_service.rs
use std::collections::HashSet;

use chrono::Utc;
use sqlx::types::Json;
use uuid::Uuid;

use crate::{
    db::{payoutdb::PayoutExt, reviewdb::ReviewExt, submissiondb::SubmissionExt, StoreHandle},
    dtos::payoutdtos::{CreatePayoutDto, PayoutQueryDto, PayoutSummaryDto},
    models::{
        payoutmodel::{Payout, PayoutReviewItem, PayoutStatus},
        usermodel::Caller,
    },
    service::error::ServiceError,
    utils::money::format_cents,
};

pub struct PayoutService {
    store: StoreHandle,
}

fn require_admin(caller: Option<&Caller>) -> Result<&Caller, ServiceError> {
    let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
    if !caller.is_admin() {
        return Err(ServiceError::PermissionDenied(
            "Only admins can manage payouts".to_string(),
        ));
    }
    Ok(caller)
}

fn parse_payout_status(raw: &str) -> Result<PayoutStatus, ServiceError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(PayoutStatus::Pending),
        "paid" => Ok(PayoutStatus::Paid),
        other => Err(ServiceError::InvalidArgument(format!("unknown payout status: {}", other))),
    }
}

impl PayoutService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// The review list is stored as supplied; selecting non-overlapping reviews is the caller's job.
    pub async fn create(&self, caller: Option<&Caller>, request: CreatePayoutDto) -> Result<Payout, ServiceError> {
        let caller = require_admin(caller)?;

        let reviewer_id = request
            .reviewer_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ServiceError::InvalidArgument("reviewerId is required".to_string()))?;
        let reviewer = request
            .reviewer
            .ok_or_else(|| ServiceError::InvalidArgument("reviewer is required".to_string()))?;
        let amount_in_cents = request
            .amount_in_cents
            .ok_or_else(|| ServiceError::InvalidArgument("amountInCents is required".to_string()))?;
        let payment_method = request
            .payment_method
            .map(|method| method.trim().to_string())
            .filter(|method| !method.is_empty())
            .ok_or_else(|| ServiceError::InvalidArgument("paymentMethod is required".to_string()))?;

        if amount_in_cents < 0 {
            return Err(ServiceError::InvalidArgument("amountInCents cannot be negative".to_string()));
        }

        let payout = Payout {
            id: Uuid::new_v4(),
            reviewer_id,
            reviewer: Json(reviewer),
            amount: format_cents(amount_in_cents),
            amount_in_cents,
            payment_method,
            reviews: Json(request.reviews),
            status: PayoutStatus::Pending,
            date: Utc::now(),
            paid_date: None,
        };

        let payout = self.store.insert_payout(payout).await?;

        tracing::info!(
            "Payout {} created for reviewer {} ({}) by {}",
            payout.id,
            payout.reviewer_id,
            payout.amount,
            caller.uid
        );

        Ok(payout)
    }

    /// Pending -> Paid. Re-marking a paid payout is a no-op that keeps the original paid date.
    pub async fn update_status(
        &self,
        caller: Option<&Caller>,
        payout_id: Uuid,
        status: &str,
    ) -> Result<Payout, ServiceError> {
        let caller = require_admin(caller)?;

        if parse_payout_status(status)? != PayoutStatus::Paid {
            return Err(ServiceError::InvalidArgument(
                "Payouts can only be moved to Paid".to_string(),
            ));
        }

        let payout = self
            .store
            .get_payout(payout_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Payout {} not found", payout_id)))?;

        if payout.status == PayoutStatus::Paid {
            return Ok(payout);
        }

        match self.store.mark_payout_paid(payout_id, Utc::now()).await? {
            Some(paid) => {
                tracing::info!("Payout {} marked paid by {}", paid.id, caller.uid);
                Ok(paid)
            }
            // Paid concurrently; report the stored state.
            None => self
                .store
                .get_payout(payout_id)
                .await?
                .ok_or_else(|| ServiceError::NotFound(format!("Payout {} not found", payout_id))),
        }
    }

    pub async fn list(&self, caller: Option<&Caller>, query: PayoutQueryDto) -> Result<Vec<Payout>, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_reviewer_or_admin() {
            return Err(ServiceError::PermissionDenied("Only reviewers and admins can view payouts".to_string()));
        }

        let status = query.status.as_deref().map(parse_payout_status).transpose()?;
        let reviewer_id = if caller.is_admin() {
            query.reviewer_id
        } else {
            Some(caller.uid.clone())
        };

        Ok(self.store.list_payouts(reviewer_id.as_deref(), status).await?)
    }

    /// Completed reviews not referenced by any payout yet, recomputed on every call.
    pub async fn summary(&self, caller: Option<&Caller>, reviewer_id: &str) -> Result<PayoutSummaryDto, ServiceError> {
        let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
        if !caller.is_admin() && !(caller.is_reviewer_or_admin() && caller.uid == reviewer_id) {
            return Err(ServiceError::PermissionDenied(
                "You can only view your own payout summary".to_string(),
            ));
        }

        let paid_out: HashSet<String> = self
            .store
            .paid_out_review_ids(reviewer_id)
            .await?
            .into_iter()
            .collect();

        let mut unpaid_reviews = Vec::new();
        for review in self.store.list_reviews_by_reviewer(reviewer_id).await? {
            if paid_out.contains(&review.id.to_string()) {
                continue;
            }

            let fee = match self.store.get_submission(review.submission_id).await? {
                Some(submission) => submission.amount,
                None => {
                    tracing::warn!("Review {} points at missing submission {}", review.id, review.submission_id);
                    continue;
                }
            };

            unpaid_reviews.push(PayoutReviewItem {
                id: review.id.to_string(),
                artist: review.submission_details.artist_name.clone(),
                song: review.submission_details.song_title.clone(),
                date: review.created_at,
                fee,
            });
        }

        let total_in_cents = unpaid_reviews.iter().map(|item| item.fee).sum();

        Ok(PayoutSummaryDto {
            reviewer_id: reviewer_id.to_string(),
            unpaid_reviews,
            total_in_cents,
            total: format_cents(total_in_cents),
        })
    }
}
