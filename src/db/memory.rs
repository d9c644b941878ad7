// db/memory.rs
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    payoutdb::PayoutExt,
    referraldb::ReferralExt,
    reviewdb::{ReviewCompletion, ReviewExt},
    reviewerdb::ReviewerExt,
    settingsdb::SettingsExt,
    submissiondb::SubmissionExt,
    StoreError,
};
use crate::models::{
    payoutmodel::{Payout, PayoutStatus},
    referralmodel::{EarningStatus, ReferralCode, ReferralCodeStatus, ReferralEarning, ReferralStats},
    reviewermodel::ReviewerProfile,
    reviewmodel::{NewReview, Review},
    settingsmodel::AppSettings,
    submissionmodel::{NewSubmission, PaymentStatus, Submission, SubmissionStatus},
};

#[derive(Default)]
struct MemoryState {
    submissions: HashMap<Uuid, Submission>,
    reviews: HashMap<Uuid, Review>,
    payouts: HashMap<Uuid, Payout>,
    referral_codes: HashMap<Uuid, ReferralCode>,
    referral_earnings: HashMap<Uuid, ReferralEarning>,
    referral_stats: HashMap<String, ReferralStats>,
    reviewers: HashMap<String, ReviewerProfile>,
    settings: Option<AppSettings>,
}

/// A thread-safe in-memory store with the same uniqueness and atomicity
/// guarantees as the Postgres store. Every multi-step operation runs under a
/// single write guard.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

#[async_trait]
impl SubmissionExt for InMemoryStore {
    async fn insert_submission_if_absent(
        &self,
        submission: NewSubmission,
    ) -> Result<Option<Submission>, StoreError> {
        let mut state = self.state.write().await;

        let duplicate = state
            .submissions
            .values()
            .any(|s| s.payment_intent_id == submission.payment_intent_id);
        if duplicate {
            return Ok(None);
        }

        let created = submission.into_submission(Uuid::new_v4(), Utc::now());
        state.submissions.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn get_submission(&self, submission_id: Uuid) -> Result<Option<Submission>, StoreError> {
        let state = self.state.read().await;
        Ok(state.submissions.get(&submission_id).cloned())
    }

    async fn get_submission_by_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<Option<Submission>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .submissions
            .values()
            .find(|s| s.payment_intent_id == payment_intent_id)
            .cloned())
    }

    async fn find_submissions_by_tracking(
        &self,
        tracking_token: &str,
        contact_email: &str,
    ) -> Result<Vec<Submission>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Submission> = state
            .submissions
            .values()
            .filter(|s| {
                s.tracking_token == tracking_token
                    && s.contact_email.eq_ignore_ascii_case(contact_email)
            })
            .cloned()
            .collect();
        newest_first(&mut found, |s| s.submitted_at);
        Ok(found)
    }

    async fn list_submissions(
        &self,
        reviewer_id: Option<&str>,
        status: Option<SubmissionStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Submission>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Submission> = state
            .submissions
            .values()
            .filter(|s| reviewer_id.map_or(true, |r| s.reviewer_id == r))
            .filter(|s| status.map_or(true, |st| s.status == st))
            .cloned()
            .collect();
        newest_first(&mut found, |s| s.submitted_at);

        Ok(found
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn update_submission_status(
        &self,
        submission_id: Uuid,
        from: SubmissionStatus,
        to: SubmissionStatus,
    ) -> Result<Option<Submission>, StoreError> {
        let mut state = self.state.write().await;
        match state.submissions.get_mut(&submission_id) {
            Some(submission) if submission.status == from => {
                submission.status = to;
                Ok(Some(submission.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn set_payment_status(
        &self,
        payment_intent_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<Option<Submission>, StoreError> {
        let mut state = self.state.write().await;
        let submission = state
            .submissions
            .values_mut()
            .find(|s| s.payment_intent_id == payment_intent_id);

        Ok(submission.map(|s| {
            s.payment_status = payment_status;
            s.clone()
        }))
    }
}

#[async_trait]
impl ReviewExt for InMemoryStore {
    async fn complete_review(
        &self,
        review: NewReview,
        access_token: String,
        completed_at: DateTime<Utc>,
    ) -> Result<ReviewCompletion, StoreError> {
        let mut state = self.state.write().await;

        let status = match state.submissions.get(&review.submission_id) {
            Some(submission) => submission.status,
            None => return Ok(ReviewCompletion::SubmissionMissing),
        };

        let already_reviewed = state
            .reviews
            .values()
            .any(|r| r.submission_id == review.submission_id && r.reviewer_id == review.reviewer_id);
        if already_reviewed {
            return Ok(ReviewCompletion::AlreadyReviewed);
        }

        if status != SubmissionStatus::PendingReview {
            return Ok(ReviewCompletion::WrongStatus(status));
        }

        let review = review.with_access_token(access_token);
        state.reviews.insert(review.id, review.clone());

        let submission = match state.submissions.get_mut(&review.submission_id) {
            Some(submission) => {
                submission.status = SubmissionStatus::Completed;
                submission.reviewed_at = Some(completed_at);
                submission.review_id = Some(review.id);
                submission.clone()
            }
            None => return Ok(ReviewCompletion::SubmissionMissing),
        };

        Ok(ReviewCompletion::Completed { review, submission })
    }

    async fn get_review(&self, review_id: Uuid) -> Result<Option<Review>, StoreError> {
        let state = self.state.read().await;
        Ok(state.reviews.get(&review_id).cloned())
    }

    async fn find_review(
        &self,
        submission_id: Uuid,
        reviewer_id: &str,
    ) -> Result<Option<Review>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .reviews
            .values()
            .find(|r| r.submission_id == submission_id && r.reviewer_id == reviewer_id)
            .cloned())
    }

    async fn list_reviews_by_reviewer(&self, reviewer_id: &str) -> Result<Vec<Review>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Review> = state
            .reviews
            .values()
            .filter(|r| r.reviewer_id == reviewer_id)
            .cloned()
            .collect();
        newest_first(&mut found, |r| r.created_at);
        Ok(found)
    }
}

#[async_trait]
impl PayoutExt for InMemoryStore {
    async fn insert_payout(&self, payout: Payout) -> Result<Payout, StoreError> {
        let mut state = self.state.write().await;
        if state.payouts.contains_key(&payout.id) {
            return Err(StoreError::Conflict(format!("payout {} exists", payout.id)));
        }
        state.payouts.insert(payout.id, payout.clone());
        Ok(payout)
    }

    async fn get_payout(&self, payout_id: Uuid) -> Result<Option<Payout>, StoreError> {
        let state = self.state.read().await;
        Ok(state.payouts.get(&payout_id).cloned())
    }

    async fn mark_payout_paid(
        &self,
        payout_id: Uuid,
        paid_at: DateTime<Utc>,
    ) -> Result<Option<Payout>, StoreError> {
        let mut state = self.state.write().await;
        match state.payouts.get_mut(&payout_id) {
            Some(payout) if payout.status == PayoutStatus::Pending => {
                payout.status = PayoutStatus::Paid;
                payout.paid_date = Some(paid_at);
                Ok(Some(payout.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn list_payouts(
        &self,
        reviewer_id: Option<&str>,
        status: Option<PayoutStatus>,
    ) -> Result<Vec<Payout>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<Payout> = state
            .payouts
            .values()
            .filter(|p| reviewer_id.map_or(true, |r| p.reviewer_id == r))
            .filter(|p| status.map_or(true, |st| p.status == st))
            .cloned()
            .collect();
        newest_first(&mut found, |p| p.date);
        Ok(found)
    }

    async fn paid_out_review_ids(&self, reviewer_id: &str) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .payouts
            .values()
            .filter(|p| p.reviewer_id == reviewer_id)
            .flat_map(|p| p.reviews.0.iter().map(|item| item.id.clone()))
            .collect())
    }
}

#[async_trait]
impl ReferralExt for InMemoryStore {
    async fn insert_referral_code(&self, code: ReferralCode) -> Result<ReferralCode, StoreError> {
        let mut state = self.state.write().await;
        if state.referral_codes.values().any(|c| c.code == code.code) {
            return Err(StoreError::Conflict(format!("referral code {} exists", code.code)));
        }
        state.referral_codes.insert(code.id, code.clone());
        Ok(code)
    }

    async fn count_referral_codes_since(
        &self,
        referrer_id: &str,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .referral_codes
            .values()
            .filter(|c| c.referrer_id == referrer_id && c.created_at >= since)
            .count() as i64)
    }

    async fn get_referral_code(&self, code: &str) -> Result<Option<ReferralCode>, StoreError> {
        let state = self.state.read().await;
        Ok(state.referral_codes.values().find(|c| c.code == code).cloned())
    }

    async fn list_referral_codes(&self, referrer_id: &str) -> Result<Vec<ReferralCode>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<ReferralCode> = state
            .referral_codes
            .values()
            .filter(|c| c.referrer_id == referrer_id)
            .cloned()
            .collect();
        newest_first(&mut found, |c| c.created_at);
        Ok(found)
    }

    async fn expire_referral_code(&self, code_id: Uuid) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if let Some(code) = state.referral_codes.get_mut(&code_id) {
            if code.status == ReferralCodeStatus::Active {
                code.status = ReferralCodeStatus::Expired;
            }
        }
        Ok(())
    }

    async fn redeem_referral_code(
        &self,
        code_id: Uuid,
        used_by: &str,
        used_by_email: &str,
        used_at: DateTime<Utc>,
        created_after: DateTime<Utc>,
    ) -> Result<Option<ReferralCode>, StoreError> {
        let mut state = self.state.write().await;

        let already_redeemed = state
            .referral_codes
            .values()
            .any(|c| c.used_by.as_deref() == Some(used_by));
        if already_redeemed {
            return Err(StoreError::Conflict(format!("{} already redeemed a code", used_by)));
        }

        match state.referral_codes.get_mut(&code_id) {
            Some(code)
                if code.status == ReferralCodeStatus::Active && code.created_at > created_after =>
            {
                code.status = ReferralCodeStatus::Used;
                code.used_by = Some(used_by.to_string());
                code.used_by_email = Some(used_by_email.to_string());
                code.used_at = Some(used_at);
                Ok(Some(code.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn get_redeemed_code_for(&self, user_id: &str) -> Result<Option<ReferralCode>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .referral_codes
            .values()
            .find(|c| c.status == ReferralCodeStatus::Used && c.used_by.as_deref() == Some(user_id))
            .cloned())
    }

    async fn get_earning_by_review(&self, review_id: Uuid) -> Result<Option<ReferralEarning>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .referral_earnings
            .values()
            .find(|e| e.review_id == review_id)
            .cloned())
    }

    async fn record_referral_earning(
        &self,
        earning: ReferralEarning,
    ) -> Result<Option<ReferralEarning>, StoreError> {
        let mut state = self.state.write().await;

        if state.referral_earnings.values().any(|e| e.review_id == earning.review_id) {
            return Ok(None);
        }

        let stats = state
            .referral_stats
            .entry(earning.referrer_id.clone())
            .or_insert_with(|| ReferralStats {
                referrer_id: earning.referrer_id.clone(),
                total_earned: 0,
                total_reviews: 0,
                updated_at: earning.created_at,
            });
        stats.total_earned += earning.commission_amount;
        stats.total_reviews += 1;
        stats.updated_at = earning.created_at;

        state.referral_earnings.insert(earning.id, earning.clone());
        Ok(Some(earning))
    }

    async fn list_referral_earnings(&self, referrer_id: &str) -> Result<Vec<ReferralEarning>, StoreError> {
        let state = self.state.read().await;
        let mut found: Vec<ReferralEarning> = state
            .referral_earnings
            .values()
            .filter(|e| e.referrer_id == referrer_id)
            .cloned()
            .collect();
        newest_first(&mut found, |e| e.created_at);
        Ok(found)
    }

    async fn get_referral_stats(&self, referrer_id: &str) -> Result<Option<ReferralStats>, StoreError> {
        let state = self.state.read().await;
        Ok(state.referral_stats.get(referrer_id).cloned())
    }

    async fn mark_earning_paid(&self, earning_id: Uuid) -> Result<Option<ReferralEarning>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.referral_earnings.get_mut(&earning_id).map(|earning| {
            earning.status = EarningStatus::Paid;
            earning.clone()
        }))
    }
}

#[async_trait]
impl ReviewerExt for InMemoryStore {
    async fn upsert_reviewer(&self, profile: ReviewerProfile) -> Result<ReviewerProfile, StoreError> {
        let mut state = self.state.write().await;
        let stored = match state.reviewers.get(&profile.id) {
            Some(existing) => ReviewerProfile {
                created_at: existing.created_at,
                ..profile
            },
            None => profile,
        };
        state.reviewers.insert(stored.id.clone(), stored.clone());
        Ok(stored)
    }

    async fn get_reviewer(&self, reviewer_id: &str) -> Result<Option<ReviewerProfile>, StoreError> {
        let state = self.state.read().await;
        Ok(state.reviewers.get(reviewer_id).cloned())
    }
}

#[async_trait]
impl SettingsExt for InMemoryStore {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StoreError> {
        let state = self.state.read().await;
        Ok(state.settings.clone())
    }

    async fn save_settings(&self, settings: AppSettings) -> Result<AppSettings, StoreError> {
        let mut state = self.state.write().await;
        state.settings = Some(settings.clone());
        Ok(settings)
    }
}
