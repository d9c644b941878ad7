// service/referral_service.rs
use std::sync::OnceLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;
use uuid::Uuid;
use validator::Validate;

use crate::{
    db::{
        referraldb::ReferralExt, reviewdb::ReviewExt, reviewerdb::ReviewerExt, StoreError,
        StoreHandle,
    },
    dtos::referraldtos::{
        AccrualOutcome, CreateReferralCodeDto, EarningsOverviewDto, RedeemReferralCodeDto,
        ReferralCodeDto, UpdateEarningsDto,
    },
    models::{
        referralmodel::{
            commission_for, redeemable_since, EarningStatus, EarningType, ReferralCode,
            ReferralCodeStatus, ReferralEarning, DAILY_CODE_LIMIT,
        },
        usermodel::Caller,
    },
    service::error::ServiceError,
    utils::secure_token::generate_referral_code,
};

const CODE_INSERT_ATTEMPTS: usize = 3;

fn is_well_formed_code(code: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^INVITE-[A-Z0-9]{8}$").ok())
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(code))
}

fn start_of_utc_day(now: DateTime<Utc>) -> Result<DateTime<Utc>, ServiceError> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| Utc.from_utc_datetime(&midnight))
        .ok_or_else(|| ServiceError::Internal("could not compute start of day".to_string()))
}

fn require_staff(caller: Option<&Caller>) -> Result<&Caller, ServiceError> {
    let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
    if !caller.is_reviewer_or_admin() {
        return Err(ServiceError::PermissionDenied(
            "Only reviewers and admins can use referrals".to_string(),
        ));
    }
    Ok(caller)
}

fn require_admin(caller: Option<&Caller>) -> Result<&Caller, ServiceError> {
    let caller = caller.ok_or_else(ServiceError::unauthenticated)?;
    if !caller.is_admin() {
        return Err(ServiceError::PermissionDenied(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(caller)
}

/// Reviewers act for themselves; admins may name another referrer.
fn resolve_referrer(caller: &Caller, requested: Option<&str>) -> Result<String, ServiceError> {
    match requested.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) if caller.is_admin() => Ok(id.to_string()),
        Some(id) if id != caller.uid => Err(ServiceError::PermissionDenied(
            "You can only act on your own referrals".to_string(),
        )),
        _ => Ok(caller.uid.clone()),
    }
}

pub struct ReferralService {
    store: StoreHandle,
}

impl ReferralService {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }

    /// Count-then-insert: concurrent calls from one referrer can transiently
    /// exceed the daily limit by the number of racing requests.
    pub async fn create_code(
        &self,
        caller: Option<&Caller>,
        request: CreateReferralCodeDto,
    ) -> Result<ReferralCodeDto, ServiceError> {
        let caller = require_staff(caller)?;
        request.validate()?;
        let referrer_id = resolve_referrer(caller, request.referrer_id.as_deref())?;

        let now = Utc::now();
        let issued_today = self
            .store
            .count_referral_codes_since(&referrer_id, start_of_utc_day(now)?)
            .await?;

        if issued_today >= DAILY_CODE_LIMIT {
            return Err(ServiceError::FailedPrecondition(format!(
                "Daily limit reached: at most {} referral codes per day",
                DAILY_CODE_LIMIT
            )));
        }

        for _ in 0..CODE_INSERT_ATTEMPTS {
            let code = ReferralCode {
                id: Uuid::new_v4(),
                code: generate_referral_code(),
                referrer_id: referrer_id.clone(),
                associated_user: request.associated_user.trim().to_string(),
                status: ReferralCodeStatus::Active,
                created_at: now,
                used_by: None,
                used_by_email: None,
                used_at: None,
            };

            match self.store.insert_referral_code(code).await {
                Ok(code) => {
                    tracing::info!("Referral code {} issued for {}", code.code, code.referrer_id);
                    return Ok(ReferralCodeDto::at(&code, now));
                }
                Err(StoreError::Conflict(_)) => {
                    tracing::debug!("Referral code collision, regenerating");
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::Internal("Could not allocate a unique referral code".to_string()))
    }

    /// Flips a stale Active code to Expired in storage and reports the effective status.
    async fn observe(&self, code: ReferralCode, now: DateTime<Utc>) -> Result<ReferralCodeDto, ServiceError> {
        if code.status == ReferralCodeStatus::Active
            && code.effective_status(now) == ReferralCodeStatus::Expired
        {
            self.store.expire_referral_code(code.id).await?;
            tracing::info!("Referral code {} expired on read", code.code);
        }
        Ok(ReferralCodeDto::at(&code, now))
    }

    pub async fn get_code(&self, caller: Option<&Caller>, code: &str) -> Result<ReferralCodeDto, ServiceError> {
        let caller = require_staff(caller)?;

        let code = self
            .store
            .get_referral_code(code.trim())
            .await?
            .ok_or_else(|| ServiceError::NotFound("Referral code not found".to_string()))?;

        if !caller.is_admin() && code.referrer_id != caller.uid {
            return Err(ServiceError::PermissionDenied(
                "You can only view your own referral codes".to_string(),
            ));
        }

        self.observe(code, Utc::now()).await
    }

    pub async fn list_codes(
        &self,
        caller: Option<&Caller>,
        referrer_id: Option<&str>,
    ) -> Result<Vec<ReferralCodeDto>, ServiceError> {
        let caller = require_staff(caller)?;
        let referrer_id = resolve_referrer(caller, referrer_id)?;

        let now = Utc::now();
        let mut codes = Vec::new();
        for code in self.store.list_referral_codes(&referrer_id).await? {
            codes.push(self.observe(code, now).await?);
        }

        Ok(codes)
    }

    /// Redemption hook for the application-approval flow.
    pub async fn redeem(
        &self,
        caller: Option<&Caller>,
        request: RedeemReferralCodeDto,
    ) -> Result<ReferralCodeDto, ServiceError> {
        let caller = require_admin(caller)?;
        request.validate()?;

        let normalized = request.code.trim().to_ascii_uppercase();
        if !is_well_formed_code(&normalized) {
            return Err(ServiceError::InvalidArgument(
                "Referral codes look like INVITE-XXXXXXXX".to_string(),
            ));
        }

        let code = self
            .store
            .get_referral_code(&normalized)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Referral code not found".to_string()))?;

        if code.referrer_id == request.user_id {
            return Err(ServiceError::FailedPrecondition(
                "A reviewer cannot redeem their own referral code".to_string(),
            ));
        }

        let now = Utc::now();
        match code.effective_status(now) {
            ReferralCodeStatus::Active => {}
            ReferralCodeStatus::Used => {
                return Err(ServiceError::FailedPrecondition(
                    "Referral code has already been used".to_string(),
                ));
            }
            ReferralCodeStatus::Expired => {
                self.observe(code, now).await?;
                return Err(ServiceError::FailedPrecondition(
                    "Referral code has expired".to_string(),
                ));
            }
        }

        if self.store.get_redeemed_code_for(&request.user_id).await?.is_some() {
            return Err(ServiceError::AlreadyExists(
                "This user has already redeemed a referral code".to_string(),
            ));
        }

        let redeemed = self
            .store
            .redeem_referral_code(
                code.id,
                &request.user_id,
                request.user_email.trim(),
                now,
                redeemable_since(now),
            )
            .await;

        match redeemed {
            Ok(Some(code)) => {
                tracing::info!(
                    "Referral code {} redeemed by {} (approved by {})",
                    code.code,
                    request.user_id,
                    caller.uid
                );
                Ok(ReferralCodeDto::at(&code, now))
            }
            Ok(None) => Err(ServiceError::FailedPrecondition(
                "Referral code is no longer redeemable".to_string(),
            )),
            Err(StoreError::Conflict(_)) => Err(ServiceError::AlreadyExists(
                "This user has already redeemed a referral code".to_string(),
            )),
            Err(e) => Err(e.into()),
        }
    }

    /// Credits the referrer of `reviewer_id` with a commission on one review.
    /// The referrer is whoever issued the code the reviewer redeemed.
    pub async fn update_reviewer_earnings(
        &self,
        caller: Option<&Caller>,
        request: UpdateEarningsDto,
    ) -> Result<AccrualOutcome, ServiceError> {
        let caller = require_admin(caller)?;
        request.validate()?;

        let reviewer = self
            .store
            .get_reviewer(&request.reviewer_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Reviewer {} not found", request.reviewer_id)))?;

        let review = self
            .store
            .get_review(request.review_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Review {} not found", request.review_id)))?;

        if review.reviewer_id != reviewer.id {
            return Err(ServiceError::InvalidArgument(format!(
                "Review {} does not belong to reviewer {}",
                review.id, reviewer.id
            )));
        }

        if self.store.get_earning_by_review(review.id).await?.is_some() {
            return Err(ServiceError::AlreadyExists(format!(
                "Commission for review {} has already been recorded",
                review.id
            )));
        }

        let referral = match self.store.get_redeemed_code_for(&reviewer.id).await? {
            Some(code) => code,
            None => {
                tracing::debug!("Reviewer {} joined without a referral; no commission", reviewer.id);
                return Ok(AccrualOutcome::NoReferrer);
            }
        };

        let commission_amount = commission_for(request.amount).ok_or_else(|| {
            ServiceError::InvalidArgument(format!("amount {} is out of range", request.amount))
        })?;

        let earning = ReferralEarning {
            id: Uuid::new_v4(),
            referrer_id: referral.referrer_id.clone(),
            referred_user_id: reviewer.id.clone(),
            referred_user_name: reviewer.name.clone(),
            referred_user_email: reviewer.email.clone(),
            original_amount: request.amount,
            commission_amount,
            review_id: review.id,
            earning_type: request.earning_type.unwrap_or(EarningType::ReviewFee),
            status: EarningStatus::Pending,
            created_at: Utc::now(),
        };

        match self.store.record_referral_earning(earning).await? {
            Some(earning) => {
                tracing::info!(
                    "Commission {} credited to {} for review {} (recorded by {})",
                    earning.commission_amount,
                    earning.referrer_id,
                    earning.review_id,
                    caller.uid
                );
                Ok(AccrualOutcome::Accrued { earning })
            }
            None => Err(ServiceError::AlreadyExists(format!(
                "Commission for review {} has already been recorded",
                review.id
            ))),
        }
    }

    pub async fn earnings_overview(
        &self,
        caller: Option<&Caller>,
        referrer_id: Option<&str>,
    ) -> Result<EarningsOverviewDto, ServiceError> {
        let caller = require_staff(caller)?;
        let referrer_id = resolve_referrer(caller, referrer_id)?;

        let stats = self.store.get_referral_stats(&referrer_id).await?;
        let earnings = self.store.list_referral_earnings(&referrer_id).await?;

        Ok(EarningsOverviewDto::new(&referrer_id, stats, earnings))
    }

    pub async fn mark_earning_paid(
        &self,
        caller: Option<&Caller>,
        earning_id: Uuid,
    ) -> Result<ReferralEarning, ServiceError> {
        let caller = require_admin(caller)?;

        let earning = self
            .store
            .mark_earning_paid(earning_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Earning {} not found", earning_id)))?;

        tracing::info!("Earning {} marked paid by {}", earning.id, caller.uid);
        Ok(earning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::UserRole;

    #[test]
    fn test_start_of_utc_day() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 23, 59, 59).unwrap();
        assert_eq!(
            start_of_utc_day(now).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 14, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_code_pattern() {
        assert!(is_well_formed_code("INVITE-AB12CD34"));
        assert!(!is_well_formed_code("INVITE-ab12cd34"));
        assert!(!is_well_formed_code("INVITE-AB12CD3"));
        assert!(!is_well_formed_code("REFER-AB12CD34"));
    }

    #[test]
    fn test_resolve_referrer() {
        let reviewer = Caller::new("rev_1", UserRole::Reviewer);
        let admin = Caller::new("admin_1", UserRole::Admin);

        assert_eq!(resolve_referrer(&reviewer, None).unwrap(), "rev_1");
        assert_eq!(resolve_referrer(&reviewer, Some("rev_1")).unwrap(), "rev_1");
        assert!(resolve_referrer(&reviewer, Some("rev_2")).is_err());
        assert_eq!(resolve_referrer(&admin, Some("rev_2")).unwrap(), "rev_2");
        assert_eq!(resolve_referrer(&admin, None).unwrap(), "admin_1");
    }
}
