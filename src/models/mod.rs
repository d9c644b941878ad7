pub mod payoutmodel;
pub mod referralmodel;
pub mod reviewermodel;
pub mod reviewmodel;
pub mod settingsmodel;
pub mod submissionmodel;
pub mod usermodel;
