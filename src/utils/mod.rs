pub mod money;
pub mod secure_token;
pub mod token;
