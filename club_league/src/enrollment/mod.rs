//! Join-code enrollment into rating tiers.

pub mod join_code;
pub mod manager;
pub mod models;

pub use join_code::{JOIN_CODE_ALPHABET, JoinCodeGenerator};
pub use manager::EnrollmentManager;
pub use models::{
    Enrollment, EnrollmentId, EnrollmentOutcome, EnrollmentStatus, EnrollmentWarning, JoinCode,
    PlayerId, PlayerProfile, RedeemRequest,
};
