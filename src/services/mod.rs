pub mod driver_verification;
pub mod google_identity;
pub mod otp;
