mod otp;
mod service;

pub use otp::{OtpManager, check_code, generate_code};
pub use service::AccountService;
