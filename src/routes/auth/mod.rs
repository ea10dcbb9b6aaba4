pub mod google_login;
pub mod login;
pub mod logout;
pub mod session;

pub use google_login::{google_callback, google_login};
pub use login::{handle_login, handle_send_otp, handle_verify_otp};
pub use logout::handle_logout;
