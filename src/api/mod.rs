//! API endpoint modules.

pub mod auth;
pub mod chat;
pub mod code_analysis;
pub mod health;
pub mod openapi;
pub mod upload;
pub mod users;

pub use auth::configure_routes as configure_auth_routes;
pub use chat::configure_routes as configure_chat_routes;
pub use code_analysis::configure_routes as configure_code_analysis_routes;
pub use health::configure_health_routes;
pub use openapi::ApiDoc;
pub use upload::configure_routes as configure_upload_routes;
pub use users::configure_routes as configure_user_routes;

/// Round to two decimal places, the precision stats endpoints report scores at.
pub(crate) fn round_to_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to_2dp() {
        assert_eq!(round_to_2dp(0.0), 0.0);
        assert_eq!(round_to_2dp(50.0), 50.0);
        assert_eq!(round_to_2dp(72.666_666), 72.67);
        assert_eq!(round_to_2dp(99.994), 99.99);
    }
}
