pub mod errors;
pub mod oauth;
pub mod result;
pub mod rest;
pub mod retry;
pub mod rule;
pub mod validation;

pub use errors::IntegrationError;
pub use oauth::{drop_null_fields, OAuthClient, OAuthConfigPassFlow, OAuthTokenPass, TokenProvider};
pub use result::IntegrationResult;
pub use rest::{DefaultResponseProcessor, HttpResource, OutputMapper, RawResponse, ReqwestResource, ResponseProcessor, RestIntegrationRule};
pub use retry::{retry_with_backoff, BASE_DELAY, MAX_RETRIES};
pub use rule::{IntegrationRule, IntegrationRunner};
pub use validation::{build_validation_error_body, serialize_validation_errors};
