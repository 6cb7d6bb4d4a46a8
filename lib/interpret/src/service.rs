use crate::error::ServiceError;
use async_trait::async_trait;
use yojana_core::{PartialProfile, UserProfile};

/// An external language-understanding service (typically an LLM behind an API).
///
/// Implementations must be thread-safe (Send + Sync). The interpreter bounds
/// every call with a timeout and treats any error as a reason to fall back to
/// rule extraction, so implementations should not retry internally.
///
/// # Example
/// ```ignore
/// struct HostedModel { /* ... */ }
///
/// #[async_trait]
/// impl LanguageUnderstandingService for HostedModel {
///     async fn extract(&self, text: &str, prior: &UserProfile) -> Result<PartialProfile, ServiceError> {
///         // Call the model and map its JSON onto a PartialProfile
///     }
/// }
/// ```
#[async_trait]
pub trait LanguageUnderstandingService: Send + Sync {
    /// Extract profile fields from one turn, given the profile so far.
    ///
    /// # Returns
    /// * `Ok(PartialProfile)` - Fields recognized in this turn, `None` where absent
    /// * `Err(ServiceError)` - If the service could not answer
    async fn extract(&self, text: &str, prior: &UserProfile) -> Result<PartialProfile, ServiceError>;

    /// Identifier used in logs
    fn name(&self) -> &str {
        "language-service"
    }
}
