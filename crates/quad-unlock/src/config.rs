/// Configuration the orchestrator needs, passed in at construction. Explicit
/// rather than ambient so tests can inject a fake secret deterministically.
#[derive(Debug, Clone)]
pub struct UnlockConfig {
    /// Shared secret for the gateway's confirmation signature scheme.
    pub signature_secret: String,
    /// Currency code for created orders (single-currency system).
    pub currency: String,
}

impl UnlockConfig {
    pub fn new(signature_secret: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            signature_secret: signature_secret.into(),
            currency: currency.into(),
        }
    }
}
