//! Priority-ordered failover across providers, with quote validation.

mod provider_registry;
mod validator;

pub use provider_registry::ProviderRegistry;
pub use validator::QuoteValidator;
