use crate::errors::Result;
use crate::quotes::Quote;
use async_trait::async_trait;

/// Trait defining the contract for the external quote collaborator.
#[async_trait]
pub trait QuoteProviderTrait: Send + Sync {
    async fn get_quote(&self, symbol: &str) -> Result<Quote>;
}
