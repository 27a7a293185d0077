// # IP Fetcher Trait
//
// Defines the capability the IP monitor uses to query a public-IP discovery
// service.
//
// ## Implementations
//
// - HTTP (reqwest): `zonedash-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use zonedash_core::IpFetcher;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let fetcher = /* IpFetcher implementation */;
//
//     // Raw body, validated by the caller
//     let body = fetcher.fetch("https://api.ipify.org").await?;
//     println!("{}", body.trim());
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for fetching the raw body of an IP discovery endpoint
///
/// Implementations return the response body untouched. Trimming and address
/// validation are the monitor's job, so every fetcher is held to the same
/// rules.
///
/// # Failure
///
/// A transport error or a non-success status must be reported as an error.
/// The monitor logs it and falls back to the next provider.
///
/// # Retries
///
/// Fetchers must not retry or sleep. The monitor makes exactly one attempt per
/// provider and address family, in order.
#[async_trait]
pub trait IpFetcher: Send + Sync {
    /// Fetch the body at `url`
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The raw response body
    /// - `Err(Error)`: Transport failure or non-success status
    async fn fetch(&self, url: &str) -> Result<String, crate::Error>;

    /// Name used in logs
    fn fetcher_name(&self) -> &'static str {
        "ip-fetcher"
    }
}
