/// Classification of market data failures.
///
/// Used by the price fetcher to decide what happens next for a ticker.
///
/// # Behavior Summary
///
/// | Kind | Surfaced to caller? | Fetcher reaction |
/// |------|---------------------|------------------|
/// | `Validation` | Yes, request-level | Reject the batch, no provider call |
/// | `RateLimited` | No | Try fallback, or cool down if already on fallback |
/// | `NoData` | No (null price) | Try fallback, else null |
/// | `ProviderUnavailable` | No (null price) | Try fallback, else null |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The batch request is malformed (missing, non-array or empty ticker list).
    Validation,

    /// An upstream signalled throttling, via HTTP 429 or a "too many requests" message.
    RateLimited,

    /// The provider answered but had no usable price for the symbol.
    NoData,

    /// Network failure, timeout, unexpected status or malformed response.
    ProviderUnavailable,
}
