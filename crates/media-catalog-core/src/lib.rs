pub mod aggregate;
pub mod resolve;

pub use aggregate::{Aggregator, HomeRow, ProviderResults};
pub use resolve::{ResolvedVideo, Resolver};

#[cfg(test)]
mod testutil;
