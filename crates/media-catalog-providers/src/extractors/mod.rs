//! Host-specific link resolvers. Each one encodes a single site's
//! de-obfuscation recipe and nothing else; shared behavior lives in the
//! [`crate::traits::Extractor`] contract and the registry.

pub mod doodware;
pub mod embedrise;
pub mod moonplay;
pub mod rabbitvid;
pub mod streamvault;
pub mod vidlink;
pub mod voescape;

pub use doodware::DoodWare;
pub use embedrise::EmbedRise;
pub use moonplay::MoonPlay;
pub use rabbitvid::RabbitVid;
pub use streamvault::StreamVault;
pub use vidlink::VidLink;
pub use voescape::VoeScape;
