//! Helper-agent identities: the on-disk catalog and mention resolution.

pub mod catalog;
pub mod resolver;

pub use catalog::{AgentCatalog, CatalogLoader};
pub use resolver::AgentMentionResolver;
