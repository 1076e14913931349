mod reference;
mod scrape;

pub use reference::{PlatformId, ReferenceKind, ResolvedReference, Resolver, is_url};
pub use scrape::{extract_deep_link, trailing_segment};
