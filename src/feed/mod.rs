mod assemble;
mod write;

pub use assemble::{FeedOptions, GENERATOR, assemble, assemble_at, build_channel};
pub use write::{partial_path, write_feed};
