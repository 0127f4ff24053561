pub mod render;
pub mod publisher;

pub use render::{render, render_at};
pub use publisher::{publish, PublishOutcome};
