/// Business logic layer
pub mod classifier;
pub mod media_store;
pub mod moderation;
pub mod posts;

pub use posts::PostService;
