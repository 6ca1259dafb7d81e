/// HTTP request handlers
pub mod comments;
pub mod posts;

pub use comments::add_comment;
pub use posts::{create_post, get_post, get_stats, list_posts, my_posts};
