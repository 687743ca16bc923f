// Store trait - isolates all database side effects
mod sqlite;

pub use sqlite::SqliteStore;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::models::{
    Application, Comment, Credentials, EditPost, NewApplication, NewComment, NewPost, NewUser,
    Post, PostFilter, ProfileUpdate, User,
};
use crate::error::AppResult;

/// Store trait - all board operations over persistent state
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a user; duplicate usernames are accepted.
    async fn register(&self, user: NewUser) -> AppResult<i64>;

    /// Exact-match credential lookup; `None` when no row matches.
    async fn login(&self, credentials: &Credentials) -> AppResult<Option<User>>;

    /// Look up a user by username.
    async fn profile(&self, username: &str) -> AppResult<Option<User>>;

    /// Overwrite a user's mutable fields; returns the changed-row count.
    async fn update_profile(&self, username: &str, update: ProfileUpdate) -> AppResult<usize>;

    async fn create_post(&self, post: NewPost) -> AppResult<i64>;

    /// The feed query: optional AND-composed filters, newest first,
    /// counters and author picture computed at read time.
    async fn list_posts(&self, filter: &PostFilter) -> AppResult<Vec<Post>>;

    /// Rewrite title/content and refresh the timestamp; returns the
    /// changed-row count (0 when the id does not exist).
    async fn edit_post(&self, id: i64, edit: EditPost) -> AppResult<usize>;

    /// Remove a post together with its comments, applications, and flag
    /// rows; returns the post-row count (0 when already gone).
    async fn delete_post(&self, id: i64) -> AppResult<usize>;

    /// Flip the user's like flag for a post and return the post's like
    /// count. Fails with NotFound when the post does not exist.
    async fn toggle_like(&self, post_id: i64, user_id: i64) -> AppResult<i64>;

    /// Same as [`toggle_like`](Store::toggle_like) for the report flag.
    async fn toggle_report(&self, post_id: i64, user_id: i64) -> AppResult<i64>;

    /// Insert a comment; returns (id, timestamp). Fails with NotFound when
    /// the post does not exist.
    async fn add_comment(&self, post_id: i64, comment: NewComment) -> AppResult<(i64, String)>;

    /// A post's comments, newest first, carrying the author's current
    /// profile picture.
    async fn comments_for_post(&self, post_id: i64) -> AppResult<Vec<Comment>>;

    /// Insert an application, resolving the post's author at apply time;
    /// returns (id, timestamp). Fails with NotFound when the post does not
    /// exist.
    async fn apply(&self, application: NewApplication) -> AppResult<(i64, String)>;

    /// Applications received by a post author, newest first, joined to the
    /// post title.
    async fn applications_for_author(&self, author: &str) -> AppResult<Vec<Application>>;
}

/// Type alias for Arc-wrapped store (for AppState)
pub type DynStore = Arc<dyn Store>;
