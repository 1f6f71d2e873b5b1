//! Business logic services.

pub mod comment;
pub mod follow;
pub mod group;
pub mod post;
pub mod user;

pub use comment::{CommentService, CreateCommentInput};
pub use follow::{FollowOutcome, FollowService};
pub use group::{CreateGroupInput, GroupService, UpdateGroupInput};
pub use post::{
    AuthorPosts, CreatePostInput, EditOutcome, PostDetail, PostService, UpdatePostInput,
};
pub use user::{RegisterInput, UserService};
