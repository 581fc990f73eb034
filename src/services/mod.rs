pub mod comment_service;
pub mod context;
pub mod pipeline;
pub mod text_service;

pub use comment_service::{create_comment, delete_comment, list_comments, CommentPayload, CommentsPayload};
pub use context::ServiceContext;
pub use pipeline::{finish, parse_payload, Authorized, ServiceError, ServiceResult};
pub use text_service::{
    create_text, delete_text, get_texts, update_text, DeletedPayload, TextPayload, TextsPayload,
};
