pub mod comment;
pub mod text;
pub mod workspace;

pub use comment::{Comment, NewComment};
pub use text::{NewText, Text, TextChanges};
pub use workspace::{Workspace, WorkspaceMember};
