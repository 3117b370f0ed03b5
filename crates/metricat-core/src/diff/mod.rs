//! Field differ and comment builder.

pub mod comment;
pub mod engine;

pub use comment::{
    build_entries, comment_from_states, create_comment, render, update_comment, CommentEntry,
    INITIAL_COMMENT,
};
pub use engine::{diff_fields, DeltaKind, FieldDelta};
