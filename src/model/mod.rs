// src/model/mod.rs

//! Result types shared by planning, execution and reporting.

pub mod batch;
pub mod deployed;
pub mod message;

pub use batch::Batch;
pub use deployed::{DeployedFile, DeploymentMechanism, FileId, FileKind};
pub use message::{Message, MessageKind, MessageList, SourceLocation};
