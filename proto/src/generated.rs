#![allow(clippy::doc_markdown, clippy::use_self)]
pub mod logs;
