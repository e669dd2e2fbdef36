//! Article assembly
//!
//! This module ties the fetch and extract layers together:
//! - The plain record types handed over to callers
//! - Assembling one article from its section map
//! - Running a batch of discovered articles sequentially

mod assembler;
mod batch;
mod record;

pub use assembler::ArticleAssembler;
pub use batch::{select_articles, BatchFailure, BatchReport, NO_CONTENT_REASON};
pub use record::{ArticleRecord, ContentBlock, ContentItem, Section};
