#![deny(missing_docs)]
//! Tools the portfolio agent can call.
//!
//! Two families:
//! - Experience tools ([`GetExperience`], [`GetSkills`], [`GetProjects`])
//!   serve static structured data about the portfolio's owner.
//! - Codebase oracle tools ([`FindSymbol`], [`GetFileContent`],
//!   [`FindReferences`]) answer technical questions about the codebase
//!   itself through regex-based symbol search and bounded file reads.
//!
//! All tools are plain data lookups; the agent logs their invocation
//! and result generically without understanding their semantics.

pub mod codebase;
pub mod experience;

pub use codebase::{CodebaseConfig, FindReferences, FindSymbol, GetFileContent};
pub use experience::{GetExperience, GetProjects, GetSkills, profile};
