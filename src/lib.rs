//! Turn a batch file of shell commands into an SGE job-array submission.
//!
//! The core is the resource-option translator: it parses a free-form string
//! of extra scheduler options into a [`FlagMap`], merges in the resource
//! requests derived from the memory/thread parameters, and derives a job
//! name from the batch file. The [`submit`] module assembles the final
//! `qsub` invocation from the translated flags plus the task lines.

pub mod batch;
pub mod errors;
pub mod flags;
pub mod resources;
pub mod submit;

pub use errors::{Error, Result};
pub use flags::{FlagMap, ParseError};
pub use resources::{ResourceParams, derive_job_name, derive_resource_flags};
pub use submit::SubmitRequest;
