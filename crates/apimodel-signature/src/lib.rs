//! Reading and writing `// Signature format: N.N` API text files.
//!
//! A file is a header naming the format version and options, followed by `package` blocks
//! of flattened class declarations. [`parse_signature`] turns one file into declarations,
//! [`SignatureCodebaseBuilder`] merges files into a codebase, and [`write_signature`] renders
//! a codebase back in canonical form.

#![forbid(unsafe_code)]

mod builder;
mod error;
mod format;
mod parser;
mod provider;
mod scanner;
mod writer;

pub use builder::SignatureCodebaseBuilder;
pub use error::SignatureError;
pub use format::{FileFormat, FormatVersion};
pub use parser::{parse_signature, ParsedClass, SignatureFile};
pub use provider::SignatureProvider;
pub use writer::{write_package_artifacts, write_signature};
