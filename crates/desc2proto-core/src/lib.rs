//! # desc2proto-core
//!
//! A library for reconstructing human-readable `.proto` source files from
//! compiled, binary-encoded descriptor sets: the structural metadata
//! protobuf compilers produce from `.proto` source (and servers expose via
//! reflection).
//!
//! This crate provides the core functionality for:
//! - Decoding a binary `FileDescriptorSet` into its descriptor tree
//! - Rendering each file entry back into compilable `.proto` source,
//!   including proto2/proto3 label differences, nested types, `map<K,V>`
//!   and `oneof` inference, grouped `extend` blocks, options, and reserved
//!   declarations
//!
//! ## Architecture
//!
//! The library is organized into two modules:
//!
//! - [`render`]: descriptor-to-proto rendering
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use desc2proto_core::{decode_descriptor_set, render_descriptor_set};
//! use std::fs;
//!
//! // Read a compiled descriptor set (e.g. protoc --descriptor_set_out)
//! let data = fs::read("./api.protoset")?;
//! let set = decode_descriptor_set(&data)?;
//!
//! // Reconstruct the proto sources
//! for rendered in render_descriptor_set(&set)? {
//!     println!("// {}", rendered.path.display());
//!     println!("{}", rendered.content);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod error;
pub mod render;

use prost::Message;
use prost_types::FileDescriptorSet;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use render::{render_descriptor_set, FileRenderer, IndentedEmitter, ProtoSyntax, RenderedFile};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid protobuf field number (2^29 - 1)
/// Used for `reserved X to max` ranges
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Decodes a binary-encoded descriptor set into its descriptor tree.
pub fn decode_descriptor_set(data: &[u8]) -> Result<FileDescriptorSet> {
    Ok(FileDescriptorSet::decode(data)?)
}
