//! Descriptor-to-proto rendering module.
//!
//! This module turns decoded descriptor trees back into `.proto` source
//! text. [`FileRenderer`] orchestrates one file entry; the recursive
//! structure renderers walk messages, enums, services, and their children
//! depth-first, accumulating text in an [`IndentedEmitter`].
//!
//! Rendering is a pure transform: the descriptor tree is read once and
//! never mutated, and re-rendering the same tree produces byte-identical
//! output. Writing the resulting artifacts to disk is the caller's
//! responsibility.

mod emitter;
mod structure;

use crate::error::{Error, Result};
use prost_types::{FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use std::path::PathBuf;
use tracing::debug;

pub use emitter::IndentedEmitter;

/// Proto syntax version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtoSyntax {
    /// Proto2 syntax
    Proto2,
    /// Proto3 syntax
    Proto3,
}

impl ProtoSyntax {
    /// Returns the syntax declaration string
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtoSyntax::Proto2 => "proto2",
            ProtoSyntax::Proto3 => "proto3",
        }
    }

    /// Resolves a file entry's declared syntax. An absent declaration means
    /// proto3 semantics; any token other than the two known ones aborts the
    /// run, since label emission depends on a correctly resolved version.
    pub fn resolve(file: &str, declared: Option<&str>) -> Result<Self> {
        match declared {
            None => Ok(ProtoSyntax::Proto3),
            Some("proto2") => Ok(ProtoSyntax::Proto2),
            Some("proto3") => Ok(ProtoSyntax::Proto3),
            Some(other) => Err(Error::unsupported_syntax(file, other)),
        }
    }
}

/// Per-file state threaded through the recursive renderers: the emitter,
/// the resolved syntax version, and the file's extension declarations
/// (extensions render grouped by extendee, not in declaration position).
pub(crate) struct RenderContext<'a> {
    pub(crate) out: IndentedEmitter,
    pub(crate) syntax: ProtoSyntax,
    pub(crate) extensions: &'a [FieldDescriptorProto],
}

impl<'a> RenderContext<'a> {
    pub(crate) fn new(syntax: ProtoSyntax, extensions: &'a [FieldDescriptorProto]) -> Self {
        Self {
            out: IndentedEmitter::new(),
            syntax,
            extensions,
        }
    }

    /// Runs `body` one indent level deeper, restoring the prior depth on
    /// every exit path.
    pub(crate) fn with_indent<R>(&mut self, body: impl FnOnce(&mut Self) -> R) -> R {
        self.out.indent();
        let result = body(self);
        self.out.dedent();
        result
    }

    pub(crate) fn finish(self) -> String {
        self.out.into_string()
    }
}

/// One rendered output artifact: the proto source text and its path
/// relative to a caller-supplied destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFile {
    /// Relative output path derived from the file entry's name
    pub path: PathBuf,
    /// The reconstructed `.proto` source
    pub content: String,
}

/// Renders one descriptor-tree file entry into proto source text.
#[derive(Debug)]
pub struct FileRenderer<'a> {
    proto: &'a FileDescriptorProto,
}

impl<'a> FileRenderer<'a> {
    /// Creates a renderer for one file entry.
    pub fn new(proto: &'a FileDescriptorProto) -> Self {
        Self { proto }
    }

    /// Renders the file entry. Every top-level construct is followed by
    /// exactly one blank separator line.
    pub fn render(&self) -> Result<RenderedFile> {
        let proto = self.proto;
        let path = self.relative_path()?;
        let syntax = ProtoSyntax::resolve(proto.name(), proto.syntax.as_deref())?;
        debug!(
            "rendering '{}': {} message(s), {} enum(s), {} service(s), {} extension(s)",
            proto.name(),
            proto.message_type.len(),
            proto.enum_type.len(),
            proto.service.len(),
            proto.extension.len()
        );

        let mut ctx = RenderContext::new(syntax, &proto.extension);

        // The syntax line appears only when the entry declares one; an
        // absent declaration still resolves to proto3 semantics above.
        if proto.syntax.is_some() {
            ctx.out.write_line(&format!("syntax = \"{}\";", syntax.as_str()));
            ctx.out.blank_line();
        }

        if let Some(package) = proto.package.as_deref().filter(|p| !p.is_empty()) {
            ctx.out.write_line(&format!("package {};", package));
            ctx.out.blank_line();
        }

        for dependency in &proto.dependency {
            ctx.out.write_line(&format!("import \"{}\";", dependency));
        }
        if !proto.dependency.is_empty() {
            ctx.out.blank_line();
        }

        let file_options = structure::collect_file_options(proto.options.as_ref());
        if !file_options.is_empty() {
            structure::render_block_options(&mut ctx.out, &file_options);
            ctx.out.blank_line();
        }

        structure::render_extend_blocks(&mut ctx)?;

        for message in &proto.message_type {
            structure::render_message(&mut ctx, message)?;
            ctx.out.blank_line();
        }

        for enum_type in &proto.enum_type {
            structure::render_enum(&mut ctx, enum_type);
            ctx.out.blank_line();
        }

        for service in &proto.service {
            structure::render_service(&mut ctx, service);
            ctx.out.blank_line();
        }

        Ok(RenderedFile {
            path,
            content: ctx.finish(),
        })
    }

    /// Derives the relative output path from the entry name: slash
    /// segments become path components. Empty, `.`, and `..` segments
    /// would escape the destination root and are rejected.
    fn relative_path(&self) -> Result<PathBuf> {
        let name = self.proto.name();
        if name.is_empty() {
            return Err(Error::internal("file entry has no name"));
        }
        let mut path = PathBuf::new();
        for segment in name.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(Error::path_traversal(name));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

/// Renders every file entry of a descriptor set, in order. The first
/// failing entry aborts the whole render; entries already rendered form a
/// valid prefix of the output.
pub fn render_descriptor_set(set: &FileDescriptorSet) -> Result<Vec<RenderedFile>> {
    set.file
        .iter()
        .map(|proto| FileRenderer::new(proto).render())
        .collect()
}
