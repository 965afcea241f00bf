//! Recursive rendering of descriptor structures.
//!
//! These functions walk one file entry depth-first and emit `.proto`
//! source through the [`RenderContext`]: messages, enums, oneofs, fields,
//! map fields, extend blocks, services, methods, options, and reserved
//! declarations. Constructs that exist in source but not in the compiled
//! form are inferred here: `map<K,V>` from synthetic map-entry nested
//! types, `oneof` membership from field oneof indices, and `extend` blocks
//! from per-field extendee names.

use crate::error::{Error, Result};
use crate::MAX_FIELD_NUMBER;
use prost_types::descriptor_proto::ReservedRange;
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::field_options::{CType, JsType};
use prost_types::file_options::OptimizeMode;
use prost_types::method_options::IdempotencyLevel;
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueOptions, FieldDescriptorProto, FileOptions,
    MessageOptions, MethodDescriptorProto, MethodOptions, OneofDescriptorProto,
    ServiceDescriptorProto,
};
use std::fmt;

use super::emitter::IndentedEmitter;
use super::{ProtoSyntax, RenderContext};

/// An explicitly-set option value, rendered with proto literal syntax.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OptionValue {
    /// Unquoted `true` / `false`
    Bool(bool),
    /// Unquoted integer
    Int(i64),
    /// Quoted and escaped string literal
    Str(String),
    /// Bare identifier, e.g. an enum value name or a proto2 default token
    Ident(String),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(v) => write!(f, "{}", v),
            OptionValue::Int(v) => write!(f, "{}", v),
            OptionValue::Str(v) => write!(f, "\"{}\"", escape_string(v)),
            OptionValue::Ident(v) => f.write_str(v),
        }
    }
}

macro_rules! push_string_option {
    ($entries:ident, $name:literal, $value:expr) => {
        if let Some(v) = &$value {
            if !v.is_empty() {
                $entries.push(($name, OptionValue::Str(v.clone())));
            }
        }
    };
}

macro_rules! push_bool_option {
    ($entries:ident, $name:literal, $value:expr) => {
        if let Some(v) = $value {
            $entries.push(($name, OptionValue::Bool(v)));
        }
    };
}

/// Emits `message <name> { … }` with the body in fixed order: options,
/// nested enums, nested non-map messages, oneofs, remaining fields,
/// reserved names, reserved ranges.
pub(crate) fn render_message(ctx: &mut RenderContext<'_>, message: &DescriptorProto) -> Result<()> {
    ctx.out.write_line(&format!("message {} {{", message.name()));
    ctx.with_indent(|ctx| -> Result<()> {
        let options = collect_message_options(message.options.as_ref());
        if !options.is_empty() {
            render_block_options(&mut ctx.out, &options);
            ctx.out.blank_line();
        }

        for enum_type in &message.enum_type {
            render_enum(ctx, enum_type);
        }

        for nested in message.nested_type.iter().filter(|n| !is_map_entry(n)) {
            render_message(ctx, nested)?;
        }

        for (index, oneof) in message.oneof_decl.iter().enumerate() {
            let members: Vec<&FieldDescriptorProto> = message
                .field
                .iter()
                .filter(|field| field.oneof_index == Some(index as i32))
                .collect();
            render_oneof(ctx, oneof, &members)?;
        }

        for field in message.field.iter().filter(|f| f.oneof_index.is_none()) {
            match find_map_entry(message, field) {
                Some(entry) => render_map_field(ctx, field, entry)?,
                None => render_field(ctx, field, true)?,
            }
        }

        if !message.reserved_name.is_empty() {
            render_reserved_names(&mut ctx.out, &message.reserved_name);
        }
        if !message.reserved_range.is_empty() {
            render_reserved_ranges(&mut ctx.out, &message.reserved_range);
        }
        Ok(())
    })?;
    ctx.out.write_line("}");
    Ok(())
}

/// Emits `enum <name> { … }` with values in declared order. Duplicate
/// numbers (proto2 alias semantics) pass through verbatim.
pub(crate) fn render_enum(ctx: &mut RenderContext<'_>, enum_type: &EnumDescriptorProto) {
    ctx.out.write_line(&format!("enum {} {{", enum_type.name()));
    ctx.with_indent(|ctx| {
        let options = collect_enum_options(enum_type.options.as_ref());
        if !options.is_empty() {
            render_block_options(&mut ctx.out, &options);
        }
        for value in &enum_type.value {
            let entries = collect_enum_value_options(value.options.as_ref());
            ctx.out.write(&format!("{} = {}", value.name(), value.number()));
            ctx.out.without_indent(|out| {
                write_inline_options(out, &entries);
                out.write_line(";");
            });
        }
    });
    ctx.out.write_line("}");
}

/// Emits `oneof <name> { … }`. Members render as normal fields without a
/// label keyword; oneof members are implicitly singular. An empty oneof
/// still renders its block.
pub(crate) fn render_oneof(
    ctx: &mut RenderContext<'_>,
    oneof: &OneofDescriptorProto,
    members: &[&FieldDescriptorProto],
) -> Result<()> {
    // OneofOptions carries no scalar options a compiled set can restore,
    // so the block goes straight to its member fields.
    ctx.out.write_line(&format!("oneof {} {{", oneof.name()));
    ctx.with_indent(|ctx| -> Result<()> {
        for field in members.iter().copied() {
            render_field(ctx, field, false)?;
        }
        Ok(())
    })?;
    ctx.out.write_line("}");
    Ok(())
}

/// Emits one field declaration: label, type token, name, number, inline
/// options, `;`.
pub(crate) fn render_field(
    ctx: &mut RenderContext<'_>,
    field: &FieldDescriptorProto,
    include_label: bool,
) -> Result<()> {
    let label = if include_label {
        label_token(field, ctx.syntax)?
    } else {
        ""
    };
    let type_name = type_token(field)?;
    let entries = collect_field_options(field, ctx.syntax);

    // Even an empty label claims the line, so the indent prefix lands
    // before indentation is suspended for the rest of the declaration.
    ctx.out.write(label);
    ctx.out.without_indent(|out| {
        out.write(&format!("{} {} = {}", type_name, field.name(), field.number()));
        write_inline_options(out, &entries);
        out.write_line(";");
    });
    Ok(())
}

/// Emits `map<K,V> <name> = <number>;`, resolving the key and value types
/// from the matched map-entry nested type. Map fields never take a label.
pub(crate) fn render_map_field(
    ctx: &mut RenderContext<'_>,
    field: &FieldDescriptorProto,
    entry: &DescriptorProto,
) -> Result<()> {
    let key = entry.field.iter().find(|f| f.name() == "key" && f.number() == 1);
    let value = entry.field.iter().find(|f| f.name() == "value" && f.number() == 2);
    let (Some(key), Some(value)) = (key, value) else {
        // Malformed synthetic entry; fall back to a plain field.
        return render_field(ctx, field, true);
    };

    let key_token = type_token(key)?;
    let value_token = type_token(value)?;
    let entries = collect_field_options(field, ctx.syntax);

    ctx.out.write(&format!(
        "map<{},{}> {} = {}",
        key_token,
        value_token,
        field.name(),
        field.number()
    ));
    ctx.out.without_indent(|out| {
        write_inline_options(out, &entries);
        out.write_line(";");
    });
    Ok(())
}

/// Emits one `extend <extendee> { … }` block per distinct extendee, blocks
/// ordered by first appearance, fields in declaration order. Each block is
/// followed by one blank separator line.
pub(crate) fn render_extend_blocks(ctx: &mut RenderContext<'_>) -> Result<()> {
    let extensions = ctx.extensions;
    if extensions.is_empty() {
        return Ok(());
    }

    let mut groups: Vec<(&str, Vec<&FieldDescriptorProto>)> = Vec::new();
    for extension in extensions {
        let extendee = extension.extendee();
        match groups.iter_mut().find(|(name, _)| *name == extendee) {
            Some((_, fields)) => fields.push(extension),
            None => groups.push((extendee, vec![extension])),
        }
    }

    for (extendee, fields) in groups {
        ctx.out.write_line(&format!("extend {} {{", extendee));
        ctx.with_indent(|ctx| -> Result<()> {
            for field in fields.iter().copied() {
                render_field(ctx, field, true)?;
            }
            Ok(())
        })?;
        ctx.out.write_line("}");
        ctx.out.blank_line();
    }
    Ok(())
}

/// Emits `service <name> { … }` with methods in declaration order.
pub(crate) fn render_service(ctx: &mut RenderContext<'_>, service: &ServiceDescriptorProto) {
    ctx.out.write_line(&format!("service {} {{", service.name()));
    ctx.with_indent(|ctx| {
        for method in &service.method {
            render_method(ctx, method);
        }
    });
    ctx.out.write_line("}");
}

/// Emits `rpc <name> ( [stream ]<in> ) returns ( [stream ]<out> )`,
/// terminated by `;` or by a braced option block.
pub(crate) fn render_method(ctx: &mut RenderContext<'_>, method: &MethodDescriptorProto) {
    let input = stream_prefixed(method.input_type(), method.client_streaming());
    let output = stream_prefixed(method.output_type(), method.server_streaming());
    let signature = format!("rpc {} ( {} ) returns ( {} )", method.name(), input, output);

    let options = collect_method_options(method.options.as_ref());
    if options.is_empty() {
        ctx.out.write_line(&format!("{};", signature));
    } else {
        ctx.out.write_line(&format!("{} {{", signature));
        ctx.with_indent(|ctx| {
            render_block_options(&mut ctx.out, &options);
        });
        ctx.out.write_line("}");
    }
}

fn stream_prefixed(type_name: &str, streaming: bool) -> String {
    if streaming {
        format!("stream {}", type_name)
    } else {
        type_name.to_string()
    }
}

/// Emits block options, one `option <id> = <value>;` line per entry.
pub(crate) fn render_block_options(
    out: &mut IndentedEmitter,
    entries: &[(&'static str, OptionValue)],
) {
    for (name, value) in entries {
        out.write_line(&format!("option {} = {};", name, value));
    }
}

/// Appends an inline ` [id=value, …]` option list to the current line.
/// Writes nothing when no options are set.
pub(crate) fn write_inline_options(
    out: &mut IndentedEmitter,
    entries: &[(&'static str, OptionValue)],
) {
    if entries.is_empty() {
        return;
    }
    let rendered: Vec<String> = entries
        .iter()
        .map(|(name, value)| format!("{}={}", name, value))
        .collect();
    out.write(&format!(" [{}]", rendered.join(", ")));
}

/// Emits `reserved "a", "b";` in declaration order.
pub(crate) fn render_reserved_names(out: &mut IndentedEmitter, names: &[String]) {
    let quoted: Vec<String> = names
        .iter()
        .map(|name| format!("\"{}\"", escape_string(name)))
        .collect();
    out.write_line(&format!("reserved {};", quoted.join(", ")));
}

/// Emits `reserved <r1>, <r2>;`, ranges sorted ascending by start. A range
/// of width one renders as the single number, wider ranges as
/// `start to end-1`, and a range running to the field number ceiling as
/// `start to max`.
pub(crate) fn render_reserved_ranges(out: &mut IndentedEmitter, ranges: &[ReservedRange]) {
    let mut sorted: Vec<&ReservedRange> = ranges.iter().collect();
    sorted.sort_by_key(|range| range.start());

    let parts: Vec<String> = sorted
        .iter()
        .map(|range| {
            let start = range.start();
            let end = range.end();
            if end - start == 1 {
                start.to_string()
            } else if end == MAX_FIELD_NUMBER as i32 + 1 {
                format!("{} to max", start)
            } else {
                format!("{} to {}", start, end - 1)
            }
        })
        .collect();
    out.write_line(&format!("reserved {};", parts.join(", ")));
}

/// True for synthetic map-entry nested types.
pub(crate) fn is_map_entry(message: &DescriptorProto) -> bool {
    message
        .options
        .as_ref()
        .and_then(|options| options.map_entry)
        .unwrap_or(false)
}

/// Matches a field against its owning message's map-entry nested types by
/// fully-qualified-name suffix. The compiled form stores no map flag on
/// the field itself; this suffix lookup is the only signal.
pub(crate) fn find_map_entry<'a>(
    message: &'a DescriptorProto,
    field: &FieldDescriptorProto,
) -> Option<&'a DescriptorProto> {
    message
        .nested_type
        .iter()
        .filter(|nested| is_map_entry(nested))
        .find(|nested| {
            field
                .type_name()
                .ends_with(&format!(".{}.{}", message.name(), nested.name()))
        })
}

/// Resolves the label keyword for the active syntax version. `repeated`
/// survives both versions; `optional` and `required` are proto2-only
/// tokens. Unknown label values are fatal.
fn label_token(field: &FieldDescriptorProto, syntax: ProtoSyntax) -> Result<&'static str> {
    let label = match field.label {
        Some(raw) => {
            Label::try_from(raw).map_err(|_| Error::unsupported_label(field.name(), raw))?
        }
        None => Label::Optional,
    };
    Ok(match (label, syntax) {
        (Label::Repeated, _) => "repeated ",
        (Label::Optional, ProtoSyntax::Proto2) => "optional ",
        (Label::Required, ProtoSyntax::Proto2) => "required ",
        (Label::Optional | Label::Required, ProtoSyntax::Proto3) => "",
    })
}

/// Resolves the type token: the lower-cased wire-type name for scalars,
/// the stored fully-qualified name for message and enum references.
fn type_token(field: &FieldDescriptorProto) -> Result<String> {
    let raw = match field.r#type {
        Some(raw) => raw,
        // Some producers omit the type when the name alone resolves it.
        None if !field.type_name().is_empty() => return Ok(field.type_name().to_string()),
        None => {
            return Err(Error::internal(format!(
                "field '{}' carries neither a type nor a type name",
                field.name()
            )))
        }
    };
    let kind = Type::try_from(raw).map_err(|_| Error::unsupported_type(field.name(), raw))?;
    Ok(match kind {
        Type::Message | Type::Enum => field.type_name().to_string(),
        Type::Double => "double".to_string(),
        Type::Float => "float".to_string(),
        Type::Int64 => "int64".to_string(),
        Type::Uint64 => "uint64".to_string(),
        Type::Int32 => "int32".to_string(),
        Type::Fixed64 => "fixed64".to_string(),
        Type::Fixed32 => "fixed32".to_string(),
        Type::Bool => "bool".to_string(),
        Type::String => "string".to_string(),
        Type::Group => "group".to_string(),
        Type::Bytes => "bytes".to_string(),
        Type::Uint32 => "uint32".to_string(),
        Type::Sfixed32 => "sfixed32".to_string(),
        Type::Sfixed64 => "sfixed64".to_string(),
        Type::Sint32 => "sint32".to_string(),
        Type::Sint64 => "sint64".to_string(),
    })
}

/// Collects explicitly-set file-level options in descriptor declaration
/// order. Unset options never appear.
pub(crate) fn collect_file_options(
    options: Option<&FileOptions>,
) -> Vec<(&'static str, OptionValue)> {
    let Some(opts) = options else {
        return Vec::new();
    };
    let mut entries = Vec::new();

    push_string_option!(entries, "java_package", opts.java_package);
    push_string_option!(entries, "java_outer_classname", opts.java_outer_classname);
    push_bool_option!(entries, "java_multiple_files", opts.java_multiple_files);
    push_bool_option!(entries, "java_string_check_utf8", opts.java_string_check_utf8);
    if let Some(raw) = opts.optimize_for {
        if let Ok(mode) = OptimizeMode::try_from(raw) {
            entries.push(("optimize_for", OptionValue::Ident(mode.as_str_name().to_string())));
        }
    }
    push_string_option!(entries, "go_package", opts.go_package);
    push_bool_option!(entries, "cc_generic_services", opts.cc_generic_services);
    push_bool_option!(entries, "java_generic_services", opts.java_generic_services);
    push_bool_option!(entries, "py_generic_services", opts.py_generic_services);
    push_bool_option!(entries, "deprecated", opts.deprecated);
    push_bool_option!(entries, "cc_enable_arenas", opts.cc_enable_arenas);
    push_string_option!(entries, "objc_class_prefix", opts.objc_class_prefix);
    push_string_option!(entries, "csharp_namespace", opts.csharp_namespace);
    push_string_option!(entries, "swift_prefix", opts.swift_prefix);
    push_string_option!(entries, "php_class_prefix", opts.php_class_prefix);
    push_string_option!(entries, "php_namespace", opts.php_namespace);
    push_string_option!(entries, "php_metadata_namespace", opts.php_metadata_namespace);
    push_string_option!(entries, "ruby_package", opts.ruby_package);

    entries
}

/// Collects explicitly-set message-level options.
pub(crate) fn collect_message_options(
    options: Option<&MessageOptions>,
) -> Vec<(&'static str, OptionValue)> {
    let Some(opts) = options else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    push_bool_option!(entries, "message_set_wire_format", opts.message_set_wire_format);
    push_bool_option!(
        entries,
        "no_standard_descriptor_accessor",
        opts.no_standard_descriptor_accessor
    );
    push_bool_option!(entries, "deprecated", opts.deprecated);
    entries
}

/// Collects explicitly-set enum-level options.
pub(crate) fn collect_enum_options(
    options: Option<&prost_types::EnumOptions>,
) -> Vec<(&'static str, OptionValue)> {
    let Some(opts) = options else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    push_bool_option!(entries, "allow_alias", opts.allow_alias);
    push_bool_option!(entries, "deprecated", opts.deprecated);
    entries
}

/// Collects explicitly-set enum-value options.
pub(crate) fn collect_enum_value_options(
    options: Option<&EnumValueOptions>,
) -> Vec<(&'static str, OptionValue)> {
    let Some(opts) = options else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    push_bool_option!(entries, "deprecated", opts.deprecated);
    entries
}

/// Collects explicitly-set method-level options.
pub(crate) fn collect_method_options(
    options: Option<&MethodOptions>,
) -> Vec<(&'static str, OptionValue)> {
    let Some(opts) = options else {
        return Vec::new();
    };
    let mut entries = Vec::new();
    push_bool_option!(entries, "deprecated", opts.deprecated);
    if let Some(raw) = opts.idempotency_level {
        if let Ok(level) = IdempotencyLevel::try_from(raw) {
            entries.push((
                "idempotency_level",
                OptionValue::Ident(level.as_str_name().to_string()),
            ));
        }
    }
    entries
}

/// Collects the inline option list for a field: the proto2 default, a
/// non-derived `json_name`, and the explicitly-set `FieldOptions` scalars.
pub(crate) fn collect_field_options(
    field: &FieldDescriptorProto,
    syntax: ProtoSyntax,
) -> Vec<(&'static str, OptionValue)> {
    let mut entries = Vec::new();

    if syntax == ProtoSyntax::Proto2 {
        if let Some(default) = &field.default_value {
            let value = match field.r#type.map(Type::try_from) {
                Some(Ok(Type::String)) | Some(Ok(Type::Bytes)) => {
                    OptionValue::Str(default.clone())
                }
                // enum names, bools and numbers are stored as the bare token
                _ => OptionValue::Ident(default.clone()),
            };
            entries.push(("default", value));
        }
    }

    if let Some(json_name) = &field.json_name {
        if *json_name != to_lower_camel_case(field.name()) {
            entries.push(("json_name", OptionValue::Str(json_name.clone())));
        }
    }

    let Some(opts) = field.options.as_ref() else {
        return entries;
    };
    if let Some(raw) = opts.ctype {
        if let Ok(ctype) = CType::try_from(raw) {
            entries.push(("ctype", OptionValue::Ident(ctype.as_str_name().to_string())));
        }
    }
    push_bool_option!(entries, "packed", opts.packed);
    if let Some(raw) = opts.jstype {
        if let Ok(jstype) = JsType::try_from(raw) {
            entries.push(("jstype", OptionValue::Ident(jstype.as_str_name().to_string())));
        }
    }
    push_bool_option!(entries, "lazy", opts.lazy);
    push_bool_option!(entries, "deprecated", opts.deprecated);
    push_bool_option!(entries, "weak", opts.weak);

    entries
}

/// Escape a string for proto literal syntax
pub(crate) fn escape_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            _ if c.is_ascii_control() => {
                result.push_str(&format!("\\x{:02x}", c as u8));
            }
            _ => result.push(c),
        }
    }
    result
}

/// Convert a snake_case name to lowerCamelCase, the derivation compilers
/// use for the implicit `json_name`.
fn to_lower_camel_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if c == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prost_types::{EnumValueDescriptorProto, FieldOptions, OneofOptions};

    fn scalar_field(name: &str, number: i32, kind: Type) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(kind as i32),
            ..Default::default()
        }
    }

    fn message_field(name: &str, number: i32, type_name: &str) -> FieldDescriptorProto {
        FieldDescriptorProto {
            name: Some(name.to_string()),
            number: Some(number),
            label: Some(Label::Optional as i32),
            r#type: Some(Type::Message as i32),
            type_name: Some(type_name.to_string()),
            ..Default::default()
        }
    }

    fn map_entry(name: &str, value: FieldDescriptorProto) -> DescriptorProto {
        DescriptorProto {
            name: Some(name.to_string()),
            field: vec![scalar_field("key", 1, Type::String), value],
            options: Some(MessageOptions {
                map_entry: Some(true),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn render_with(
        syntax: ProtoSyntax,
        body: impl FnOnce(&mut RenderContext<'_>) -> Result<()>,
    ) -> String {
        let mut ctx = RenderContext::new(syntax, &[]);
        body(&mut ctx).unwrap();
        ctx.finish()
    }

    #[test]
    fn test_proto2_label_tokens() {
        let mut field = scalar_field("name", 1, Type::String);
        let out = render_with(ProtoSyntax::Proto2, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "optional string name = 1;\n");

        field.label = Some(Label::Required as i32);
        let out = render_with(ProtoSyntax::Proto2, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "required string name = 1;\n");

        field.label = Some(Label::Repeated as i32);
        let out = render_with(ProtoSyntax::Proto2, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "repeated string name = 1;\n");
    }

    #[test]
    fn test_proto3_suppresses_singular_labels() {
        let mut field = scalar_field("name", 1, Type::String);
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "string name = 1;\n");

        field.label = Some(Label::Required as i32);
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "string name = 1;\n");

        field.label = Some(Label::Repeated as i32);
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "repeated string name = 1;\n");
    }

    #[test]
    fn test_unknown_label_is_fatal() {
        let mut field = scalar_field("bad", 1, Type::Int32);
        field.label = Some(99);
        let mut ctx = RenderContext::new(ProtoSyntax::Proto2, &[]);
        let err = render_field(&mut ctx, &field, true).unwrap_err();
        assert!(matches!(err, Error::UnsupportedLabel { value: 99, .. }));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let mut field = scalar_field("bad", 1, Type::Int32);
        field.r#type = Some(42);
        let mut ctx = RenderContext::new(ProtoSyntax::Proto3, &[]);
        let err = render_field(&mut ctx, &field, true).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType { value: 42, .. }));
    }

    #[test]
    fn test_message_reference_uses_stored_type_name() {
        let field = message_field("owner", 4, ".pkg.Person");
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, ".pkg.Person owner = 4;\n");
    }

    #[test]
    fn test_inline_field_options() {
        let mut field = scalar_field("ids", 3, Type::Int32);
        field.label = Some(Label::Repeated as i32);
        field.options = Some(FieldOptions {
            packed: Some(true),
            deprecated: Some(true),
            ..Default::default()
        });
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "repeated int32 ids = 3 [packed=true, deprecated=true];\n");
    }

    #[test]
    fn test_proto2_default_value_quoting() {
        let mut field = scalar_field("greeting", 1, Type::String);
        field.default_value = Some("hi".to_string());
        let out = render_with(ProtoSyntax::Proto2, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "optional string greeting = 1 [default=\"hi\"];\n");

        let mut field = scalar_field("count", 2, Type::Int32);
        field.default_value = Some("5".to_string());
        let out = render_with(ProtoSyntax::Proto2, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "optional int32 count = 2 [default=5];\n");
    }

    #[test]
    fn test_default_value_not_rendered_in_proto3() {
        let mut field = scalar_field("greeting", 1, Type::String);
        field.default_value = Some("hi".to_string());
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "string greeting = 1;\n");
    }

    #[test]
    fn test_json_name_rendered_only_when_not_derived() {
        let mut field = scalar_field("user_id", 1, Type::Int64);
        field.json_name = Some("userId".to_string());
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "int64 user_id = 1;\n");

        field.json_name = Some("uid".to_string());
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_field(ctx, &field, true));
        assert_eq!(out, "int64 user_id = 1 [json_name=\"uid\"];\n");
    }

    #[test]
    fn test_map_field_renders_once_with_map_syntax() {
        let entry = map_entry("TagsEntry", scalar_field("value", 2, Type::String));
        let mut tags = message_field("tags", 3, ".Pkg.Container.TagsEntry");
        tags.label = Some(Label::Repeated as i32);
        let container = DescriptorProto {
            name: Some("Container".to_string()),
            field: vec![tags],
            nested_type: vec![entry],
            ..Default::default()
        };

        let out = render_with(ProtoSyntax::Proto3, |ctx| render_message(ctx, &container));
        assert!(out.contains("map<string,string> tags = 3;"));
        assert!(!out.contains("message TagsEntry"));
        assert!(!out.contains("repeated"));
    }

    #[test]
    fn test_map_value_may_reference_message() {
        let entry = map_entry(
            "ScoresEntry",
            message_field("value", 2, ".pkg.Score"),
        );
        let mut scores = message_field("scores", 7, ".pkg.Board.ScoresEntry");
        scores.label = Some(Label::Repeated as i32);
        let board = DescriptorProto {
            name: Some("Board".to_string()),
            field: vec![scores],
            nested_type: vec![entry],
            ..Default::default()
        };

        let out = render_with(ProtoSyntax::Proto3, |ctx| render_message(ctx, &board));
        assert!(out.contains("map<string,.pkg.Score> scores = 7;"));
    }

    #[test]
    fn test_map_heuristic_requires_enclosing_message_in_suffix() {
        // Same entry name under a different enclosing message must not match.
        let entry = map_entry("TagsEntry", scalar_field("value", 2, Type::String));
        let mut tags = message_field("tags", 3, ".Pkg.Other.TagsEntry");
        tags.label = Some(Label::Repeated as i32);
        let container = DescriptorProto {
            name: Some("Container".to_string()),
            field: vec![tags],
            nested_type: vec![entry],
            ..Default::default()
        };

        assert!(find_map_entry(&container, &container.field[0]).is_none());
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_message(ctx, &container));
        assert!(out.contains("repeated .Pkg.Other.TagsEntry tags = 3;"));
    }

    #[test]
    fn test_oneof_members_render_inside_block_without_labels() {
        let mut choice_a = scalar_field("a", 1, Type::String);
        choice_a.oneof_index = Some(0);
        let mut choice_b = scalar_field("b", 2, Type::Int32);
        choice_b.oneof_index = Some(0);
        let standalone = scalar_field("c", 3, Type::Bool);

        let message = DescriptorProto {
            name: Some("Pick".to_string()),
            field: vec![choice_a, standalone, choice_b],
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("choice".to_string()),
                options: Some(OneofOptions::default()),
            }],
            ..Default::default()
        };

        let out = render_with(ProtoSyntax::Proto2, |ctx| render_message(ctx, &message));
        let expected = "message Pick {\n  oneof choice {\n    string a = 1;\n    int32 b = 2;\n  }\n  optional bool c = 3;\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_empty_oneof_still_renders_block() {
        let message = DescriptorProto {
            name: Some("Empty".to_string()),
            oneof_decl: vec![OneofDescriptorProto {
                name: Some("nothing".to_string()),
                options: None,
            }],
            ..Default::default()
        };
        let out = render_with(ProtoSyntax::Proto3, |ctx| render_message(ctx, &message));
        assert!(out.contains("oneof nothing {\n  }"));
    }

    #[test]
    fn test_message_body_ordering() {
        let nested_enum = EnumDescriptorProto {
            name: Some("Kind".to_string()),
            value: vec![EnumValueDescriptorProto {
                name: Some("KIND_UNSPECIFIED".to_string()),
                number: Some(0),
                options: None,
            }],
            ..Default::default()
        };
        let nested_message = DescriptorProto {
            name: Some("Inner".to_string()),
            ..Default::default()
        };
        let message = DescriptorProto {
            name: Some("Outer".to_string()),
            options: Some(MessageOptions {
                deprecated: Some(true),
                ..Default::default()
            }),
            enum_type: vec![nested_enum],
            nested_type: vec![nested_message],
            field: vec![scalar_field("x", 1, Type::Int32)],
            reserved_name: vec!["gone".to_string()],
            reserved_range: vec![ReservedRange {
                start: Some(2),
                end: Some(3),
            }],
            ..Default::default()
        };

        let out = render_with(ProtoSyntax::Proto3, |ctx| render_message(ctx, &message));
        let option_at = out.find("option deprecated = true;").unwrap();
        let enum_at = out.find("enum Kind").unwrap();
        let nested_at = out.find("message Inner").unwrap();
        let field_at = out.find("int32 x = 1;").unwrap();
        let names_at = out.find("reserved \"gone\";").unwrap();
        let ranges_at = out.find("reserved 2;").unwrap();
        assert!(option_at < enum_at);
        assert!(enum_at < nested_at);
        assert!(nested_at < field_at);
        assert!(field_at < names_at);
        assert!(names_at < ranges_at);
    }

    #[test]
    fn test_enum_rendering_with_alias_and_value_options() {
        let enum_type = EnumDescriptorProto {
            name: Some("Status".to_string()),
            options: Some(prost_types::EnumOptions {
                allow_alias: Some(true),
                ..Default::default()
            }),
            value: vec![
                EnumValueDescriptorProto {
                    name: Some("STATUS_OK".to_string()),
                    number: Some(0),
                    options: None,
                },
                EnumValueDescriptorProto {
                    name: Some("STATUS_FINE".to_string()),
                    number: Some(0),
                    options: Some(EnumValueOptions {
                        deprecated: Some(true),
                        ..Default::default()
                    }),
                },
            ],
            ..Default::default()
        };

        let out = render_with(ProtoSyntax::Proto2, |ctx| {
            render_enum(ctx, &enum_type);
            Ok(())
        });
        let expected = "enum Status {\n  option allow_alias = true;\n  STATUS_OK = 0;\n  STATUS_FINE = 0 [deprecated=true];\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_reserved_range_width_rules() {
        let mut out = IndentedEmitter::new();
        render_reserved_ranges(
            &mut out,
            &[
                ReservedRange {
                    start: Some(5),
                    end: Some(8),
                },
                ReservedRange {
                    start: Some(2),
                    end: Some(3),
                },
            ],
        );
        assert_eq!(out.into_string(), "reserved 2, 5 to 7;\n");
    }

    #[test]
    fn test_reserved_range_to_max() {
        let mut out = IndentedEmitter::new();
        render_reserved_ranges(
            &mut out,
            &[ReservedRange {
                start: Some(100),
                end: Some(MAX_FIELD_NUMBER as i32 + 1),
            }],
        );
        assert_eq!(out.into_string(), "reserved 100 to max;\n");
    }

    #[test]
    fn test_reserved_names_quoted_in_order() {
        let mut out = IndentedEmitter::new();
        render_reserved_names(&mut out, &["foo".to_string(), "bar".to_string()]);
        assert_eq!(out.into_string(), "reserved \"foo\", \"bar\";\n");
    }

    #[test]
    fn test_extend_blocks_grouped_by_extendee() {
        let mut first = scalar_field("ext_a", 100, Type::Int32);
        first.extendee = Some(".pkg.Target".to_string());
        let mut other = scalar_field("ext_b", 101, Type::String);
        other.extendee = Some(".pkg.Elsewhere".to_string());
        let mut second = scalar_field("ext_c", 102, Type::Bool);
        second.extendee = Some(".pkg.Target".to_string());

        let extensions = vec![first, other, second];
        let mut ctx = RenderContext::new(ProtoSyntax::Proto2, &extensions);
        render_extend_blocks(&mut ctx).unwrap();
        let out = ctx.finish();

        let expected = "extend .pkg.Target {\n  optional int32 ext_a = 100;\n  optional bool ext_c = 102;\n}\n\nextend .pkg.Elsewhere {\n  optional string ext_b = 101;\n}\n\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_method_without_options_is_single_line() {
        let method = MethodDescriptorProto {
            name: Some("Name".to_string()),
            input_type: Some(".pkg.Input".to_string()),
            output_type: Some(".pkg.Output".to_string()),
            client_streaming: Some(true),
            server_streaming: Some(false),
            options: None,
        };
        let out = render_with(ProtoSyntax::Proto3, |ctx| {
            render_method(ctx, &method);
            Ok(())
        });
        assert_eq!(out, "rpc Name ( stream .pkg.Input ) returns ( .pkg.Output );\n");
    }

    #[test]
    fn test_method_with_options_renders_block() {
        let method = MethodDescriptorProto {
            name: Some("Watch".to_string()),
            input_type: Some(".pkg.Query".to_string()),
            output_type: Some(".pkg.Event".to_string()),
            client_streaming: None,
            server_streaming: Some(true),
            options: Some(MethodOptions {
                deprecated: Some(true),
                idempotency_level: Some(IdempotencyLevel::NoSideEffects as i32),
                ..Default::default()
            }),
        };
        let out = render_with(ProtoSyntax::Proto3, |ctx| {
            render_method(ctx, &method);
            Ok(())
        });
        let expected = "rpc Watch ( .pkg.Query ) returns ( stream .pkg.Event ) {\n  option deprecated = true;\n  option idempotency_level = NO_SIDE_EFFECTS;\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_service_rendering() {
        let service = ServiceDescriptorProto {
            name: Some("Greeter".to_string()),
            method: vec![MethodDescriptorProto {
                name: Some("SayHello".to_string()),
                input_type: Some(".pkg.HelloRequest".to_string()),
                output_type: Some(".pkg.HelloReply".to_string()),
                ..Default::default()
            }],
            options: None,
        };
        let out = render_with(ProtoSyntax::Proto3, |ctx| {
            render_service(ctx, &service);
            Ok(())
        });
        let expected =
            "service Greeter {\n  rpc SayHello ( .pkg.HelloRequest ) returns ( .pkg.HelloReply );\n}\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_file_options_only_set_entries() {
        let options = FileOptions {
            java_package: Some("com.example".to_string()),
            java_multiple_files: Some(true),
            optimize_for: Some(OptimizeMode::Speed as i32),
            ..Default::default()
        };
        let entries = collect_file_options(Some(&options));
        assert_eq!(
            entries,
            vec![
                ("java_package", OptionValue::Str("com.example".to_string())),
                ("java_multiple_files", OptionValue::Bool(true)),
                ("optimize_for", OptionValue::Ident("SPEED".to_string())),
            ]
        );
        assert!(collect_file_options(None).is_empty());
    }

    #[test]
    fn test_option_value_quoting() {
        assert_eq!(OptionValue::Bool(false).to_string(), "false");
        assert_eq!(OptionValue::Int(42).to_string(), "42");
        assert_eq!(
            OptionValue::Str("a \"b\"".to_string()).to_string(),
            "\"a \\\"b\\\"\""
        );
        assert_eq!(OptionValue::Ident("SPEED".to_string()).to_string(), "SPEED");
    }

    #[test]
    fn test_escape_string() {
        assert_eq!(escape_string("hello"), "hello");
        assert_eq!(escape_string("hello\\world"), "hello\\\\world");
        assert_eq!(escape_string("hello\"world"), "hello\\\"world");
        assert_eq!(escape_string("hello\nworld"), "hello\\nworld");
    }

    #[test]
    fn test_to_lower_camel_case() {
        assert_eq!(to_lower_camel_case("hello_world"), "helloWorld");
        assert_eq!(to_lower_camel_case("my_field_name"), "myFieldName");
        assert_eq!(to_lower_camel_case("simple"), "simple");
    }
}
