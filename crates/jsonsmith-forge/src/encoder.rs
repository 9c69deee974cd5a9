//! Emission of specialized marshal routines, one record schema at a time.
//!
//! For each schema this produces two routines: a `marshal_json` wrapper
//! that pre-grows a buffer by the schema's grow hint, and the
//! `marshal_json_buf` body — straight-line writes with conditionals only
//! where omit-empty or nullability demand them. All literal output is
//! batched through the forge's deferred queue so adjacent constants land in
//! one write call.

use crate::{
    forge::Forge,
    schema::{FieldSchema, Kind, RecordSchema},
};

/// Integer-like through containers: decides whether a routine declares the
/// digit scratch local.
fn is_intish(kind: &Kind) -> bool {
    match kind {
        Kind::Int8
        | Kind::Int16
        | Kind::Int32
        | Kind::Int64
        | Kind::Uint8
        | Kind::Uint16
        | Kind::Uint32
        | Kind::Uint64
        | Kind::Usize
        | Kind::Bytes => true,
        Kind::Seq(elem) | Kind::Ptr(elem) => is_intish(elem),
        _ => false,
    }
}

/// Rounds up to the next power of two.
fn p2(v: u32) -> u32 {
    let mut v = v.wrapping_sub(1);
    v |= v >> 1;
    v |= v >> 2;
    v |= v >> 4;
    v |= v >> 8;
    v |= v >> 16;
    v.wrapping_add(1)
}

/// Per-field byte estimate feeding the grow hint.
fn type_size(kind: &Kind) -> u32 {
    match kind {
        Kind::String => 32,
        Kind::Seq(elem) | Kind::Map(elem) => 4 * type_size(elem),
        Kind::Bytes => 4 * type_size(&Kind::Uint8),
        Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Uint8 | Kind::Uint16 | Kind::Uint32 => 8,
        Kind::Int64 | Kind::Uint64 | Kind::Usize => 16,
        Kind::Float32 | Kind::Float64 => 16,
        Kind::Bool => 4,
        Kind::Ptr(elem) => type_size(elem),
        Kind::Record(_) | Kind::Any | Kind::Marshaler | Kind::FastMarshaler => 16,
    }
}

fn total_size(schema: &RecordSchema) -> u32 {
    schema.base_size + schema.fields.iter().map(|f| type_size(&f.kind)).sum::<u32>()
}

/// Growth request for the wrapper routine. Always a power of two.
fn grow_size(schema: &RecordSchema) -> u32 {
    p2(total_size(schema))
}

/// `access` evaluated as a value; `deref` when `access` names a reference.
fn deref_expr(access: &str, deref: bool) -> String {
    if deref {
        format!("(*{access})")
    } else {
        access.to_owned()
    }
}

/// Conditional guard for an omit-empty field.
fn omit_empty_guard(f: &FieldSchema, access: &str, deref: bool) -> String {
    let v = deref_expr(access, deref);
    match &f.kind {
        Kind::Seq(_) | Kind::Map(_) | Kind::String | Kind::Bytes => {
            format!("if !{access}.is_empty() {{\n")
        }
        Kind::Int8
        | Kind::Int16
        | Kind::Int32
        | Kind::Int64
        | Kind::Uint8
        | Kind::Uint16
        | Kind::Uint32
        | Kind::Uint64
        | Kind::Usize => format!("if {v} != 0 {{\n"),
        Kind::Float32 | Kind::Float64 => format!("if {v} != 0.0 {{\n"),
        Kind::Bool => format!("if {v} {{\n"),
        Kind::Ptr(_) => format!("if {access}.is_some() {{\n"),
        // The emitter cannot reason about emptiness for these kinds; the
        // guard degenerates to always-true. See `FieldSchema::omit_empty`.
        Kind::Record(_) | Kind::Any | Kind::Marshaler | Kind::FastMarshaler => {
            "if true {\n".to_owned()
        }
    }
}

/// General-marshaler fallback: encode with the configured delegate and
/// append its bytes as-is.
fn fallback_value(forge: &Forge, name: &str) -> String {
    let rt = &forge.opts.runtime_crate;
    let enc = &forge.opts.fallback_encoder;
    format!("buf.write_slice(&{enc}(&{name}).map_err({rt}::Error::emit)?);\n")
}

fn seq_value(forge: &mut Forge, name: &str, elem: &Kind) -> String {
    let mut out = String::new();
    out.push_str("buf.write_str(\"[\");\n");
    out.push_str(&format!("for (i, v) in {name}.iter().enumerate() {{\n"));
    out.push_str("if i != 0 {\nbuf.write_str(\",\");\n}\n");
    out.push_str(&inner_value(forge, "v", elem, true, false));
    out.push_str("}\n");
    out.push_str("buf.write_str(\"]\");\n");
    out
}

fn inner_value(
    forge: &mut Forge,
    name: &str,
    kind: &Kind,
    deref: bool,
    force_string: bool,
) -> String {
    let rt = forge.opts.runtime_crate.clone();
    let mut out = String::new();

    // Pending literals must land before any value-producing code. Bool is
    // the exception: its branches fold true/false into the pending run.
    if !matches!(kind, Kind::Bool) {
        out.push_str(&forge.q.flush());
    }

    match kind {
        Kind::Int8 | Kind::Int16 | Kind::Int32 | Kind::Int64 => {
            forge.imports.insert(format!("{rt}::format_bits"));
            let v = deref_expr(name, deref);
            out.push_str(&format!(
                "format_bits(&mut scratch, buf, {v} as u64, {v} < 0);\n"
            ));
        }
        Kind::Uint8 | Kind::Uint16 | Kind::Uint32 | Kind::Uint64 | Kind::Usize => {
            forge.imports.insert(format!("{rt}::format_bits"));
            let v = deref_expr(name, deref);
            out.push_str(&format!(
                "format_bits(&mut scratch, buf, {v} as u64, false);\n"
            ));
        }
        Kind::Float32 => {
            forge.imports.insert(format!("{rt}::format_float32"));
            let v = deref_expr(name, deref);
            out.push_str(&format!("format_float32(buf, {v});\n"));
        }
        Kind::Float64 => {
            forge.imports.insert(format!("{rt}::format_float64"));
            let v = deref_expr(name, deref);
            out.push_str(&format!("format_float64(buf, {v});\n"));
        }
        Kind::String => {
            forge.imports.insert(format!("{rt}::write_json_string"));
            if force_string {
                // The inner opening quote was folded into the queue; the
                // value gets a closing quote appended before escaping.
                let v = deref_expr(name, deref);
                out.push_str(&format!(
                    "write_json_string(buf, &format!(\"{{}}\\\"\", {v}));\n"
                ));
            } else {
                let v = if deref {
                    name.to_owned()
                } else {
                    format!("&{name}")
                };
                out.push_str(&format!("write_json_string(buf, {v});\n"));
            }
        }
        Kind::Bool => {
            let v = deref_expr(name, deref);
            out.push_str(&format!("if {v} {{\n"));
            forge.q.write("true");
            out.push_str(&forge.q.get_queued());
            out.push_str("} else {\n");
            // The other branch replaces the queued `true`.
            forge.q.delete_last();
            out.push_str(&forge.q.write_flush("false"));
            out.push_str("}\n");
        }
        Kind::Bytes => out.push_str(&seq_value(forge, name, &Kind::Uint8)),
        Kind::Seq(elem) => out.push_str(&seq_value(forge, name, elem)),
        Kind::Ptr(elem) => {
            out.push_str(&format!("if let Some(v) = {name}.as_ref() {{\n"));
            out.push_str(&inner_value(forge, "v", elem, true, false));
            out.push_str("} else {\n");
            out.push_str("buf.write_str(\"null\");\n");
            out.push_str("}\n");
        }
        Kind::Record(type_name) => {
            if forge.in_round(type_name) {
                out.push_str(&format!("{name}.marshal_json_buf(buf)?;\n"));
            } else {
                out.push_str(&fallback_value(forge, name));
            }
        }
        Kind::FastMarshaler => {
            out.push_str(&format!("{name}.marshal_json_buf(buf)?;\n"));
        }
        Kind::Marshaler => {
            out.push_str(&format!("buf.write_slice(&{name}.marshal_json()?);\n"));
        }
        Kind::Map(_) | Kind::Any => out.push_str(&fallback_value(forge, name)),
    }
    out
}

/// Value emission for one field, including force-string quoting.
fn value(forge: &mut Forge, f: &FieldSchema) -> String {
    let (access, deref) = if f.pointer {
        ("v".to_owned(), true)
    } else {
        (format!("self.{}", f.name), false)
    };

    let mut close_quote = false;
    if f.force_string && !f.pointer {
        match &f.kind {
            Kind::Int8
            | Kind::Int16
            | Kind::Int32
            | Kind::Int64
            | Kind::Uint8
            | Kind::Uint16
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Usize
            | Kind::Float32
            | Kind::Float64
            | Kind::Bool => {
                forge.q.write("\"");
                close_quote = true;
            }
            // The inner string's opening quote folds into the literal run.
            Kind::String => forge.q.write("\"\\"),
            _ => {}
        }
    }

    let out = inner_value(forge, &access, &f.kind, deref, f.force_string && !f.pointer);
    if close_quote {
        forge.q.write("\"");
    }
    out
}

/// Emits both marshal routines for `schema` into the forge.
pub(crate) fn create_marshal(forge: &mut Forge, schema: &RecordSchema) {
    tracing::debug!(
        record = %schema.name,
        fields = schema.fields.len(),
        "emitting marshal routines"
    );

    let rt = forge.opts.runtime_crate.clone();
    forge.imports.insert(format!("{rt}::EncodingBuffer"));
    forge.imports.insert(format!("{rt}::Marshal"));
    forge.imports.insert(format!("{rt}::MarshalFast"));

    let conditional_writes = schema.fields.last().is_some_and(|f| f.omit_empty);
    let need_scratch = schema.fields.iter().any(|f| is_intish(&f.kind));

    let mut out = String::new();
    out.push_str(&format!("impl Marshal for {} {{\n", schema.name));
    out.push_str(&format!(
        "fn marshal_json(&self) -> Result<Vec<u8>, {rt}::Error> {{\n"
    ));
    out.push_str(&format!("let mut buf = {rt}::Buffer::new();\n"));
    out.push_str(&format!("buf.grow({});\n", grow_size(schema)));
    out.push_str("self.marshal_json_buf(&mut buf)?;\n");
    out.push_str("Ok(buf.into_bytes())\n");
    out.push_str("}\n");
    out.push_str("}\n");

    out.push_str(&format!("impl MarshalFast for {} {{\n", schema.name));
    out.push_str(&format!(
        "fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), {rt}::Error> {{\n"
    ));
    if need_scratch {
        forge.imports.insert(format!("{rt}::FormatBitsScratch"));
        out.push_str("let mut scratch = FormatBitsScratch::default();\n");
    }

    forge.q.write("{");
    // The sentinel space is consumed by the first unconditional member or
    // rewound at the end along with a trailing comma.
    let mut sentinel = false;
    if conditional_writes || schema.fields.is_empty() {
        forge.q.write(" ");
        sentinel = true;
    }

    for f in &schema.fields {
        let access = format!("self.{}", f.name);

        if f.omit_empty {
            sentinel = false;
            out.push_str(&forge.q.flush());
            if f.pointer {
                out.push_str(&format!("if let Some(v) = {access}.as_ref() {{\n"));
                out.push_str(&omit_empty_guard(f, "v", true));
            } else {
                out.push_str(&omit_empty_guard(f, &access, false));
            }
        }
        if f.pointer && !f.omit_empty {
            out.push_str(&format!("if let Some(v) = {access}.as_ref() {{\n"));
        }
        if sentinel {
            forge.q.delete_last();
            sentinel = false;
        }

        // The key arrives pre-escaped and quoted; inline it verbatim.
        forge.q.write(&f.json_key);
        // Kept so a null branch can replay the pending literals.
        let snapshot = forge.q.clone();

        out.push_str(&value(forge, f));
        forge.q.write(",");

        if f.pointer && !f.omit_empty {
            out.push_str("} else {\n");
            let mut null_q = snapshot;
            out.push_str(&null_q.write_flush("null"));
            out.push_str("}\n");
        }
        if f.omit_empty {
            out.push_str(&forge.q.flush());
            out.push_str("}\n");
            if f.pointer {
                out.push_str("}\n");
            }
        }
    }

    // The trailing separator: with a conditional tail, back the buffer up
    // one byte at runtime (comma or sentinel space); otherwise the comma is
    // still queued and can be dropped here.
    if conditional_writes {
        out.push_str(&forge.q.flush());
        out.push_str("buf.rewind(1);\n");
    } else {
        forge.q.delete_last();
    }
    out.push_str(&forge.q.write_flush("}"));
    out.push_str("Ok(())\n");
    out.push_str("}\n");
    out.push_str("}\n");

    forge.funcs.push(out);
}
