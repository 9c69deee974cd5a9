//! Materialized generator output, exercised against the runtime.
//!
//! The impl blocks below are the (rustfmt'd) output of `jsonsmith-forge`
//! for the schemas built in `sample_schemas`; `emission_matches_this_file`
//! keeps the two in sync. The behavior tests then pin the emitted bytes.

use std::collections::BTreeMap;

use jsonsmith::EncodingBuffer;
use jsonsmith::FormatBitsScratch;
use jsonsmith::Marshal;
use jsonsmith::MarshalFast;
use jsonsmith::format_bits;
use jsonsmith::write_json_string;
use jsonsmith_forge::{FieldSchema, Forge, Kind, RecordSchema};
use serde::Serialize;

struct Author {
    id: i64,
    name: String,
}

#[derive(Default)]
struct Profile {
    id: i64,
    nickname: String,
}

#[derive(Default)]
struct Sparse {
    id: i64,
    nickname: String,
}

struct Inner {
    n: i32,
}

struct Wrapper {
    inner: Option<Inner>,
}

struct Flag {
    ok: bool,
}

struct Stringly {
    id: i64,
}

struct Tagged {
    tags: Vec<String>,
}

struct Loose {
    extra: BTreeMap<String, String>,
}

#[derive(Serialize)]
struct GeoTag {
    lat: f64,
    lon: f64,
}

struct Pinned {
    spot: GeoTag,
}

impl Marshal for Author {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(128);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Author {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        let mut scratch = FormatBitsScratch::default();
        buf.write_str("{\"id\":");
        format_bits(&mut scratch, buf, self.id as u64, self.id < 0);
        buf.write_str(",\"name\":");
        write_json_string(buf, &self.name);
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Profile {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(128);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Profile {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        let mut scratch = FormatBitsScratch::default();
        buf.write_str("{\"id\":");
        format_bits(&mut scratch, buf, self.id as u64, self.id < 0);
        buf.write_str(",");
        if !self.nickname.is_empty() {
            buf.write_str("\"nickname\":");
            write_json_string(buf, &self.nickname);
            buf.write_str(",");
        }
        buf.rewind(1);
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Sparse {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(128);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Sparse {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        let mut scratch = FormatBitsScratch::default();
        buf.write_str("{ ");
        if self.id != 0 {
            buf.write_str("\"id\":");
            format_bits(&mut scratch, buf, self.id as u64, self.id < 0);
            buf.write_str(",");
        }
        if !self.nickname.is_empty() {
            buf.write_str("\"nickname\":");
            write_json_string(buf, &self.nickname);
            buf.write_str(",");
        }
        buf.rewind(1);
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Inner {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(16);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Inner {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        let mut scratch = FormatBitsScratch::default();
        buf.write_str("{\"n\":");
        format_bits(&mut scratch, buf, self.n as u64, self.n < 0);
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Wrapper {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(32);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Wrapper {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        if let Some(v) = self.inner.as_ref() {
            buf.write_str("{\"inner\":");
            v.marshal_json_buf(buf)?;
        } else {
            buf.write_str("{\"inner\":null");
        }
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Flag {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(8);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Flag {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        if self.ok {
            buf.write_str("{\"ok\":true");
        } else {
            buf.write_str("{\"ok\":false");
        }
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Stringly {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(32);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Stringly {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        let mut scratch = FormatBitsScratch::default();
        buf.write_str("{\"id\":\"");
        format_bits(&mut scratch, buf, self.id as u64, self.id < 0);
        buf.write_str("\"}");
        Ok(())
    }
}

impl Marshal for Tagged {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(256);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Tagged {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        buf.write_str("{\"tags\":");
        buf.write_str("[");
        for (i, v) in self.tags.iter().enumerate() {
            if i != 0 {
                buf.write_str(",");
            }
            write_json_string(buf, v);
        }
        buf.write_str("]");
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Loose {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(256);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Loose {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        buf.write_str("{\"extra\":");
        buf.write_slice(&serde_json::to_vec(&self.extra).map_err(jsonsmith::Error::emit)?);
        buf.write_str("}");
        Ok(())
    }
}

impl Marshal for Pinned {
    fn marshal_json(&self) -> Result<Vec<u8>, jsonsmith::Error> {
        let mut buf = jsonsmith::Buffer::new();
        buf.grow(32);
        self.marshal_json_buf(&mut buf)?;
        Ok(buf.into_bytes())
    }
}
impl MarshalFast for Pinned {
    fn marshal_json_buf(&self, buf: &mut dyn EncodingBuffer) -> Result<(), jsonsmith::Error> {
        buf.write_str("{\"spot\":");
        buf.write_slice(&serde_json::to_vec(&self.spot).map_err(jsonsmith::Error::emit)?);
        buf.write_str("}");
        Ok(())
    }
}

fn marshal(value: &impl Marshal) -> String {
    String::from_utf8(value.marshal_json().unwrap()).unwrap()
}

fn sample_schemas() -> Vec<RecordSchema> {
    let omit = |name: &str, kind: Kind| {
        let mut f = FieldSchema::new(name, kind);
        f.omit_empty = true;
        f
    };
    vec![
        RecordSchema::new(
            "Author",
            vec![
                FieldSchema::new("id", Kind::Int64),
                FieldSchema::new("name", Kind::String),
            ],
            32,
        ),
        RecordSchema::new(
            "Profile",
            vec![
                FieldSchema::new("id", Kind::Int64),
                omit("nickname", Kind::String),
            ],
            32,
        ),
        RecordSchema::new(
            "Sparse",
            vec![omit("id", Kind::Int64), omit("nickname", Kind::String)],
            32,
        ),
        RecordSchema::new("Inner", vec![FieldSchema::new("n", Kind::Int32)], 8),
        RecordSchema::new(
            "Wrapper",
            vec![{
                let mut f = FieldSchema::new("inner", Kind::Record("Inner".into()));
                f.pointer = true;
                f
            }],
            8,
        ),
        RecordSchema::new("Flag", vec![FieldSchema::new("ok", Kind::Bool)], 1),
        RecordSchema::new(
            "Stringly",
            vec![{
                let mut f = FieldSchema::new("id", Kind::Int64);
                f.force_string = true;
                f
            }],
            8,
        ),
        RecordSchema::new(
            "Tagged",
            vec![FieldSchema::new("tags", Kind::Seq(Box::new(Kind::String)))],
            24,
        ),
        RecordSchema::new(
            "Loose",
            vec![FieldSchema::new(
                "extra",
                Kind::Map(Box::new(Kind::String)),
            )],
            8,
        ),
        RecordSchema::new("Pinned", vec![FieldSchema::new("spot", Kind::Any)], 8),
    ]
}

/// Every statement the impls above execute appears verbatim in the
/// generator's output for the same schemas.
#[test]
fn emission_matches_this_file() {
    let mut forge = Forge::new(sample_schemas());
    forge.generate().unwrap();
    let out = forge.finish();

    for stmt in [
        "buf.grow(128);",
        "buf.write_str(\"{\\\"id\\\":\");",
        "format_bits(&mut scratch, buf, self.id as u64, self.id < 0);",
        "buf.write_str(\",\\\"name\\\":\");",
        "write_json_string(buf, &self.name);",
        "if !self.nickname.is_empty() {",
        "buf.rewind(1);",
        "buf.write_str(\"{ \");",
        "if self.id != 0 {",
        "if let Some(v) = self.inner.as_ref() {",
        "v.marshal_json_buf(buf)?;",
        "buf.write_str(\"{\\\"inner\\\":null\");",
        "buf.write_str(\"{\\\"ok\\\":true\");",
        "buf.write_str(\"{\\\"ok\\\":false\");",
        "buf.write_str(\"{\\\"id\\\":\\\"\");",
        "buf.write_str(\"\\\"}\");",
        "for (i, v) in self.tags.iter().enumerate() {",
        "buf.write_slice(&serde_json::to_vec(&self.extra).map_err(jsonsmith::Error::emit)?);",
        "buf.write_slice(&serde_json::to_vec(&self.spot).map_err(jsonsmith::Error::emit)?);",
    ] {
        assert!(out.contains(stmt), "missing {stmt:?} in:\n{out}");
    }
}

#[test]
fn simple_record() {
    let author = Author {
        id: 42,
        name: "ok".into(),
    };
    assert_eq!(marshal(&author), "{\"id\":42,\"name\":\"ok\"}");
}

#[test]
fn omit_empty_trailing_field_rewinds_the_comma() {
    let profile = Profile {
        id: 7,
        ..Profile::default()
    };
    assert_eq!(marshal(&profile), "{\"id\":7}");

    let profile = Profile {
        id: 7,
        nickname: "kit".into(),
    };
    assert_eq!(marshal(&profile), "{\"id\":7,\"nickname\":\"kit\"}");
}

#[test]
fn all_omit_empty_zero_collapses_to_empty_object() {
    assert_eq!(marshal(&Sparse::default()), "{}");
}

#[test]
fn partially_set_sparse_record_stays_parseable() {
    let sparse = Sparse {
        id: 9,
        ..Sparse::default()
    };
    let parsed: serde_json::Value = serde_json::from_str(&marshal(&sparse)).unwrap();
    assert_eq!(parsed, serde_json::json!({"id": 9}));
}

#[test]
fn nil_pointer_encodes_null() {
    assert_eq!(marshal(&Wrapper { inner: None }), "{\"inner\":null}");
    assert_eq!(
        marshal(&Wrapper {
            inner: Some(Inner { n: 5 })
        }),
        "{\"inner\":{\"n\":5}}"
    );
}

#[test]
fn folded_booleans() {
    assert_eq!(marshal(&Flag { ok: true }), "{\"ok\":true}");
    assert_eq!(marshal(&Flag { ok: false }), "{\"ok\":false}");
}

#[test]
fn force_string_integers() {
    assert_eq!(marshal(&Stringly { id: 42 }), "{\"id\":\"42\"}");
    assert_eq!(marshal(&Stringly { id: -7 }), "{\"id\":\"-7\"}");
}

#[test]
fn sequences_separate_elements() {
    assert_eq!(marshal(&Tagged { tags: vec![] }), "{\"tags\":[]}");
    assert_eq!(
        marshal(&Tagged {
            tags: vec!["a".into(), "b\"c".into()]
        }),
        "{\"tags\":[\"a\",\"b\\\"c\"]}"
    );
}

#[test]
fn map_fields_delegate_to_the_fallback_encoder() {
    let mut extra = BTreeMap::new();
    extra.insert("a".to_owned(), "b".to_owned());
    assert_eq!(marshal(&Loose { extra }), "{\"extra\":{\"a\":\"b\"}}");
}

#[test]
fn any_fields_delegate_to_the_fallback_encoder() {
    let pinned = Pinned {
        spot: GeoTag { lat: 1.5, lon: -2.25 },
    };
    assert_eq!(marshal(&pinned), "{\"spot\":{\"lat\":1.5,\"lon\":-2.25}}");
}

#[test]
fn wrapper_and_buffer_entry_points_agree() {
    let author = Author {
        id: -3,
        name: "x".into(),
    };
    let mut buf = jsonsmith::Buffer::new();
    author.marshal_json_buf(&mut buf).unwrap();
    assert_eq!(author.marshal_json().unwrap(), buf.into_bytes());
}

#[test]
fn emitted_bytes_parse_with_a_conformant_parser() {
    let author = Author {
        id: i64::MIN,
        name: "esc \"\\ \n \u{1F600}".into(),
    };
    let parsed: serde_json::Value = serde_json::from_slice(&author.marshal_json().unwrap()).unwrap();
    assert_eq!(parsed["id"], serde_json::json!(i64::MIN));
    assert_eq!(parsed["name"], serde_json::json!("esc \"\\ \n \u{1F600}"));
}
