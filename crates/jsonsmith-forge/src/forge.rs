//! Generation context for one inception round.

use std::collections::BTreeSet;

use crate::{
    encoder,
    queue::DeferredQueue,
    schema::{RecordSchema, SchemaError},
};

/// Generator configuration.
#[derive(Debug, Clone)]
pub struct ForgeOptions {
    /// Crate path prefixed to runtime helper references in emitted code.
    pub runtime_crate: String,
    /// Function path emitted for kinds the generator cannot specialize
    /// (`Any`, string-keyed maps, out-of-round records). Must have the
    /// shape `fn(&T) -> Result<Vec<u8>, E>` with `E` convertible to a
    /// boxed error; the generator never inspects its behavior.
    pub fallback_encoder: String,
}

impl Default for ForgeOptions {
    fn default() -> Self {
        Self {
            runtime_crate: "jsonsmith".to_owned(),
            fallback_encoder: "serde_json::to_vec".to_owned(),
        }
    }
}

/// One generation round over a batch of schemas that recognize each other
/// as fast-marshaler-capable.
///
/// The context accumulates the imports the emitted code requires and the
/// emitted routine bodies; [`Forge::finish`] consumes it into the output
/// artifact text.
#[derive(Debug)]
pub struct Forge {
    pub(crate) schemas: Vec<RecordSchema>,
    pub(crate) imports: BTreeSet<String>,
    pub(crate) funcs: Vec<String>,
    pub(crate) q: DeferredQueue,
    pub(crate) opts: ForgeOptions,
}

impl Forge {
    pub fn new(schemas: Vec<RecordSchema>) -> Self {
        Self::with_options(schemas, ForgeOptions::default())
    }

    pub fn with_options(schemas: Vec<RecordSchema>, opts: ForgeOptions) -> Self {
        Self {
            schemas,
            imports: BTreeSet::new(),
            funcs: Vec::new(),
            q: DeferredQueue::new(),
            opts,
        }
    }

    /// Whether a record type participates in this round. In-round fields
    /// compile to a direct fast-path call.
    pub(crate) fn in_round(&self, name: &str) -> bool {
        self.schemas.iter().any(|s| s.name == name)
    }

    /// Validates every schema, then emits both marshal routines for each.
    pub fn generate(&mut self) -> Result<(), SchemaError> {
        for schema in &self.schemas {
            schema.validate()?;
        }
        for i in 0..self.schemas.len() {
            let schema = self.schemas[i].clone();
            encoder::create_marshal(self, &schema);
        }
        Ok(())
    }

    /// Set of `use` paths the emitted code requires so far.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    /// Assembles the output artifact: `use` lines, then routine bodies.
    /// The caller owns writing it to disk and formatting.
    pub fn finish(self) -> String {
        let mut out = String::new();
        for import in &self.imports {
            out.push_str("use ");
            out.push_str(import);
            out.push_str(";\n");
        }
        if !self.imports.is_empty() {
            out.push('\n');
        }
        for func in &self.funcs {
            out.push_str(func);
            out.push('\n');
        }
        out
    }
}
