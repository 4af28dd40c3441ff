//! WebAssembly binaries as an ordered list of sections.
//!
//! Passes in this crate work at section granularity: they inspect section
//! ids and custom section names, and drop whole sections. Section payloads
//! are copied through untouched.

use anyhow::{bail, Context, Result};
use std::ops::Range;
use wasmparser::{Encoding, Parser, Payload, Validator, WasmFeatures};

/// Magic number plus version.
const HEADER_LEN: usize = 8;

const CUSTOM_SECTION_ID: u8 = 0;

/// A top-level section of a module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: u8,
    /// Set for custom sections only.
    pub name: Option<String>,
    /// Payload bytes, excluding the id and size prefix.
    pub range: Range<usize>,
}

impl Section {
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_SECTION_ID
    }

    pub fn custom_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A core WebAssembly module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WasmModule {
    bytes: Vec<u8>,
}

impl WasmModule {
    /// Wraps `bytes` after checking they parse as a core module.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let module = Self { bytes };
        module.sections().context("input is not a WebAssembly module")?;
        Ok(module)
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Lists top-level sections in binary order.
    pub fn sections(&self) -> Result<Vec<Section>> {
        let mut sections = Vec::new();
        for payload in Parser::new(0).parse_all(&self.bytes) {
            let payload = payload?;
            if let Payload::Version {
                encoding: Encoding::Component,
                ..
            } = payload
            {
                bail!("components are not supported");
            }
            let Some((id, range)) = payload.as_section() else {
                continue;
            };
            let name = match &payload {
                Payload::CustomSection(reader) => Some(reader.name().to_string()),
                _ => None,
            };
            sections.push(Section { id, name, range });
        }
        Ok(sections)
    }

    pub fn custom_section_names(&self) -> Result<Vec<String>> {
        Ok(self
            .sections()?
            .into_iter()
            .filter_map(|section| section.name)
            .collect())
    }

    /// Keeps only the sections for which `keep` returns true.
    ///
    /// Returns how many sections were removed. The binary is left untouched
    /// when nothing is removed.
    pub fn retain_sections<F>(&mut self, mut keep: F) -> Result<usize>
    where
        F: FnMut(&Section) -> bool,
    {
        let sections = self.sections()?;
        let mut out = Vec::with_capacity(self.bytes.len());
        out.extend_from_slice(&self.bytes[..HEADER_LEN]);
        let mut removed = 0;
        for section in &sections {
            if !keep(section) {
                removed += 1;
                continue;
            }
            let size = u32::try_from(section.range.len())
                .with_context(|| format!("section {} is too large", section.id))?;
            out.push(section.id);
            write_u32_leb128(&mut out, size);
            out.extend_from_slice(&self.bytes[section.range.clone()]);
        }
        if removed > 0 {
            self.bytes = out;
        }
        Ok(removed)
    }

    pub fn validate(&self, features: WasmFeatures) -> Result<()> {
        Validator::new_with_features(features)
            .validate_all(&self.bytes)
            .context("module failed validation")?;
        Ok(())
    }
}

fn write_u32_leb128(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}
