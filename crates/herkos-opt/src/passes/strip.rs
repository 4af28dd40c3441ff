//! Custom section stripping.

use crate::module::WasmModule;
use anyhow::{bail, Result};
use herkos_passes::{Pass, PassOptions};

/// Pass argument listing the sections `strip-custom-sections` removes.
pub const STRIP_CUSTOM_SECTIONS_ARG: &str = "strip-custom-sections";

pub fn is_dwarf_section(name: &str) -> bool {
    name.starts_with(".debug_")
}

pub fn is_debug_section(name: &str) -> bool {
    name == "name"
        || name == "sourceMappingURL"
        || name == "external_debug_info"
        || is_dwarf_section(name)
}

/// Removes every custom section whose name matches.
pub struct StripSections {
    matches: fn(&str) -> bool,
}

impl Pass<WasmModule> for StripSections {
    fn run(&mut self, module: &mut WasmModule, _options: &PassOptions) -> Result<()> {
        let matches = self.matches;
        let removed = module.retain_sections(|s| !s.custom_name().is_some_and(matches))?;
        log::debug!("removed {removed} custom sections");
        Ok(())
    }
}

/// Removes the custom sections listed in the `strip-custom-sections`
/// pass argument (comma separated).
pub struct StripNamedSections;

impl Pass<WasmModule> for StripNamedSections {
    fn run(&mut self, module: &mut WasmModule, options: &PassOptions) -> Result<()> {
        let Some(list) = options.argument(STRIP_CUSTOM_SECTIONS_ARG) else {
            bail!(
                "strip-custom-sections needs --pass-arg {}:NAME[,NAME...]",
                STRIP_CUSTOM_SECTIONS_ARG
            );
        };
        let names: Vec<&str> = list.split(',').filter(|n| !n.is_empty()).collect();
        let removed =
            module.retain_sections(|s| !s.custom_name().is_some_and(|n| names.contains(&n)))?;
        log::debug!("removed {removed} of {:?}", names);
        Ok(())
    }
}

pub fn debug() -> Box<dyn Pass<WasmModule>> {
    Box::new(StripSections {
        matches: is_debug_section,
    })
}

pub fn dwarf() -> Box<dyn Pass<WasmModule>> {
    Box::new(StripSections {
        matches: is_dwarf_section,
    })
}

pub fn producers() -> Box<dyn Pass<WasmModule>> {
    Box::new(StripSections {
        matches: |name| name == "producers",
    })
}

pub fn target_features() -> Box<dyn Pass<WasmModule>> {
    Box::new(StripSections {
        matches: |name| name == "target_features",
    })
}

pub fn named() -> Box<dyn Pass<WasmModule>> {
    Box::new(StripNamedSections)
}
