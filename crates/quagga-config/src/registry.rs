//! Compiled line matchers, built once from the static schema.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::schema::{AttributeSpec, BlockSchema, Kind, Scope, Section, BLOCKS};

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid regex pattern")
}

/// One entry of a section's ordered dispatch table.
pub(crate) enum Matcher {
    /// A line pattern owned by one attribute.
    Attribute {
        kind: Kind,
        spec: &'static AttributeSpec,
        regex: Regex,
    },
    /// A whole-line record filling identity and every attribute.
    Record { kind: Kind, regex: Regex },
}

impl Matcher {
    pub(crate) fn kind(&self) -> Kind {
        match self {
            Matcher::Attribute { kind, .. } | Matcher::Record { kind, .. } => *kind,
        }
    }

    pub(crate) fn regex(&self) -> &Regex {
        match self {
            Matcher::Attribute { regex, .. } | Matcher::Record { regex, .. } => regex,
        }
    }

    pub(crate) fn scope(&self) -> Scope {
        match self {
            Matcher::Attribute { spec, .. } => spec.scope,
            Matcher::Record { .. } => Scope::Root,
        }
    }
}

pub(crate) struct CompiledSubBlock {
    pub(crate) enter: Regex,
    pub(crate) exit: Regex,
    pub(crate) root: &'static [(&'static str, &'static str)],
    pub(crate) defaults: &'static [(&'static str, &'static str)],
}

pub(crate) struct CompiledBlock {
    pub(crate) section: Section,
    pub(crate) header: Regex,
    pub(crate) sub_block: Option<CompiledSubBlock>,
    /// Kinds whose identity is complete once the header is seen; they are
    /// created when the block opens.
    pub(crate) openers: Vec<Kind>,
    pub(crate) matchers: Vec<Matcher>,
}

pub(crate) struct Registry {
    pub(crate) blocks: Vec<CompiledBlock>,
    pub(crate) top_level: Vec<Matcher>,
}

pub(crate) static REGISTRY: Lazy<Registry> = Lazy::new(Registry::build);

impl Registry {
    fn build() -> Self {
        let blocks = BLOCKS.iter().map(compile_block).collect();
        let top_level = matchers(Section::TopLevel);
        Self { blocks, top_level }
    }
}

fn compile_block(block: &'static BlockSchema) -> CompiledBlock {
    let header = compile(block.header);
    let header_fields: Vec<&str> = header.capture_names().flatten().collect();

    let openers = Kind::ALL
        .iter()
        .copied()
        .filter(|kind| {
            let schema = kind.schema();
            schema.section == block.section
                && schema
                    .identity
                    .iter()
                    .all(|field| header_fields.contains(field) || schema.fixed(field).is_some())
        })
        .collect();

    let sub_block = block.sub_block.map(|sub| CompiledSubBlock {
        enter: compile(sub.enter),
        exit: compile(sub.exit),
        root: sub.root,
        defaults: sub.defaults,
    });

    CompiledBlock {
        section: block.section,
        header,
        sub_block,
        openers,
        matchers: matchers(block.section),
    }
}

/// Ordered dispatch table: kinds in [`Kind::ALL`] order, attributes in
/// schema order within each kind.
fn matchers(section: Section) -> Vec<Matcher> {
    let mut out = Vec::new();
    for kind in Kind::ALL {
        let schema = kind.schema();
        if schema.section != section {
            continue;
        }
        if let Some(record) = schema.record {
            out.push(Matcher::Record {
                kind,
                regex: compile(record.pattern),
            });
            continue;
        }
        for spec in schema.attributes {
            if let Some(pattern) = spec.pattern() {
                out.push(Matcher::Attribute {
                    kind,
                    spec,
                    regex: compile(pattern),
                });
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_pattern_compiles() {
        let registry = &*REGISTRY;
        assert_eq!(registry.blocks.len(), BLOCKS.len());
        assert!(!registry.top_level.is_empty());
    }

    #[test]
    fn test_block_openers() {
        let openers: Vec<(Section, Vec<Kind>)> = REGISTRY
            .blocks
            .iter()
            .map(|block| (block.section, block.openers.clone()))
            .collect();
        assert_eq!(
            openers,
            vec![
                (Section::RouterBgp, vec![Kind::BgpRouter]),
                (Section::RouterOspf, vec![Kind::OspfRouter]),
                (Section::Interface, vec![Kind::Interface]),
                (Section::RouteMap, vec![Kind::RouteMap]),
            ]
        );
    }

    #[test]
    fn test_specific_pattern_precedes_generic() {
        let bgp = &REGISTRY.blocks[0];
        let line = " maximum-paths ibgp 4";
        let first = bgp
            .matchers
            .iter()
            .find(|matcher| matcher.regex().is_match(line))
            .unwrap();
        match first {
            Matcher::Attribute { spec, .. } => assert_eq!(spec.name, "maximum_paths_ibgp"),
            Matcher::Record { .. } => panic!("Expected attribute matcher"),
        }
    }

    #[test]
    fn test_top_level_includes_records() {
        assert!(REGISTRY
            .top_level
            .iter()
            .any(|matcher| matches!(matcher, Matcher::Record { kind: Kind::PrefixList, .. })));
        assert!(REGISTRY
            .top_level
            .iter()
            .all(|matcher| matcher.kind().schema().section == Section::TopLevel));
    }
}
