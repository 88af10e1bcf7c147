//! Pack manifest
//!
//! The manifest is a nested-tag text directory stored between the header and
//! the payload. The runtime's config parser reads it, so the layout below is
//! reproduced exactly, tabs and newlines included:
//!
//! ```text
//! <root>
//! 	<item name="tex.raw">
//! 		<item name="Offset" type="Integer">
//! 			0
//! 		</item>
//! 		<item name="Size" type="Integer">
//! 			64
//! 		</item>
//! 		<item name="Width" type="Integer">
//! 			4
//! 		</item>
//! 	</item>
//! </root>
//! ```
//!
//! Image entries add `Width`; model entries add `MinX`..`MaxZ` (Float) and
//! `Version`. Emission is deterministic for a given entry list, since its
//! byte length is baked into the header.

use crate::archive::{Entry, EntryKind, Extents};
use crate::error::{PackError, Result};
use roxmltree::{Document, Node};
use std::collections::HashSet;

const ROOT_TAG: &str = "root";
const ITEM_TAG: &str = "item";

/// Leaf value type, spelled out in the `type` attribute
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LeafValue {
    Integer(i64),
    Float(f32),
}

impl LeafValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Integer(v) => v.to_string(),
            Self::Float(v) => format_float(*v),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(v) => Some(*v),
            Self::Float(_) => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Integer(_) => None,
        }
    }
}

/// Named, typed leaf under an entry node
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub name: String,
    pub value: LeafValue,
}

impl Leaf {
    fn integer(name: &str, value: u64) -> Self {
        Self {
            name: name.to_string(),
            value: LeafValue::Integer(value as i64),
        }
    }

    fn float(name: &str, value: f32) -> Self {
        Self {
            name: name.to_string(),
            value: LeafValue::Float(value),
        }
    }
}

/// Leaves recorded for `entry`, in emission order
pub fn leaves_for(entry: &Entry) -> Vec<Leaf> {
    let mut leaves = vec![
        Leaf::integer("Offset", entry.offset),
        Leaf::integer("Size", entry.effective_size),
    ];

    match entry.kind {
        EntryKind::Image { width } => leaves.push(Leaf::integer("Width", width as u64)),
        EntryKind::Model { extents, version } => {
            leaves.push(Leaf::float("MinX", extents.min[0]));
            leaves.push(Leaf::float("MinY", extents.min[1]));
            leaves.push(Leaf::float("MinZ", extents.min[2]));
            leaves.push(Leaf::float("MaxX", extents.max[0]));
            leaves.push(Leaf::float("MaxY", extents.max[1]));
            leaves.push(Leaf::float("MaxZ", extents.max[2]));
            leaves.push(Leaf::integer("Version", version as u64));
        }
        EntryKind::Script | EntryKind::Generic => {}
    }

    leaves
}

/// Serialize planned entries into manifest text
pub fn emit(entries: &[Entry]) -> Result<String> {
    let mut out = String::new();
    out.push_str("<root>\n");

    for entry in entries {
        validate_name(&entry.name)?;

        out.push_str(&format!("\t<item name=\"{}\">\n", entry.name));
        for leaf in leaves_for(entry) {
            if let LeafValue::Float(value) = leaf.value {
                if !value.is_finite() {
                    return Err(PackError::NonFiniteExtent {
                        name: entry.name.clone(),
                    });
                }
            }
            out.push_str(&format!(
                "\t\t<item name=\"{}\" type=\"{}\">\n",
                leaf.name,
                leaf.value.type_name()
            ));
            out.push_str(&format!("\t\t\t{}\n", leaf.value.render()));
            out.push_str("\t\t</item>\n");
        }
        out.push_str("\t</item>\n");
    }

    out.push_str("</root>\n");
    Ok(out)
}

/// Check that `name` can be carried inside a `name="..."` attribute
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PackError::InvalidName("empty name".to_string()));
    }

    if let Some(c) = name
        .chars()
        .find(|c| matches!(c, '"' | '<' | '>' | '&') || c.is_control())
    {
        return Err(PackError::InvalidName(format!(
            "{:?} contains reserved character {:?}",
            name, c
        )));
    }

    Ok(())
}

/// Shortest round-trip decimal, always with a decimal point.
///
/// Non-finite values have no decimal form; [`emit`] refuses them.
pub fn format_float(value: f32) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// One entry as read back from manifest text
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub name: String,
    pub offset: u64,
    pub size: u64,
    pub leaves: Vec<Leaf>,
}

impl ManifestEntry {
    pub fn leaf(&self, name: &str) -> Option<&LeafValue> {
        self.leaves.iter().find(|l| l.name == name).map(|l| &l.value)
    }

    pub fn width(&self) -> Option<u32> {
        self.leaf("Width")
            .and_then(LeafValue::as_integer)
            .and_then(|v| u32::try_from(v).ok())
    }

    pub fn version(&self) -> Option<u32> {
        self.leaf("Version")
            .and_then(LeafValue::as_integer)
            .and_then(|v| u32::try_from(v).ok())
    }

    /// Model extents, present only when all six leaves are
    pub fn extents(&self) -> Option<Extents> {
        let get = |name: &str| self.leaf(name).and_then(LeafValue::as_float);
        Some(Extents {
            min: [get("MinX")?, get("MinY")?, get("MinZ")?],
            max: [get("MaxX")?, get("MaxY")?, get("MaxZ")?],
        })
    }
}

/// Parsed manifest, entries in stored order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Manifest {
    pub entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse manifest text
    pub fn parse(text: &str) -> Result<Self> {
        let document = Document::parse(text)?;
        let root = document.root_element();
        if root.tag_name().name() != ROOT_TAG {
            return Err(PackError::InvalidManifest(format!(
                "expected <{}>, found <{}>",
                ROOT_TAG,
                root.tag_name().name()
            )));
        }

        let mut seen = HashSet::new();
        let mut entries = Vec::new();
        for node in items(root) {
            let entry = parse_entry(node?)?;
            if !seen.insert(entry.name.clone()) {
                return Err(PackError::InvalidManifest(format!(
                    "duplicate entry '{}'",
                    entry.name
                )));
            }
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    pub fn get(&self, name: &str) -> Option<&ManifestEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

fn items<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Result<Node<'a, 'input>>> {
    node.children().filter(|n| n.is_element()).map(|n| {
        if n.tag_name().name() == ITEM_TAG {
            Ok(n)
        } else {
            Err(PackError::InvalidManifest(format!(
                "unexpected <{}>",
                n.tag_name().name()
            )))
        }
    })
}

fn parse_entry(node: Node) -> Result<ManifestEntry> {
    let name = node
        .attribute("name")
        .ok_or_else(|| PackError::InvalidManifest("entry without a name".to_string()))?
        .to_string();

    let mut leaves = Vec::new();
    for child in items(node) {
        leaves.push(parse_leaf(&name, child?)?);
    }

    let required = |leaf: &str| -> Result<u64> {
        leaves
            .iter()
            .find(|l| l.name == leaf)
            .and_then(|l| l.value.as_integer())
            .and_then(|v| u64::try_from(v).ok())
            .ok_or_else(|| {
                PackError::InvalidManifest(format!("entry '{}' is missing '{}'", name, leaf))
            })
    };
    let offset = required("Offset")?;
    let size = required("Size")?;

    Ok(ManifestEntry {
        name,
        offset,
        size,
        leaves,
    })
}

fn parse_leaf(entry: &str, node: Node) -> Result<Leaf> {
    let invalid = |what: String| PackError::InvalidManifest(format!("entry '{}': {}", entry, what));

    let name = node
        .attribute("name")
        .ok_or_else(|| invalid("leaf without a name".to_string()))?;
    let text = node.text().unwrap_or("").trim();

    let value = match node.attribute("type") {
        Some("Integer") => LeafValue::Integer(
            text.parse()
                .map_err(|_| invalid(format!("'{}' is not an integer: {:?}", name, text)))?,
        ),
        Some("Float") => LeafValue::Float(
            text.parse()
                .map_err(|_| invalid(format!("'{}' is not a float: {:?}", name, text)))?,
        ),
        Some(other) => return Err(invalid(format!("'{}' has unknown type '{}'", name, other))),
        None => return Err(invalid(format!("'{}' has no type", name))),
    };

    Ok(Leaf {
        name: name.to_string(),
        value,
    })
}
