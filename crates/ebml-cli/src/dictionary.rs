/// Element dictionary: names and value types for identifiers.
///
/// The decoder itself only needs to know which identifiers are containers.
/// The CLI additionally needs a name and a value type to render leaves, so
/// it loads them from a JSON file:
///
/// ```json
/// {
///   "elements": [
///     { "name": "Segment",      "id": "0x18538067", "type": "master" },
///     { "name": "SamplingRate", "id": "0x4A12",     "type": "uinteger" },
///     { "name": "Samples",      "id": "0x4A30",     "type": "binary(double)" }
///   ]
/// }
/// ```
///
/// # Value types
///
/// ```text
/// ┌────────────────────────┬─────────────────────────────────────────────┐
/// │ Type string            │ Rendering                                   │
/// ├────────────────────────┼─────────────────────────────────────────────┤
/// │ master                 │ container, children are decoded             │
/// │ uinteger / integer     │ big-endian integer value                    │
/// │ float                  │ 4- or 8-byte IEEE 754 value                 │
/// │ string                 │ one character per byte                      │
/// │ binary                 │ byte count                                  │
/// │ binary(<scalar>)       │ little-endian array, first N values         │
/// │ anything else          │ "unknown" with byte count                   │
/// └────────────────────────┴─────────────────────────────────────────────┘
/// ```
///
/// `<scalar>` is one of `double`, `float`, `integer8`, `integer16`,
/// `integer32`, `integer64`, `uinteger8`, `uinteger16`, `uinteger32`,
/// `uinteger64`.
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ebml_wire::Identifier;

// ── Value types ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementType {
    Master,
    Unsigned,
    Signed,
    Float,
    String,
    Binary,
    Array(ArrayType),
    Unknown,
}

/// Element type of a `binary(<scalar>)` leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayType {
    F64,
    F32,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl ElementType {
    /// Parse a dictionary type string. Never fails: unrecognised strings
    /// become [`ElementType::Unknown`].
    pub fn parse(s: &str) -> Self {
        match s {
            "master" => Self::Master,
            "uinteger" => Self::Unsigned,
            "integer" => Self::Signed,
            "float" => Self::Float,
            "string" => Self::String,
            // No portable reader for extended precision; shown as raw bytes.
            "binary" | "binary(long double)" => Self::Binary,
            _ => s
                .strip_prefix("binary(")
                .and_then(|rest| rest.strip_suffix(')'))
                .and_then(ArrayType::parse)
                .map_or(Self::Unknown, Self::Array),
        }
    }

    /// Label printed in `-[type:…]`.
    pub fn label(self) -> &'static str {
        match self {
            Self::Master => "master",
            Self::Unsigned => "uinteger",
            Self::Signed => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Binary => "binary",
            Self::Array(array) => array.label(),
            Self::Unknown => "unknown",
        }
    }
}

impl ArrayType {
    fn parse(scalar: &str) -> Option<Self> {
        Some(match scalar {
            "double" => Self::F64,
            "float" => Self::F32,
            "integer8" => Self::I8,
            "integer16" => Self::I16,
            "integer32" => Self::I32,
            "integer64" => Self::I64,
            "uinteger8" => Self::U8,
            "uinteger16" => Self::U16,
            "uinteger32" => Self::U32,
            "uinteger64" => Self::U64,
            _ => return None,
        })
    }

    fn label(self) -> &'static str {
        match self {
            Self::F64 => "binary(double)",
            Self::F32 => "binary(float)",
            Self::I8 => "binary(integer8)",
            Self::I16 => "binary(integer16)",
            Self::I32 => "binary(integer32)",
            Self::I64 => "binary(integer64)",
            Self::U8 => "binary(uinteger8)",
            Self::U16 => "binary(uinteger16)",
            Self::U32 => "binary(uinteger32)",
            Self::U64 => "binary(uinteger64)",
        }
    }
}

// ── Dictionary ────────────────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct DictionaryFile {
    elements: Vec<DictionaryEntry>,
}

#[derive(serde::Deserialize)]
struct DictionaryEntry {
    name: String,
    /// Hex (`0x…`) or decimal.
    id: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub kind: ElementType,
}

#[derive(Clone, Debug)]
pub struct Dictionary {
    elements: HashMap<Identifier, Element>,
}

/// Elements of the EBML header, known without any dictionary file.
const EBML_HEADER: &[(&str, u64, ElementType)] = &[
    ("EBML", 0x1A45_DFA3, ElementType::Master),
    ("EBMLVersion", 0x4286, ElementType::Unsigned),
    ("EBMLReadVersion", 0x42F7, ElementType::Unsigned),
    ("EBMLMaxIDLength", 0x42F2, ElementType::Unsigned),
    ("EBMLMaxSizeLength", 0x42F3, ElementType::Unsigned),
    ("DocType", 0x4282, ElementType::String),
    ("DocTypeVersion", 0x4287, ElementType::Unsigned),
    ("DocTypeReadVersion", 0x4285, ElementType::Unsigned),
    ("Void", 0xEC, ElementType::Binary),
    ("CRC-32", 0xBF, ElementType::Binary),
];

impl Dictionary {
    /// The EBML header elements only.
    pub fn builtin() -> Self {
        let elements = EBML_HEADER
            .iter()
            .map(|&(name, id, kind)| {
                (
                    Identifier(id),
                    Element {
                        name: name.to_string(),
                        kind,
                    },
                )
            })
            .collect();
        Self { elements }
    }

    /// The built-in elements, extended (and overridden) by `path` if given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut dictionary = Self::builtin();
        if let Some(path) = path {
            let json = fs::read_to_string(path)
                .with_context(|| format!("cannot read dictionary {}", path.display()))?;
            dictionary
                .extend_from_json(&json)
                .with_context(|| format!("invalid dictionary {}", path.display()))?;
        }
        Ok(dictionary)
    }

    pub fn extend_from_json(&mut self, json: &str) -> Result<()> {
        let file: DictionaryFile = serde_json::from_str(json)?;
        for entry in file.elements {
            let id: Identifier = entry
                .id
                .parse()
                .with_context(|| format!("element {}: bad id {:?}", entry.name, entry.id))?;
            let kind = ElementType::parse(&entry.kind);
            if kind == ElementType::Unknown {
                log::warn!("element {} has unrecognised type {:?}", entry.name, entry.kind);
            }
            self.elements.insert(
                id,
                Element {
                    name: entry.name,
                    kind,
                },
            );
        }
        Ok(())
    }

    pub fn get(&self, id: Identifier) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn is_master(&self, id: Identifier) -> bool {
        self.get(id).is_some_and(|e| e.kind == ElementType::Master)
    }

    /// Identifiers of every `master` element.
    pub fn masters(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.elements
            .iter()
            .filter(|(_, e)| e.kind == ElementType::Master)
            .map(|(&id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_type_strings() {
        assert_eq!(ElementType::parse("master"), ElementType::Master);
        assert_eq!(ElementType::parse("integer"), ElementType::Signed);
        assert_eq!(
            ElementType::parse("binary(uinteger16)"),
            ElementType::Array(ArrayType::U16)
        );
        assert_eq!(ElementType::parse("binary(long double)"), ElementType::Binary);
        assert_eq!(ElementType::parse("binary(quad)"), ElementType::Unknown);
        assert_eq!(ElementType::parse("date"), ElementType::Unknown);
        assert_eq!(ElementType::parse("binary(double)").label(), "binary(double)");
    }

    #[test]
    fn json_extends_builtin() {
        let mut dictionary = Dictionary::builtin();
        assert!(dictionary.is_master(Identifier(0x1A45_DFA3)));

        dictionary
            .extend_from_json(
                r#"{"elements":[
                    {"name":"Segment","id":"0x18538067","type":"master"},
                    {"name":"Rate","id":"19000","type":"uinteger"}
                ]}"#,
            )
            .unwrap();

        assert!(dictionary.is_master(Identifier(0x1853_8067)));
        assert_eq!(dictionary.get(Identifier(19000)).unwrap().name, "Rate");
        assert_eq!(dictionary.masters().count(), 2);
    }

    #[test]
    fn bad_id_is_rejected() {
        let err = Dictionary::builtin()
            .extend_from_json(r#"{"elements":[{"name":"X","id":"0xZZ","type":"binary"}]}"#)
            .unwrap_err();
        assert!(format!("{err:#}").contains("bad id"));
    }
}
