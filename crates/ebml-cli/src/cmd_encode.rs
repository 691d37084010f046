/// Implementation of `ebml encode`.
///
/// Parses a JSON manifest describing an element tree and serialises it into
/// an EBML stream using `EbmlEncoder`. The manifest path is the sole
/// positional argument; the output file is required via `-o`.
///
/// # Manifest format
///
/// ```json
/// {
///   "elements": [
///     {
///       "id": "0x1A45DFA3",
///       "type": "master",
///       "children": [
///         { "id": "0x4286", "type": "uinteger", "value": 1 },
///         { "id": "0x4282", "type": "string",   "value": "openvibe" }
///       ]
///     },
///     { "id": "0x4A30", "type": "binary(double)", "value": [0.5, 1.0, 1.5] },
///     { "id": "0x4A31", "type": "binary",         "value": "deadbeef" },
///     { "id": "0x4A32", "type": "binary",         "file": "samples.raw" }
///   ]
/// }
/// ```
///
/// Type strings are the same as in the inspection dictionary.
///
/// ```text
/// ┌──────────────────┬─────────────────────────────────────────────────────┐
/// │ Type             │ Value                                               │
/// ├──────────────────┼─────────────────────────────────────────────────────┤
/// │ master           │ none; `children` holds the nested elements          │
/// │ uinteger         │ non-negative integer                                │
/// │ integer          │ integer                                             │
/// │ float            │ number, written as 8-byte IEEE 754                  │
/// │ string           │ string                                              │
/// │ binary           │ hex string, or `file` relative to the manifest      │
/// │ binary(<scalar>) │ array of numbers, written little-endian             │
/// └──────────────────┴─────────────────────────────────────────────────────┘
/// ```
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use ebml_encoder::EbmlEncoder;
use ebml_wire::Identifier;
use serde_json::Value;

use crate::EncodeArgs;
use crate::dictionary::{ArrayType, ElementType};

// ── Manifest serde types ──────────────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct Manifest {
    elements: Vec<ManifestElement>,
}

/// A single element in the manifest tree.
#[derive(serde::Deserialize)]
struct ManifestElement {
    /// Hex (`0x…`) or decimal, marker bits included.
    id: String,
    #[serde(rename = "type")]
    kind: String,
    value: Option<Value>,
    /// Binary content read from this path (relative to manifest dir).
    file: Option<String>,
    #[serde(default)]
    children: Vec<ManifestElement>,
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Run the `ebml encode` command.
///
/// Prints a one-line summary (`Wrote N bytes to <path>`) on success.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or parsed, if an element
/// has a bad identifier, type, or value, or if `EbmlEncoder::encode` fails.
pub fn run(args: &EncodeArgs) -> Result<()> {
    let manifest_src = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;

    let manifest: Manifest = serde_json::from_str(&manifest_src)
        .with_context(|| format!("failed to parse manifest {}", args.input.display()))?;

    let manifest_dir = args.input.parent().unwrap_or_else(|| Path::new("."));

    let mut encoder = EbmlEncoder::new();
    for (idx, element) in manifest.elements.iter().enumerate() {
        apply_element(&mut encoder, element, manifest_dir)
            .with_context(|| format!("element {idx}: failed to apply"))?;
    }

    let bytes = encoder.encode().context("EbmlEncoder::encode failed")?;

    fs::write(&args.output, &bytes)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    println!("Wrote {} bytes to {}", bytes.len(), args.output.display());
    Ok(())
}

// ── Element application helpers ───────────────────────────────────────────────

/// Adds `element` (and, for masters, its subtree) to `encoder`.
fn apply_element(
    encoder: &mut EbmlEncoder,
    element: &ManifestElement,
    manifest_dir: &Path,
) -> Result<()> {
    let id: Identifier = element
        .id
        .parse()
        .with_context(|| format!("bad id {:?}", element.id))?;
    let id = id.raw();

    match ElementType::parse(&element.kind) {
        ElementType::Master => {
            encoder.open_container(id);
            for (idx, child) in element.children.iter().enumerate() {
                apply_element(encoder, child, manifest_dir)
                    .with_context(|| format!("{}: child {idx}", element.id))?;
            }
            encoder.close_container();
        }
        ElementType::Unsigned => {
            encoder.add_unsigned(id, unsigned(required(element)?)?);
        }
        ElementType::Signed => {
            encoder.add_signed(id, signed(required(element)?)?);
        }
        ElementType::Float => {
            encoder.add_float(id, float(required(element)?)?);
        }
        ElementType::String => {
            let text = required(element)?
                .as_str()
                .ok_or_else(|| anyhow!("{}: expected a string", element.id))?;
            encoder.add_string(id, text);
        }
        ElementType::Binary => {
            let bytes = binary_content(element, manifest_dir)?;
            encoder.add_binary(id, &bytes);
        }
        ElementType::Array(array) => {
            let values = required(element)?
                .as_array()
                .ok_or_else(|| anyhow!("{}: expected an array", element.id))?;
            encoder.add_binary(id, &array_bytes(array, values)?);
        }
        ElementType::Unknown => bail!("{}: unknown type {:?}", element.id, element.kind),
    }
    Ok(())
}

fn required(element: &ManifestElement) -> Result<&Value> {
    element
        .value
        .as_ref()
        .ok_or_else(|| anyhow!("{}: missing value", element.id))
}

/// Resolve `binary` content from an inline hex `value` or a `file` path.
fn binary_content(element: &ManifestElement, manifest_dir: &Path) -> Result<Vec<u8>> {
    match (&element.value, &element.file) {
        (Some(Value::String(text)), None) => {
            hex::decode(text).with_context(|| format!("{}: invalid hex", element.id))
        }
        (None, Some(file)) => {
            let path = manifest_dir.join(file);
            fs::read(&path).with_context(|| format!("cannot read {}", path.display()))
        }
        (None, None) => Ok(Vec::new()),
        _ => bail!("{}: binary takes either a hex string value or a file", element.id),
    }
}

fn unsigned(value: &Value) -> Result<u64> {
    value
        .as_u64()
        .ok_or_else(|| anyhow!("expected a non-negative integer, got {value}"))
}

fn signed(value: &Value) -> Result<i64> {
    value
        .as_i64()
        .ok_or_else(|| anyhow!("expected an integer, got {value}"))
}

fn float(value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| anyhow!("expected a number, got {value}"))
}

/// Little-endian array content for a `binary(<scalar>)` element.
#[allow(clippy::cast_possible_truncation)]
fn array_bytes(array: ArrayType, values: &[Value]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for value in values {
        match array {
            ArrayType::F64 => out.extend_from_slice(&float(value)?.to_le_bytes()),
            ArrayType::F32 => out.extend_from_slice(&(float(value)? as f32).to_le_bytes()),
            ArrayType::I8 => out.extend_from_slice(&i8::try_from(signed(value)?)?.to_le_bytes()),
            ArrayType::I16 => out.extend_from_slice(&i16::try_from(signed(value)?)?.to_le_bytes()),
            ArrayType::I32 => out.extend_from_slice(&i32::try_from(signed(value)?)?.to_le_bytes()),
            ArrayType::I64 => out.extend_from_slice(&signed(value)?.to_le_bytes()),
            ArrayType::U8 => out.extend_from_slice(&u8::try_from(unsigned(value)?)?.to_le_bytes()),
            ArrayType::U16 => {
                out.extend_from_slice(&u16::try_from(unsigned(value)?)?.to_le_bytes());
            }
            ArrayType::U32 => {
                out.extend_from_slice(&u32::try_from(unsigned(value)?)?.to_le_bytes());
            }
            ArrayType::U64 => out.extend_from_slice(&unsigned(value)?.to_le_bytes()),
        }
    }
    Ok(out)
}
