/// Implementation of `ebml inspect`.
///
/// Feeds the file through a `StreamDecoder` in fixed-size chunks and prints
/// one line per element as it is decoded, indented by depth. Output is
/// flushed after every chunk, so arbitrarily large streams can be inspected
/// without holding them in memory.
///
/// # Output format
///
/// ```text
///   Opened EBML node [id:0x1A45DFA3]-[name:EBML]
///     Opened EBML node [id:0x4286]-[name:EBMLVersion]-[type:uinteger]-[value:1]
///     Opened EBML node [id:0x4282]-[name:DocType]-[type:string]-[value:openvibe]
///   Opened EBML node [id:0x18538067]-[name:Segment]
///     Opened EBML node [id:0x4A30]-[name:Samples]-[type:binary(double)]-[values:0.5 1 1.5 2 ...]
///     Opened EBML node [id:0x4A31]-[name:unknown]
/// ```
///
/// Identifiers missing from the dictionary are treated as leaves and
/// printed without a value.
use std::fmt::{Display, Write as _};
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};

use anyhow::{Context, Result};
use ebml_decoder::{DecoderCallback, Identifier, StreamDecoder};
use ebml_wire::value::{
    LeArrayElement, read_ascii, read_float, read_le_array, read_signed, read_unsigned,
};

use crate::InspectArgs;
use crate::dictionary::{ArrayType, Dictionary, ElementType};

/// Run the `ebml inspect` command.
///
/// # Errors
///
/// Returns an error if the dictionary or the file cannot be read, or if the
/// stream is malformed or truncated.
pub fn run(args: &InspectArgs) -> Result<()> {
    let dictionary = Dictionary::load(args.dictionary.as_deref())?;
    let mut file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut decoder = StreamDecoder::new(Spy::new(&dictionary, args.expand));
    let mut buf = vec![0u8; args.chunk_size.max(1)];
    let mut stdout = io::stdout().lock();

    loop {
        let n = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(e).with_context(|| format!("cannot read {}", args.file.display()));
            }
        };
        let fed = decoder.feed(&buf[..n]);
        stdout.write_all(decoder.callback_mut().take_output().as_bytes())?;
        fed.with_context(|| format!("malformed stream near offset {}", decoder.offset()))?;
    }

    log::debug!("decoded {} bytes", decoder.offset());
    decoder
        .finish()
        .with_context(|| format!("{} ended early", args.file.display()))?;
    Ok(())
}

// ── Spy callback ──────────────────────────────────────────────────────────────

/// Callback that renders each decoded element as a line of text.
struct Spy<'a> {
    dictionary: &'a Dictionary,
    /// Maximum array values to print; `None` renders arrays as binary.
    expand: Option<usize>,
    open: Vec<Identifier>,
    output: String,
}

impl<'a> Spy<'a> {
    fn new(dictionary: &'a Dictionary, expand: Option<usize>) -> Self {
        Self {
            dictionary,
            expand,
            open: Vec::new(),
            output: String::new(),
        }
    }

    fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    fn render_value(&mut self, kind: ElementType, bytes: &[u8]) {
        let out = &mut self.output;
        let label = kind.label();
        match (kind, self.expand) {
            (ElementType::Master, _) => {}
            (ElementType::Unsigned, _) => {
                let _ = write!(out, "-[type:{label}]-[value:{}]", read_unsigned(bytes));
            }
            (ElementType::Signed, _) => {
                let _ = write!(out, "-[type:{label}]-[value:{}]", read_signed(bytes));
            }
            (ElementType::Float, _) => {
                let _ = write!(out, "-[type:{label}]-[value:{}]", read_float(bytes));
            }
            (ElementType::String, _) => {
                let _ = write!(out, "-[type:{label}]-[value:{}]", read_ascii(bytes));
            }
            (ElementType::Array(array), Some(limit)) => {
                let _ = write!(out, "-[type:{label}]-[values:");
                match array {
                    ArrayType::F64 => push_values::<f64>(out, bytes, limit),
                    ArrayType::F32 => push_values::<f32>(out, bytes, limit),
                    ArrayType::I8 => push_values::<i8>(out, bytes, limit),
                    ArrayType::I16 => push_values::<i16>(out, bytes, limit),
                    ArrayType::I32 => push_values::<i32>(out, bytes, limit),
                    ArrayType::I64 => push_values::<i64>(out, bytes, limit),
                    ArrayType::U8 => push_values::<u8>(out, bytes, limit),
                    ArrayType::U16 => push_values::<u16>(out, bytes, limit),
                    ArrayType::U32 => push_values::<u32>(out, bytes, limit),
                    ArrayType::U64 => push_values::<u64>(out, bytes, limit),
                }
                out.push(']');
            }
            (ElementType::Binary | ElementType::Array(_), _) => {
                let _ = write!(out, "-[type:binary]-[bytes:{}]", bytes.len());
            }
            (ElementType::Unknown, _) => {
                let _ = write!(out, "-[type:unknown]-[bytes:{}]", bytes.len());
            }
        }
    }
}

/// Append up to `limit` space-separated values, then ` ...` if any were left
/// out.
fn push_values<T: LeArrayElement + Display>(out: &mut String, bytes: &[u8], limit: usize) {
    let values = read_le_array::<T>(bytes);
    for (i, value) in values.iter().take(limit).enumerate() {
        let sep = if i == 0 { "" } else { " " };
        let _ = write!(out, "{sep}{value}");
    }
    if values.len() > limit {
        out.push_str(" ...");
    }
}

impl DecoderCallback for Spy<'_> {
    fn is_container(&self, id: Identifier) -> bool {
        self.dictionary.is_master(id)
    }

    fn open_element(&mut self, id: Identifier) {
        let element = self.dictionary.get(id);
        let name = element.map_or("unknown", |e| e.name.as_str());
        for _ in 0..=self.open.len() {
            self.output.push_str("  ");
        }
        let _ = write!(self.output, "Opened EBML node [id:{id}]-[name:{name}]");
        if self.dictionary.is_master(id) {
            self.output.push('\n');
        }
        self.open.push(id);
    }

    fn deliver_content(&mut self, bytes: &[u8]) {
        let kind = self
            .open
            .last()
            .and_then(|&id| self.dictionary.get(id))
            .map(|e| e.kind);
        if let Some(kind) = kind {
            self.render_value(kind, bytes);
        }
        self.output.push('\n');
    }

    fn close_element(&mut self) {
        self.open.pop();
    }
}

#[cfg(test)]
mod tests {
    use ebml_encoder::EbmlEncoder;

    use super::*;

    const DICTIONARY: &str = r#"{"elements":[
        {"name":"Segment","id":"0x18538067","type":"master"},
        {"name":"Offset","id":"0x4A10","type":"integer"},
        {"name":"Gain","id":"0x4A11","type":"float"},
        {"name":"Samples","id":"0x4A30","type":"binary(double)"},
        {"name":"Raw","id":"0x4A32","type":"blob"}
    ]}"#;

    fn render(bytes: &[u8], expand: Option<usize>, chunk: usize) -> String {
        let mut dictionary = Dictionary::builtin();
        dictionary.extend_from_json(DICTIONARY).unwrap();
        let mut decoder = StreamDecoder::new(Spy::new(&dictionary, expand));
        let mut output = String::new();
        for piece in bytes.chunks(chunk) {
            decoder.feed(piece).unwrap();
            output.push_str(&decoder.callback_mut().take_output());
        }
        decoder.finish().unwrap();
        output
    }

    fn stream() -> Vec<u8> {
        let samples: Vec<u8> = [0.5f64, 1.0, 1.5, 2.0, 2.5]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        EbmlEncoder::new()
            .open_container(0x1A45_DFA3)
            .add_unsigned(0x4286, 1)
            .add_string(0x4282, "openvibe")
            .close_container()
            .open_container(0x1853_8067)
            .add_signed(0x4A10, -3)
            .add_float(0x4A11, 0.25)
            .add_binary(0x4A30, &samples)
            .add_binary(0x4A31, b"??")
            .add_binary(0x4A32, b"abc")
            .close_container()
            .encode()
            .unwrap()
    }

    #[test]
    fn renders_tree_with_expanded_arrays() {
        let expected = "  Opened EBML node [id:0x1A45DFA3]-[name:EBML]
    Opened EBML node [id:0x4286]-[name:EBMLVersion]-[type:uinteger]-[value:1]
    Opened EBML node [id:0x4282]-[name:DocType]-[type:string]-[value:openvibe]
  Opened EBML node [id:0x18538067]-[name:Segment]
    Opened EBML node [id:0x4A10]-[name:Offset]-[type:integer]-[value:-3]
    Opened EBML node [id:0x4A11]-[name:Gain]-[type:float]-[value:0.25]
    Opened EBML node [id:0x4A30]-[name:Samples]-[type:binary(double)]-[values:0.5 1 1.5 2 ...]
    Opened EBML node [id:0x4A31]-[name:unknown]
    Opened EBML node [id:0x4A32]-[name:Raw]-[type:unknown]-[bytes:3]
";
        assert_eq!(render(&stream(), Some(4), 4096), expected);
    }

    #[test]
    fn arrays_without_expand_are_binary() {
        let output = render(&stream(), None, 4096);
        assert!(output.contains("[name:Samples]-[type:binary]-[bytes:40]\n"));
    }

    #[test]
    fn long_double_arrays_are_binary() {
        let mut dictionary = Dictionary::builtin();
        dictionary
            .extend_from_json(r#"{"elements":[{"name":"Wide","id":"0x4A33","type":"binary(long double)"}]}"#)
            .unwrap();
        let bytes = EbmlEncoder::new().add_binary(0x4A33, &[0; 20]).encode().unwrap();
        for expand in [None, Some(4)] {
            let mut decoder = StreamDecoder::new(Spy::new(&dictionary, expand));
            decoder.feed(&bytes).unwrap();
            assert_eq!(
                decoder.callback_mut().take_output(),
                "  Opened EBML node [id:0x4A33]-[name:Wide]-[type:binary]-[bytes:20]\n"
            );
        }
    }

    #[test]
    fn chunking_does_not_change_output() {
        let bytes = stream();
        assert_eq!(render(&bytes, Some(2), 1), render(&bytes, Some(2), 4096));
    }
}
