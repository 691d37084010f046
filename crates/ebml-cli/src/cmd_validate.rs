/// Implementation of `ebml validate`.
///
/// Streams the whole file through the decoder and reports either a series
/// of success checkmarks (`✓`) or a diagnostic failure line (`✗`). The
/// command exits with code 0 on a valid stream and code 1 otherwise.
///
/// # Success output
///
/// ```text
/// ✓ Structure: 412 elements, maximum depth 3
/// ✓ Content: 18734 bytes in 389 leaves
/// ✓ Complete: every element closed at offset 20481
/// ```
///
/// # Failure output
///
/// ```text
/// ✗ Error: stream ended with 2 element(s) open and 0 header byte(s) pending
/// ```
///
/// Only elements typed `master` in the dictionary are descended into;
/// everything else is checked as an opaque leaf.
use std::fs::File;
use std::io::BufReader;

use anyhow::{Context, Result, anyhow};
use ebml_decoder::{DecodeError, DecoderCallback, Identifier, StreamDecoder};

use crate::ValidateArgs;
use crate::dictionary::Dictionary;

/// Run the `ebml validate` command.
///
/// # Errors
///
/// Returns an error if the dictionary or the file cannot be read, or if the
/// stream fails any structural check.
pub fn run(args: &ValidateArgs) -> Result<()> {
    let dictionary = Dictionary::load(args.dictionary.as_deref())?;
    let file =
        File::open(&args.file).with_context(|| format!("cannot open {}", args.file.display()))?;

    let mut decoder = StreamDecoder::new(Census::new(&dictionary));
    let result = decoder
        .feed_reader(BufReader::new(file))
        .and_then(|_| decoder.check_complete());

    if let Err(e) = result {
        println!("✗ Error: {}", diagnostic(&e, decoder.offset()));
        return Err(anyhow!("validation failed"));
    }

    let offset = decoder.offset();
    let census = decoder.into_callback();
    println!(
        "✓ Structure: {} element{}, maximum depth {}",
        census.elements,
        if census.elements == 1 { "" } else { "s" },
        census.max_depth
    );
    println!(
        "✓ Content: {} bytes in {} lea{}",
        census.content_bytes,
        census.leaves,
        if census.leaves == 1 { "f" } else { "ves" }
    );
    println!("✓ Complete: every element closed at offset {offset}");
    Ok(())
}

/// Converts a `DecodeError` into a one-line diagnostic.
///
/// ```text
/// ┌──────────────────────────┬──────────────────────────────────────────┐
/// │ DecodeError variant      │ Diagnostic                               │
/// ├──────────────────────────┼──────────────────────────────────────────┤
/// │ Truncated                │ "stream ended with N element(s) open …"  │
/// │ ElementOverrun           │ "<error Display> (offset N)"             │
/// │ Io                       │ "read failed: <io error>"                │
/// │ anything else            │ "<error Display>"                        │
/// └──────────────────────────┴──────────────────────────────────────────┘
/// ```
fn diagnostic(e: &DecodeError, offset: u64) -> String {
    match e {
        DecodeError::Truncated {
            open_elements,
            pending_bytes,
        } => format!(
            "stream ended with {open_elements} element(s) open and \
             {pending_bytes} header byte(s) pending"
        ),
        DecodeError::ElementOverrun { .. } => format!("{e} (offset {offset})"),
        DecodeError::Io(inner) => format!("read failed: {inner}"),
        other => other.to_string(),
    }
}

// ── Census callback ───────────────────────────────────────────────────────────

/// Counts elements without looking at their content.
struct Census<'a> {
    dictionary: &'a Dictionary,
    depth: usize,
    max_depth: usize,
    elements: u64,
    leaves: u64,
    content_bytes: u64,
}

impl<'a> Census<'a> {
    fn new(dictionary: &'a Dictionary) -> Self {
        Self {
            dictionary,
            depth: 0,
            max_depth: 0,
            elements: 0,
            leaves: 0,
            content_bytes: 0,
        }
    }
}

impl DecoderCallback for Census<'_> {
    fn is_container(&self, id: Identifier) -> bool {
        self.dictionary.is_master(id)
    }

    fn open_element(&mut self, _id: Identifier) {
        self.elements += 1;
        self.depth += 1;
        self.max_depth = self.max_depth.max(self.depth);
    }

    fn deliver_content(&mut self, bytes: &[u8]) {
        self.leaves += 1;
        self.content_bytes += bytes.len() as u64;
    }

    fn close_element(&mut self) {
        self.depth -= 1;
    }
}
