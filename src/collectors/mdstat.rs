use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

/// `md0 : active raid1 ...` at the very start of a (trimmed) line.
static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(md[0-9]+)\s*:\s*").expect("mdstat header pattern"));

/// The raw lines /proc/mdstat printed for one array, header line first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayBlock {
    pub name:  String,   // "md0"
    pub index: u32,      // numeric suffix of name, 0 if it does not fit
    pub lines: Vec<String>,
}

impl ArrayBlock {
    fn open(name: &str) -> Self {
        let index = name[2..].parse().unwrap_or_else(|e| {
            debug!(array = name, error = %e, "array index out of range, using 0");
            0
        });
        Self { name: name.to_string(), index, lines: Vec::new() }
    }
}

/// Split the contents of /proc/mdstat into per-array line groups, in source order.
///
/// A block opens on a header line and closes on the next blank line or the
/// next header, whichever comes first. Text outside any block (the
/// `Personalities` preamble, `unused devices`, `/dev/mdN:` detail sections)
/// is dropped. The same array may appear in several blocks; each is returned.
pub fn split(raw: &[u8]) -> Vec<ArrayBlock> {
    let text = String::from_utf8_lossy(raw);
    let mut blocks = Vec::new();
    let mut current: Option<ArrayBlock> = None;

    for line in text.lines() {
        let line = line.trim();

        if line.is_empty() {
            blocks.extend(current.take());
            continue;
        }

        if let Some(m) = HEADER.captures(line) {
            blocks.extend(current.take());
            let name = &m[1];
            debug!(array = name, "found new array");
            current = Some(ArrayBlock::open(name));
        }

        if let Some(block) = current.as_mut() {
            block.lines.push(line.to_string());
        }
    }

    blocks.extend(current);
    blocks
}
