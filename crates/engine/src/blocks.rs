//! The content-rendering boundary.
//!
//! The host CMS owns block parsing and rendering; the injector only needs
//! an ordered walk of atomic renderable units. `ParagraphBlocks` is the
//! reference implementation used by tests and the CLI.

/// One atomic renderable unit of content, carrying its raw source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub raw: String,
}

/// Host-supplied block parsing and rendering.
pub trait BlockEngine: Send + Sync {
    /// Split content into blocks, in document order.
    fn parse_blocks(&self, content: &str) -> Vec<Block>;

    /// Render one block to its final string form.
    fn render_block(&self, block: &Block) -> String;
}

/// Blank-line-delimited paragraphs, rendered verbatim.
///
/// Each block keeps its trailing separator run, so concatenating the
/// rendered blocks reproduces the input exactly -- the injector's offset
/// arithmetic relies on that.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParagraphBlocks;

impl BlockEngine for ParagraphBlocks {
    fn parse_blocks(&self, content: &str) -> Vec<Block> {
        let bytes = content.as_bytes();
        let mut blocks = Vec::new();
        let mut start = 0;
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'\n' && bytes.get(i + 1) == Some(&b'\n') {
                let mut end = i + 2;
                while bytes.get(end) == Some(&b'\n') {
                    end += 1;
                }
                blocks.push(Block {
                    raw: content[start..end].to_string(),
                });
                start = end;
                i = end;
            } else {
                i += 1;
            }
        }
        if start < bytes.len() {
            blocks.push(Block {
                raw: content[start..].to_string(),
            });
        }
        blocks
    }

    fn render_block(&self, block: &Block) -> String {
        block.raw.clone()
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
