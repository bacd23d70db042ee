//! Append-only block chain.

use super::block::Block;

/// Ordered, append-only sequence of blocks. Never truncated or reordered.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True before the genesis block is appended.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Most recently appended block.
    pub fn previous(&self) -> Option<&Block> {
        self.blocks.last()
    }

    /// Append a block.
    pub fn append(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// All blocks, oldest first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }
}
