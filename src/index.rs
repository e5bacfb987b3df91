use std::collections::HashMap;

use tracing::debug;

use crate::block::{Block, Document};
use crate::error::{Error, Result};

/// Identifier → block lookup over a flat block list
pub struct BlockIndex<'a> {
    blocks: HashMap<&'a str, &'a Block>,
    root: &'a Block,
}

impl<'a> BlockIndex<'a> {
    /// Index `blocks` and locate the block named by the document root id.
    pub fn build(document: &Document, blocks: &'a [Block]) -> Result<Self> {
        let map: HashMap<&str, &Block> = blocks.iter().map(|b| (b.id.as_str(), b)).collect();
        let root = *map
            .get(document.document_id.as_str())
            .ok_or_else(|| Error::MissingBlock(document.document_id.clone()))?;
        debug!(
            document = %document.document_id,
            blocks = map.len(),
            "indexed document blocks"
        );
        Ok(Self { blocks: map, root })
    }

    pub fn root(&self) -> &'a Block {
        self.root
    }

    pub fn get(&self, id: &str) -> Result<&'a Block> {
        self.blocks
            .get(id)
            .copied()
            .ok_or_else(|| Error::MissingBlock(id.to_string()))
    }

    pub fn parent(&self, block: &Block) -> Result<Option<&'a Block>> {
        block.parent_id.as_deref().map(|id| self.get(id)).transpose()
    }

    /// Children of `block` in order; fails on the first dangling id.
    pub fn children(&self, block: &Block) -> Result<Vec<&'a Block>> {
        block.children.iter().map(|id| self.get(id)).collect()
    }
}
