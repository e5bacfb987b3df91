use crate::block::Block;
use crate::error::Result;
use crate::index::BlockIndex;

/// Ordinal of an ordered-list block within its run of ordered siblings.
///
/// Counts the ordered siblings directly before `block`, stopping at the first
/// sibling of any other type, so numbering restarts at 1 after an interruption.
pub fn ordinal(index: &BlockIndex<'_>, block: &Block) -> Result<usize> {
    let Some(parent) = index.parent(block)? else {
        return Ok(1);
    };
    let Some(position) = parent.children.iter().position(|id| *id == block.id) else {
        return Ok(1);
    };

    let mut order = 1;
    for id in parent.children[..position].iter().rev() {
        if !index.get(id)?.is_ordered() {
            break;
        }
        order += 1;
    }
    Ok(order)
}
