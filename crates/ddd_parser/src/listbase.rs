//! Traversal of Blender `ListBase` linked lists
//!
//! A `ListBase` stores `first`/`last` pointers; every element starts with a
//! `next` pointer. Elements are separate blocks found through the address
//! index.

use crate::BlendFile;
use crate::error::Result;
use ahash::AHashSet;
use log::{trace, warn};

impl BlendFile {
    /// Collect the block indices of a list, starting at the `first` pointer
    ///
    /// `struct_name` is the element type, used to locate its `next` member.
    /// The walk stops at a null pointer, at a pointer with no block behind it
    /// (logged), or when an element is visited twice.
    pub fn walk_list(&self, first: u64, struct_name: &str) -> Result<Vec<usize>> {
        let next_offset = self.dna().resolve(struct_name, "next")?.offset;

        let mut visited = AHashSet::new();
        let mut out = Vec::new();
        let mut current = first;

        while current != 0 {
            if !visited.insert(current) {
                warn!("Cycle in {struct_name} list at address {current:#x}; stopping");
                break;
            }

            let Some(index) = self.find_block_by_address(current) else {
                warn!("Dangling {struct_name} pointer {current:#x}; list truncated");
                break;
            };

            out.push(index);
            current = self.field_view(index)?.read_pointer(next_offset)?;
        }

        trace!("Walked {} {struct_name} list elements", out.len());
        Ok(out)
    }

    /// Walk a `ListBase` member of a block, e.g. `("Collection", "gobject", "CollectionObject")`
    pub fn walk_list_field(
        &self,
        block_index: usize,
        owner_struct: &str,
        list_path: &str,
        element_struct: &str,
    ) -> Result<Vec<usize>> {
        let first = self
            .field_view(block_index)?
            .read_field_pointer(owner_struct, &format!("{list_path}.first"))?;
        self.walk_list(first, element_struct)
    }
}
