//! Item stacks held, dropped, or consumed by entities.

use serde::{Deserialize, Serialize};

use crate::materials::Material;

/// A stack of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemStack {
    pub material: Material,
    pub amount: u32,
}

impl ItemStack {
    /// Create a stack of the given material.
    pub fn new(material: Material, amount: u32) -> Self {
        Self { material, amount }
    }

    /// A single item.
    pub fn single(material: Material) -> Self {
        Self::new(material, 1)
    }

    /// Whether the stack places a block when used.
    pub fn is_block(&self) -> bool {
        self.material.is_block()
    }
}
