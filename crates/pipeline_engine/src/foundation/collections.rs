//! Specialized collection types

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generation-checked slot of a shader module in the shader registry
    pub struct ShaderKey;
}

/// Slot storage for shader modules
pub type ShaderSlots<T> = SlotMap<ShaderKey, T>;
