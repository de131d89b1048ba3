//! The raw event as the host framework hands it to a converter.

use std::collections::BTreeMap;

use fxhash::FxHashMap;

/// A raw event from the data acquisition.
///
/// Carries the trigger number, a set of string tags (run metadata, only
/// populated on the beginning-of-run event) and numbered binary data blocks.
/// The CAEN producer appends exactly one block per trigger, keyed by the
/// trigger number, but the converter does not rely on that.
#[derive(Debug, Clone, Default)]
pub struct RawEvent {
    trigger_number: u32,
    is_bore: bool,
    tags: FxHashMap<String, String>,
    blocks: BTreeMap<u32, Vec<u8>>,
}

impl RawEvent {
    /// Create a new raw event for a given trigger
    pub fn new(trigger_number: u32) -> Self {
        Self {
            trigger_number,
            ..Default::default()
        }
    }

    /// Mark this event as the beginning-of-run event (BORE)
    pub fn set_bore(&mut self) {
        self.is_bore = true;
    }

    pub fn is_bore(&self) -> bool {
        self.is_bore
    }

    pub fn trigger_number(&self) -> u32 {
        self.trigger_number
    }

    /// Set a metadata tag. Overwrites any previous value for the same key.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// Get a metadata tag by name
    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|value| value.as_str())
    }

    /// Append a binary data block under the given block number
    pub fn add_block(&mut self, block_number: u32, data: Vec<u8>) {
        self.blocks.insert(block_number, data);
    }

    /// Get a data block by number
    pub fn get_block(&self, block_number: u32) -> Option<&[u8]> {
        self.blocks.get(&block_number).map(|data| data.as_slice())
    }

    /// The block numbers present in this event, in ascending order
    pub fn block_num_list(&self) -> Vec<u32> {
        self.blocks.keys().copied().collect()
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }
}
