//! Registration of converters under their digitizer identifiers.
//!
//! The host framework looks converters up by a 32-bit hash of the digitizer
//! name. The hash here reproduces the host's compile-time string hash, so the
//! ids computed on either side agree.

use fxhash::FxHashMap;

use super::constants::DT5748_NAME;
use super::converter::{Dt5742Converter, StdEventConverter};

/// The host's compile-time string hash (djb2 variant, folded from the tail).
pub const fn cstr2hash(name: &str) -> u32 {
    let bytes = name.as_bytes();
    let mut hash: u32 = 5381;
    let mut index = bytes.len();
    while index > 0 {
        index -= 1;
        hash = hash.wrapping_mul(33) ^ (bytes[index] as u32);
    }
    hash
}

/// Factory id of the CAEN DT5742/DT5748 converter
pub const DT5748_ID: u32 = cstr2hash(DT5748_NAME);

/// Constructor signature stored in the factory
pub type ConverterMaker = fn() -> Box<dyn StdEventConverter>;

fn make_dt5742() -> Box<dyn StdEventConverter> {
    Box::new(Dt5742Converter::default())
}

/// Registry mapping converter ids to constructors.
///
/// `ConverterFactory::default()` comes with the converters of this crate
/// already registered; `ConverterFactory::empty()` starts blank for hosts
/// that manage registration themselves.
#[derive(Debug, Clone)]
pub struct ConverterFactory {
    makers: FxHashMap<u32, ConverterMaker>,
}

impl ConverterFactory {
    pub fn empty() -> Self {
        Self {
            makers: FxHashMap::default(),
        }
    }

    /// Register a constructor under an id, replacing any previous registration
    pub fn register(&mut self, id: u32, maker: ConverterMaker) {
        self.makers.insert(id, maker);
    }

    pub fn is_registered(&self, id: u32) -> bool {
        self.makers.contains_key(&id)
    }

    /// Instantiate the converter registered under the given id
    pub fn make(&self, id: u32) -> Option<Box<dyn StdEventConverter>> {
        self.makers.get(&id).map(|maker| maker())
    }
}

impl Default for ConverterFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        factory.register(DT5748_ID, make_dt5742);
        factory
    }
}
