//! Common types and data structures

/// Street address resolved from a CEP. Fields the API omits stay empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Address {
    pub street: String,
    pub district: String,
    pub city: String,
    pub state: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.district.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
    }
}

/// Shared form state, written by lookup tasks and read by the UI each frame.
///
/// Overlapping lookups are not coordinated: each task overwrites `address`
/// and `message` when it settles, so the last response to resolve wins.
pub struct LookupState {
    pub active_count: usize,     // in-flight lookups; spinner shows while > 0
    pub address: Address,        // current output field contents
    pub message: Option<String>, // error banner text, None hides the banner
}

impl Default for LookupState {
    fn default() -> Self {
        Self {
            active_count: 0,
            address: Address::default(),
            message: None,
        }
    }
}

impl LookupState {
    pub fn is_loading(&self) -> bool {
        self.active_count > 0
    }
}
