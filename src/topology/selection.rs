// Single highlighted node

use crate::net::Address;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<Address>,
}

impl SelectionState {
    /// Select `address`, returning the previously selected one
    pub fn select(&mut self, address: Address) -> Option<Address> {
        self.selected.replace(address)
    }

    pub fn selected(&self) -> Option<Address> {
        self.selected
    }

    pub fn is_selected(&self, address: &Address) -> bool {
        self.selected.as_ref() == Some(address)
    }

    pub fn clear(&mut self) -> Option<Address> {
        self.selected.take()
    }
}
