// Network data model
//
// Addresses, capture devices, packets and hops as plain data, plus the
// read-only socket table scanner used by the live capture collaborator.

mod address;
mod device;
mod packet;
pub mod sockets;

pub use address::Address;
pub use device::{Device, DeviceAddress, DeviceFlags, IfFlags};
pub use packet::{Hop, Packet};
