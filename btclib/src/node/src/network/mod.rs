mod p2p;
mod protocol;
mod sync;

pub use p2p::{P2PNetwork, NetworkCommand, NetworkEvent};
pub use protocol::{Message, Protocol};
pub use sync::ChainSync;