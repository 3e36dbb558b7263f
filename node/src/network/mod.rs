mod p2p;
mod protocol;
mod sync;

pub use p2p::{P2PNetwork, NetworkCommand, NetworkEvent};
pub use protocol::{Message, Protocol, PublishError};
pub use sync::ChainSync;

pub use libp2p::{
    PeerId,
    gossipsub::MessageId,
    identity::Keypair,
};