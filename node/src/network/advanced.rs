use libp2p::{
    core::Multiaddr,
    PeerId,
    ping::{Ping, PingConfig},
    identify::{Identify, IdentifyConfig, IdentifyEvent},
    swarm::{NetworkBehaviour, SwarmEvent},
    mdns::{Mdns, MdnsEvent},
    rendezvous::{client::Behaviour as RendezvousBehaviour, server::Behaviour as RendezvousServer},
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use serde::{Serialize, Deserialize};
use tracing::{debug, info, warn, error};
use tokio::sync::mpsc;
use tokio::task;
use std::net::Ipv4Addr;
use geo::prelude::*;
use geo::Point;
use maxminddb::geoip2::City;

/// Configuration for advanced networking features
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AdvancedNetworkConfig {
    /// Enable automatic NAT traversal
    pub enable_nat_traversal: bool,
    /// Enable peer discovery via rendezvous points
    pub enable_rendezvous: bool,
    /// Enable relay service for peers behind NAT
    pub enable_relay: bool,
    /// Enable geographic diversity
    pub enable_geo_diversity: bool,
    /// Enable MDNS discovery (local network)
    pub enable_mdns: bool,
    /// Maximum number of connections per subnet
    pub max_connections_per_subnet: u32,
    /// Geographic diversity target score (0.0-1.0)
    pub geo_diversity_target: f64,
    /// Enable IPv6 support
    pub enable_ipv6: bool,
    /// List of trusted rendezvous points
    pub rendezvous_points: Vec<String>,
}

impl Default for AdvancedNetworkConfig {
    fn default() -> Self {
        Self {
            enable_nat_traversal: true,
            enable_rendezvous: true,
            enable_relay: true,
            enable_geo_diversity: true,
            enable_mdns: true,
            max_connections_per_subnet: 2,
            geo_diversity_target: 0.8,
            enable_ipv6: true,
            rendezvous_points: vec![
                "/dns/rendezvous.supernova.io/tcp/4001/p2p/QmYRaTC2DqzenTzDGczCXEWzCMqg3TeWwLLSoNrSgX5XRV".to_string(),
                "/dns/rendezvous2.supernova.io/tcp/4001/p2p/QmX5gcRwmZ6UYYu6L2jLfYsX8sFuWTcQhLkKFzwSpmTPCF".to_string(),
            ],
        }
    }
}

/// Network behavior for advanced networking features
#[derive(NetworkBehaviour)]
#[behaviour(out_event = "AdvancedNetworkEvent")]
pub struct AdvancedNetworkBehaviour {
    ping: Ping,
    identify: Identify,
    mdns: Mdns,
    rendezvous_client: RendezvousBehaviour,
    rendezvous_server: RendezvousServer,
}

/// Events emitted by the advanced network behavior
#[derive(Debug)]
pub enum AdvancedNetworkEvent {
    Ping(libp2p::ping::PingEvent),
    Identify(IdentifyEvent),
    Mdns(MdnsEvent),
    RendezvousClient(libp2p::rendezvous::client::Event),
    RendezvousServer(libp2p::rendezvous::server::Event),
}

impl From<libp2p::ping::PingEvent> for AdvancedNetworkEvent {
    fn from(event: libp2p::ping::PingEvent) -> Self {
        AdvancedNetworkEvent::Ping(event)
    }
}

impl From<IdentifyEvent> for AdvancedNetworkEvent {
    fn from(event: IdentifyEvent) -> Self {
        AdvancedNetworkEvent::Identify(event)
    }
}

impl From<MdnsEvent> for AdvancedNetworkEvent {
    fn from(event: MdnsEvent) -> Self {
        AdvancedNetworkEvent::Mdns(event)
    }
}

impl From<libp2p::rendezvous::client::Event> for AdvancedNetworkEvent {
    fn from(event: libp2p::rendezvous::client::Event) -> Self {
        AdvancedNetworkEvent::RendezvousClient(event)
    }
}

impl From<libp2p::rendezvous::server::Event> for AdvancedNetworkEvent {
    fn from(event: libp2p::rendezvous::server::Event) -> Self {
        AdvancedNetworkEvent::RendezvousServer(event)
    }
}

/// Geographic information about a peer
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PeerGeoInfo {
    /// IP address of the peer
    pub ip: String,
    /// Country code (ISO 3166-1 alpha-2)
    pub country_code: Option<String>,
    /// Country name
    pub country_name: Option<String>,
    /// City name
    pub city: Option<String>,
    /// Latitude
    pub latitude: Option<f64>,
    /// Longitude
    pub longitude: Option<f64>,
    /// Autonomous System Number
    pub asn: Option<u32>,
    /// ISP name
    pub isp: Option<String>,
}

/// Connection statistics for advanced network features
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ConnectionStats {
    /// Number of inbound connections
    pub inbound_connections: usize,
    /// Number of outbound connections
    pub outbound_connections: usize,
    /// Number of relayed connections
    pub relayed_connections: usize,
    /// Number of directly connected peers
    pub direct_connections: usize,
    /// Number of private network peers
    pub private_peers: usize,
    /// Number of public network peers
    pub public_peers: usize,
    /// Geographic distribution of peers
    pub geo_distribution: HashMap<String, usize>,
    /// Subnet distribution of peers
    pub subnet_distribution: HashMap<String, usize>,
    /// ASN distribution of peers
    pub asn_distribution: HashMap<u32, usize>,
    /// Geographic diversity score (0.0-1.0)
    pub geo_diversity_score: f64,
    /// Average ping time in milliseconds
    pub average_ping_ms: f64,
    /// Last updated timestamp
    pub last_updated: u64,
}

/// Advanced network service for enhanced peer connectivity and diversity
pub struct AdvancedNetworkService {
    /// Configuration for advanced networking
    config: AdvancedNetworkConfig,
    /// Sender for commands to the network service
    command_tx: mpsc::Sender<NetworkCommand>,
    /// GeoIP database for IP geolocation
    geo_db: Option<Arc<maxminddb::Reader<Vec<u8>>>>,
    /// Information about known peers
    peer_info: Arc<RwLock<HashMap<PeerId, PeerInfo>>>,
    /// Network connection statistics
    stats: Arc<RwLock<ConnectionStats>>,
}

/// Information about a connected peer
#[derive(Clone, Debug)]
struct PeerInfo {
    /// Peer ID
    peer_id: PeerId,
    /// List of known addresses
    addresses: Vec<Multiaddr>,
    /// Geographic information
    geo_info: Option<PeerGeoInfo>,
    /// Protocol versions supported
    protocols: Vec<String>,
    /// Agent version string
    agent_version: Option<String>,
    /// Connection direction
    direction: ConnectionDirection,
    /// Last ping time in milliseconds
    last_ping_ms: Option<u64>,
    /// Last seen timestamp
    last_seen: Instant,
    /// Is this peer relayed
    is_relayed: bool,
    /// Is this peer a relay
    is_relay: bool,
    /// Is this peer connectable directly
    is_connectable: bool,
}

/// Direction of a connection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConnectionDirection {
    Inbound,
    Outbound,
}

/// Commands for the network service
#[derive(Debug)]
enum NetworkCommand {
    /// Connect to a peer
    Connect(PeerId, Vec<Multiaddr>),
    /// Disconnect from a peer
    Disconnect(PeerId),
    /// Start discovery process
    StartDiscovery,
    /// Register with rendezvous points
    RegisterRendezvous,
    /// Update connection limits
    UpdateConnectionLimits(usize, usize),
    /// Prioritize connection to a peer
    PrioritizePeer(PeerId, i32),
    /// Shutdown the service
    Shutdown,
}

impl AdvancedNetworkService {
    /// Create a new advanced network service
    pub async fn new(
        config: AdvancedNetworkConfig,
        geo_db_path: Option<String>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (command_tx, command_rx) = mpsc::channel(100);
        
        // Load GeoIP database if path is provided
        let geo_db = if let Some(path) = geo_db_path {
            match maxminddb::Reader::open_readfile(path) {
                Ok(reader) => Some(Arc::new(reader)),
                Err(e) => {
                    warn!("Failed to open GeoIP database: {}", e);
                    None
                }
            }
        } else {
            None
        };
        
        let peer_info = Arc::new(RwLock::new(HashMap::new()));
        let stats = Arc::new(RwLock::new(ConnectionStats::default()));
        
        let service = Self {
            config,
            command_tx,
            geo_db,
            peer_info,
            stats,
        };
        
        // Start the network service in a background task
        service.start_service(command_rx);
        
        Ok(service)
    }
    
    /// Start the network service in a background task
    fn start_service(&self, mut command_rx: mpsc::Receiver<NetworkCommand>) {
        let config = self.config.clone();
        let peer_info = Arc::clone(&self.peer_info);
        let stats = Arc::clone(&self.stats);
        let geo_db = self.geo_db.clone();
        
        task::spawn(async move {
            info!("Starting advanced network service");
            
            // Create libp2p swarm with the advanced behavior
            // This is a simplified example; in a real implementation,
            // you would create and manage the swarm here
            
            // Main event loop
            loop {
                tokio::select! {
                    Some(command) = command_rx.recv() => {
                        match command {
                            NetworkCommand::Connect(peer_id, addrs) => {
                                debug!("Connecting to peer: {}", peer_id);
                                // Handle connect command
                            },
                            NetworkCommand::Disconnect(peer_id) => {
                                debug!("Disconnecting from peer: {}", peer_id);
                                // Handle disconnect command
                            },
                            NetworkCommand::StartDiscovery => {
                                debug!("Starting peer discovery");
                                // Handle discovery command
                            },
                            NetworkCommand::RegisterRendezvous => {
                                debug!("Registering with rendezvous points");
                                // Handle rendezvous registration
                            },
                            NetworkCommand::UpdateConnectionLimits(inbound, outbound) => {
                                debug!("Updating connection limits: inbound={}, outbound={}", inbound, outbound);
                                // Handle connection limit update
                            },
                            NetworkCommand::PrioritizePeer(peer_id, priority) => {
                                debug!("Prioritizing peer {}: priority={}", peer_id, priority);
                                // Handle peer prioritization
                            },
                            NetworkCommand::Shutdown => {
                                info!("Shutting down advanced network service");
                                break;
                            }
                        }
                    },
                    else => {
                        // Handle swarm events, network operations, etc.
                        
                        // Update connection stats periodically
                        update_connection_stats(&stats, &peer_info, &config);
                        
                        // Sleep to avoid busy loop
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                }
            }
            
            info!("Advanced network service stopped");
        });
    }
    
    /// Connect to a peer with the given addresses
    pub async fn connect_to_peer(&self, peer_id: PeerId, addrs: Vec<Multiaddr>) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::Connect(peer_id, addrs))
            .await
            .map_err(|e| format!("Failed to send connect command: {}", e))
    }
    
    /// Disconnect from a peer
    pub async fn disconnect_from_peer(&self, peer_id: PeerId) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::Disconnect(peer_id))
            .await
            .map_err(|e| format!("Failed to send disconnect command: {}", e))
    }
    
    /// Start the peer discovery process
    pub async fn start_discovery(&self) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::StartDiscovery)
            .await
            .map_err(|e| format!("Failed to send discovery command: {}", e))
    }
    
    /// Register with rendezvous points
    pub async fn register_rendezvous(&self) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::RegisterRendezvous)
            .await
            .map_err(|e| format!("Failed to send rendezvous command: {}", e))
    }
    
    /// Update connection limits
    pub async fn update_connection_limits(&self, inbound: usize, outbound: usize) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::UpdateConnectionLimits(inbound, outbound))
            .await
            .map_err(|e| format!("Failed to send connection limits command: {}", e))
    }
    
    /// Prioritize connection to a peer
    pub async fn prioritize_peer(&self, peer_id: PeerId, priority: i32) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::PrioritizePeer(peer_id, priority))
            .await
            .map_err(|e| format!("Failed to send prioritize peer command: {}", e))
    }
    
    /// Shutdown the service
    pub async fn shutdown(&self) -> Result<(), String> {
        self.command_tx.send(NetworkCommand::Shutdown)
            .await
            .map_err(|e| format!("Failed to send shutdown command: {}", e))
    }
    
    /// Get current connection statistics
    pub fn get_connection_stats(&self) -> ConnectionStats {
        self.stats.read().unwrap().clone()
    }
    
    /// Get information about a connected peer
    pub fn get_peer_info(&self, peer_id: &PeerId) -> Option<PeerGeoInfo> {
        let info = self.peer_info.read().unwrap();
        info.get(peer_id).and_then(|p| p.geo_info.clone())
    }
    
    /// Get the geographic diversity score
    pub fn get_geo_diversity_score(&self) -> f64 {
        self.stats.read().unwrap().geo_diversity_score
    }
    
    /// Lookup geographic information for an IP address
    fn lookup_geo_info(&self, ip: &str) -> Option<PeerGeoInfo> {
        let geo_db = self.geo_db.as_ref()?;
        
        let ip_addr = match ip.parse() {
            Ok(addr) => addr,
            Err(_) => return None,
        };
        
        match geo_db.lookup::<City>(ip_addr) {
            Ok(city) => {
                let country = city.country.and_then(|c| c.iso_code.map(|code| code.to_string()));
                let country_name = city.country.and_then(|c| c.names.and_then(|n| n.get("en").map(|&s| s.to_string())));
                let city_name = city.city.and_then(|c| c.names.and_then(|n| n.get("en").map(|&s| s.to_string())));
                let latitude = city.location.as_ref().and_then(|l| l.latitude);
                let longitude = city.location.as_ref().and_then(|l| l.longitude);
                
                Some(PeerGeoInfo {
                    ip: ip.to_string(),
                    country_code: country,
                    country_name,
                    city: city_name,
                    latitude,
                    longitude,
                    asn: None, // ASN not available in basic City database
                    isp: None,  // ISP not available in basic City database
                })
            },
            Err(e) => {
                debug!("GeoIP lookup error for {}: {}", ip, e);
                None
            }
        }
    }
}

/// Calculate geographic diversity score based on peer distribution
fn calculate_geo_diversity(peers: &HashMap<PeerId, PeerInfo>) -> f64 {
    let mut country_counts = HashMap::new();
    let mut total_with_geo = 0;
    
    // Count peers by country
    for peer in peers.values() {
        if let Some(geo) = &peer.geo_info {
            if let Some(country) = &geo.country_code {
                *country_counts.entry(country.clone()).or_insert(0) += 1;
                total_with_geo += 1;
            }
        }
    }
    
    if total_with_geo == 0 {
        return 0.0;
    }
    
    // Calculate Shannon entropy for geographic distribution
    let mut entropy = 0.0;
    for count in country_counts.values() {
        let p = *count as f64 / total_with_geo as f64;
        entropy -= p * p.log2();
    }
    
    // Normalize entropy (0.0-1.0)
    let max_entropy = (country_counts.len() as f64).log2();
    if max_entropy > 0.0 {
        entropy / max_entropy
    } else {
        0.0
    }
}

/// Convert IP address to subnet (/24 for IPv4, /64 for IPv6)
fn ip_to_subnet(ip: &str) -> Option<String> {
    if let Ok(addr) = ip.parse::<std::net::IpAddr>() {
        match addr {
            std::net::IpAddr::V4(v4) => {
                let octets = v4.octets();
                Some(format!("{}.{}.{}.0/24", octets[0], octets[1], octets[2]))
            },
            std::net::IpAddr::V6(v6) => {
                let segments = v6.segments();
                Some(format!("{:x}:{:x}:{:x}:{:x}::/64", 
                    segments[0], segments[1], segments[2], segments[3]))
            }
        }
    } else {
        None
    }
}

/// Update connection statistics based on current peer information
fn update_connection_stats(
    stats: &Arc<RwLock<ConnectionStats>>,
    peer_info: &Arc<RwLock<HashMap<PeerId, PeerInfo>>>,
    config: &AdvancedNetworkConfig,
) {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
        
    let peers = peer_info.read().unwrap();
    let mut new_stats = ConnectionStats {
        last_updated: now,
        ..Default::default()
    };
    
    // Count various connection types
    for peer in peers.values() {
        match peer.direction {
            ConnectionDirection::Inbound => new_stats.inbound_connections += 1,
            ConnectionDirection::Outbound => new_stats.outbound_connections += 1,
        }
        
        if peer.is_relayed {
            new_stats.relayed_connections += 1;
        } else {
            new_stats.direct_connections += 1;
        }
        
        if peer.is_connectable {
            new_stats.public_peers += 1;
        } else {
            new_stats.private_peers += 1;
        }
        
        // Geographic distribution
        if let Some(geo) = &peer.geo_info {
            if let Some(country) = &geo.country_code {
                *new_stats.geo_distribution.entry(country.clone()).or_insert(0) += 1;
            }
            
            if let Some(asn) = geo.asn {
                *new_stats.asn_distribution.entry(asn).or_insert(0) += 1;
            }
        }
        
        // Subnet distribution
        for addr in &peer.addresses {
            if let Some(ip) = extract_ip_from_multiaddr(addr) {
                if let Some(subnet) = ip_to_subnet(&ip) {
                    *new_stats.subnet_distribution.entry(subnet).or_insert(0) += 1;
                }
            }
        }
        
        // Calculate average ping time
        if let Some(ping) = peer.last_ping_ms {
            if new_stats.average_ping_ms == 0.0 {
                new_stats.average_ping_ms = ping as f64;
            } else {
                new_stats.average_ping_ms = (new_stats.average_ping_ms + ping as f64) / 2.0;
            }
        }
    }
    
    // Calculate geographic diversity score
    new_stats.geo_diversity_score = calculate_geo_diversity(&peers);
    
    // Update stats atomically
    *stats.write().unwrap() = new_stats;
}

/// Extract IP address from a multiaddr
fn extract_ip_from_multiaddr(addr: &Multiaddr) -> Option<String> {
    use libp2p::core::multiaddr::Protocol;
    
    for proto in addr.iter() {
        match proto {
            Protocol::Ip4(ip) => return Some(ip.to_string()),
            Protocol::Ip6(ip) => return Some(ip.to_string()),
            _ => {}
        }
    }
    
    None
} 