//! Network Finder - match IP addresses and subnets against a set of networks
//!
//! This library keeps a sorted collection of CIDR networks per address
//! family and answers:
//! - Exact match (`search_exact`)
//! - Longest-prefix match (`search_best`)
//! - Shortest-prefix match (`search_worst`)
//! - Networks contained by a subnet (`search_covered`)
//! - Networks containing a subnet (`search_covering`)
//!
//! Networks can carry caller-defined metadata, merged when the same network
//! is added twice.
//!
//! # Example
//!
//! ```rust
//! use network_finder::Ipv4Finder;
//!
//! let mut finder = Ipv4Finder::new();
//! finder.add("10.0.0.0/8", None).unwrap();
//! finder.add("10.1.0.0/16", None).unwrap().set_attr("gateway", "10.1.0.1");
//!
//! let best = finder.search_best("10.1.2.3").unwrap().unwrap();
//! assert_eq!(best.to_string(), "10.1.0.0/16");
//! assert_eq!(best.attr("gateway").unwrap(), "10.1.0.1");
//!
//! let worst = finder.search_worst("10.1.2.3").unwrap().unwrap();
//! assert_eq!(worst.to_string(), "10.0.0.0/8");
//! ```
//!
//! # Network List Syntax
//!
//! Finders can be built from a text list:
//! ```text
//! # comment
//! 10.0.0.0/8   site=ams weight=10
//! 10.1.0.0/16  primary=true
//! file: /etc/networks.d/extra.txt
//! ```
//!
//! | Element | Example | Description |
//! |---------|---------|-------------|
//! | CIDR | `10.0.0.0/8` | Network, host bits are cleared |
//! | Address | `192.0.2.1` | Host network (full-width prefix) |
//! | Attribute | `weight=10` | Metadata, JSON value or plain string |
//! | Quoted attribute | `owner="noc team"` | String value, may contain whitespace but not `#` |
//! | Include | `file: path` | Entries from another list |

pub mod codec;
pub mod error;
pub mod family;
pub mod finder;
pub mod metadata;
pub mod network;
pub mod parser;
pub mod shared;

// Re-export commonly used items
pub use codec::{format_address, parse_address, parse_cidr};
pub use error::{ErrorKind, FinderError, Result};
pub use family::{AddressFamily, Ipv4, Ipv6};
pub use finder::{Ipv4Finder, Ipv6Finder, NetworkFinder};
pub use metadata::{Metadata, RESERVED_FIELDS};
pub use network::{IntoNetwork, Ipv4Network, Ipv6Network, Network};
pub use parser::{parse_networks, parse_networks_from_file, NetworkEntry};
pub use shared::SharedNetworkFinder;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_workflow() {
        let networks = r#"
# Aggregates
10.0.0.0/8       site=core
10.0.0.0/13
10.0.0.0/16      site=ams
10.0.0.0/24

# Default route
0.0.0.0/0        site=upstream
"#;

        let mut finder = Ipv4Finder::from_text(networks).unwrap();
        assert_eq!(finder.len(), 5);

        // Longest prefix
        let best = finder.search_best("10.0.1.9").unwrap().unwrap();
        assert_eq!(best.to_string(), "10.0.0.0/16");
        assert_eq!(best.attr("site").unwrap(), "ams");

        // Shortest prefix
        let worst = finder.search_worst("10.0.1.9").unwrap().unwrap();
        assert_eq!(worst.to_string(), "0.0.0.0/0");

        // Nothing more specific than the default route
        let best = finder.search_best("192.0.2.1").unwrap().unwrap();
        assert_eq!(best.attr("site").unwrap(), "upstream");

        // Covered subnets of the /8
        let covered: Vec<String> = finder
            .search_covered("10.0.0.0/8")
            .unwrap()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(
            covered,
            ["10.0.0.0/8", "10.0.0.0/13", "10.0.0.0/16", "10.0.0.0/24"]
        );

        // Remove the default route
        finder.delete("0.0.0.0/0").unwrap();
        assert!(finder.search_best("192.0.2.1").unwrap().is_none());
        assert_eq!(
            finder.delete("0.0.0.0/0").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
