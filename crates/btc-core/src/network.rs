use bitcoin::Network;

/// Bitcoin network parameters this core operates under.
///
/// Address encoding, sighash computation and script verification are all
/// parameterized on a network; the query façade and external collaborators
/// are Bitcoin mainnet only (see the crate-level Non-goals), but the core
/// keeps the parameter explicit rather than hard-coding `Network::Bitcoin`
/// throughout, since every `bitcoin` crate API already takes one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtcNetwork {
    Mainnet,
}

impl BtcNetwork {
    /// Convert to the `bitcoin` crate's `Network` type.
    pub fn to_bitcoin_network(self) -> Network {
        match self {
            BtcNetwork::Mainnet => Network::Bitcoin,
        }
    }
}

impl std::fmt::Display for BtcNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BtcNetwork::Mainnet => write!(f, "mainnet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_converts_to_bitcoin_network() {
        assert_eq!(BtcNetwork::Mainnet.to_bitcoin_network(), Network::Bitcoin);
    }

    #[test]
    fn display_name() {
        assert_eq!(BtcNetwork::Mainnet.to_string(), "mainnet");
    }

    #[test]
    fn clone_and_copy() {
        let net = BtcNetwork::Mainnet;
        let net2 = net;
        assert_eq!(net, net2);
    }
}
