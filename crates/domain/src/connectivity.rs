//! Connectivity status published on `{root}/connected`.

use std::fmt;

/// Liveness/pairing value carried by the retained connectivity topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    /// The bridge process is gone (last will).
    Offline,
    /// Connected to the bus, device bridge not paired yet.
    BusOnly,
    /// Connected to the bus and paired with the device bridge.
    Paired,
}

impl ConnectivityStatus {
    /// Status for the current pairing state, assuming the bus is connected.
    #[must_use]
    pub fn connected(paired: bool) -> Self {
        if paired { Self::Paired } else { Self::BusOnly }
    }

    /// Wire payload.
    #[must_use]
    pub fn as_payload(self) -> &'static str {
        match self {
            Self::Offline => "0",
            Self::BusOnly => "1",
            Self::Paired => "2",
        }
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_payload())
    }
}
