/// Request generation counters, one per fetch kind
///
/// Every fetch takes a fresh generation before the request goes out. When the
/// response comes back it is applied only if no newer request of the same
/// kind has been issued in the meantime, so an overlapping manual refresh and
/// timer tick can never let a slow, older response win.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchKind {
    Subnet,
    Settings,
    Coldkeys,
    Miners,
    SubnetPrice,
    BasePrice,
    Notifications,
}

impl FetchKind {
    pub const COUNT: usize = 7;

    /// Poll order of one refresh cycle (notifications run on their own timer)
    pub const POLL_ORDER: [FetchKind; 6] = [
        FetchKind::Subnet,
        FetchKind::Settings,
        FetchKind::Coldkeys,
        FetchKind::Miners,
        FetchKind::SubnetPrice,
        FetchKind::BasePrice,
    ];

    fn index(self) -> usize {
        match self {
            FetchKind::Subnet => 0,
            FetchKind::Settings => 1,
            FetchKind::Coldkeys => 2,
            FetchKind::Miners => 3,
            FetchKind::SubnetPrice => 4,
            FetchKind::BasePrice => 5,
            FetchKind::Notifications => 6,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FetchKind::Subnet => "subnet",
            FetchKind::Settings => "settings",
            FetchKind::Coldkeys => "coldkeys",
            FetchKind::Miners => "miners",
            FetchKind::SubnetPrice => "price",
            FetchKind::BasePrice => "taoPrice",
            FetchKind::Notifications => "notifications",
        }
    }
}

#[derive(Debug, Default)]
pub struct RequestGenerations {
    counters: [AtomicU64; FetchKind::COUNT],
}

impl RequestGenerations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request of `kind` and return its generation
    pub fn issue(&self, kind: FetchKind) -> u64 {
        self.counters[kind.index()].fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Latest generation issued for `kind` (0 before any request)
    pub fn current(&self, kind: FetchKind) -> u64 {
        self.counters[kind.index()].load(Ordering::SeqCst)
    }

    pub fn is_current(&self, kind: FetchKind, generation: u64) -> bool {
        self.current(kind) == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generations_are_monotonic_per_kind() {
        let gens = RequestGenerations::new();
        assert_eq!(gens.current(FetchKind::Miners), 0);

        let first = gens.issue(FetchKind::Miners);
        let second = gens.issue(FetchKind::Miners);
        assert!(second > first);
        assert!(!gens.is_current(FetchKind::Miners, first));
        assert!(gens.is_current(FetchKind::Miners, second));
    }

    #[test]
    fn test_kinds_do_not_interfere() {
        let gens = RequestGenerations::new();
        let miners = gens.issue(FetchKind::Miners);
        gens.issue(FetchKind::SubnetPrice);
        gens.issue(FetchKind::SubnetPrice);
        assert!(gens.is_current(FetchKind::Miners, miners));
        assert_eq!(gens.current(FetchKind::SubnetPrice), 2);
    }
}
