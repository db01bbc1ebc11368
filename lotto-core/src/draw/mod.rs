use crate::types::AccountId;
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Source of the settlement draw seed.
///
/// The seed must come from outside the ledger's own mutable state so that
/// participants cannot steer the outcome by timing their purchases. Swap in
/// an externally verifiable beacon where one is available.
pub trait EntropySource: Send + Sync {
    fn seed(&self) -> [u8; 32];
}

/// Operating-system randomness.
#[derive(Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn seed(&self) -> [u8; 32] {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        seed
    }
}

/// Fixed seed source for reproducible draws.
#[derive(Debug, Clone)]
pub struct FixedEntropy(pub [u8; 32]);

impl EntropySource for FixedEntropy {
    fn seed(&self) -> [u8; 32] {
        self.0
    }
}

/// Pick the winning ticket holder from a weighted ticket ledger.
///
/// Every sold ticket is an equal-weight entry. The seed is expanded with
/// SHA-256 and reduced to a ticket index in `[0, total)`; the holder of that
/// ticket wins. Returns `None` when no tickets were sold. Callers must pass
/// `total == sum(balances.values())`; iteration over the `BTreeMap` is
/// ordered, so a given seed always selects the same winner.
pub fn pick_winner(
    balances: &BTreeMap<AccountId, u64>,
    total: u64,
    seed: [u8; 32],
) -> Option<AccountId> {
    if total == 0 {
        return None;
    }

    let digest = Sha256::digest(seed);
    let mut word = [0u8; 8];
    word.copy_from_slice(&digest[..8]);
    let mut cursor = u64::from_be_bytes(word) % total;

    for (account, tickets) in balances {
        if cursor < *tickets {
            return Some(account.clone());
        }
        cursor -= tickets;
    }

    // Unreachable when total matches the ledger sum
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger(entries: &[(&str, u64)]) -> BTreeMap<AccountId, u64> {
        entries
            .iter()
            .map(|(name, tickets)| (AccountId::from(*name), *tickets))
            .collect()
    }

    #[test]
    fn empty_ledger_has_no_winner() {
        assert_eq!(pick_winner(&BTreeMap::new(), 0, [7u8; 32]), None);
    }

    #[test]
    fn sole_holder_always_wins() {
        let balances = ledger(&[("alice", 1000)]);
        for byte in 0..32u8 {
            let winner = pick_winner(&balances, 1000, [byte; 32]);
            assert_eq!(winner, Some(AccountId::from("alice")));
        }
    }

    #[test]
    fn same_seed_same_winner() {
        let balances = ledger(&[("alice", 3), ("bob", 5), ("carol", 2)]);
        let first = pick_winner(&balances, 10, [42u8; 32]);
        let second = pick_winner(&balances, 10, [42u8; 32]);
        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn winner_holds_at_least_one_ticket() {
        let balances = ledger(&[("alice", 1), ("bob", 0), ("carol", 4)]);
        for byte in 0..64u8 {
            let winner = pick_winner(&balances, 5, [byte; 32]).unwrap();
            assert!(balances[&winner] > 0, "{} holds no tickets", winner);
        }
    }

    #[test]
    fn every_holder_reachable_over_seed_space() {
        let balances = ledger(&[("alice", 1), ("bob", 1), ("carol", 1)]);
        let mut seen = std::collections::BTreeSet::new();
        for byte in 0..=255u8 {
            if let Some(winner) = pick_winner(&balances, 3, [byte; 32]) {
                seen.insert(winner);
            }
        }
        assert_eq!(seen.len(), 3);
    }
}
