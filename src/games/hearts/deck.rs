//! The 52-card deck and seeded dealing.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::types::{Card, Suit, HAND_SIZE, SEATS};

pub static FULL_DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    Suit::ALL
        .iter()
        .flat_map(|&suit| (2..=14).map(move |rank| Card::new(suit, rank)))
        .collect()
});

/// Deal 13 cards to each seat from a deck shuffled (Fisher-Yates) with a
/// seed derived from the match seed and round, so every deal is
/// reproducible from the persisted state.
pub fn deal(seed: u64, round: u32) -> [Vec<Card>; SEATS] {
    let mut deck = FULL_DECK.clone();
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(round as u64));
    deck.shuffle(&mut rng);

    let mut hands: [Vec<Card>; SEATS] = Default::default();
    for (seat, chunk) in deck.chunks(HAND_SIZE).enumerate() {
        hands[seat] = chunk.to_vec();
        hands[seat].sort();
    }
    hands
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_full_deck() {
        assert_eq!(FULL_DECK.len(), 52);
        let unique: HashSet<Card> = FULL_DECK.iter().copied().collect();
        assert_eq!(unique.len(), 52);
        assert_eq!(FULL_DECK.iter().filter(|c| c.is_point_card()).count(), 14);
    }

    #[test]
    fn test_deal_partitions_deck() {
        let hands = deal(7, 1);
        let mut all: Vec<Card> = hands.iter().flatten().copied().collect();
        assert!(hands.iter().all(|h| h.len() == HAND_SIZE));
        all.sort();
        let mut deck = FULL_DECK.clone();
        deck.sort();
        assert_eq!(all, deck);
    }

    #[test]
    fn test_deal_is_deterministic_per_seed_and_round() {
        assert_eq!(deal(42, 1), deal(42, 1));
        assert_ne!(deal(42, 1), deal(42, 2));
    }
}
