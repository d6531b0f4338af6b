//! Trick resolution and round scoring for Hearts.

use super::types::{Card, PlayedCard, SEATS};

/// Points available in one round: 13 hearts plus the queen of spades.
pub const MOON_SHOT_POINTS: u32 = 26;

/// Seat that wins a trick: highest rank in the suit that was led. Cards of
/// other suits never win.
pub fn trick_winner(cards: &[PlayedCard]) -> Option<usize> {
    let led = cards.first()?.card.suit;
    cards
        .iter()
        .filter(|pc| pc.card.suit == led)
        .max_by_key(|pc| pc.card.rank)
        .map(|pc| pc.seat)
}

/// 1 per heart, 13 for the queen of spades.
pub fn card_points(card: Card) -> u32 {
    if card.is_heart() {
        1
    } else if card == Card::QUEEN_OF_SPADES {
        13
    } else {
        0
    }
}

pub fn trick_points(cards: &[PlayedCard]) -> u32 {
    cards.iter().map(|pc| card_points(pc.card)).sum()
}

/// Fold a finished round into the cumulative scores. Returns the seat that
/// shot the moon, if any: that seat scores nothing and everyone else takes
/// `moon_shot_penalty`.
pub fn settle_round(
    scores: &mut [u32; SEATS],
    round_scores: &[u32; SEATS],
    moon_shot_penalty: u32,
) -> Option<usize> {
    let shooter = round_scores.iter().position(|&s| s == MOON_SHOT_POINTS);
    match shooter {
        Some(moon) => {
            for (seat, score) in scores.iter_mut().enumerate() {
                if seat != moon {
                    *score += moon_shot_penalty;
                }
            }
        }
        None => {
            for (score, round) in scores.iter_mut().zip(round_scores) {
                *score += round;
            }
        }
    }
    shooter
}
