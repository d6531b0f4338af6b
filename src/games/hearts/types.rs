//! Domain types for Hearts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of seats at the table.
pub const SEATS: usize = 4;
pub const HAND_SIZE: usize = 13;
pub const PASS_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Clubs,
    Diamonds,
    Spades,
    Hearts,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Spades, Suit::Hearts];

    pub fn symbol(self) -> char {
        match self {
            Suit::Clubs => '♣',
            Suit::Diamonds => '♦',
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Suit::Clubs => "clubs",
            Suit::Diamonds => "diamonds",
            Suit::Spades => "spades",
            Suit::Hearts => "hearts",
        };
        f.write_str(name)
    }
}

/// A playing card. Ranks run 2..=14 with 11-14 for J, Q, K, A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: u8,
}

impl Card {
    pub const TWO_OF_CLUBS: Card = Card { suit: Suit::Clubs, rank: 2 };
    pub const QUEEN_OF_SPADES: Card = Card { suit: Suit::Spades, rank: 12 };

    pub fn new(suit: Suit, rank: u8) -> Self {
        Self { suit, rank }
    }

    pub fn is_heart(self) -> bool {
        self.suit == Suit::Hearts
    }

    /// Hearts and the queen of spades.
    pub fn is_point_card(self) -> bool {
        self.is_heart() || self == Card::QUEEN_OF_SPADES
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.rank {
            11 => write!(f, "J{}", self.suit.symbol()),
            12 => write!(f, "Q{}", self.suit.symbol()),
            13 => write!(f, "K{}", self.suit.symbol()),
            14 => write!(f, "A{}", self.suit.symbol()),
            r => write!(f, "{}{}", r, self.suit.symbol()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeartsPhase {
    Passing,
    Playing,
    RoundComplete,
    GameComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassingDirection {
    Left,
    Right,
    Across,
    None,
}

impl PassingDirection {
    /// Seat offset on the ring that receives a seat's passed cards.
    pub fn offset(self) -> usize {
        match self {
            PassingDirection::Left => 1,
            PassingDirection::Across => 2,
            PassingDirection::Right => 3,
            PassingDirection::None => 0,
        }
    }

    /// left -> right -> across -> none -> left ...
    pub fn next(self) -> Self {
        match self {
            PassingDirection::Left => PassingDirection::Right,
            PassingDirection::Right => PassingDirection::Across,
            PassingDirection::Across => PassingDirection::None,
            PassingDirection::None => PassingDirection::Left,
        }
    }
}

impl fmt::Display for PassingDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PassingDirection::Left => "left",
            PassingDirection::Right => "right",
            PassingDirection::Across => "across",
            PassingDirection::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayedCard {
    pub seat: usize,
    pub card: Card,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trick {
    pub cards: Vec<PlayedCard>,
    pub leader: usize,
    #[serde(default)]
    pub winner: Option<usize>,
}

impl Trick {
    pub fn led_by(leader: usize) -> Self {
        Self {
            cards: Vec::new(),
            leader,
            winner: None,
        }
    }

    pub fn led_suit(&self) -> Option<Suit> {
        self.cards.first().map(|pc| pc.card.suit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartsSettings {
    pub target_score: u32,
    pub moon_shot_penalty: u32,
}

impl Default for HeartsSettings {
    fn default() -> Self {
        Self {
            target_score: 100,
            moon_shot_penalty: 26,
        }
    }
}

/// A move submitted by a seat: three cards to pass, or one card to play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HeartsMove {
    Pass { cards: Vec<Card> },
    Play { card: Card },
}

/// Full Hearts game state. Seats are positions in turn order (0..4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartsState {
    pub phase: HeartsPhase,
    pub round: u32,
    pub hands: [Vec<Card>; SEATS],
    pub passed_cards: [Vec<Card>; SEATS],
    pub current_trick: Trick,
    #[serde(default)]
    pub last_trick: Option<Trick>,
    pub tricks_won: [u32; SEATS],
    /// Cards captured in completed tricks this round.
    #[serde(default)]
    pub taken_cards: [Vec<Card>; SEATS],
    pub scores: [u32; SEATS],
    pub round_scores: [u32; SEATS],
    pub hearts_broken: bool,
    pub passing_direction: PassingDirection,
    pub game_settings: HeartsSettings,
    #[serde(default)]
    pub deal_seed: u64,
}

impl HeartsState {
    pub fn tricks_played(&self) -> u32 {
        self.tricks_won.iter().sum()
    }

    pub fn has_passed(&self, seat: usize) -> bool {
        self.passed_cards.get(seat).is_some_and(|c| !c.is_empty())
    }

    pub fn holder_of(&self, card: Card) -> Option<usize> {
        self.hands.iter().position(|hand| hand.contains(&card))
    }

    /// Seat expected to play next while the trick is running.
    pub fn seat_to_play(&self) -> usize {
        match self.current_trick.cards.last() {
            Some(pc) => (pc.seat % SEATS + 1) % SEATS,
            None => self.current_trick.leader % SEATS,
        }
    }

    /// Seat references a decoded state must keep within the table.
    pub fn check_seats(&self) -> Result<(), String> {
        let tricks = std::iter::once(&self.current_trick).chain(self.last_trick.as_ref());
        for trick in tricks {
            if trick.leader >= SEATS {
                return Err(format!("trick leader {} is not a seat", trick.leader));
            }
            if let Some(winner) = trick.winner.filter(|&w| w >= SEATS) {
                return Err(format!("trick winner {winner} is not a seat"));
            }
            if let Some(pc) = trick.cards.iter().find(|pc| pc.seat >= SEATS) {
                return Err(format!("{} was played from seat {}", pc.card, pc.seat));
            }
        }
        if self.current_trick.cards.len() >= SEATS {
            return Err(format!(
                "running trick holds {} cards",
                self.current_trick.cards.len()
            ));
        }
        Ok(())
    }

    /// Every card the state accounts for this round: hands, pass buffers,
    /// the running trick and captured tricks.
    pub fn cards_in_play(&self) -> Vec<Card> {
        let mut cards: Vec<Card> = Vec::with_capacity(52);
        for seat in 0..SEATS {
            cards.extend(&self.hands[seat]);
            cards.extend(&self.passed_cards[seat]);
            cards.extend(&self.taken_cards[seat]);
        }
        cards.extend(self.current_trick.cards.iter().map(|pc| pc.card));
        cards
    }
}
