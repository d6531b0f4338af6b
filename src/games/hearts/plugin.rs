//! Four-player Hearts engine.
//!
//! Phases cycle passing -> playing -> round_complete, then back to passing
//! (or straight to playing when the passing direction is `none`) until a
//! cumulative score reaches the target, which ends the game.

use std::collections::HashSet;

use crate::engine::errors::GameError;
use crate::engine::models::*;
use crate::engine::plugin::TypedGameEngine;
use crate::engine::turns;

use super::deck::deal;
use super::scoring::{settle_round, trick_points, trick_winner};
use super::types::*;

#[derive(Default)]
pub struct HeartsEngine {
    /// Used when the match options leave a setting out.
    pub defaults: HeartsSettings,
}

impl HeartsEngine {
    pub fn new(defaults: HeartsSettings) -> Self {
        Self { defaults }
    }

    /// Option value for `key`, or None when absent or unusable.
    /// `check_config` reports the unusable ones.
    fn option_u32(config: &GameConfig, key: &str) -> Option<u32> {
        config.option_u64(key).and_then(|v| u32::try_from(v).ok())
    }

    fn settings_for(&self, config: &GameConfig) -> HeartsSettings {
        HeartsSettings {
            target_score: Self::option_u32(config, "target_score")
                .filter(|&v| v > 0)
                .unwrap_or(self.defaults.target_score),
            moon_shot_penalty: Self::option_u32(config, "moon_shot_penalty")
                .unwrap_or(self.defaults.moon_shot_penalty),
        }
    }

    fn seat(players: &[Player], player_id: &str) -> Option<usize> {
        turns::seat_of(players, player_id).filter(|&s| s < SEATS)
    }

    fn validate_pass(state: &HeartsState, seat: usize, cards: &[Card]) -> Option<String> {
        if cards.len() != PASS_SIZE {
            return Some(format!("You must pass exactly {PASS_SIZE} cards"));
        }
        let hand = &state.hands[seat];
        if let Some(missing) = cards.iter().find(|&&c| !hand.contains(&c)) {
            return Some(format!("You do not hold {missing}"));
        }
        let unique: HashSet<&Card> = cards.iter().collect();
        if unique.len() != cards.len() {
            return Some("Cannot pass the same card twice".into());
        }
        if state.has_passed(seat) {
            return Some("You have already passed this round".into());
        }
        None
    }

    fn validate_play(state: &HeartsState, seat: usize, card: Card) -> Option<String> {
        if state.seat_to_play() != seat {
            return Some("It is not your turn to play".into());
        }
        let hand = &state.hands[seat];
        if !hand.contains(&card) {
            return Some(format!("You do not hold {card}"));
        }

        let first_trick = state.tricks_played() == 0;
        let only_hearts = hand.iter().all(|c| c.is_heart());

        match state.current_trick.led_suit() {
            None => {
                if first_trick && card != Card::TWO_OF_CLUBS {
                    return Some("The first trick must be led with the 2♣".into());
                }
                if card.is_heart() && !state.hearts_broken && !only_hearts {
                    return Some("Hearts have not been broken".into());
                }
            }
            Some(led) => {
                let can_follow = hand.iter().any(|c| c.suit == led);
                if can_follow && card.suit != led {
                    return Some(format!("You must follow suit ({led})"));
                }
                if !can_follow {
                    let only_points = hand.iter().all(|c| c.is_point_card());
                    if first_trick && card.is_point_card() && !only_points {
                        return Some("Point cards cannot be played on the first trick".into());
                    }
                    if card.is_heart() && !state.hearts_broken && !only_hearts && !first_trick {
                        return Some("Hearts have not been broken".into());
                    }
                }
            }
        }
        None
    }

    fn apply_pass(mut s: HeartsState, seat: usize, cards: &[Card]) -> HeartsState {
        s.hands[seat].retain(|c| !cards.contains(c));
        s.passed_cards[seat] = cards.to_vec();

        if (0..SEATS).all(|seat| s.has_passed(seat)) {
            let offset = s.passing_direction.offset();
            let passed = std::mem::take(&mut s.passed_cards);
            for (from, cards) in passed.into_iter().enumerate() {
                s.hands[(from + offset) % SEATS].extend(cards);
            }
            for hand in s.hands.iter_mut() {
                hand.sort();
            }
            Self::begin_play(&mut s);
            tracing::debug!(round = s.round, direction = %s.passing_direction, "cards exchanged");
        }
        s
    }

    /// Switch to trick play with the 2♣ holder leading.
    fn begin_play(s: &mut HeartsState) {
        s.phase = HeartsPhase::Playing;
        let leader = s.holder_of(Card::TWO_OF_CLUBS).unwrap_or(0);
        s.current_trick = Trick::led_by(leader);
    }

    fn apply_play(mut s: HeartsState, seat: usize, card: Card) -> HeartsState {
        s.hands[seat].retain(|&c| c != card);
        s.current_trick.cards.push(PlayedCard { seat, card });
        if card.is_heart() {
            s.hearts_broken = true;
        }

        if s.current_trick.cards.len() < SEATS {
            return s;
        }

        let mut finished = std::mem::replace(&mut s.current_trick, Trick::led_by(0));
        let winner = trick_winner(&finished.cards).unwrap_or(finished.leader % SEATS);
        let points = trick_points(&finished.cards);
        finished.winner = Some(winner);

        s.tricks_won[winner] += 1;
        s.round_scores[winner] += points;
        s.taken_cards[winner].extend(finished.cards.iter().map(|pc| pc.card));
        s.current_trick = Trick::led_by(winner);
        s.last_trick = Some(finished);

        if s.hands.iter().all(|h| h.is_empty()) {
            Self::finish_round(&mut s);
        }
        s
    }

    fn finish_round(s: &mut HeartsState) {
        s.phase = HeartsPhase::RoundComplete;
        let moon = settle_round(&mut s.scores, &s.round_scores, s.game_settings.moon_shot_penalty);
        tracing::debug!(round = s.round, scores = ?s.scores, moon = ?moon, "round complete");

        s.round_scores = [0; SEATS];
        s.taken_cards = Default::default();
        s.tricks_won = [0; SEATS];
        s.hearts_broken = false;
        s.round += 1;
        s.passing_direction = s.passing_direction.next();

        if s.scores.iter().any(|&score| score >= s.game_settings.target_score) {
            s.phase = HeartsPhase::GameComplete;
            tracing::info!(scores = ?s.scores, "hearts game complete");
            return;
        }
        Self::start_round(s);
    }

    fn start_round(s: &mut HeartsState) {
        s.hands = deal(s.deal_seed, s.round);
        s.passed_cards = Default::default();
        if s.passing_direction == PassingDirection::None {
            Self::begin_play(s);
        } else {
            s.phase = HeartsPhase::Passing;
            let leader = s.holder_of(Card::TWO_OF_CLUBS).unwrap_or(0);
            s.current_trick = Trick::led_by(leader);
        }
    }

    fn pass_combinations(hand: &[Card]) -> Vec<HeartsMove> {
        let mut moves = Vec::new();
        for i in 0..hand.len() {
            for j in i + 1..hand.len() {
                for k in j + 1..hand.len() {
                    moves.push(HeartsMove::Pass {
                        cards: vec![hand[i], hand[j], hand[k]],
                    });
                }
            }
        }
        moves
    }
}

impl TypedGameEngine for HeartsEngine {
    type State = HeartsState;
    type Move = HeartsMove;

    const GAME_TYPE: &'static str = "hearts";
    const GAME_TYPE_NAME: &'static str = "Hearts";
    const GAME_DESCRIPTION: &'static str =
        "Four-player trick-taking card game. Avoid hearts and the queen of spades; lowest score wins.";
    const MIN_PLAYERS: u32 = 4;
    const MAX_PLAYERS: u32 = 4;
    const AVAILABLE_COLORS: &'static [&'static str] = &["red", "blue", "green", "yellow"];

    fn initial_state(&self, config: &GameConfig) -> HeartsState {
        let deal_seed = config.random_seed.unwrap_or_else(rand::random);
        let mut state = HeartsState {
            phase: HeartsPhase::Passing,
            round: 1,
            hands: Default::default(),
            passed_cards: Default::default(),
            current_trick: Trick::led_by(0),
            last_trick: None,
            tricks_won: [0; SEATS],
            taken_cards: Default::default(),
            scores: [0; SEATS],
            round_scores: [0; SEATS],
            hearts_broken: false,
            passing_direction: PassingDirection::Left,
            game_settings: self.settings_for(config),
            deal_seed,
        };
        Self::start_round(&mut state);
        state
    }

    fn validate_move(
        &self,
        state: &HeartsState,
        mv: &HeartsMove,
        player_id: &str,
        players: &[Player],
    ) -> Option<String> {
        let Some(seat) = Self::seat(players, player_id) else {
            return Some(format!("Player {player_id} is not in this game"));
        };
        match (state.phase, mv) {
            (HeartsPhase::Passing, HeartsMove::Pass { cards }) => {
                Self::validate_pass(state, seat, cards)
            }
            (HeartsPhase::Passing, HeartsMove::Play { .. }) => {
                Some("Cards must be passed before play begins".into())
            }
            (HeartsPhase::Playing, HeartsMove::Play { card }) => {
                Self::validate_play(state, seat, *card)
            }
            (HeartsPhase::Playing, HeartsMove::Pass { .. }) => {
                Some("Passing is over for this round".into())
            }
            (HeartsPhase::RoundComplete, _) => Some("The round is being scored".into()),
            (HeartsPhase::GameComplete, _) => Some("The game is over".into()),
        }
    }

    fn apply_move(
        &self,
        state: &HeartsState,
        mv: &HeartsMove,
        player_id: &str,
        players: &[Player],
    ) -> Result<HeartsState, GameError> {
        let seat = Self::seat(players, player_id)
            .ok_or_else(|| GameError::UnknownPlayer(player_id.to_string()))?;
        let s = state.clone();
        match (state.phase, mv) {
            (HeartsPhase::Passing, HeartsMove::Pass { cards }) => Ok(Self::apply_pass(s, seat, cards)),
            (HeartsPhase::Playing, HeartsMove::Play { card }) => Ok(Self::apply_play(s, seat, *card)),
            (phase, _) => Err(GameError::IllegalMove(format!(
                "move does not fit the {phase:?} phase"
            ))),
        }
    }

    fn check_config(&self, config: &GameConfig) -> Result<(), GameError> {
        for key in ["target_score", "moon_shot_penalty"] {
            let Some(value) = config.options.get(key) else {
                continue;
            };
            let Some(v) = Self::option_u32(config, key) else {
                return Err(GameError::InvalidConfig(format!(
                    "{key} must be a whole number up to {}, got {value}",
                    u32::MAX
                )));
            };
            if key == "target_score" && v == 0 {
                return Err(GameError::InvalidConfig("target_score must be positive".into()));
            }
        }
        Ok(())
    }

    fn decode_state(&self, board_state: &serde_json::Value) -> Result<HeartsState, GameError> {
        let state: HeartsState = serde_json::from_value(board_state.clone())?;
        state.check_seats().map_err(GameError::StateFormat)?;
        Ok(state)
    }

    fn is_game_complete(&self, state: &HeartsState) -> bool {
        state.phase == HeartsPhase::GameComplete
            || state
                .scores
                .iter()
                .any(|&score| score >= state.game_settings.target_score)
    }

    fn winner(&self, state: &HeartsState, players: &[Player]) -> Option<PlayerId> {
        if !self.is_game_complete(state) {
            return None;
        }
        let (seat, _) = state
            .scores
            .iter()
            .enumerate()
            .min_by_key(|&(seat, &score)| (score, seat))?;
        turns::player_at_seat(players, seat).map(|p| p.user_id.clone())
    }

    fn render_board(&self, state: &HeartsState) -> RenderData {
        let mut annotations = vec![
            format!("Round {}", state.round),
            format!("Passing {}", state.passing_direction),
        ];
        if state.hearts_broken {
            annotations.push("Hearts broken".into());
        }
        let highlights = match state.phase {
            HeartsPhase::Playing => vec![format!("seat {}", state.seat_to_play())],
            HeartsPhase::Passing => (0..SEATS)
                .filter(|&seat| !state.has_passed(seat))
                .map(|seat| format!("seat {seat}"))
                .collect(),
            _ => vec![],
        };
        let trick: Vec<String> = state
            .current_trick
            .cards
            .iter()
            .map(|pc| format!("{}:{}", pc.seat, pc.card))
            .collect();
        RenderData {
            game_type: Self::GAME_TYPE.into(),
            grid: None,
            highlights,
            annotations,
            summary: serde_json::json!({
                "phase": state.phase,
                "round": state.round,
                "scores": state.scores,
                "round_scores": state.round_scores,
                "tricks_won": state.tricks_won,
                "hand_sizes": state.hands.iter().map(Vec::len).collect::<Vec<_>>(),
                "current_trick": trick,
                "last_trick_winner": state.last_trick.as_ref().and_then(|t| t.winner),
                "hearts_broken": state.hearts_broken,
                "passing_direction": state.passing_direction,
            }),
        }
    }

    fn valid_moves(&self, state: &HeartsState, player_id: &str, players: &[Player]) -> Vec<HeartsMove> {
        let Some(seat) = Self::seat(players, player_id) else {
            return vec![];
        };
        match state.phase {
            HeartsPhase::Passing if !state.has_passed(seat) => {
                Self::pass_combinations(&state.hands[seat])
            }
            HeartsPhase::Playing => state.hands[seat]
                .iter()
                .filter(|&&card| Self::validate_play(state, seat, card).is_none())
                .map(|&card| HeartsMove::Play { card })
                .collect(),
            _ => vec![],
        }
    }

    fn expected_player(&self, state: &HeartsState, players: &[Player]) -> Option<PlayerId> {
        let seat = match state.phase {
            HeartsPhase::Playing => state.seat_to_play(),
            HeartsPhase::Passing => (0..SEATS).find(|&seat| !state.has_passed(seat))?,
            _ => return None,
        };
        turns::player_at_seat(players, seat).map(|p| p.user_id.clone())
    }

    fn enforces_turn_order(&self, state: &HeartsState) -> bool {
        state.phase != HeartsPhase::Passing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::hearts::deck::FULL_DECK;

    fn test_players() -> Vec<Player> {
        ["north", "east", "south", "west"]
            .iter()
            .enumerate()
            .map(|(i, name)| Player {
                user_id: format!("p{i}"),
                username: name.to_string(),
                color: HeartsEngine::AVAILABLE_COLORS[i].into(),
                player_order: i as u32 + 1,
            })
            .collect()
    }

    fn new_state(seed: u64) -> HeartsState {
        HeartsEngine::default().initial_state(&GameConfig::with_seed(seed))
    }

    fn assert_partition(state: &HeartsState) {
        let mut cards = state.cards_in_play();
        cards.sort();
        let mut deck = FULL_DECK.clone();
        deck.sort();
        assert_eq!(cards, deck);
    }

    /// Seat 0..4 passes its three lowest cards.
    fn pass_all(engine: &HeartsEngine, mut state: HeartsState, players: &[Player]) -> HeartsState {
        for seat in 0..SEATS {
            let cards = state.hands[seat][..3].to_vec();
            let mv = HeartsMove::Pass { cards };
            let pid = players[seat].user_id.clone();
            assert!(engine.validate_move(&state, &mv, &pid, players).is_none());
            state = engine.apply_move(&state, &mv, &pid, players).unwrap();
        }
        state
    }

    /// Play the first legal card for whoever is due.
    fn play_one(engine: &HeartsEngine, state: &HeartsState, players: &[Player]) -> HeartsState {
        let seat = state.seat_to_play();
        let pid = players[seat].user_id.clone();
        let mv = engine
            .valid_moves(state, &pid, players)
            .into_iter()
            .next()
            .expect("someone must be able to play");
        engine.apply_move(state, &mv, &pid, players).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let state = new_state(1);
        assert_eq!(state.phase, HeartsPhase::Passing);
        assert_eq!(state.round, 1);
        assert_eq!(state.passing_direction, PassingDirection::Left);
        assert!(state.hands.iter().all(|h| h.len() == HAND_SIZE));
        assert_eq!(state.game_settings, HeartsSettings::default());
        assert_partition(&state);
    }

    #[test]
    fn test_settings_from_options() {
        let config = GameConfig {
            options: serde_json::json!({"target_score": 50, "moon_shot_penalty": 13}),
            random_seed: Some(3),
        };
        let state = HeartsEngine::default().initial_state(&config);
        assert_eq!(state.game_settings.target_score, 50);
        assert_eq!(state.game_settings.moon_shot_penalty, 13);
    }

    #[test]
    fn test_pass_validation() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let state = new_state(5);
        let hand = state.hands[0].clone();
        let other = state.hands[1][0];

        let two = HeartsMove::Pass { cards: hand[..2].to_vec() };
        assert!(engine.validate_move(&state, &two, "p0", &players).unwrap().contains("exactly 3"));

        let foreign = HeartsMove::Pass { cards: vec![hand[0], hand[1], other] };
        assert!(engine.validate_move(&state, &foreign, "p0", &players).unwrap().contains("do not hold"));

        let dup = HeartsMove::Pass { cards: vec![hand[0], hand[0], hand[1]] };
        assert!(engine.validate_move(&state, &dup, "p0", &players).unwrap().contains("twice"));

        let ok = HeartsMove::Pass { cards: hand[..3].to_vec() };
        assert!(engine.validate_move(&state, &ok, "p0", &players).is_none());
        let after = engine.apply_move(&state, &ok, "p0", &players).unwrap();
        assert_eq!(after.hands[0].len(), 10);
        assert_partition(&after);

        let again = HeartsMove::Pass { cards: after.hands[0][..3].to_vec() };
        assert!(engine.validate_move(&after, &again, "p0", &players).unwrap().contains("already passed"));

        let play = HeartsMove::Play { card: hand[5] };
        assert!(engine.validate_move(&state, &play, "p0", &players).unwrap().contains("passed before"));
        assert!(engine.validate_move(&state, &ok, "ghost", &players).unwrap().contains("not in this game"));
    }

    #[test]
    fn test_passing_is_order_independent() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let state = new_state(9);
        assert!(!engine.enforces_turn_order(&state));
        let mv = HeartsMove::Pass { cards: state.hands[2][..3].to_vec() };
        let after = engine.apply_move(&state, &mv, "p2", &players).unwrap();
        assert_eq!(engine.expected_player(&after, &players), Some("p0".into()));
        assert!(after.has_passed(2));
    }

    #[test]
    fn test_pass_round_redistributes_left() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let state = new_state(11);
        let passed: Vec<Vec<Card>> = state.hands.iter().map(|h| h[..3].to_vec()).collect();

        let after = pass_all(&engine, state, &players);
        assert_eq!(after.phase, HeartsPhase::Playing);
        assert!(after.passed_cards.iter().all(|p| p.is_empty()));
        for from in 0..SEATS {
            let to = (from + 1) % SEATS;
            for card in &passed[from] {
                assert!(after.hands[to].contains(card), "{card} should reach seat {to}");
            }
        }
        assert!(after.hands.iter().all(|h| h.len() == HAND_SIZE));
        let leader = after.current_trick.leader;
        assert!(after.hands[leader].contains(&Card::TWO_OF_CLUBS));
        assert_eq!(engine.expected_player(&after, &players), Some(players[leader].user_id.clone()));
        assert!(engine.enforces_turn_order(&after));
        assert_partition(&after);
    }

    #[test]
    fn test_pass_round_redistributes_right_and_across() {
        let engine = HeartsEngine::default();
        let players = test_players();
        for (direction, offset) in [(PassingDirection::Right, 3), (PassingDirection::Across, 2)] {
            let mut state = new_state(17);
            state.passing_direction = direction;
            let passed: Vec<Vec<Card>> = state.hands.iter().map(|h| h[..3].to_vec()).collect();

            let after = pass_all(&engine, state, &players);
            assert_eq!(after.phase, HeartsPhase::Playing);
            for from in 0..SEATS {
                let to = (from + offset) % SEATS;
                for card in &passed[from] {
                    assert!(after.hands[to].contains(card), "{direction}: {card} should reach seat {to}");
                    assert!(!after.hands[from].contains(card), "{direction}: {card} stayed at seat {from}");
                }
            }
            assert_partition(&after);
        }
    }

    #[test]
    fn test_decode_rejects_seats_off_the_table() {
        use crate::engine::plugin::{GameEngine, JsonAdapter};

        let engine = HeartsEngine::default();
        let players = test_players();
        let state = pass_all(&engine, new_state(19), &players);
        let mut board = engine.encode_state(&state).unwrap();
        board["current_trick"]["cards"] = serde_json::json!([
            {"seat": u64::MAX, "card": {"suit": "clubs", "rank": 2}}
        ]);
        assert!(matches!(engine.decode_state(&board), Err(GameError::StateFormat(_))));

        let adapter = JsonAdapter(HeartsEngine::default());
        let mv = serde_json::json!({"type": "play", "card": {"suit": "clubs", "rank": 3}});
        let v = adapter.validate_move(&mv, "p0", &board, &players);
        assert!(!v.valid);
        assert!(adapter.apply_move(&mv, "p0", &board, &players).is_err());

        let mut board = engine.encode_state(&state).unwrap();
        board["current_trick"]["leader"] = serde_json::json!(4);
        assert!(engine.decode_state(&board).is_err());

        let mut full = state.clone();
        full.current_trick.cards = (0..SEATS)
            .map(|seat| PlayedCard { seat, card: state.hands[seat][0] })
            .collect();
        assert!(full.check_seats().unwrap_err().contains("4 cards"));
        assert!(state.check_seats().is_ok());
    }

    #[test]
    fn test_unusable_options_are_rejected() {
        let engine = HeartsEngine::default();
        for options in [
            serde_json::json!({"target_score": 4294967296u64}),
            serde_json::json!({"target_score": 0}),
            serde_json::json!({"moon_shot_penalty": -3}),
            serde_json::json!({"target_score": "lots"}),
        ] {
            let config = GameConfig { options: options.clone(), random_seed: Some(1) };
            assert!(
                matches!(engine.check_config(&config), Err(GameError::InvalidConfig(_))),
                "{options} accepted"
            );
            // Never truncated into a game that is over before it starts.
            let state = engine.initial_state(&config);
            assert_eq!(state.game_settings.target_score, 100);
            assert!(!engine.is_game_complete(&state));
        }
        let config = GameConfig {
            options: serde_json::json!({"target_score": 50, "moon_shot_penalty": 0}),
            random_seed: Some(1),
        };
        assert!(engine.check_config(&config).is_ok());
    }

    #[test]
    fn test_first_lead_must_be_two_of_clubs() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let state = pass_all(&engine, new_state(13), &players);
        let leader = state.current_trick.leader;
        let pid = &players[leader].user_id;

        let other = *state.hands[leader].iter().find(|&&c| c != Card::TWO_OF_CLUBS).unwrap();
        let err = engine
            .validate_move(&state, &HeartsMove::Play { card: other }, pid, &players)
            .unwrap();
        assert!(err.contains("2♣"));

        let moves = engine.valid_moves(&state, pid, &players);
        assert_eq!(moves, vec![HeartsMove::Play { card: Card::TWO_OF_CLUBS }]);

        let wrong_seat = &players[(leader + 1) % SEATS].user_id;
        let card = state.hands[(leader + 1) % SEATS][0];
        let err = engine
            .validate_move(&state, &HeartsMove::Play { card }, wrong_seat, &players)
            .unwrap();
        assert!(err.contains("not your turn"));
    }

    fn playing_state(hands: [Vec<Card>; SEATS], leader: usize) -> HeartsState {
        let mut state = new_state(0);
        state.phase = HeartsPhase::Playing;
        state.hands = hands;
        state.passed_cards = Default::default();
        state.current_trick = Trick::led_by(leader);
        // Pretend one trick is already done so first-trick rules are off.
        state.tricks_won = [1, 0, 0, 0];
        state
    }

    #[test]
    fn test_follow_suit_and_hearts_broken() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let c = |suit, rank| Card::new(suit, rank);
        let hands = [
            vec![c(Suit::Hearts, 5), c(Suit::Clubs, 9)],
            vec![c(Suit::Clubs, 4), c(Suit::Hearts, 7)],
            vec![c(Suit::Diamonds, 3), c(Suit::Hearts, 8)],
            vec![c(Suit::Spades, 12), c(Suit::Clubs, 13)],
        ];
        let state = playing_state(hands, 0);

        let lead_heart = HeartsMove::Play { card: c(Suit::Hearts, 5) };
        assert!(engine.validate_move(&state, &lead_heart, "p0", &players).unwrap().contains("broken"));
        let lead_club = HeartsMove::Play { card: c(Suit::Clubs, 9) };
        assert!(engine.validate_move(&state, &lead_club, "p0", &players).is_none());
        let s = engine.apply_move(&state, &lead_club, "p0", &players).unwrap();

        let off_suit = HeartsMove::Play { card: c(Suit::Hearts, 7) };
        assert!(engine.validate_move(&s, &off_suit, "p1", &players).unwrap().contains("follow suit"));
        let s = engine
            .apply_move(&s, &HeartsMove::Play { card: c(Suit::Clubs, 4) }, "p1", &players)
            .unwrap();

        // Void in clubs, but hearts are unbroken and a diamond is available.
        let discard_heart = HeartsMove::Play { card: c(Suit::Hearts, 8) };
        assert!(engine.validate_move(&s, &discard_heart, "p2", &players).unwrap().contains("broken"));
        let s = engine
            .apply_move(&s, &HeartsMove::Play { card: c(Suit::Diamonds, 3) }, "p2", &players)
            .unwrap();
        let s = engine
            .apply_move(&s, &HeartsMove::Play { card: c(Suit::Clubs, 13) }, "p3", &players)
            .unwrap();

        // Trick resolved: king of clubs wins, no points.
        assert_eq!(s.tricks_won[3], 1);
        assert_eq!(s.round_scores, [0, 0, 0, 0]);
        assert_eq!(s.current_trick.leader, 3);
        assert!(s.current_trick.cards.is_empty());
        assert_eq!(s.last_trick.as_ref().unwrap().winner, Some(3));
        assert!(!s.hearts_broken);
    }

    #[test]
    fn test_leading_hearts_allowed_when_hand_is_all_hearts() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let c = |suit, rank| Card::new(suit, rank);
        let hands = [
            vec![c(Suit::Hearts, 5), c(Suit::Hearts, 6)],
            vec![c(Suit::Clubs, 4), c(Suit::Hearts, 7)],
            vec![c(Suit::Diamonds, 3), c(Suit::Hearts, 8)],
            vec![c(Suit::Spades, 12), c(Suit::Clubs, 13)],
        ];
        let state = playing_state(hands, 0);
        let lead = HeartsMove::Play { card: c(Suit::Hearts, 5) };
        assert!(engine.validate_move(&state, &lead, "p0", &players).is_none());
        let s = engine.apply_move(&state, &lead, "p0", &players).unwrap();
        assert!(s.hearts_broken);
    }

    #[test]
    fn test_queen_of_spades_scores_thirteen() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let c = |suit, rank| Card::new(suit, rank);
        let hands = [
            vec![c(Suit::Spades, 13), c(Suit::Clubs, 2)],
            vec![c(Suit::Spades, 12), c(Suit::Clubs, 3)],
            vec![c(Suit::Spades, 2), c(Suit::Clubs, 4)],
            vec![c(Suit::Hearts, 9), c(Suit::Clubs, 5)],
        ];
        let mut state = playing_state(hands, 0);
        state.hearts_broken = true;
        for (seat, card) in [
            (0, c(Suit::Spades, 13)),
            (1, c(Suit::Spades, 12)),
            (2, c(Suit::Spades, 2)),
            (3, c(Suit::Hearts, 9)),
        ] {
            let mv = HeartsMove::Play { card };
            let pid = &players[seat].user_id;
            assert!(engine.validate_move(&state, &mv, pid, &players).is_none());
            state = engine.apply_move(&state, &mv, pid, &players).unwrap();
        }
        assert_eq!(state.round_scores[0], 14);
        assert_eq!(state.tricks_won[0], 2);
    }

    #[test]
    fn test_first_trick_forbids_point_discards() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let c = |suit, rank| Card::new(suit, rank);
        let hands = [
            vec![Card::TWO_OF_CLUBS, c(Suit::Diamonds, 9)],
            vec![c(Suit::Spades, 12), c(Suit::Diamonds, 4)],
            vec![c(Suit::Hearts, 2), c(Suit::Hearts, 3)],
            vec![c(Suit::Clubs, 8), c(Suit::Clubs, 13)],
        ];
        let mut state = playing_state(hands, 0);
        state.tricks_won = [0; SEATS];
        state = engine
            .apply_move(&state, &HeartsMove::Play { card: Card::TWO_OF_CLUBS }, "p0", &players)
            .unwrap();

        let queen = HeartsMove::Play { card: c(Suit::Spades, 12) };
        assert!(engine.validate_move(&state, &queen, "p1", &players).unwrap().contains("first trick"));
        let state = engine
            .apply_move(&state, &HeartsMove::Play { card: c(Suit::Diamonds, 4) }, "p1", &players)
            .unwrap();

        // Only hearts left: allowed even on the first trick.
        let heart = HeartsMove::Play { card: c(Suit::Hearts, 2) };
        assert!(engine.validate_move(&state, &heart, "p2", &players).is_none());
    }

    #[test]
    fn test_full_round_hands_out_all_points() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let mut state = pass_all(&engine, new_state(21), &players);
        for _ in 0..52 {
            assert_eq!(state.round, 1);
            assert_partition(&state);
            state = play_one(&engine, &state, &players);
        }
        assert_eq!(state.round, 2);
        let total: u32 = state.scores.iter().sum();
        assert!(total == 26 || total == 78, "unexpected total {total}");
        assert_eq!(state.passing_direction, PassingDirection::Right);
        assert_eq!(state.phase, HeartsPhase::Passing);
        assert!(state.hands.iter().all(|h| h.len() == HAND_SIZE));
        assert_eq!(state.round_scores, [0; SEATS]);
        assert_eq!(state.tricks_won, [0; SEATS]);
        assert!(!state.hearts_broken);
        assert_partition(&state);
    }

    #[test]
    fn test_moon_shot_charges_everyone_else() {
        let mut state = new_state(6);
        state.scores = [10, 20, 30, 40];
        state.round_scores = [0, 26, 0, 0];
        HeartsEngine::finish_round(&mut state);
        assert_eq!(state.scores, [36, 20, 56, 66]);
        assert_eq!(state.phase, HeartsPhase::Passing);

        state.game_settings.moon_shot_penalty = 13;
        state.round_scores = [26, 0, 0, 0];
        HeartsEngine::finish_round(&mut state);
        assert_eq!(state.scores, [36, 33, 69, 79]);
    }

    #[test]
    fn test_game_completes_at_target_and_lowest_wins() {
        let engine = HeartsEngine::default();
        let players = test_players();
        let mut state = new_state(4);
        state.scores = [40, 12, 99, 60];
        assert!(!engine.is_game_complete(&state));
        assert!(engine.winner(&state, &players).is_none());

        state.round_scores = [0, 0, 1, 25];
        state.hands = Default::default();
        state.passed_cards = Default::default();
        HeartsEngine::finish_round(&mut state);
        assert_eq!(state.phase, HeartsPhase::GameComplete);
        assert_eq!(state.scores, [40, 12, 100, 85]);
        assert!(engine.is_game_complete(&state));
        assert_eq!(engine.winner(&state, &players), Some("p1".into()));
        assert!(engine.valid_moves(&state, "p1", &players).is_empty());
        let mv = HeartsMove::Play { card: Card::TWO_OF_CLUBS };
        assert!(engine.validate_move(&state, &mv, "p1", &players).unwrap().contains("over"));
    }

    #[test]
    fn test_no_pass_round_goes_straight_to_play() {
        let mut state = new_state(8);
        state.passing_direction = PassingDirection::Across;
        state.round_scores = [0; SEATS];
        HeartsEngine::finish_round(&mut state);
        assert_eq!(state.passing_direction, PassingDirection::None);
        assert_eq!(state.phase, HeartsPhase::Playing);
        assert!(state.hands[state.current_trick.leader].contains(&Card::TWO_OF_CLUBS));
    }
}
