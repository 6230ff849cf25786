//! The room state machine.
//!
//! `Room` owns one room's authoritative state and validates every player
//! action before mutating. It is deliberately synchronous and free of
//! I/O: the actor task wraps it and handles channels and broadcasting,
//! so everything here can be tested directly.

use palace_protocol::{
    Card, PlayerId, PlayerSnapshot, Rank, RoleAssignment, RoomCode,
    RoomSnapshot,
};

use crate::deck::fresh_deck;

/// Display name derived deterministically from an id's leading
/// characters.
fn display_name(id: &PlayerId) -> String {
    format!("Player-{}", id.short())
}

/// A player in a room: identity, derived name, and held cards.
///
/// A player exists only while its connection is alive; the connection
/// itself is never stored here, so room state is serializable by
/// construction.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub hand: Vec<Card>,
}

impl Player {
    fn new(id: PlayerId) -> Self {
        let name = display_name(&id);
        Self {
            id,
            name,
            hand: Vec::new(),
        }
    }
}

/// Result of a join request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    /// The player was appended to the room.
    Joined,
    /// The player was already a member; the room is unchanged.
    AlreadyMember,
}

/// Result of a draw request.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOutcome {
    /// A card was drawn. `held` is true when it went into the drawer's
    /// hand instead of resolving a role.
    Drawn { card: Card, held: bool },
    /// The request was stale or invalid (out of turn, game over, empty
    /// deck). No state changed; per the protocol this is not an error.
    Ignored,
}

/// Result of removing a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// The player was not a member; the room is unchanged.
    NotAMember,
    /// The player was removed. `now_empty` reports whether the room's
    /// player list became empty (the caller must then destroy the room).
    Removed { now_empty: bool },
}

/// Authoritative state for one room.
#[derive(Debug, Clone)]
pub struct Room {
    pub room_code: RoomCode,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    /// Drawn from the back; strictly shrinking, never replenished.
    pub deck: Vec<Card>,
    pub current_player_index: usize,
    pub last_drawn_card: Option<Card>,
    pub game_log: Vec<String>,
    pub roles: RoleAssignment,
    /// Monotonic: set once when a draw empties the deck, never reset.
    pub is_game_over: bool,
}

impl Room {
    /// Creates a room with an empty player list and a fresh shuffled
    /// deck. The room is playable immediately; the creator joins
    /// through the normal [`join`](Self::join) path.
    pub fn new(room_code: RoomCode, host_id: PlayerId) -> Self {
        let game_log =
            vec![format!("Game created by {}.", display_name(&host_id))];
        Self {
            room_code,
            host_id,
            players: Vec::new(),
            deck: fresh_deck(),
            current_player_index: 0,
            last_drawn_card: None,
            game_log,
            roles: RoleAssignment::default(),
            is_game_over: false,
        }
    }

    /// Adds a player. Idempotent: joining twice leaves the player list
    /// untouched (same length, same order, same ids).
    pub fn join(&mut self, player_id: PlayerId) -> JoinOutcome {
        if self.players.iter().any(|p| p.id == player_id) {
            return JoinOutcome::AlreadyMember;
        }
        self.players.push(Player::new(player_id));
        JoinOutcome::Joined
    }

    /// The player whose draw is currently valid, if any.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.current_player_index)
    }

    /// Applies a draw for `player_id`.
    ///
    /// Stale requests (after game over, out of turn, or against an
    /// empty deck) are ignored without touching state: they are
    /// expected races between clients and authoritative state.
    pub fn draw(&mut self, player_id: &PlayerId) -> DrawOutcome {
        if self.is_game_over {
            return DrawOutcome::Ignored;
        }
        match self.current_player() {
            Some(current) if current.id == *player_id => {}
            _ => return DrawOutcome::Ignored,
        }
        let Some(card) = self.deck.pop() else {
            return DrawOutcome::Ignored;
        };

        let drawer = &mut self.players[self.current_player_index];
        let mut log_line = format!("{} drew {}.", drawer.name, card);
        let held = card.is_holdable();
        if held {
            drawer.hand.push(card.clone());
            log_line.push_str(" Card kept in hand.");
        } else {
            match card.rank {
                Rank::King => self.roles.crown_emperor(player_id.clone()),
                Rank::Queen => self.roles.add_missy(player_id.clone()),
                Rank::Jack => self.roles.add_servant(player_id.clone()),
                _ => {}
            }
        }

        self.last_drawn_card = Some(card.clone());
        self.current_player_index =
            (self.current_player_index + 1) % self.players.len();
        self.game_log.push(log_line);

        if self.deck.is_empty() {
            self.is_game_over = true;
            self.game_log
                .push("The deck is empty! Game over.".to_string());
        }

        DrawOutcome::Drawn { card, held }
    }

    /// Removes a player (disconnect path).
    ///
    /// When members remain: the host role transfers to the new first
    /// player if the host departed, and the turn pointer resets to 0 if
    /// it now points past the shrunken list. Reset-to-first is the
    /// documented policy; no attempt is made to preserve whose turn it
    /// logically was.
    pub fn remove_player(&mut self, player_id: &PlayerId) -> RemovalOutcome {
        let before = self.players.len();
        self.players.retain(|p| p.id != *player_id);
        if self.players.len() == before {
            return RemovalOutcome::NotAMember;
        }
        if self.players.is_empty() {
            return RemovalOutcome::Removed { now_empty: true };
        }
        if self.host_id == *player_id {
            self.host_id = self.players[0].id.clone();
        }
        if self.current_player_index >= self.players.len() {
            self.current_player_index = 0;
        }
        RemovalOutcome::Removed { now_empty: false }
    }

    /// Builds the sanitized wire projection of this room.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.room_code.clone(),
            host_id: self.host_id.clone(),
            players: self
                .players
                .iter()
                .map(|p| PlayerSnapshot {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    hand: p.hand.clone(),
                })
                .collect(),
            deck: self.deck.clone(),
            current_player_index: self.current_player_index,
            last_drawn_card: self.last_drawn_card.clone(),
            game_log: self.game_log.clone(),
            roles: self.roles.clone(),
            is_game_over: self.is_game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use palace_protocol::Suit;

    use super::*;
    use crate::deck::DECK_SIZE;

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    fn card(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    /// A room with the given players joined, host first.
    fn room_with_players(ids: &[&str]) -> Room {
        let mut room = Room::new(RoomCode::new("TEST1"), pid(ids[0]));
        for id in ids {
            room.join(pid(id));
        }
        room
    }

    #[test]
    fn test_new_room_is_fresh() {
        let room = Room::new(RoomCode::new("AB12C"), pid("host"));
        assert_eq!(room.deck.len(), DECK_SIZE);
        assert!(room.players.is_empty());
        assert_eq!(room.current_player_index, 0);
        assert!(room.last_drawn_card.is_none());
        assert!(!room.is_game_over);
        assert_eq!(room.game_log.len(), 1);
        assert!(room.game_log[0].contains("Player-host"));
    }

    #[test]
    fn test_join_appends_with_derived_name_and_empty_hand() {
        let mut room = room_with_players(&["alice-1"]);
        assert_eq!(room.join(pid("bobby-2")), JoinOutcome::Joined);
        assert_eq!(room.players.len(), 2);
        let p = &room.players[1];
        assert_eq!(p.name, "Player-bobb");
        assert!(p.hand.is_empty());
    }

    #[test]
    fn test_join_is_idempotent() {
        let mut room = room_with_players(&["a", "b", "c"]);
        let ids_before: Vec<_> =
            room.players.iter().map(|p| p.id.clone()).collect();

        assert_eq!(room.join(pid("b")), JoinOutcome::AlreadyMember);

        let ids_after: Vec<_> =
            room.players.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids_before, ids_after);
    }

    #[test]
    fn test_draw_out_of_turn_is_ignored() {
        let mut room = room_with_players(&["a", "b"]);
        let deck_before = room.deck.len();
        let log_before = room.game_log.len();

        assert_eq!(room.draw(&pid("b")), DrawOutcome::Ignored);

        assert_eq!(room.deck.len(), deck_before);
        assert_eq!(room.game_log.len(), log_before);
        assert_eq!(room.current_player_index, 0);
        assert!(room.last_drawn_card.is_none());
    }

    #[test]
    fn test_draw_by_non_member_is_ignored() {
        let mut room = room_with_players(&["a"]);
        assert_eq!(room.draw(&pid("stranger")), DrawOutcome::Ignored);
    }

    #[test]
    fn test_draw_with_no_players_is_ignored() {
        let mut room = Room::new(RoomCode::new("EMPTY"), pid("ghost"));
        assert_eq!(room.draw(&pid("ghost")), DrawOutcome::Ignored);
    }

    #[test]
    fn test_valid_draw_pops_one_and_advances_turn() {
        let mut room = room_with_players(&["a", "b"]);
        let top = room.deck.last().cloned().unwrap();

        let outcome = room.draw(&pid("a"));

        match outcome {
            DrawOutcome::Drawn { ref card, .. } => {
                assert_eq!(*card, top)
            }
            other => panic!("expected Drawn, got {other:?}"),
        }
        assert_eq!(room.deck.len(), DECK_SIZE - 1);
        assert_eq!(room.last_drawn_card.as_ref(), Some(&top));
        assert_eq!(room.current_player_index, 1);
        assert!(!room.is_game_over);
        assert_eq!(room.game_log.len(), 2);
    }

    #[test]
    fn test_holdable_card_goes_to_hand() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![card(Suit::Spades, Rank::Seven)];

        let outcome = room.draw(&pid("a"));

        assert!(matches!(outcome, DrawOutcome::Drawn { held: true, .. }));
        assert_eq!(room.players[0].hand.len(), 1);
        assert_eq!(room.players[0].hand[0].rank, Rank::Seven);
        assert!(
            room.game_log
                .iter()
                .any(|l| l.contains("kept in hand"))
        );
    }

    #[test]
    fn test_small_joker_is_held_big_joker_is_not() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![
            card(Suit::Joker, Rank::BigJoker),
            card(Suit::Joker, Rank::SmallJoker),
        ];

        room.draw(&pid("a")); // small joker on top
        assert_eq!(room.players[0].hand.len(), 1);

        room.draw(&pid("b")); // big joker: no hold, no role
        assert!(room.players[1].hand.is_empty());
        assert!(room.roles.emperor.is_none());
    }

    #[test]
    fn test_king_crowns_emperor_with_overwrite() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![
            card(Suit::Hearts, Rank::King),
            card(Suit::Spades, Rank::King),
        ];

        room.draw(&pid("a"));
        assert_eq!(room.roles.emperor, Some(pid("a")));

        room.draw(&pid("b"));
        assert_eq!(room.roles.emperor, Some(pid("b")));
    }

    #[test]
    fn test_queen_and_jack_accumulate_at_most_once() {
        let mut room = room_with_players(&["a"]);
        room.deck = vec![
            card(Suit::Clubs, Rank::Jack),
            card(Suit::Diamonds, Rank::Jack),
            card(Suit::Clubs, Rank::Queen),
            card(Suit::Diamonds, Rank::Queen),
        ];

        // Single player: every draw is theirs.
        room.draw(&pid("a"));
        room.draw(&pid("a"));
        assert_eq!(room.roles.missies, vec![pid("a")]);

        room.draw(&pid("a"));
        room.draw(&pid("a"));
        assert_eq!(room.roles.servants, vec![pid("a")]);
    }

    #[test]
    fn test_number_card_resolves_no_role_and_no_hold() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![card(Suit::Diamonds, Rank::Three)];

        let outcome = room.draw(&pid("a"));

        assert!(matches!(outcome, DrawOutcome::Drawn { held: false, .. }));
        assert!(room.players[0].hand.is_empty());
        assert!(room.roles.emperor.is_none());
        assert!(room.roles.missies.is_empty());
        assert!(room.roles.servants.is_empty());
    }

    #[test]
    fn test_round_robin_advances_modulo_player_count() {
        let mut room = room_with_players(&["a", "b", "c"]);
        let order = ["a", "b", "c"];

        for n in 0..7 {
            let expected = n % order.len();
            assert_eq!(room.current_player_index, expected);
            let current = order[expected];
            assert!(matches!(
                room.draw(&pid(current)),
                DrawOutcome::Drawn { .. }
            ));
        }
        assert_eq!(room.current_player_index, 7 % 3);
    }

    #[test]
    fn test_deck_length_never_increases() {
        let mut room = room_with_players(&["a", "b"]);
        let mut prev = room.deck.len();
        let order = ["a", "b"];
        for n in 0..20 {
            room.draw(&pid(order[n % 2]));
            assert!(room.deck.len() <= prev);
            prev = room.deck.len();
        }
    }

    #[test]
    fn test_drawing_last_card_ends_the_game() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![card(Suit::Spades, Rank::Two)];

        let outcome = room.draw(&pid("a"));

        assert!(matches!(outcome, DrawOutcome::Drawn { .. }));
        assert!(room.is_game_over);
        assert!(room.deck.is_empty());
        // Turn still advanced on the pre-removal player count.
        assert_eq!(room.current_player_index, 1);
        assert_eq!(
            room.game_log.last().map(String::as_str),
            Some("The deck is empty! Game over.")
        );
    }

    #[test]
    fn test_game_over_is_terminal() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![card(Suit::Spades, Rank::Two)];
        room.draw(&pid("a"));
        assert!(room.is_game_over);

        let last = room.last_drawn_card.clone();
        let log_len = room.game_log.len();

        // Even the now-current player's draw is a no-op.
        assert_eq!(room.draw(&pid("b")), DrawOutcome::Ignored);
        assert_eq!(room.draw(&pid("a")), DrawOutcome::Ignored);

        assert!(room.is_game_over);
        assert!(room.deck.is_empty());
        assert_eq!(room.last_drawn_card, last);
        assert_eq!(room.game_log.len(), log_len);
    }

    #[test]
    fn test_draw_from_empty_deck_without_game_over_is_ignored() {
        // Deck emptied out-of-band: the guard must hold on its own.
        let mut room = room_with_players(&["a"]);
        room.deck.clear();

        assert_eq!(room.draw(&pid("a")), DrawOutcome::Ignored);
        assert!(!room.is_game_over);
        assert!(room.last_drawn_card.is_none());
    }

    #[test]
    fn test_remove_player_not_a_member() {
        let mut room = room_with_players(&["a"]);
        assert_eq!(
            room.remove_player(&pid("nope")),
            RemovalOutcome::NotAMember
        );
        assert_eq!(room.players.len(), 1);
    }

    #[test]
    fn test_remove_last_player_reports_empty() {
        let mut room = room_with_players(&["a"]);
        assert_eq!(
            room.remove_player(&pid("a")),
            RemovalOutcome::Removed { now_empty: true }
        );
        assert!(room.players.is_empty());
    }

    #[test]
    fn test_host_transfer_on_host_departure() {
        let mut room = room_with_players(&["h", "b", "c"]);
        assert_eq!(room.host_id, pid("h"));

        let outcome = room.remove_player(&pid("h"));

        assert_eq!(outcome, RemovalOutcome::Removed { now_empty: false });
        assert_eq!(room.host_id, pid("b"));
    }

    #[test]
    fn test_non_host_departure_keeps_host() {
        let mut room = room_with_players(&["h", "b", "c"]);
        room.remove_player(&pid("b"));
        assert_eq!(room.host_id, pid("h"));
    }

    #[test]
    fn test_turn_pointer_resets_when_out_of_bounds() {
        let mut room = room_with_players(&["a", "b", "c"]);
        // Advance the pointer to the last seat.
        room.draw(&pid("a"));
        room.draw(&pid("b"));
        assert_eq!(room.current_player_index, 2);

        room.remove_player(&pid("c"));

        assert_eq!(room.current_player_index, 0);
        assert!(room.current_player_index < room.players.len());
    }

    #[test]
    fn test_turn_pointer_kept_when_still_in_bounds() {
        let mut room = room_with_players(&["a", "b", "c"]);
        room.draw(&pid("a"));
        assert_eq!(room.current_player_index, 1);

        // Removing "c" (index 2) leaves the pointer valid at 1, now
        // occupied by "b" still; index-based tracking, by policy.
        room.remove_player(&pid("c"));

        assert_eq!(room.current_player_index, 1);
        assert_eq!(room.current_player().unwrap().id, pid("b"));
    }

    #[test]
    fn test_turn_pointer_shifts_occupant_on_removal_before_it() {
        let mut room = room_with_players(&["a", "b", "c"]);
        room.draw(&pid("a"));
        assert_eq!(room.current_player().unwrap().id, pid("b"));

        // Removing "a" shifts "c" under the pointer without an explicit
        // turn change, an accepted consequence of index-based tracking.
        room.remove_player(&pid("a"));

        assert_eq!(room.current_player_index, 1);
        assert_eq!(room.current_player().unwrap().id, pid("c"));
    }

    #[test]
    fn test_create_join_draw_scenario() {
        // create → host joins at index 0 → second player joins → first
        // draw by host pops exactly one of 54 cards.
        let mut room = Room::new(RoomCode::new("SCENE"), pid("host"));
        room.join(pid("host"));
        room.join(pid("guest"));
        assert_eq!(room.deck.len(), 54);

        let outcome = room.draw(&pid("host"));

        let DrawOutcome::Drawn { card, .. } = outcome else {
            panic!("expected a draw");
        };
        assert_eq!(room.deck.len(), 53);
        assert_eq!(room.last_drawn_card, Some(card));
        assert_eq!(room.current_player_index, 1);
        assert!(!room.is_game_over);
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut room = room_with_players(&["a", "b"]);
        room.deck = vec![card(Suit::Hearts, Rank::King)];
        room.draw(&pid("a"));

        let snap = room.snapshot();

        assert_eq!(snap.room_id, room.room_code);
        assert_eq!(snap.host_id, room.host_id);
        assert_eq!(snap.players.len(), 2);
        assert_eq!(snap.players[0].id, pid("a"));
        assert!(snap.deck.is_empty());
        assert_eq!(snap.current_player_index, 1);
        assert_eq!(snap.roles.emperor, Some(pid("a")));
        assert!(snap.is_game_over);
        assert_eq!(snap.game_log, room.game_log);
    }

    #[test]
    fn test_full_game_runs_deck_to_exhaustion() {
        let mut room = room_with_players(&["a", "b", "c"]);
        let order = ["a", "b", "c"];
        for n in 0..DECK_SIZE {
            let current = order[n % order.len()];
            assert!(matches!(
                room.draw(&pid(current)),
                DrawOutcome::Drawn { .. }
            ));
        }
        assert!(room.is_game_over);
        assert!(room.deck.is_empty());

        // Cards are conserved: hands + discarded = 54, no id reused.
        use std::collections::HashSet;
        let held: usize =
            room.players.iter().map(|p| p.hand.len()).sum();
        assert!(held <= DECK_SIZE);
        let mut ids = HashSet::new();
        for p in &room.players {
            for c in &p.hand {
                assert!(ids.insert(c.id.as_str().to_owned()));
            }
        }
    }
}
