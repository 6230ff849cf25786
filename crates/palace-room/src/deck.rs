//! Deck factory.

use palace_protocol::{Card, Rank, Suit};
use rand::seq::SliceRandom;

/// Cards in a fresh deck: 13 ranks × 4 suits + 2 jokers.
pub const DECK_SIZE: usize = 54;

/// Builds a full, uniformly shuffled deck for a new room.
///
/// Every card gets a fresh unique id. The shuffle is `rand`'s
/// Fisher–Yates, so each of the 54! orderings is equally likely.
/// Pure with respect to room state.
pub fn fresh_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::STANDARD {
        for rank in Rank::STANDARD {
            deck.push(Card::new(suit, rank));
        }
    }
    deck.push(Card::new(Suit::Joker, Rank::SmallJoker));
    deck.push(Card::new(Suit::Joker, Rank::BigJoker));
    deck.shuffle(&mut rand::rng());
    deck
}
