//! Card domain types.
//!
//! A playing card is an immutable value: suit, rank, a color derived from
//! the two, and a unique opaque id. The id is the card's identity: two
//! cards of the same suit and rank are still distinct cards.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The suit of a card. Jokers carry the distinguished 🃏 suit.
///
/// The serde renames are the wire representation: clients receive the
/// glyph itself, not an enum name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    #[serde(rename = "♠")]
    Spades,
    #[serde(rename = "♥")]
    Hearts,
    #[serde(rename = "♣")]
    Clubs,
    #[serde(rename = "♦")]
    Diamonds,
    #[serde(rename = "🃏")]
    Joker,
}

impl Suit {
    /// The four standard suits, in deck-construction order.
    pub const STANDARD: [Suit; 4] =
        [Suit::Spades, Suit::Hearts, Suit::Clubs, Suit::Diamonds];

    fn glyph(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Clubs => "♣",
            Suit::Diamonds => "♦",
            Suit::Joker => "🃏",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// The rank of a card: the thirteen standard ranks plus the two jokers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Rank {
    #[serde(rename = "A")]
    Ace,
    #[serde(rename = "2")]
    Two,
    #[serde(rename = "3")]
    Three,
    #[serde(rename = "4")]
    Four,
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
    #[serde(rename = "9")]
    Nine,
    #[serde(rename = "10")]
    Ten,
    #[serde(rename = "J")]
    Jack,
    #[serde(rename = "Q")]
    Queen,
    #[serde(rename = "K")]
    King,
    #[serde(rename = "小王")]
    SmallJoker,
    #[serde(rename = "大王")]
    BigJoker,
}

impl Rank {
    /// The thirteen standard ranks, in deck-construction order.
    pub const STANDARD: [Rank; 13] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Whether a drawn card of this rank is kept in the drawer's hand
    /// instead of resolving a role.
    pub fn is_holdable(self) -> bool {
        matches!(self, Rank::Seven | Rank::Eight | Rank::SmallJoker)
    }

    fn label(self) -> &'static str {
        match self {
            Rank::Ace => "A",
            Rank::Two => "2",
            Rank::Three => "3",
            Rank::Four => "4",
            Rank::Five => "5",
            Rank::Six => "6",
            Rank::Seven => "7",
            Rank::Eight => "8",
            Rank::Nine => "9",
            Rank::Ten => "10",
            Rank::Jack => "J",
            Rank::Queen => "Q",
            Rank::King => "K",
            Rank::SmallJoker => "小王",
            Rank::BigJoker => "大王",
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The color of a card. A pure function of suit and rank, fixed at
/// construction and never mutated independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardColor {
    Black,
    Red,
}

/// Unique opaque identifier for a single card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    /// Generates a fresh unique id.
    pub fn fresh() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable playing card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub color: CardColor,
    pub id: CardId,
}

impl Card {
    /// Creates a card with a fresh id and its color derived from suit
    /// and rank.
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            suit,
            rank,
            color: Self::color_of(suit, rank),
            id: CardId::fresh(),
        }
    }

    fn color_of(suit: Suit, rank: Rank) -> CardColor {
        match suit {
            Suit::Spades | Suit::Clubs => CardColor::Black,
            Suit::Hearts | Suit::Diamonds => CardColor::Red,
            Suit::Joker => match rank {
                Rank::BigJoker => CardColor::Red,
                _ => CardColor::Black,
            },
        }
    }

    /// Whether this card is kept in hand when drawn.
    pub fn is_holdable(&self) -> bool {
        self.rank.is_holdable()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit, self.rank)
    }
}
