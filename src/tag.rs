use std::fmt::Display;

use itertools::Itertools;
use tracing::error;

use crate::{math::Map, Error, Result};

/// Integer rank attached to a [`StateTag`], smaller ranks take precedence.
pub type Rank = i64;

/// The label carried by every state of every automaton. Apart from the two reserved tags,
/// tags are opaque to this crate, the caller decides what a [`StateTag::Token`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StateTag {
    /// The state is not accepting.
    NotFinal,
    /// The state is accepting, without further distinction.
    FinalDummy,
    /// The state accepts a token of the given, caller defined kind.
    Token(u32),
}

impl StateTag {
    /// Returns true for every tag except [`StateTag::NotFinal`].
    pub fn is_final(&self) -> bool {
        !matches!(self, StateTag::NotFinal)
    }
}

impl Default for StateTag {
    fn default() -> Self {
        StateTag::NotFinal
    }
}

impl Display for StateTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StateTag::NotFinal => write!(f, "NOT_FINAL"),
            StateTag::FinalDummy => write!(f, "FINAL_DUMMY"),
            StateTag::Token(kind) => write!(f, "T{kind}"),
        }
    }
}

/// Assigns a [`Rank`] to tags. Determinization uses it to pick a single tag for a set of
/// states: the tag with the smallest rank wins.
///
/// # Example
/// ```
/// use scanner_automata::prelude::*;
///
/// let keyword = StateTag::Token(0);
/// let identifier = StateTag::Token(1);
/// let priorities = Priorities::from_precedence([keyword, identifier]);
/// assert_eq!(priorities.best_of([identifier, StateTag::NotFinal, keyword])?, keyword);
/// assert!(priorities.rank(StateTag::Token(7)).is_err());
/// # Ok::<(), scanner_automata::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Priorities {
    ranks: Map<StateTag, Rank>,
}

impl Priorities {
    /// Creates priorities from explicit `(tag, rank)` pairs. Later pairs overwrite earlier
    /// ones for the same tag.
    pub fn new<I: IntoIterator<Item = (StateTag, Rank)>>(pairs: I) -> Self {
        Self {
            ranks: pairs.into_iter().collect(),
        }
    }

    /// Ranks the given tags by their position, the first one getting rank `0`. If they are
    /// not listed, [`StateTag::FinalDummy`] and then [`StateTag::NotFinal`] are ranked after
    /// all listed tags. Duplicates keep their first position.
    pub fn from_precedence<I: IntoIterator<Item = StateTag>>(tags: I) -> Self {
        let mut ranks = Map::default();
        for tag in tags
            .into_iter()
            .chain([StateTag::FinalDummy, StateTag::NotFinal])
        {
            let next = ranks.len() as Rank;
            ranks.entry(tag).or_insert(next);
        }
        Self { ranks }
    }

    /// Returns the rank of `tag` or an error if none was given.
    pub fn rank(&self, tag: StateTag) -> Result<Rank> {
        self.ranks.get(&tag).copied().ok_or_else(|| {
            error!("no priority for tag {tag}");
            Error::MissingPriority(tag)
        })
    }

    /// Returns true if a rank is known for `tag`.
    pub fn contains(&self, tag: StateTag) -> bool {
        self.ranks.contains_key(&tag)
    }

    /// Number of ranked tags.
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    /// Returns true if no tag has a rank.
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    /// Iterates over all `(tag, rank)` pairs in ascending order of rank.
    pub fn iter(&self) -> impl Iterator<Item = (StateTag, Rank)> + '_ {
        self.ranks
            .iter()
            .map(|(&tag, &rank)| (tag, rank))
            .sorted_by_key(|&(tag, rank)| (rank, tag))
    }

    /// Picks the tag with the smallest rank, or [`StateTag::NotFinal`] if `tags` is empty.
    /// Among tags of equal rank the first one wins. Every tag must have a rank.
    pub fn best_of<I: IntoIterator<Item = StateTag>>(&self, tags: I) -> Result<StateTag> {
        let mut best: Option<(Rank, StateTag)> = None;
        for tag in tags {
            let rank = self.rank(tag)?;
            if best.map_or(true, |(r, _)| rank < r) {
                best = Some((rank, tag));
            }
        }
        Ok(best.map_or(StateTag::NotFinal, |(_, tag)| tag))
    }
}
