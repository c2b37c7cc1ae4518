//! Hand organisation.
//!
//! Greedy extraction of disjoint groups and runs from an unordered tile
//! collection. Used to auto-sort hands and to pick the sets the move search
//! tries to place.
//!
//! ## Algorithm
//!
//! 1. Stable-sort by score and bucket equal scores. From each bucket take
//!    the first tile of every distinct colour; three or more colours make a
//!    group.
//! 2. Stable-sort what is left by colour, then score, and bucket by colour.
//!    Walk each bucket collecting consecutive scores; three or more make a
//!    run. A second copy of the score just taken stays behind rather than
//!    breaking the run.
//!
//! Attributes are read from the game's tile table. Tile ids within a hand
//! are unique, so set membership is tracked by id.

use rustc_hash::FxHashSet;

use crate::core::error::RuleResult;
use crate::core::state::TileTable;
use crate::core::tile::{Tile, TileId};
use crate::moves::SortKind;

/// Sets found in a tile collection.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoundSets {
    /// Groups in ascending score order, then runs by colour.
    pub sets: Vec<Vec<TileId>>,
    /// Tiles in no set, in their original relative order.
    pub remaining: Vec<TileId>,
}

impl FoundSets {
    /// Total score of the found sets (jokers count 0).
    pub fn score(&self, table: &TileTable) -> RuleResult<u32> {
        let mut score = 0;
        for set in &self.sets {
            for tile in table.lookup(set)? {
                score += u32::from(tile.score);
            }
        }
        Ok(score)
    }
}

type Keyed = (TileId, Tile);

/// Find maximal groups, then maximal runs among the rest.
///
/// Fails with `IllegalTileIndex` if a tile is missing from the table.
pub fn find_maximal_sets(tiles: &[TileId], table: &TileTable) -> RuleResult<FoundSets> {
    let keyed: Vec<Keyed> = tiles
        .iter()
        .map(|&id| Ok((id, table.get(id)?)))
        .collect::<RuleResult<_>>()?;

    let groups = find_groups(&keyed);
    let rest = without(&keyed, &groups);
    let runs = find_runs(&rest);
    let remaining = without(&rest, &runs).into_iter().map(|(id, _)| id).collect();

    let mut sets = groups;
    sets.extend(runs);
    Ok(FoundSets { sets, remaining })
}

/// Order a hand as its found sets followed by the leftovers.
pub fn sort_hand_by_sets(hand: &[TileId], table: &TileTable) -> RuleResult<Vec<TileId>> {
    let found = find_maximal_sets(hand, table)?;
    let mut sorted: Vec<TileId> = found.sets.into_iter().flatten().collect();
    sorted.extend(found.remaining);
    Ok(sorted)
}

/// Order a hand by ascending score. Stable.
pub fn sort_hand_by_score(hand: &[TileId], table: &TileTable) -> RuleResult<Vec<TileId>> {
    sorted_by_key(hand, table, |tile| tile.score)
}

/// Order a hand by colour name, then score. Stable.
pub fn sort_hand_by_color(hand: &[TileId], table: &TileTable) -> RuleResult<Vec<TileId>> {
    sorted_by_key(hand, table, |tile| (tile.color, tile.score))
}

/// Order a hand the way a SORT move asks for.
pub fn sort_hand(hand: &[TileId], kind: SortKind, table: &TileTable) -> RuleResult<Vec<TileId>> {
    match kind {
        SortKind::Score => sort_hand_by_score(hand, table),
        SortKind::Color => sort_hand_by_color(hand, table),
        SortKind::Set => sort_hand_by_sets(hand, table),
    }
}

fn sorted_by_key<K: Ord>(
    hand: &[TileId],
    table: &TileTable,
    key: impl Fn(&Tile) -> K,
) -> RuleResult<Vec<TileId>> {
    let mut keyed: Vec<Keyed> = hand
        .iter()
        .map(|&id| Ok((id, table.get(id)?)))
        .collect::<RuleResult<_>>()?;
    keyed.sort_by_key(|(_, tile)| key(tile));
    Ok(keyed.into_iter().map(|(id, _)| id).collect())
}

/// Split a sorted slice into runs of equal keys.
fn buckets<K: PartialEq>(sorted: &[Keyed], key: impl Fn(&Tile) -> K) -> Vec<&[Keyed]> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=sorted.len() {
        if i == sorted.len() || key(&sorted[i].1) != key(&sorted[start].1) {
            if i > start {
                out.push(&sorted[start..i]);
            }
            start = i;
        }
    }
    out
}

fn find_groups(tiles: &[Keyed]) -> Vec<Vec<TileId>> {
    let mut by_score = tiles.to_vec();
    by_score.sort_by_key(|(_, tile)| tile.score);

    let mut groups = Vec::new();
    for bucket in buckets(&by_score, |tile| tile.score) {
        let mut colors = Vec::with_capacity(4);
        let mut group = Vec::with_capacity(4);
        for (id, tile) in bucket {
            if !colors.contains(&tile.color) {
                colors.push(tile.color);
                group.push(*id);
            }
        }
        if group.len() >= 3 {
            groups.push(group);
        }
    }
    groups
}

fn find_runs(tiles: &[Keyed]) -> Vec<Vec<TileId>> {
    let mut by_color = tiles.to_vec();
    by_color.sort_by_key(|(_, tile)| (tile.color, tile.score));

    let mut runs = Vec::new();
    for bucket in buckets(&by_color, |tile| tile.color) {
        let mut run: Vec<TileId> = Vec::new();
        let mut last: Option<u8> = None;
        for (id, tile) in bucket {
            match last {
                Some(score) if tile.score == score + 1 => run.push(*id),
                Some(score) if tile.score == score => continue,
                _ => {
                    if run.len() >= 3 {
                        runs.push(std::mem::take(&mut run));
                    }
                    run = vec![*id];
                }
            }
            last = Some(tile.score);
        }
        if run.len() >= 3 {
            runs.push(run);
        }
    }
    runs
}

fn without(tiles: &[Keyed], sets: &[Vec<TileId>]) -> Vec<Keyed> {
    let used: FxHashSet<TileId> = sets.iter().flatten().copied().collect();
    tiles
        .iter()
        .filter(|(id, _)| !used.contains(id))
        .copied()
        .collect()
}
