// Copyright (C) 2026  Caprica Software Limited
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Track advancement policy under shuffle and repeat.
//!
//! These functions decide which list index plays next. They are pure: they
//! never touch playback state, and they are deterministic given the random
//! source passed in. The caller applies the result.
//!
//! Shuffle intentionally draws from the whole list with no history
//! exclusion, so the same index can play twice in a row.

use rand::Rng;
use rand::RngExt;

/// Outcome of an advancement decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Play the entry at this index of the current list.
    Index(usize),
    /// Nothing further to play; the caller decides what stopping means.
    Stop,
}

/// Selects the index that follows `current` in a list of `len` entries.
///
/// A `current` of `None` means nothing from the list has played yet and
/// behaves as "before the first entry". At the end of the list, `repeat`
/// wraps back to the first entry; otherwise the decision is [`Advance::Stop`].
pub fn next_index(
    len: usize,
    current: Option<usize>,
    shuffle: bool,
    repeat: bool,
    rng: &mut impl Rng,
) -> Advance {
    if len == 0 {
        return Advance::Stop;
    }

    if shuffle {
        return Advance::Index(rng.random_range(0..len));
    }

    let next = current.map_or(0, |index| index + 1);
    if next < len {
        Advance::Index(next)
    } else if repeat {
        Advance::Index(0)
    } else {
        Advance::Stop
    }
}

/// Selects the index that precedes `current`.
///
/// Repeat has no effect here: stepping back from the first entry is a
/// [`Advance::Stop`], leaving the caller on the current track.
pub fn prev_index(
    len: usize,
    current: Option<usize>,
    shuffle: bool,
    rng: &mut impl Rng,
) -> Advance {
    if len == 0 {
        return Advance::Stop;
    }

    if shuffle {
        return Advance::Index(rng.random_range(0..len));
    }

    match current {
        Some(index) if index > 0 => Advance::Index(index - 1),
        _ => Advance::Stop,
    }
}
