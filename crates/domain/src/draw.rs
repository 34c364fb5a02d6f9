// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Uniform winner selection.

use rand::Rng;
use rand::seq::IndexedRandom;

/// Picks the winning ticket among `ticket_ids`, each with equal probability.
///
/// Returns `None` when no ticket was sold.
///
/// # Arguments
///
/// * `ticket_ids` - Identifiers of every ticket sold for the tombola
/// * `rng` - Random source; the thread RNG in production
#[must_use]
pub fn pick_winner<R>(ticket_ids: &[i64], rng: &mut R) -> Option<i64>
where
    R: Rng + ?Sized,
{
    ticket_ids.choose(rng).copied()
}
