// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::pick_winner;

#[test]
fn test_no_tickets_has_no_winner() {
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(pick_winner(&[], &mut rng), None);
}

#[test]
fn test_single_ticket_always_wins() {
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..32 {
        assert_eq!(pick_winner(&[41], &mut rng), Some(41));
    }
}

#[test]
fn test_winner_is_one_of_the_tickets() {
    let tickets: [i64; 3] = [10, 20, 30];
    let mut rng = StdRng::seed_from_u64(2026);
    for _ in 0..64 {
        let winner = pick_winner(&tickets, &mut rng).unwrap();
        assert!(tickets.contains(&winner));
    }
}

#[test]
fn test_same_seed_draws_same_winner() {
    let tickets: Vec<i64> = (1..=50).collect();
    let first = pick_winner(&tickets, &mut StdRng::seed_from_u64(99));
    let second = pick_winner(&tickets, &mut StdRng::seed_from_u64(99));
    assert_eq!(first, second);
}

#[test]
fn test_every_ticket_can_win() {
    let tickets: [i64; 3] = [1, 2, 3];
    let mut rng = StdRng::seed_from_u64(11);
    let mut wins = [0_u32; 3];
    for _ in 0..3_000 {
        let winner = pick_winner(&tickets, &mut rng).unwrap();
        let slot = usize::try_from(winner - 1).unwrap();
        wins[slot] += 1;
    }
    // Each ticket should land near 1000 wins.
    assert!(wins.iter().all(|count| (800..1200).contains(count)), "{wins:?}");
}
