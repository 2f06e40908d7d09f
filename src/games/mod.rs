//! Reference games with known equilibria.
//!
//! These serve as:
//!
//! 1. **Validation**: every solver is checked against games whose equilibria
//!    are known in closed form.
//!
//! 2. **Degenerate cases**: games where best responses tie, so extreme
//!    equilibria share polytope vertices and form larger cliques.
//!
//! 3. **Benchmarks**: standard inputs for performance testing.
//!
//! ## Available Games
//!
//! | Game                        | Players | Equilibria                          |
//! |-----------------------------|---------|-------------------------------------|
//! | [`coordination`]            | 2       | three isolated                      |
//! | [`prisoners_dilemma`]       | 2       | (D, D), by strict dominance         |
//! | [`matching_pennies`]        | 2       | uniform                             |
//! | [`rock_paper_scissors`]     | 2       | uniform                             |
//! | [`battle_of_sexes`]         | 2       | two pure, one mixed                 |
//! | [`shapley`]                 | 2       | uniform                             |
//! | [`indifferent_column`]      | 2       | one segment, two extremes           |
//! | [`degenerate_three_by_two`] | 2       | one isolated, one segment           |
//! | [`single_row`]              | 2       | one pure                            |
//! | [`iterated_dominance`]      | 2       | (U, M) after three removal rounds   |
//! | [`three_player_matching`]   | 3       | both all-match profiles, uniform    |
//! | [`three_player_dominance`]  | 3       | player 1 has a dominated strategy   |
//! | [`three_player_cycle`]      | 3       | IPA cycles between two pure points  |
//! | [`weak_dominance`]          | 2       | a weakly dominated row survives     |
//! | [`solitaire`]               | 1       | the best of three strategies        |
//!
//! Bimatrix payoffs below are written `[row][column]`.

use crate::nash::game::{advance, Game, Player};
use crate::nash::number::rational;

/// Build a bimatrix game from integer payoffs.
fn bimatrix(title: &str, a: &[&[i64]], b: &[&[i64]]) -> Game {
    let convert = |m: &[&[i64]]| -> Vec<Vec<_>> {
        m.iter()
            .map(|row| row.iter().map(|&v| rational(v)).collect())
            .collect()
    };
    Game::bimatrix(title, convert(a), convert(b)).expect("reference matrices are rectangular")
}

/// Build an N-player game from a payoff function over pure profiles.
fn tabulated(title: &str, counts: &[usize], payoff: impl Fn(&[usize]) -> Vec<i64>) -> Game {
    let players = counts
        .iter()
        .enumerate()
        .map(|(p, &n)| Player::numbered(format!("Player {}", p + 1), n))
        .collect();

    let total: usize = counts.iter().product();
    let mut strategies = vec![0usize; counts.len()];
    let mut payoffs = Vec::with_capacity(total);
    for _ in 0..total {
        payoffs.push(payoff(&strategies).into_iter().map(rational).collect());
        advance(&mut strategies, counts);
    }
    Game::new(title, players, payoffs).expect("payoff table covers every profile")
}

/// Pure coordination: both players get 1 when they match.
pub fn coordination() -> Game {
    bimatrix(
        "Coordination",
        &[&[1, 0], &[0, 1]],
        &[&[1, 0], &[0, 1]],
    )
}

/// Cooperate is strictly dominated by defect for both players.
pub fn prisoners_dilemma() -> Game {
    bimatrix(
        "Prisoner's dilemma",
        &[&[3, 0], &[5, 1]],
        &[&[3, 5], &[0, 1]],
    )
}

/// Zero-sum; the unique equilibrium is uniform.
pub fn matching_pennies() -> Game {
    bimatrix(
        "Matching pennies",
        &[&[1, -1], &[-1, 1]],
        &[&[-1, 1], &[1, -1]],
    )
}

/// Zero-sum; the unique equilibrium is uniform.
pub fn rock_paper_scissors() -> Game {
    bimatrix(
        "Rock, paper, scissors",
        &[&[0, -1, 1], &[1, 0, -1], &[-1, 1, 0]],
        &[&[0, 1, -1], &[-1, 0, 1], &[1, -1, 0]],
    )
}

/// Two pure equilibria and the mixed one ((2/3, 1/3), (1/3, 2/3)).
pub fn battle_of_sexes() -> Game {
    bimatrix(
        "Battle of the sexes",
        &[&[2, 0], &[0, 1]],
        &[&[1, 0], &[0, 2]],
    )
}

/// Shapley's cyclic game; the unique equilibrium is uniform.
pub fn shapley() -> Game {
    bimatrix(
        "Shapley",
        &[&[1, 0, 0], &[0, 1, 0], &[0, 0, 1]],
        &[&[0, 1, 0], &[0, 0, 1], &[1, 0, 0]],
    )
}

/// Player 2 is indifferent everywhere, so against row 1 every column mix is
/// an equilibrium: one segment with two extreme points.
pub fn indifferent_column() -> Game {
    bimatrix(
        "Indifferent column",
        &[&[1, 1], &[0, 0]],
        &[&[1, 1], &[1, 1]],
    )
}

/// Column player is indifferent against row 1, giving one isolated
/// equilibrium and one segment.
pub fn degenerate_three_by_two() -> Game {
    bimatrix(
        "Degenerate 3x2",
        &[&[3, 3], &[2, 5], &[0, 6]],
        &[&[3, 3], &[2, 6], &[3, 1]],
    )
}

/// Player 1 has a single strategy; player 2 prefers their second.
pub fn single_row() -> Game {
    bimatrix("Single row", &[&[0, 0, 0]], &[&[0, 2, 1]])
}

/// Needs three rounds of elimination: R, then D, then L.
pub fn iterated_dominance() -> Game {
    bimatrix(
        "Iterated dominance",
        &[&[1, 1, 0], &[0, 0, 2]],
        &[&[0, 2, 1], &[3, 1, 0]],
    )
}

/// Every player gets 1 when all three choose the same strategy.
pub fn three_player_matching() -> Game {
    tabulated("Three-player matching", &[2, 2, 2], |s| {
        let all_match = s.iter().all(|&x| x == s[0]);
        vec![i64::from(all_match); 3]
    })
}

/// Player 1's second strategy strictly dominates the first; players 2 and 3
/// want to match each other.
pub fn three_player_dominance() -> Game {
    tabulated("Three-player dominance", &[2, 2, 2], |s| {
        let matched = i64::from(s[1] == s[2]);
        vec![s[0] as i64, matched, matched]
    })
}

/// Three players whose linearized best responses alternate between
/// (1, 1, 1) and (2, 2, 1), so damped IPA never settles.
pub fn three_player_cycle() -> Game {
    const TABLE: [[i64; 3]; 8] = [
        [4, 0, 2],
        [1, 0, 1],
        [-4, -4, 0],
        [4, 2, -4],
        [-1, -2, 4],
        [3, 2, 5],
        [0, -1, -3],
        [3, -2, -1],
    ];
    tabulated("Three-player cycle", &[2, 2, 2], |s| {
        TABLE[4 * s[0] + 2 * s[1] + s[2]].to_vec()
    })
}

/// Row 2 only ties row 1 against column 1, so nothing is strictly dominated.
pub fn weak_dominance() -> Game {
    bimatrix(
        "Weak dominance",
        &[&[1, 1], &[1, 0]],
        &[&[1, 0], &[0, 1]],
    )
}

/// A one-player game with payoffs 1, 3, 2.
pub fn solitaire() -> Game {
    tabulated("Solitaire", &[3], |s| vec![[1, 3, 2][s[0]]])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_games_are_valid() {
        let all = [
            coordination(),
            prisoners_dilemma(),
            matching_pennies(),
            rock_paper_scissors(),
            battle_of_sexes(),
            shapley(),
            indifferent_column(),
            degenerate_three_by_two(),
            single_row(),
            iterated_dominance(),
            three_player_matching(),
            three_player_dominance(),
            three_player_cycle(),
            weak_dominance(),
            solitaire(),
        ];
        for game in &all {
            assert!(game.validate().is_ok(), "{}", game.title());
            let rows: usize = game.strategy_counts().iter().product();
            assert_eq!(game.num_profiles(), rows);
        }
    }

    #[test]
    fn test_tabulated_order() {
        let game = three_player_dominance();
        assert_eq!(game.payoff(0, &[1, 0, 0]), &rational(1));
        assert_eq!(game.payoff(1, &[0, 1, 0]), &rational(0));
        assert_eq!(game.payoff(2, &[0, 1, 1]), &rational(1));
        assert_eq!(solitaire().payoff(0, &[1]), &rational(3));
        assert_eq!(three_player_cycle().payoff(2, &[1, 0, 1]), &rational(5));
    }
}
