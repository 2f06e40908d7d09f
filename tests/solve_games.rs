//! End-to-end solves of games loaded from JSON.

use nash_enum::games;
use nash_enum::nash::{solve, CsvRenderer, Game, SolveReport, SolverConfig};

const BATTLE_OF_SEXES: &str = r#"{
    "title": "Battle of the sexes",
    "players": [
        {"name": "Alice", "strategies": ["Opera", "Football"]},
        {"name": "Bob", "strategies": ["Opera", "Football"]}
    ],
    "payoffs": [[2, 1], [0, 0], [0, 0], [1, 2]]
}"#;

fn solve_to_lines(game: &Game, config: &SolverConfig) -> Vec<String> {
    let mut renderer = CsvRenderer::new(Vec::new(), config.num_decimals);
    solve(game, config, &mut renderer).unwrap();
    String::from_utf8(renderer.into_inner())
        .unwrap()
        .lines()
        .map(String::from)
        .collect()
}

#[test]
fn test_json_game_exact_and_float() {
    let game = Game::from_json_str(BATTLE_OF_SEXES).unwrap();
    let reference = games::battle_of_sexes();
    assert_eq!(game.players()[0].name, "Alice");
    for index in 0..reference.num_profiles() {
        for player in 0..2 {
            assert_eq!(game.payoff_at(index, player), reference.payoff_at(index, player));
        }
    }

    let exact = solve_to_lines(&game, &SolverConfig::default());
    assert_eq!(exact.len(), 3);
    assert!(exact.contains(&"NE,2/3,1/3,1/3,2/3".to_string()));
    assert!(exact.contains(&"NE,1,0,1,0".to_string()));
    assert!(exact.contains(&"NE,0,1,0,1".to_string()));

    let float = solve_to_lines(&game, &SolverConfig::floating(3));
    assert_eq!(float.len(), 3);
    assert!(float.contains(&"NE,0.667,0.333,0.333,0.667".to_string()));
}

#[test]
fn test_cliques_follow_equilibria() {
    let config = SolverConfig::default().with_cliques(true);
    let lines = solve_to_lines(&games::degenerate_three_by_two(), &config);
    let labels: Vec<&str> = lines.iter().map(|l| l.split(',').next().unwrap()).collect();
    assert_eq!(labels, vec!["NE", "NE", "NE", "convex-1", "convex-2", "convex-2"]);
    assert_eq!(lines[4], "convex-2,1,0,0,2/3,1/3");
}

#[test]
fn test_saved_game_solves_the_same() {
    let original = games::rock_paper_scissors();
    let reloaded = Game::from_json_str(&original.to_json().unwrap()).unwrap();
    let config = SolverConfig::default();
    assert_eq!(solve_to_lines(&original, &config), solve_to_lines(&reloaded, &config));
}

#[test]
fn test_approximation_of_three_player_game() {
    let mut renderer = CsvRenderer::new(Vec::new(), 4);
    let config = SolverConfig::approximation().with_seed(3);
    let report = solve(&games::three_player_matching(), &config, &mut renderer).unwrap();
    let result = match report {
        SolveReport::Approximation(result) => result,
        other => panic!("unexpected report {:?}", other),
    };
    assert!(result.profile.is_normalized());
    let text = String::from_utf8(renderer.into_inner()).unwrap();
    assert_eq!(text.lines().count(), 1);
    assert_eq!(text.split(',').count(), 7);
}
