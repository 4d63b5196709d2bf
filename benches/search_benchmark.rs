use arcade::games::chess::{ChessState, Side};
use arcade::games::connect4::{self, Connect4Move, Connect4State};
use arcade::games::merge2048::Merge2048State;
use arcade::search::{alpha_beta, expectimax};
use arcade::{AiConfig, ChancePolicy, GameState};
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("chess legal moves from the opening", |b| {
        let state = ChessState::new();
        b.iter(|| black_box(&state).get_possible_moves())
    });

    c.bench_function("chess alpha beta depth 3 middlegame", |b| {
        let state = middlegame();
        b.iter(|| alpha_beta::search(black_box(&state), 3))
    });

    c.bench_function("connect4 greedy move", |b| {
        let mut state = Connect4State::default();
        for column in [3, 3, 2, 4, 1] {
            state.make_move(&Connect4Move(column));
        }
        b.iter(|| connect4::best_move(black_box(&state)))
    });

    let fixed_depth = |policy| AiConfig {
        time_budget: Duration::from_secs(60),
        max_depth: 3,
        chance_policy: policy,
        ..AiConfig::default()
    };
    let board = Merge2048State::from_rows([[2, 4, 8, 16], [0, 2, 4, 8], [0, 0, 2, 4], [0, 0, 0, 2]]);

    c.bench_function("2048 expectimax depth 2 bounded", |b| {
        let config = fixed_depth(ChancePolicy::Bounded);
        b.iter(|| expectimax::iterative_deepening(black_box(&board), &config))
    });

    c.bench_function("2048 expectimax depth 2 weighted", |b| {
        let config = fixed_depth(ChancePolicy::Weighted);
        b.iter(|| expectimax::iterative_deepening(black_box(&board), &config))
    });
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);

fn middlegame() -> ChessState {
    ChessState::from_rows(
        [
            "r.bqk..r", "pppp.ppp", "..n..n..", "..b.p...", "..B.P...", ".....N..", "PPPP.PPP",
            "RNBQK..R",
        ],
        Side::White,
    )
}
