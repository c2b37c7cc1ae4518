//! Benchmarks for hand organisation, move search and validation.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use rummy_engine::core::{GameRng, GameState, PlayerId, TileId};
use rummy_engine::moves::{Engine, SortKind};
use rummy_engine::rules::{find_maximal_sets, sort_hand};

fn dealt(seed: u64) -> (Engine, GameState) {
    let engine = Engine::default();
    let deal = engine
        .initial_move(PlayerId::new(0), 4)
        .unwrap_or_else(|err| panic!("deal failed: {err}"));
    let state = GameState::default().apply_move(&deal, &mut GameRng::new(seed));
    (engine, state)
}

fn bench_find_maximal_sets(c: &mut Criterion) {
    let (engine, state) = dealt(42);
    let hand: Vec<TileId> = state.board.tiles_in_row(engine.config().player_row(PlayerId::new(0))).collect();

    c.bench_function("organizer_find_maximal_sets", |b| {
        b.iter(|| black_box(find_maximal_sets(black_box(&hand), &state.tiles)))
    });
}

fn bench_sort_large_hand(c: &mut Criterion) {
    let (_, state) = dealt(42);
    let hand: Vec<TileId> = TileId::all().step_by(2).collect();

    c.bench_function("organizer_sort_hand_by_sets_53", |b| {
        b.iter(|| black_box(sort_hand(black_box(&hand), SortKind::Set, &state.tiles)))
    });
}

fn bench_possible_moves(c: &mut Criterion) {
    let (engine, state) = dealt(7);

    c.bench_function("search_possible_moves", |b| {
        b.iter(|| black_box(engine.possible_moves(PlayerId::new(0), black_box(&state))))
    });
}

fn bench_validate_pick(c: &mut Criterion) {
    let (engine, state) = dealt(7);
    let pick = engine
        .pick_move(PlayerId::new(0), &state)
        .unwrap_or_else(|err| panic!("pick failed: {err}"));

    c.bench_function("validator_pick", |b| {
        b.iter(|| black_box(engine.is_move_ok(PlayerId::new(0), &state, black_box(&pick))))
    });
}

criterion_group!(
    benches,
    bench_find_maximal_sets,
    bench_sort_large_hand,
    bench_possible_moves,
    bench_validate_pick
);
criterion_main!(benches);
