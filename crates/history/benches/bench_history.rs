use std::hint::black_box;
use std::time::Instant;

use rigplay_common::BodyId;
use rigplay_history::{History, PlaybackCursor};
use rigplay_kernel::{ArticulatedWorld, BodySpec, World, WorldParams};

fn make_world(bodies: usize, dofs_per_body: usize) -> ArticulatedWorld {
    let specs = (0..bodies)
        .map(|i| BodySpec::new(format!("body{i}"), dofs_per_body))
        .collect();
    let mut world = ArticulatedWorld::new(WorldParams::default(), specs).unwrap();
    world
        .set_internal_forces(BodyId(0), &vec![0.5; dofs_per_body])
        .unwrap();
    world
}

fn bench_bake(bodies: usize, dofs_per_body: usize, frames: usize) {
    let mut world = make_world(bodies, dofs_per_body);
    let mut history = History::for_world(&world);

    let start = Instant::now();
    for _ in 0..frames {
        world.step_once();
        black_box(history.bake(black_box(&world)).unwrap());
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / frames as u32;
    println!(
        "  bake ({bodies} bodies x {dofs_per_body} dofs, {frames} frames): {per_iter:?}/frame, total {elapsed:?}"
    );
}

fn bench_playback(bodies: usize, dofs_per_body: usize, frames: usize, ticks: usize) {
    let mut world = make_world(bodies, dofs_per_body);
    let mut history = History::for_world(&world);
    for _ in 0..frames {
        world.step_once();
        history.bake(&world).unwrap();
    }

    let mut cursor = PlaybackCursor::new();
    let start = Instant::now();
    for _ in 0..ticks {
        if let Some(frame) = cursor.next_for_tick(history.len()) {
            history.restore_into(black_box(frame), &mut world).unwrap();
        }
    }
    let elapsed = start.elapsed();
    let per_iter = elapsed / ticks as u32;
    println!(
        "  playback ({} dofs, {frames} frames, {ticks} ticks): {per_iter:?}/tick, total {elapsed:?}",
        bodies * dofs_per_body
    );
}

fn main() {
    println!("=== History Benchmarks ===\n");

    println!("Bake:");
    bench_bake(2, 20, 10_000);
    bench_bake(10, 40, 10_000);

    println!("\nPlayback (wrap-around restore):");
    bench_playback(2, 20, 1_000, 100_000);
    bench_playback(10, 40, 1_000, 10_000);

    println!("\n=== Done ===");
}
