//! Benchmarks for the autoplay engine hot paths

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use autoplay_core::{Intent, NavigationEvent, RunState, Timestamp};
use autoplay_runtime::{Engine, EngineConfig, NavigationControls, Signal};
use autoplay_state::{reconcile, Inputs};
use autoplay_test::{SimConfig, Simulation};
use autoplay_time::CycleClock;

fn engine() -> Engine {
    let controls = NavigationControls::pair(
        Box::new(|_: NavigationEvent| {}),
        Box::new(|_: NavigationEvent| {}),
    );
    let mut engine = Engine::new(EngineConfig::default(), controls, Box::new(|| false))
        .expect("engine");
    engine.start(Timestamp::ZERO);
    engine
}

fn bench_reconcile(c: &mut Criterion) {
    let inputs = Inputs {
        intent: Intent::Playing,
        visible: true,
        blocked: false,
    };

    c.bench_function("reconcile", |b| {
        b.iter(|| black_box(reconcile(black_box(inputs), black_box(RunState::Idle))))
    });
}

fn bench_cycle_clock_pause_resume(c: &mut Criterion) {
    let mut clock = CycleClock::new(Duration::from_secs(3));
    let mut now = Timestamp::ZERO;
    let step = Duration::from_millis(10);

    c.bench_function("cycle_clock_pause_resume", |b| {
        b.iter(|| {
            black_box(clock.arm(now));
            now = now + step;
            black_box(clock.disarm(now));
        })
    });
}

fn bench_engine_frame(c: &mut Criterion) {
    let mut engine = engine();
    let mut now = Timestamp::ZERO;
    let frame = Duration::from_micros(16_667);

    c.bench_function("engine_frame", |b| {
        b.iter(|| {
            now = now + frame;
            if !engine.on_deadline(now) {
                black_box(engine.on_frame(now));
            }
        })
    });
}

fn bench_engine_toggle(c: &mut Criterion) {
    let mut engine = engine();
    let mut now = Timestamp::ZERO;
    let step = Duration::from_millis(1);

    c.bench_function("engine_toggle", |b| {
        b.iter(|| {
            now = now + step;
            engine.handle(black_box(Signal::Toggle), now);
        })
    });
}

fn bench_simulated_minute(c: &mut Criterion) {
    c.bench_function("simulated_minute", |b| {
        b.iter(|| {
            let mut sim = Simulation::new(SimConfig::default()).expect("sim");
            sim.advance(Duration::from_secs(60));
            black_box(sim.advances().len())
        })
    });
}

criterion_group!(
    benches,
    bench_reconcile,
    bench_cycle_clock_pause_resume,
    bench_engine_frame,
    bench_engine_toggle,
    bench_simulated_minute,
);
criterion_main!(benches);
