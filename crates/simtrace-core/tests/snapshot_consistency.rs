//! Concurrent readers never observe a snapshot mixing two step updates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use simtrace_core::{
    EpisodeAggregator, EpisodeStatus, Phase, StepRecord, SystemClock, VideoMetricsView,
};

fn step(i: u64) -> StepRecord {
    StepRecord {
        episode: 0,
        steps: i,
        x: i as f64,
        y: 0.0,
        yaw: 0.0,
        steer: i as f64,
        throttle: 1.0,
        action: 0,
        reward: 0.0,
        done: i % 2 == 0,
        all_wheels_on_track: true,
        progress: (i % 100) as f64,
        closest_waypoint: 0,
        track_len: 17.7,
        tstamp: 0.0,
        episode_status: EpisodeStatus::InProgress,
    }
}

#[test]
fn readers_see_whole_snapshots() {
    const UPDATES: u64 = 20_000;
    let clock = Arc::new(SystemClock);
    let mut aggregator = EpisodeAggregator::new(clock.clone(), Phase::Eval);
    let mut view = VideoMetricsView::new(clock, false);
    let handle = view.handle();
    let finished = Arc::new(AtomicBool::new(false));

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let handle = handle.clone();
            let finished = finished.clone();
            thread::spawn(move || {
                let mut observed = 0u64;
                let mut last_step = 0u64;
                while !finished.load(Ordering::Acquire) {
                    let snap = handle.load();
                    if snap.step == 0 {
                        continue;
                    }
                    assert_eq!(snap.steering, snap.step as f64);
                    assert_eq!(snap.completion_percentage, (snap.step % 100) as f64);
                    assert_eq!(snap.done, snap.step % 2 == 0);
                    assert!(snap.step >= last_step, "snapshots went backwards");
                    last_step = snap.step;
                    observed += 1;
                }
                observed
            })
        })
        .collect();

    let writer = thread::spawn(move || {
        for i in 1..=UPDATES {
            let record = step(i);
            aggregator.ingest(&record).unwrap();
            view.update(&record, &aggregator.episode_state());
        }
        view
    });

    let view = writer.join().unwrap();
    finished.store(true, Ordering::Release);
    for reader in readers {
        reader.join().unwrap();
    }

    let last = view.handle().snapshot();
    assert_eq!(last.step, UPDATES);
    assert_eq!(last.steering, UPDATES as f64);
}
