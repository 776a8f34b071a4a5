// Copyright 2026 the Zoetrope Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end engine scenarios on the virtual clock.

use zoetrope_core::config::{SlideshowConfig, TransitionKind};
use zoetrope_core::deeplink::{format_fragment, parse_fragment};
use zoetrope_core::gesture::PointerSource;
use zoetrope_core::registry::Registry;
use zoetrope_harness::{Driver, RecordedEvent};

fn config(total: u32, looping: bool, transition: TransitionKind) -> SlideshowConfig {
    SlideshowConfig {
        total,
        looping,
        transition,
        autoplay_interval_ms: 5000,
        transition_duration_ms: 700,
        ..SlideshowConfig::default()
    }
}

fn driver(config: SlideshowConfig) -> Driver {
    Driver::new(config).expect("valid config")
}

#[test]
fn go_to_reaches_every_slide() {
    let mut d = driver(config(6, true, TransitionKind::Instant));
    for n in 1..=6 {
        let now = d.now();
        let _ = d.engine().go_to(n, now);
        assert_eq!(d.engine_ref().state().index, n);
    }
}

#[test]
fn five_slides_looping_full_cycle() {
    // total=5, looping, start at 1: next ×4 → 5, once more → 1.
    let mut d = driver(config(5, true, TransitionKind::Instant));
    for expected in [2, 3, 4, 5] {
        let now = d.now();
        assert!(d.engine().next(now));
        assert_eq!(d.engine_ref().state().index, expected);
    }
    let now = d.now();
    assert!(d.engine().next(now));
    assert_eq!(d.engine_ref().state().index, 1);
}

#[test]
fn non_looping_end_stops_autoplay() {
    // total=3, looping=false, start at 3: next is a no-op that stops
    // autoplay.
    let mut cfg = config(3, false, TransitionKind::Instant);
    cfg.start_index = 3;
    let mut d = driver(cfg);
    assert!(d.engine_ref().autoplay_running());

    let now = d.now();
    assert!(!d.engine().next(now));
    assert_eq!(d.engine_ref().state().index, 3);
    assert!(!d.engine_ref().autoplay_running());

    // No timer ever fires again.
    d.advance_ms(60_000);
    assert_eq!(d.engine_ref().state().index, 3);
}

#[test]
fn exactly_one_changed_per_navigation_for_every_kind() {
    for kind in [
        TransitionKind::Instant,
        TransitionKind::CrossfadeClassic,
        TransitionKind::CrossfadeStaged,
        TransitionKind::CrossfadeDynamic,
    ] {
        let mut d = driver(config(4, true, kind));
        let _ = d.log().take();

        for n in [2, 3, 4] {
            let now = d.now();
            assert!(d.engine().go_to(n, now));
            // Let any crossfade run to completion before the next call.
            d.advance_ms(2000);
        }

        let events = d.log().take();
        let changing = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::SlideChanging(..)))
            .count();
        let changed = events
            .iter()
            .filter(|e| matches!(e, RecordedEvent::SlideChanged(..)))
            .count();
        assert_eq!(changing, 3, "kind {kind:?}");
        assert_eq!(changed, 3, "one changed per navigation, kind {kind:?}");
    }
}

#[test]
fn superseding_navigation_never_double_completes() {
    // Autoplay off so the only completions come from the raced jobs.
    let mut cfg = config(5, true, TransitionKind::CrossfadeClassic);
    cfg.autoplay_interval_ms = 0;
    let mut d = driver(cfg);
    let _ = d.log().take();

    // Navigate again while the first crossfade is in flight.
    let now = d.now();
    assert!(d.engine().go_to(2, now));
    d.advance_ms(100);
    let now = d.now();
    assert!(d.engine().go_to(3, now));
    d.advance_ms(10_000);

    let events = d.log().take();
    let completes: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, RecordedEvent::TransitionComplete(..)))
        .collect();
    assert_eq!(completes.len(), 1, "the superseded job never completes");
    assert_eq!(
        completes[0],
        &RecordedEvent::TransitionComplete(3, TransitionKind::CrossfadeClassic)
    );
    assert_eq!(d.engine_ref().state().index, 3);
}

#[test]
fn toggle_pause_twice_round_trips() {
    let mut d = driver(config(3, true, TransitionKind::Instant));
    let was_running = d.engine_ref().autoplay_running();
    let was_paused = d.engine_ref().state().paused;

    let now = d.now();
    assert!(d.engine().toggle_pause(now));
    let now = d.now();
    assert!(!d.engine().toggle_pause(now));

    assert_eq!(d.engine_ref().state().paused, was_paused);
    assert_eq!(d.engine_ref().autoplay_running(), was_running);
}

#[test]
fn page_hidden_stops_then_visible_resumes() {
    let mut d = driver(config(3, true, TransitionKind::Instant));
    // The element is well on-screen.
    let now = d.now();
    d.engine().observe_element_ratio(0.9, now);
    assert!(d.engine_ref().autoplay_running());

    // Tab hidden: force-stop.
    let now = d.now();
    d.engine().set_page_visible(false, now);
    assert!(!d.engine_ref().autoplay_running());
    d.advance_ms(30_000);
    assert_eq!(d.engine_ref().state().index, 1, "nothing advances while hidden");

    // Tab visible again, element still ≥ 50% and not manually paused.
    let now = d.now();
    d.engine().set_page_visible(true, now);
    assert!(d.engine_ref().autoplay_running());
    d.advance_ms(5000);
    assert_eq!(d.engine_ref().state().index, 2, "autoplay resumed");
}

#[test]
fn swipe_classification_drives_navigation() {
    let mut d = driver(config(4, true, TransitionKind::Instant));

    // deltaX = -60, deltaY = 5, threshold = 40 → "next".
    d.engine().pointer_down(200.0, 100.0, PointerSource::Touch);
    let _ = d.engine().pointer_move(170.0, 102.0);
    let now = d.now();
    let swipe = d.engine().pointer_up(140.0, 105.0, now);
    assert!(swipe.is_some());
    assert_eq!(d.engine_ref().state().index, 2);
}

#[test]
fn reduced_motion_at_init_downgrades_crossfade() {
    let mut d = driver(config(3, true, TransitionKind::CrossfadeClassic));
    let now = d.now();
    d.engine().set_reduced_motion(true, now);
    let _ = d.log().take();

    let now = d.now();
    assert!(d.engine().go_to(2, now));
    assert!(
        !d.engine_ref().state().in_transition,
        "no job in flight: the change completed synchronously"
    );
    let events = d.log().take();
    assert!(
        events.contains(&RecordedEvent::TransitionComplete(2, TransitionKind::Instant)),
        "transitions execute as instant, got {events:?}"
    );
}

#[test]
fn autoplay_cadence_is_one_advance_per_interval() {
    let mut d = driver(config(4, true, TransitionKind::Instant));
    let _ = d.log().take();

    d.advance_ms(60_000);
    assert_eq!(
        d.log()
            .count(|e| matches!(e, RecordedEvent::SlideChanged(..))),
        12,
        "12 ticks in 60s at a 5s interval"
    );
    // 1 → (12 % 4 = 0 advances net) → back at 1.
    assert_eq!(d.engine_ref().state().index, 1);
}

#[test]
fn crossfade_fallback_completes_without_a_native_hook() {
    let mut d = driver(config(3, true, TransitionKind::CrossfadeStaged));
    let _ = d.log().take();

    let now = d.now();
    assert!(d.engine().go_to(2, now));
    assert!(d.engine_ref().state().in_transition);

    // Staged total = 700 + 30% = 910, fallback slack 100 → 1010 ms.
    d.advance_ms(1009);
    assert!(d.engine_ref().state().in_transition, "not due yet");
    d.advance_ms(1);
    assert!(!d.engine_ref().state().in_transition);
    assert!(
        d.log()
            .snapshot()
            .contains(&RecordedEvent::TransitionComplete(
                2,
                TransitionKind::CrossfadeStaged
            ))
    );
}

#[test]
fn native_hook_then_fallback_completes_once() {
    // Autoplay off so the only completions come from the raced job.
    let mut cfg = config(3, true, TransitionKind::CrossfadeClassic);
    cfg.autoplay_interval_ms = 0;
    let mut d = driver(cfg);
    let _ = d.log().take();

    let now = d.now();
    assert!(d.engine().go_to(2, now));
    let id = d.engine().active_job().expect("job in flight").id;
    d.engine().on_animation_end(id);
    d.render();

    // Drive past where the fallback would have fired.
    d.advance_ms(10_000);
    assert_eq!(
        d.log()
            .count(|e| matches!(e, RecordedEvent::TransitionComplete(..))),
        1,
        "first signal wins, the fallback is disarmed"
    );
}

#[test]
fn presenter_always_converges_to_one_visible_slide() {
    let mut d = driver(config(5, true, TransitionKind::CrossfadeClassic));

    let now = d.now();
    let _ = d.engine().go_to(3, now);
    d.render();
    assert_eq!(
        d.presenter.visible,
        [1, 3],
        "both slides visible mid-crossfade"
    );

    d.advance_ms(2000);
    assert_eq!(d.presenter.visible, [3], "settled to the new slide");
}

#[test]
fn deep_link_fragment_round_trip_navigates() {
    let mut d = driver(config(6, true, TransitionKind::Instant));

    // The deep-link layer resolves the fragment and calls navigate-to.
    let fragment = format_fragment("front-hero", 5);
    let (id, index) = parse_fragment(&fragment).expect("well-formed fragment");
    assert_eq!(id, "front-hero");
    let now = d.now();
    assert!(d.engine().go_to(index, now));
    assert_eq!(d.engine_ref().state().index, 5);
}

#[test]
fn registry_round_trip_with_bulk_pause() {
    let mut registry = Registry::new();
    assert!(registry.insert("hero", driver(config(3, true, TransitionKind::Instant))));
    assert!(registry.insert("footer", driver(config(4, true, TransitionKind::Instant))));
    assert!(
        !registry.insert("hero", driver(config(2, true, TransitionKind::Instant))),
        "initialization is idempotent per identifier"
    );

    // pause-all in page order.
    for (_, d) in registry.iter_mut() {
        let now = d.now();
        d.engine().pause(now);
    }
    assert!(registry.resolve("#hero").expect("registered").engine_ref().state().paused);
    assert!(registry.resolve("footer").expect("registered").engine_ref().state().paused);

    // resume-all.
    for (_, d) in registry.iter_mut() {
        let now = d.now();
        d.engine().resume(now);
    }
    assert!(!registry.resolve("hero").expect("registered").engine_ref().state().paused);

    assert!(registry.resolve("#ghost").is_err(), "unknown instance is a failure value");
}
