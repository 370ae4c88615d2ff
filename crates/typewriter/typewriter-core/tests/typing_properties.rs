use proptest::prelude::*;

use typewriter_core::{
    AnimationState, Config, Line, MemorySurface, Preset, RunKind, Script, Stage, TargetId,
    Triggers, TypewriterEvent,
};

fn mount(
    stage: &mut Stage<MemorySurface>,
    lines: &[&str],
    cfg: Config,
    triggers: Triggers,
) -> (TargetId, MemorySurface) {
    let surface = MemorySurface::new("");
    let script = Script::new(lines.iter().copied()).unwrap();
    let id = stage
        .mount(surface.clone(), Some(script), cfg, triggers)
        .unwrap();
    (id, surface)
}

fn hero() -> (Stage<MemorySurface>, TargetId, MemorySurface) {
    let mut stage = Stage::new();
    let (id, surface) = mount(
        &mut stage,
        &["Ronogamy.", "Aditya."],
        Preset::Hero.config(),
        Triggers::load().with_hover(),
    );
    (stage, id, surface)
}

proptest! {
    /// Playing a line of n graphemes at T ms per tick settles after n * T.
    #[test]
    fn prop_play_settles_after_len_times_speed(text in "\\PC{0,24}", speed in 1u64..200) {
        let mut stage = Stage::new();
        let cfg = Config { speed_typing_ms: speed, ..Config::default() };
        let (id, surface) = mount(&mut stage, &[text.as_str()], cfg, Triggers::NONE);
        let n = Line::new(text.clone()).grapheme_len() as u64;

        stage.play(id, 0).unwrap();
        if n > 0 {
            stage.advance(n * speed - 1);
            prop_assert_eq!(stage.state(id), Some(AnimationState::Typing));
            stage.advance(1);
        }
        prop_assert_eq!(surface.text(), text);
        prop_assert_eq!(stage.state(id), Some(AnimationState::Idle));
    }

    /// Extra play/cycle/erase calls during a run change nothing.
    #[test]
    fn prop_reentrant_calls_are_ignored(at in 0u64..640, which in 0u8..3) {
        let mut quiet = Stage::new();
        let mut noisy = Stage::new();
        let (qid, qsurface) = mount(&mut quiet, &["Ronogamy.", "Aditya."], Config::default(), Triggers::NONE);
        let (nid, nsurface) = mount(&mut noisy, &["Ronogamy.", "Aditya."], Config::default(), Triggers::NONE);

        quiet.play(qid, 0).unwrap();
        noisy.play(nid, 0).unwrap();
        noisy.advance(at);
        let accepted = match which {
            0 => noisy.play(nid, 1).unwrap(),
            1 => noisy.cycle(nid, 1).unwrap(),
            _ => noisy.erase(nid).unwrap(),
        };
        prop_assert!(!accepted);

        quiet.advance_to(9 * 80);
        noisy.advance_to(9 * 80);
        prop_assert_eq!(qsurface.writes(), nsurface.writes());
        prop_assert_eq!(quiet.state(qid), Some(AnimationState::Idle));
        prop_assert_eq!(noisy.state(nid), Some(AnimationState::Idle));
    }
}

#[test]
fn it_should_swap_hero_lines_on_hover() {
    let (mut stage, id, surface) = hero();
    stage.ready();
    stage.advance_to(9 * 80);
    assert_eq!(surface.text(), "Ronogamy.");
    assert_eq!(stage.state(id), Some(AnimationState::Idle));

    surface.clear_writes();
    let entered_at = stage.now();
    stage.pointer_enter(id);
    assert_eq!(stage.state(id), Some(AnimationState::Erasing));

    // leaving mid-erase is ignored, not queued
    stage.advance(180);
    stage.pointer_leave(id);
    assert_eq!(stage.state(id), Some(AnimationState::Erasing));

    let out = stage.advance_to(entered_at + 9 * 60 + 7 * 80);
    assert_eq!(surface.text(), "Aditya.");
    assert_eq!(stage.state(id), Some(AnimationState::Idle));

    let writes = surface.writes();
    assert_eq!(writes.len(), 9 + 7);
    assert_eq!(writes[0], "Ronogamy");
    assert_eq!(writes[8], "");
    assert_eq!(writes[9], "A");
    assert_eq!(writes[15], "Aditya.");

    let kinds: Vec<RunKind> = out
        .completions(id)
        .filter_map(|e| match e {
            TypewriterEvent::Completed { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect();
    assert_eq!(kinds, vec![RunKind::Erasing, RunKind::Typing]);

    // now settled on the hover line; leaving swaps back
    stage.pointer_leave(id);
    stage.advance(7 * 60 + 9 * 80);
    assert_eq!(surface.text(), "Ronogamy.");
}

#[test]
fn it_should_ignore_hover_before_first_reveal_completes() {
    let (mut stage, id, surface) = hero();
    stage.ready();
    stage.advance(200);
    stage.pointer_enter(id);
    stage.advance_to(9 * 80);
    assert_eq!(surface.text(), "Ronogamy.");
    assert_eq!(stage.typewriter(id).unwrap().settled_index(), Some(0));
}

#[test]
fn it_should_not_flash_when_cycling_to_the_shown_line() {
    let (mut stage, id, surface) = hero();
    stage.ready();
    stage.advance_to(9 * 80);
    surface.clear_writes();

    assert!(!stage.cycle(id, 0).unwrap());
    stage.pointer_leave(id);
    stage.advance(10_000);
    assert!(surface.writes().is_empty());
    assert_eq!(surface.text(), "Ronogamy.");
}

#[test]
fn it_should_fire_visibility_once_per_target() {
    let mut stage = Stage::new();
    let (id, surface) = mount(
        &mut stage,
        &["Quadrant One"],
        Preset::Heading.config(),
        Triggers::visibility(),
    );

    stage.visibility(id, 0.2);
    assert_eq!(stage.advance(1000).events, vec![]);

    stage.visibility(id, 0.8);
    let out = stage.advance(12 * 70);
    assert!(out
        .events
        .contains(&TypewriterEvent::ObserverReleased { target: id }));
    assert_eq!(surface.text(), "Quadrant One");
    let writes = surface.writes().len();

    // scrolling past the threshold again and again
    for ratio in [0.0, 0.9, 0.1, 1.0] {
        stage.visibility(id, ratio);
        stage.advance(500);
    }
    assert_eq!(surface.writes().len(), writes);
    assert_eq!(stage.state(id), Some(AnimationState::Idle));
}

#[test]
fn it_should_stagger_headings_from_the_crossing_time() {
    let mut stage = Stage::new();
    let mut headings = Vec::new();
    for nth in 0..4u64 {
        let cfg = Preset::Heading.config().with_delay(nth * 200);
        headings.push(mount(
            &mut stage,
            &["Quadrant One"],
            cfg,
            Triggers::visibility(),
        ));
    }

    stage.advance_to(1000);
    for (id, _) in &headings {
        stage.visibility(*id, 0.6);
    }

    let (third, third_surface) = &headings[2];
    stage.advance_to(1399);
    assert_eq!(third_surface.text(), "");
    assert_eq!(stage.state(*third), Some(AnimationState::Idle));
    // the first two are already typing
    assert_eq!(headings[0].1.text(), "Quadrant One".get(..6).unwrap());
    assert_eq!(headings[1].1.text(), "Qua");

    stage.advance_to(1400);
    assert_eq!(third_surface.text(), "Q");
    assert_eq!(stage.state(*third), Some(AnimationState::Typing));
}

#[test]
fn it_should_animate_targets_independently() {
    let mut stage = Stage::new();
    let (fast, fast_surface) = mount(
        &mut stage,
        &["abcd"],
        Config {
            speed_typing_ms: 10,
            ..Config::default()
        },
        Triggers::NONE,
    );
    let (slow, slow_surface) = mount(&mut stage, &["abcd"], Config::default(), Triggers::NONE);
    stage.play(fast, 0).unwrap();
    stage.play(slow, 0).unwrap();
    stage.advance(40);
    assert_eq!(fast_surface.text(), "abcd");
    assert_eq!(stage.state(fast), Some(AnimationState::Idle));
    assert_eq!(slow_surface.text(), "a");
    assert_eq!(stage.state(slow), Some(AnimationState::Typing));
}

#[test]
fn it_should_keep_grapheme_clusters_whole() {
    let mut stage = Stage::new();
    let (id, surface) = mount(
        &mut stage,
        &["na\u{308}ive \u{1F469}\u{200D}\u{1F4BB}"],
        Config::default(),
        Triggers::NONE,
    );
    stage.play(id, 0).unwrap();
    stage.advance(10 * 80);
    let writes = surface.writes();
    // initial clear + one write per grapheme
    assert_eq!(writes.len(), 1 + 7);
    assert_eq!(writes[2], "na\u{308}");
    assert_eq!(writes[7], "na\u{308}ive \u{1F469}\u{200D}\u{1F4BB}");
}
