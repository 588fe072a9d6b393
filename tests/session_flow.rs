use pourover_rs::{
    calculate_recipe, BrewConfig, BrewError, BrewSession, PourEvent, SessionEvent, SessionPhase,
    Strength, Taste, TimerEvent, TransitionError,
};
use std::cell::RefCell;
use std::rc::Rc;

fn record(session: &mut BrewSession) -> Rc<RefCell<Vec<SessionEvent>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    session.on_any(move |event| log.borrow_mut().push(*event));
    seen
}

#[test]
fn full_session_for_every_preference() {
    for taste in Taste::ALL {
        for strength in Strength::ALL {
            let recipe = calculate_recipe(20.0, taste, strength);
            let pours = recipe.pour_count();
            let mut session = BrewSession::new(&recipe).unwrap();
            let seen = record(&mut session);

            session.start_session().unwrap();
            let mut ticks = 0u32;
            while !session.is_finished() {
                session.tick().unwrap();
                ticks += 1;
            }

            let events = seen.borrow();
            let ready: Vec<(usize, f64)> = events
                .iter()
                .filter_map(|e| match e {
                    SessionEvent::Pour(PourEvent::PourReady { index, amount_g }) => {
                        Some((*index, *amount_g))
                    }
                    _ => None,
                })
                .collect();
            let completes = events
                .iter()
                .filter(|e| matches!(e, SessionEvent::Pour(PourEvent::Complete)))
                .count();

            assert_eq!(ready.len(), pours, "{taste} / {strength}");
            assert_eq!(completes, 1, "{taste} / {strength}");
            assert_eq!(ticks, (pours as u32 - 1) * 45, "{taste} / {strength}");
            for (i, (index, amount)) in ready.iter().enumerate() {
                assert_eq!(*index, i);
                assert_eq!(*amount, recipe.pours[i]);
            }
        }
    }
}

#[test]
fn events_arrive_in_protocol_order() {
    let recipe = calculate_recipe(15.0, Taste::Balanced, Strength::Light);
    let mut session = BrewSession::new(&recipe).unwrap();
    let seen = record(&mut session);

    session.start_session().unwrap();
    for _ in 0..45 {
        session.tick().unwrap();
    }

    let events = seen.borrow();
    assert_eq!(events[0], SessionEvent::Pour(PourEvent::Start));
    assert!(matches!(events[1], SessionEvent::Pour(PourEvent::PourReady { index: 0, .. })));
    assert_eq!(
        events[2],
        SessionEvent::Countdown(TimerEvent::Start { duration_secs: 45 })
    );
    assert_eq!(
        events[3],
        SessionEvent::Countdown(TimerEvent::Tick { remaining_secs: 44 })
    );
    let tail = &events[events.len() - 4..];
    assert_eq!(tail[0], SessionEvent::Countdown(TimerEvent::Tick { remaining_secs: 0 }));
    assert_eq!(tail[1], SessionEvent::Countdown(TimerEvent::Complete));
    assert!(matches!(tail[2], SessionEvent::Pour(PourEvent::PourReady { index: 1, .. })));
    assert_eq!(tail[3], SessionEvent::Countdown(TimerEvent::Start { duration_secs: 45 }));
}

#[test]
fn pause_stop_and_restart() {
    let config = BrewConfig {
        bean_weight_g: 18.0,
        taste: Taste::Sweet,
        strength: Strength::Medium,
        pour_interval_secs: 30,
    };
    let recipe = config.recipe().unwrap();
    let mut session = BrewSession::new(&recipe).unwrap();
    assert_eq!(session.interval_secs(), 30);
    assert_eq!(session.phase(), SessionPhase::Ready);

    session.start_session().unwrap();
    for _ in 0..40 {
        session.tick().unwrap();
    }
    session.pause().unwrap();
    assert_eq!(
        session.pause(),
        Err(BrewError::InvalidStateTransition(TransitionError::NotRunning))
    );

    let snapshot = session.snapshot();
    assert_eq!(snapshot.phase, SessionPhase::Paused);
    assert_eq!(snapshot.pour_number, Some(2));
    assert_eq!(snapshot.remaining_secs, 20);
    assert_eq!(snapshot.progress_percent, 20);
    assert_eq!(snapshot.elapsed_secs, 40);

    let outputs = session.stop_session();
    assert_eq!(outputs.last(), Some(&SessionEvent::Stopped));
    assert_eq!(session.phase(), SessionPhase::Stopped);
    assert!(!session.is_finished());
    assert_eq!(
        session.resume(),
        Err(BrewError::InvalidStateTransition(TransitionError::NoActiveSession))
    );

    session.start_session().unwrap();
    let mut ticks = 0;
    while !session.is_finished() {
        session.tick().unwrap();
        ticks += 1;
    }
    assert_eq!(ticks, 4 * 30);
}

#[test]
fn snapshot_serializes_for_presentation() {
    let recipe = calculate_recipe(20.0, Taste::Balanced, Strength::Medium);
    let mut session = BrewSession::new(&recipe).unwrap();
    session.start_session().unwrap();

    let json = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(json["phase"], "Brewing");
    assert_eq!(json["pour_number"], 1);
    assert_eq!(json["total_pours"], 5);
    assert_eq!(json["remaining_secs"], 45);
    assert_eq!(json["progress_percent"], 0);
}
