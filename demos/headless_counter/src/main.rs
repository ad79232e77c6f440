use std::cell::RefCell;
use std::rc::Rc;

use touchspin_core::*;
use touchspin_format::NumberStyle;

/// Ticks every `frame_ms` until `total_ms` have passed, like a render loop.
fn run_frames(engine: &mut SpinEngine, clock: &TestClock, total_ms: u64, frame_ms: u64) {
    let mut elapsed = 0;
    while elapsed < total_ms {
        clock.advance_ms(frame_ms);
        engine.tick();
        elapsed += frame_ms;
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let clock = TestClock::starting_now();
    let mut engine = SpinEngine::with_clock(clock.clone());

    let stops = Rc::new(RefCell::new(Vec::new()));
    engine.subscribe({
        let stops = stops.clone();
        move |id, ev| {
            log::info!("{id:?} {ev:?}");
            if let SpinEvent::Stop { value, diff } = ev {
                stops.borrow_mut().push((*value, *diff));
            }
        }
    });

    let field = MemoryAdapter::new("5");
    let options = SpinOptions::new()
        .min(0.0)
        .max(10.0)
        .step(Step::fixed(0.5))
        .prefix("qty")
        .formatter(NumberStyle::Plain)
        .locale("de-DE");
    let id = engine.attach(field.clone(), options);
    println!("attached: {:?}", field.snapshot());

    // hold "up" for two seconds at 60 fps
    engine.press_start(id, Direction::Up);
    run_frames(&mut engine, &clock, 2000, 16);
    engine.press_end(id);
    println!("released at {}", field.current_text());
    run_frames(&mut engine, &clock, 1100, 16);
    anyhow::ensure!(
        engine.phase(id) == Some(Phase::Resting),
        "finalize did not run"
    );

    // type and commit, then blur (ignored: already committed)
    engine.focus(id);
    field.type_text("3,25");
    engine.text_edited(id);
    engine.commit(id, CommitSource::Enter);
    engine.commit(id, CommitSource::Blur);
    println!("committed {} shown as {:?}", field.current_text(), field.snapshot().overlay);

    let stops = stops.borrow();
    anyhow::ensure!(stops.len() == 2, "expected two stops, got {}", stops.len());
    for (value, diff) in stops.iter() {
        println!("stop value={value} diff={diff}");
    }

    engine.detach(id);
    println!("detached, text back to {:?}", field.current_text());
    Ok(())
}
