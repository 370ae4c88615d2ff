use serde_json::to_string_pretty;
use typewriter_core::{MemorySurface, Preset, Script, Stage, Triggers};

fn main() -> anyhow::Result<()> {
    let mut stage = Stage::new();
    let banner = MemorySurface::new("");

    let id = stage.mount(
        banner.clone(),
        Some(Script::new(["Ronogamy.", "Aditya."])?),
        Preset::Hero.config(),
        Triggers::load().with_hover(),
    )?;

    // Document ready, then hover once the first line has settled
    stage.ready();
    let mut events = stage.advance(9 * 80).events;
    stage.pointer_enter(id);

    while let Some(deadline) = stage.next_deadline() {
        let out = stage.advance_to(deadline);
        println!("{:>5}ms  {:?}", stage.now(), banner.text());
        events.extend(out.events);
    }

    println!("Events:\n{}", to_string_pretty(&events)?);
    Ok(())
}
