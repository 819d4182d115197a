//! Coin-operated turnstile
//!
//! This demo drives a small machine with a dead state and shows:
//! - Enter/exit and loop callbacks firing around each step
//! - Unknown input falling into the dead state
//! - Snapshot and restore with callbacks re-attached
//!
//! Run with: RUST_LOG=fsmkit=debug cargo run --example turnstile

use fsmkit::{EngineConfig, FsmBuilder, Snapshot, State, Transition};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("fsmkit=info".parse()?))
        .init();

    println!("=== Turnstile ===\n");

    let locked: State<String> = State::new("locked", true)
        .on_enter(|| println!("  [locked] arms locked"))
        .on_loop_enter(|| println!("  [locked] pushed while locked, nothing happens"))
        .try_on_exit(|| println!("  [locked] releasing"))?;
    let open: State<String> = State::new("open", false)
        .on_enter(|| println!("  [open] arms free"))
        .on_loop_enter(|| println!("  [open] extra coin kept"));
    let jammed: State<String> =
        State::dead("jammed").on_enter(|| println!("  [jammed] unknown input, out of order"));

    let mut engine = FsmBuilder::new()
        .states([locked.clone(), open.clone()])
        .dead_state(jammed)
        .initial("locked")
        .transition(Transition::new('c', &locked, &open)?.with_callback(|| println!("  coin")))
        .transition(Transition::new('p', &locked, &locked)?)
        .transition(Transition::new('c', &open, &open)?)
        .transition(Transition::new('p', &open, &locked)?.with_callback(|| println!("  push")))
        .config(EngineConfig::default().with_history(Some(32)))
        .build()?;

    for symbol in ['p', 'c', 'c', 'p'] {
        println!("input {symbol:?}");
        let result = engine.step(&symbol)?;
        println!("  -> {:?} (final: {})\n", result, engine.is_in_final_state());
    }

    let snapshot = engine.snapshot().to_json()?;
    println!("snapshot: {} bytes of JSON\n", snapshot.len());

    println!("input 'x'");
    engine.step(&'x')?;
    println!("  -> in dead state: {}\n", engine.is_in_dead_state());

    let mut restored = Snapshot::<String, char>::from_json(&snapshot)?.restore_with(
        EngineConfig::default(),
        |state| {
            if state.id() == "open" {
                state.on_enter(|| println!("  [open] (restored) arms free"))
            } else {
                state
            }
        },
        |transition| transition,
    )?;
    println!("restored at {:?}", restored.current_state().map(|s| s.id()));
    restored.step(&'c')?;

    let path: Vec<&String> = engine.history().get_path();
    println!("\npath before restore: {path:?}");

    println!("\n=== Demo Complete ===");
    Ok(())
}
