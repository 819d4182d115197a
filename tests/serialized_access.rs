//! The engine does no locking of its own. Hosts that share one across tasks
//! serialize every call behind a mutex; these tests exercise that pattern.

use fsmkit::{Engine, FsmBuilder, State};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

fn counter_machine(entered: Arc<AtomicUsize>) -> Engine<u32, char> {
    FsmBuilder::new()
        .state(State::new(0u32, true))
        .state(State::new(1u32, false).on_enter(move || {
            entered.fetch_add(1, Ordering::SeqCst);
        }))
        .initial(0u32)
        .edge('t', 0u32, 1u32)
        .edge('t', 1u32, 0u32)
        .build()
        .unwrap()
}

#[tokio::test]
async fn steps_from_many_tasks_are_serialized() {
    let entered = Arc::new(AtomicUsize::new(0));
    let engine = Arc::new(Mutex::new(counter_machine(Arc::clone(&entered))));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            for _ in 0..25 {
                engine.lock().await.step(&'t').unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let engine = engine.lock().await;
    // 200 toggles: every odd-numbered one enters state 1, ending back in 0
    assert_eq!(entered.load(Ordering::SeqCst), 100);
    assert_eq!(engine.current_state().unwrap().id(), &0);
    assert!(engine.is_in_final_state());
}

#[tokio::test]
async fn mutation_and_validation_under_one_lock() {
    let entered = Arc::new(AtomicUsize::new(0));
    let engine = Arc::new(Mutex::new(counter_machine(entered)));

    {
        let mut guard = engine.lock().await;
        guard.set_dead_state(Some(State::dead(99u32))).unwrap();
        guard.add_state(State::new(2u32, false)).unwrap();
        assert!(guard.is_dirty());
    }

    let engine_for_task = Arc::clone(&engine);
    let result = tokio::spawn(async move { engine_for_task.lock().await.step(&'t') })
        .await
        .unwrap();
    assert!(result.is_err());

    let mut guard = engine.lock().await;
    guard.remove_state(&2).unwrap();
    guard.validate().unwrap();
    guard.step(&'x').unwrap();
    assert!(guard.is_in_dead_state());
}
