//! This `Observable` emits values from a blocking producer and is unsubscribed
//! from before it finishes.
//!
//! The producer checks the observable's notifier between emissions and stops
//! once the observable is unsubscribed. No handler is called after that, not
//! even `done`.
//!
//! To run this example, execute `cargo run --example unsubscribe_observable`.

use std::time::Duration;

use rxstream::{Observable, Observer, Producer, StreamWriter, Unsubscribeable};

#[tokio::main]
async fn main() {
    let observable = Observable::<u32>::new();
    let notifier = observable.notifier();
    let mut writer: StreamWriter<u32> = observable.writer();

    // Emit in a separate OS thread so the producer can sleep between values.
    let producer = std::thread::spawn(move || {
        for i in 0..=10000 {
            // Stop emitting once the observable is unsubscribed.
            if notifier.is_terminated() {
                println!("Producer stopped at {}", i);
                break;
            }
            writer.next(i);
            std::thread::sleep(Duration::from_millis(1));
        }
        writer.complete();
    });

    let mut observer = Observer::on_next(|v| println!("Emitted {}", v));
    observer.on_done(|| println!("Completed"));

    let subscription = observable.subscribe(observer).unwrap();

    // Let the observable emit for a while, then unsubscribe.
    tokio::time::sleep(Duration::from_millis(50)).await;
    subscription.unsubscribe();

    // The producer thread notices the signal on its next check.
    let _ = tokio::task::spawn_blocking(move || producer.join()).await;

    println!("`main` function done")
}
