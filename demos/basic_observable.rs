//! This `Observable` emits the values 1 to 10 and is then done.
//!
//! The observable is driven by a producer running on the Tokio runtime, and
//! the observer's handlers are called by a separate dispatcher task. The
//! `Subscription` returned by `subscribe` is used to wait for the dispatcher.
//!
//! To run this example, execute `cargo run --example basic_observable`.

use rxstream::{Observable, Observer};

#[tokio::main]
async fn main() {
    // Create the `Observer` with a `next` function and an optional `done`
    // function. No need for an `error` function in this simple example.
    let mut observer = Observer::on_next(|v| println!("Emitted {}", v));
    observer.on_done(|| println!("Completed"));

    // `range` spawns its producer right away. Values queue up in the event
    // stream until an observer is subscribed.
    let observable = Observable::range(1, 11);
    let subscription = observable.subscribe(observer).unwrap();

    // Wait for the dispatcher to deliver every value and the done signal.
    subscription.join_concurrent().await.unwrap();

    println!("Observable finished emitting");
}
