//! `Subject` example
//!
//! A `Subject` is both an observer and a source of observables. Every value
//! pushed into it is multicast to all of its downstream observables.
//!
//! To run this example, execute `cargo run --example subject`.

use std::fmt::Display;

use rxstream::{Observable, Observer, Producer, Subject};

pub fn create_observer<T: Display>(observer_id: i32) -> Observer<T> {
    Observer::new(
        move |v| println!("Observer #{} emitted: {}", observer_id, v),
        |e| eprintln!("Error {}", e),
        move || println!("Completed {}", observer_id),
    )
}

#[tokio::main]
pub async fn main() {
    let mut subject = Subject::new();

    // Registers `Observer` 1.
    let s1 = subject.subscribe(create_observer(1)).unwrap();

    subject.next(101); // Emits 101 to registered `Observer` 1.
    subject.next(102); // Emits 102 to registered `Observer` 1.

    // Registers `Observer` 2. It does not see 101 and 102.
    let s2 = subject.subscribe(create_observer(2)).unwrap();

    // Emits 103 to registered `Observer`s 1 and 2.
    subject.next(103);

    // Calls `done` on registered `Observer`s 1 and 2.
    subject.complete();

    s1.join_concurrent().await.unwrap();
    s2.join_concurrent().await.unwrap();

    // Observer 3: post-completion subscribe, done immediately.
    subject
        .subscribe(create_observer(3))
        .unwrap()
        .join_concurrent()
        .await
        .unwrap();

    // Called post-completion, does not emit.
    subject.next(104);

    // A subject can also observe another observable and relay its values.
    let relay = Subject::new();
    let s4 = relay.subscribe(create_observer(4)).unwrap();
    Observable::range(0, 3)
        .subscribe(relay)
        .unwrap()
        .join_concurrent()
        .await
        .unwrap();
    s4.join_concurrent().await.unwrap();
}
