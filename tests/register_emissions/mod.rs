use std::sync::{Arc, Mutex};

use rxstream::Observer;

pub fn register_emissions_observer() -> (
    Vec<impl FnOnce() -> Observer<i64>>,
    Arc<Mutex<Vec<i64>>>,
    Arc<Mutex<Vec<i64>>>,
    Arc<Mutex<Vec<String>>>,
) {
    let nexts = Arc::new(Mutex::new(Vec::with_capacity(16)));
    let nexts_c = Arc::clone(&nexts);

    let completes = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let completes_c = Arc::clone(&completes);

    let errors = Arc::new(Mutex::new(Vec::with_capacity(5)));
    let errors_c = Arc::clone(&errors);

    let make_observer = vec![
        move || {
            Observer::new(
                move |n| {
                    // Track next() calls.
                    nexts_c.lock().unwrap().push(n);
                },
                move |e| {
                    // Track error() calls.
                    errors_c.lock().unwrap().push(e.to_string());
                },
                move || {
                    // Track done() calls.
                    completes_c.lock().unwrap().push(1);
                },
            )
        };
        10
    ];
    (make_observer, nexts, completes, errors)
}
