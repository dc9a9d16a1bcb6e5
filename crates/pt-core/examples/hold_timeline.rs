//! Print the repeat timeline of a press held for a given time.
//!
//! ```text
//! RUST_LOG=pt_core=trace cargo run -p pt-core --example hold_timeline -- 6000
//! ```

use pt_core::{PressRepeater, PressSignal, RepeatConfig, VirtualClock, VirtualSurface};
use std::env;
use std::time::Duration;

fn main() {
    env_logger::init();

    let hold_ms: u64 = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5_000);

    let clock = VirtualClock::shared();
    let surface = VirtualSurface::shared();
    let mut repeater = PressRepeater::new(RepeatConfig::default(), clock.clone(), surface);

    repeater.handle_press_start(None);
    println!("{:>6} ms  start", 0);
    if let Some(at) = clock.next_deadline() {
        println!("{:>6} ms  delay ends", at.as_millis());
    }

    let mut last = Duration::ZERO;
    clock.advance(Duration::from_millis(hold_ms), |id| {
        if let Some(PressSignal::Repeat(n)) = repeater.handle_timer(id) {
            let now = clock.now();
            println!(
                "{:>6} ms  repeat {n:<4} (+{} ms)",
                now.as_millis(),
                (now - last).as_millis()
            );
            last = now;
        }
    });

    repeater.handle_press_end();
    println!("{:>6} ms  end", clock.now().as_millis());
}
