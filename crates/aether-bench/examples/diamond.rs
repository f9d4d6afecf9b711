//! Run a 2D source and print the full grid as text.
//!
//! ```text
//! cargo run --example diamond -- 2000 30
//! ```
//!
//! Arguments: initial value (default 1000) and number of steps (default 20).

use aether_engine::{AetherEngine, EngineConfig};

fn main() {
    let mut args = std::env::args().skip(1);
    let initial: i64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(1000);
    let steps: usize = args.next().and_then(|a| a.parse().ok()).unwrap_or(20);

    let mut engine = match AetherEngine::<i64>::new(EngineConfig::new(2, initial), ()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    for _ in 0..steps {
        match engine.next_step() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }

    let max = engine.max_coordinate();
    println!(
        "step {}, max coordinate {max}, changed {}",
        engine.step(),
        engine.changed()
    );
    for y in -max..=max {
        let row: Vec<String> = (-max..=max)
            .map(|x| match engine.get(&[x, y]) {
                Ok(v) => format!("{v:>6}"),
                Err(_) => format!("{:>6}", "?"),
            })
            .collect();
        println!("{}", row.join(""));
    }
}
