// src/main.rs
use gomarks::concurrency::CancellationToken;

fn main() {
    let interrupt = CancellationToken::new();
    if let Err(e) = gomarks::concurrency::install_interrupt_handler(interrupt) {
        eprintln!("warning: failed to install interrupt handler: {e}");
    }

    match gomarks::cli::run() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}
