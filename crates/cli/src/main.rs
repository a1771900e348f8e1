//! Tensor showcase CLI entry point.

fn main() {
    if let Err(e) = tensor_showcase_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
