fn main() {
    if let Err(e) = shorts_studio_lib::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
