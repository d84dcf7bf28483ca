fn main() {
    if let Err(e) = drugshield_lib::run() {
        eprintln!("drugshield: {e}");
        std::process::exit(1);
    }
}
