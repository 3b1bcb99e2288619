fn main() {
    if let Err(err) = wave_merge::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
