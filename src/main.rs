fn main() {
    if let Err(err) = record_filter::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
