fn main() {
    if let Err(err) = oura_inserts::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
