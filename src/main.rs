fn main() {
    if let Err(err) = csvtool::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
