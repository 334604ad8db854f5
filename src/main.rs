fn main() {
    if let Err(err) = tabular_graph::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
