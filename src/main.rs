fn main() {
    if let Err(err) = ast_explorer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
