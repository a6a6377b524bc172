fn main() {
    if let Err(e) = ontotree_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(ontotree_cli::exit_code(&e));
    }
}
