#![forbid(unsafe_code)]

fn main() {
    glide_harness::logging::init();
    if let Err(error) = glide_harness::run_from_env() {
        eprintln!("{error}");
        std::process::exit(error.exit_code());
    }
}
