fn main() {
    tracing_subscriber::fmt::init();

    if let Err(error) = jobsched_cli::run(std::env::args_os()) {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}
