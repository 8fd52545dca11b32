fn main() {
    std::process::exit(slurmux::cli::run());
}
