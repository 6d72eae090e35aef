fn main() -> Result<(), Box<dyn std::error::Error>> {
    descache_cli::run()
}
