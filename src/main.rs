fn main() {
    std::process::exit(repodrift::app::startup::startup());
}
