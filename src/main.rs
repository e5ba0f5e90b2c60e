fn main() {
    if let Err(e) = bharatverse_lib::run() {
        eprintln!("bharatverse: {}", e);
        std::process::exit(1);
    }
}
