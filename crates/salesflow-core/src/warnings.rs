pub fn emit(message: &str) {
    eprintln!("warn: {message}");
}
