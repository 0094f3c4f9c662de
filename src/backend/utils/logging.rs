// src/backend/utils/logging.rs
//
// Canister logs go to the replica debug log through `ic_cdk::println!`.
// Native builds print to stdout/stderr so the service layer can run in unit tests.

#[cfg(target_arch = "wasm32")]
fn emit(line: String, _is_error: bool) {
    ic_cdk::println!("{}", line);
}

#[cfg(not(target_arch = "wasm32"))]
fn emit(line: String, is_error: bool) {
    if is_error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn info<S: AsRef<str>>(msg: S) {
    emit(format!("INFO: {}", msg.as_ref()), false);
}

pub fn warn<S: AsRef<str>>(msg: S) {
    emit(format!("WARN: {}", msg.as_ref()), true);
}

pub fn error<S: AsRef<str>>(msg: S) {
    emit(format!("ERROR: {}", msg.as_ref()), true);
}
