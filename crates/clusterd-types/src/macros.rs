#[macro_export]
macro_rules! print_cli_err {
    ($x:expr) => {
        eprintln!("\x1B[1;31merror:\x1B[0m {}", $x);
    };
}
