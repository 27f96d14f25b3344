fn main() {
    // ESP-IDF link/env directives only apply when cross-compiling for the
    // device; host test builds must not inherit them.
    if std::env::var("CARGO_CFG_TARGET_OS").as_deref() == Ok("espidf") {
        embuild::espidf::sysenv::output();
    }
}
