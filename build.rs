fn main() {
    // Only the device build needs the ESP-IDF environment exported; host
    // test builds run without the toolchain.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
