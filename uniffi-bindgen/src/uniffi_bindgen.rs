//! Generates foreign-language bindings for `iapkit`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
