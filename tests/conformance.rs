mod conformance {
    pub mod common;
    mod expand;
    mod validate;
}
