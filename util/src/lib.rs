pub trait InteropGetName {
    fn interop_name(&self) -> &'static [u8];
}
