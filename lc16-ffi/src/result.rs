use util::InteropGetName;
use util_derive::InteropGetName;

/// C-visible error code returned from every entry point in this crate.
/// Discriminants are contiguous from zero, in the order the external
/// interface documents them, since `InteropGetName` indexes a name table by
/// `*self as usize`.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, InteropGetName)]
pub enum ParserError {
    None = 0,
    IllegalParameter,
    InvalidPath,
    ArrayTooSmall,
    InvalidToken,
    UndefinedReference,
    Unknown,
}

#[no_mangle]
pub extern "C" fn parserErrorGetDescription(error: ParserError) -> *const std::os::raw::c_char {
    error.interop_name().as_ptr() as *const std::os::raw::c_char
}
