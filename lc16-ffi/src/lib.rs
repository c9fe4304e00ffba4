//! C-style opaque-handle API over [`lc16_asm::Parser`], mirroring its safe
//! Rust surface 1:1 at a C ABI boundary: `createParser`/`destroyParser`/
//! `getParserInstructionSet`.
//!
//! Structured error detail (the offending token, its line/column, an
//! undefined reference's instruction index) travels through an extensible
//! `pNext` chain rooted at each call's info struct, the same discriminated-
//! union-of-output-structs shape used by the original C API this crate
//! replaces. `getParserInstructionSet` follows the usual two-call protocol:
//! call once with a null instruction buffer to learn the count, then again
//! with a buffer sized to hold it.

mod result;

pub use result::ParserError;

use lc16::register::{Register, RegisterCell};
use lc16::Parameter;
use lc16_asm::{Parser, ParserError as AsmParserError, RegisterMap};
use std::cell::Cell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::path::Path;
use std::ptr;
use std::rc::Rc;
use std::slice;

unsafe fn into_ptr<T>(t: T) -> *mut T {
    Box::into_raw(Box::new(t))
}

unsafe fn destroy<T>(ptr: *mut T) {
    drop(Box::from_raw(ptr))
}

thread_local! {
    static LAST_ERROR: Cell<CString> = Cell::new(Default::default());
}

fn set_last_error(message: String) {
    LAST_ERROR.with(|f| {
        let err_str = CString::new(message).unwrap_or_default();
        f.set(err_str);
    });
}

/// Returns the description of whatever error was last raised by this
/// crate's entry points on the calling thread, or an empty string if none
/// was.
#[no_mangle]
pub extern "C" fn parserGetLastError() -> *const c_char {
    LAST_ERROR.with(|f| {
        let taken = f.take();
        let ptr = taken.as_ptr();
        f.set(taken);
        ptr
    })
}

/// A caller-owned 16-bit cell reached only through a raw pointer. Lets an
/// embedder bind the assembler to one of its own registers without this
/// crate ever taking ownership of the backing memory.
struct ExternalCell(*mut u16);

impl RegisterCell for ExternalCell {
    fn get(&self) -> u16 {
        unsafe { *self.0 }
    }

    fn set(&self, value: u16) {
        unsafe { *self.0 = value }
    }

    fn as_ptr(&self) -> *mut u16 {
        self.0
    }
}

fn external_register(cell: *mut u16) -> Register {
    Rc::new(ExternalCell(cell))
}

/// Which kind of optional output struct a `pNext` link points at.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum StructureType {
    InvalidTokenOutputInfo = 0,
    UndefinedReferenceOutputInfo = 1,
}

/// Common prefix every `pNext`-chained output struct starts with, letting
/// the chain be walked without knowing the concrete struct at each link.
#[repr(C)]
pub struct OutputHeader {
    pub s_type: StructureType,
    pub p_next: *mut OutputHeader,
}

/// Populated when [`createParser`] or [`getParserInstructionSet`] fails with
/// [`ParserError::InvalidToken`].
#[repr(C)]
pub struct InvalidTokenOutputInfo {
    pub header: OutputHeader,
    pub line: u32,
    pub column: u32,
    pub token_length: usize,
    pub token: *mut c_char,
    pub token_capacity: usize,
}

/// Populated when [`getParserInstructionSet`] fails with
/// [`ParserError::UndefinedReference`].
#[repr(C)]
pub struct UndefinedReferenceOutputInfo {
    pub header: OutputHeader,
    pub instruction_index: u32,
    pub token_length: usize,
    pub token: *mut c_char,
    pub token_capacity: usize,
}

unsafe fn find_in_chain(
    mut p_next: *mut OutputHeader,
    wanted: StructureType,
) -> Option<*mut OutputHeader> {
    while !p_next.is_null() {
        if (*p_next).s_type == wanted {
            return Some(p_next);
        }
        p_next = (*p_next).p_next;
    }
    None
}

/// Writes `token` into the caller's buffer per the protocol documented on
/// the output structs: writes a NUL-terminated copy if the buffer is
/// non-null and large enough, reports the required length either way.
unsafe fn write_token(
    token: &str,
    buf: *mut c_char,
    capacity: usize,
    token_length: &mut usize,
) -> ParserError {
    *token_length = token.len();
    if buf.is_null() {
        return ParserError::IllegalParameter;
    }
    if capacity <= token.len() {
        return ParserError::ArrayTooSmall;
    }
    let dest = slice::from_raw_parts_mut(buf as *mut u8, capacity);
    dest[..token.len()].copy_from_slice(token.as_bytes());
    dest[token.len()] = 0;
    ParserError::None
}

/// Classifies a resolved [`AsmParserError`], populating whichever matching
/// output struct is present in `p_next`.
unsafe fn report_asm_error(err: AsmParserError, p_next: *mut OutputHeader) -> ParserError {
    set_last_error(format!("{}", err));
    match err {
        AsmParserError::InvalidToken { line, column, token } => {
            if let Some(found) = find_in_chain(p_next, StructureType::InvalidTokenOutputInfo) {
                let info = &mut *(found as *mut InvalidTokenOutputInfo);
                let write_result =
                    write_token(&token, info.token, info.token_capacity, &mut info.token_length);
                if write_result != ParserError::None {
                    return write_result;
                }
                info.line = line;
                info.column = column;
            }
            ParserError::InvalidToken
        }
        AsmParserError::UndefinedReference { instruction_index, token } => {
            if let Some(found) = find_in_chain(p_next, StructureType::UndefinedReferenceOutputInfo) {
                let info = &mut *(found as *mut UndefinedReferenceOutputInfo);
                let write_result =
                    write_token(&token, info.token, info.token_capacity, &mut info.token_length);
                if write_result != ParserError::None {
                    return write_result;
                }
                info.instruction_index = instruction_index;
            }
            ParserError::UndefinedReference
        }
        AsmParserError::Io { .. } => ParserError::InvalidPath,
    }
}

/// Selects whether `ParserCreateInfo::data` is source text or a file path.
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum InputType {
    Code = 0,
    FilePath = 1,
}

/// Input to [`createParser`]. `data_length` of zero means `data` is a
/// NUL-terminated C string; any other value gives an explicit byte count
/// (the source need not be NUL-terminated in that case).
#[repr(C)]
pub struct ParserCreateInfo {
    pub input_type: InputType,
    pub data_length: usize,
    pub data: *const c_char,
    pub p_next: *mut OutputHeader,
}

unsafe fn read_str(data: *const c_char, data_length: usize) -> Result<String, ParserError> {
    if data.is_null() {
        return Err(ParserError::IllegalParameter);
    }
    if data_length == 0 {
        CStr::from_ptr(data)
            .to_str()
            .map(str::to_string)
            .map_err(|_| ParserError::Unknown)
    } else {
        let bytes = slice::from_raw_parts(data as *const u8, data_length);
        std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|_| ParserError::Unknown)
    }
}

/// One `name -> cell` binding a caller supplies when resolving an
/// instruction set, letting the assembler reach a register it doesn't own.
#[repr(C)]
pub struct MappedRegister {
    pub name_length: usize,
    pub name: *const c_char,
    pub register_cell: *mut u16,
}

/// Input to [`getParserInstructionSet`].
#[repr(C)]
pub struct ParserGetInstructionSetInfo {
    pub mapped_register_count: usize,
    pub mapped_registers: *const MappedRegister,
    pub p_next: *mut OutputHeader,
}

/// An opaque handle wrapping a [`Parser`] and the register bindings it last
/// resolved references against.
///
/// `registers` is boxed so that rebuilding it (when the caller supplies a
/// different set of mapped registers) gives `lc16_asm`'s resolution cache a
/// fresh address to key on, while repeated calls with an unchanged mapping
/// keep the same `Box` and so keep hitting that cache — mirroring the
/// pointer-identity cache key `RegisterMap::identity_key` documents.
pub struct FfiParser {
    parser: Parser,
    registers: Box<RegisterMap>,
    mapped_signature: Vec<*mut u16>,
}

#[no_mangle]
pub unsafe extern "C" fn createParser(
    info: *const ParserCreateInfo,
    out_parser: *mut *mut FfiParser,
) -> ParserError {
    if info.is_null() || out_parser.is_null() {
        return ParserError::IllegalParameter;
    }
    let info = &*info;

    let text = match read_str(info.data, info.data_length) {
        Ok(text) => text,
        Err(err) => return err,
    };

    let parsed = match info.input_type {
        InputType::Code => Parser::new(&text),
        InputType::FilePath => Parser::from_path(Path::new(&text)),
    };

    match parsed {
        Ok(parser) => {
            *out_parser = into_ptr(FfiParser {
                parser,
                registers: Box::new(RegisterMap::new()),
                mapped_signature: Vec::new(),
            });
            ParserError::None
        }
        Err(err) => report_asm_error(err, info.p_next),
    }
}

#[no_mangle]
pub unsafe extern "C" fn destroyParser(parser: *mut FfiParser) {
    if !parser.is_null() {
        destroy(parser);
    }
}

#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CParameterKind {
    None = 0,
    Register,
    Constant,
    MemoryLocation,
}

/// A resolved operand, mirroring [`Parameter`] at the C boundary. `value`
/// holds the current contents for `Register`/`Constant`, or the raw address
/// for `MemoryLocation`; `cell` is the live address backing a `Register`
/// operand (null otherwise), letting a caller watch or mutate it directly.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CParameter {
    pub kind: CParameterKind,
    pub value: u16,
    pub cell: *mut u16,
}

fn to_c_parameter(param: Option<&Parameter>) -> CParameter {
    match param {
        None => CParameter {
            kind: CParameterKind::None,
            value: 0,
            cell: ptr::null_mut(),
        },
        Some(Parameter::Register(cell)) => CParameter {
            kind: CParameterKind::Register,
            value: cell.get(),
            cell: cell.as_ptr(),
        },
        Some(Parameter::Constant(value)) => CParameter {
            kind: CParameterKind::Constant,
            value: *value,
            cell: ptr::null_mut(),
        },
        Some(Parameter::MemoryLocation(address)) => CParameter {
            kind: CParameterKind::MemoryLocation,
            value: *address,
            cell: ptr::null_mut(),
        },
    }
}

/// A resolved instruction, mirroring [`lc16::Instruction`] at the C
/// boundary. `kind` is the `InstructionType` discriminant; an unused
/// operand has its `kind` set to `CParameterKind::None`.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct CInstruction {
    pub kind: u8,
    pub p0: CParameter,
    pub p1: CParameter,
}

unsafe fn collect_mapped_registers(
    info: &ParserGetInstructionSetInfo,
) -> Result<(RegisterMap, Vec<*mut u16>), ParserError> {
    let mut registers = RegisterMap::new();
    let mut signature = Vec::with_capacity(info.mapped_register_count);

    if info.mapped_register_count > 0 {
        if info.mapped_registers.is_null() {
            return Err(ParserError::IllegalParameter);
        }
        for mapped in slice::from_raw_parts(info.mapped_registers, info.mapped_register_count) {
            if mapped.register_cell.is_null() {
                return Err(ParserError::IllegalParameter);
            }
            let name = read_str(mapped.name, mapped.name_length)?;
            registers.insert(name, external_register(mapped.register_cell));
            signature.push(mapped.register_cell);
        }
    }

    Ok((registers, signature))
}

/// Resolves `parser`'s instruction stream against `info`'s mapped registers
/// and copies it into `out_instructions`.
///
/// Follows the usual two-call protocol: pass a null `out_instructions` to
/// learn the instruction count through `out_count` alone; pass a buffer
/// sized to at least that count (as a second call) to fill it.
#[no_mangle]
pub unsafe extern "C" fn getParserInstructionSet(
    parser: *mut FfiParser,
    info: *const ParserGetInstructionSetInfo,
    out_count: *mut u16,
    out_instructions: *mut CInstruction,
) -> ParserError {
    if parser.is_null() || info.is_null() || out_count.is_null() {
        return ParserError::IllegalParameter;
    }
    let info = &*info;
    let ffi = &mut *parser;

    let (registers, signature) = match collect_mapped_registers(info) {
        Ok(pair) => pair,
        Err(err) => return err,
    };
    if signature != ffi.mapped_signature {
        ffi.registers = Box::new(registers);
        ffi.mapped_signature = signature;
    }

    let instructions = match ffi.parser.make_instruction_set(&ffi.registers) {
        Ok(instructions) => instructions,
        Err(err) => return report_asm_error(err, info.p_next),
    };

    if instructions.len() > u16::MAX as usize {
        return ParserError::Unknown;
    }
    let given = *out_count;
    *out_count = instructions.len() as u16;

    if out_instructions.is_null() {
        return ParserError::None;
    }
    if (given as usize) < instructions.len() {
        return ParserError::ArrayTooSmall;
    }

    let dest = slice::from_raw_parts_mut(out_instructions, instructions.len());
    for (slot, instr) in dest.iter_mut().zip(instructions.iter()) {
        slot.kind = instr.kind as u8;
        slot.p0 = to_c_parameter(instr.p0.as_ref());
        slot.p1 = to_c_parameter(instr.p1.as_ref());
    }

    ParserError::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use lc16::InstructionType;

    unsafe fn code_info(source: &CString) -> ParserCreateInfo {
        ParserCreateInfo {
            input_type: InputType::Code,
            data_length: 0,
            data: source.as_ptr(),
            p_next: ptr::null_mut(),
        }
    }

    unsafe fn make_parser(source: &CString) -> *mut FfiParser {
        let info = code_info(source);
        let mut handle: *mut FfiParser = ptr::null_mut();
        let result = createParser(&info, &mut handle);
        assert_eq!(result, ParserError::None);
        handle
    }

    #[test]
    fn size_query_reports_count_without_a_buffer() {
        unsafe {
            let source = CString::new("ret;\nret;\n").unwrap();
            let handle = make_parser(&source);
            let get_info = ParserGetInstructionSetInfo {
                mapped_register_count: 0,
                mapped_registers: ptr::null(),
                p_next: ptr::null_mut(),
            };
            let mut count = 0u16;
            let result = getParserInstructionSet(handle, &get_info, &mut count, ptr::null_mut());
            assert_eq!(result, ParserError::None);
            assert_eq!(count, 2);
            destroyParser(handle);
        }
    }

    #[test]
    fn external_cell_round_trips_through_a_mapped_register() {
        unsafe {
            let mut storage: u16 = 0;
            let name = CString::new("acc").unwrap();
            let mapped = MappedRegister {
                name_length: 0,
                name: name.as_ptr(),
                register_cell: &mut storage as *mut u16,
            };
            let source = CString::new("mov acc 7;\n").unwrap();
            let handle = make_parser(&source);

            let get_info = ParserGetInstructionSetInfo {
                mapped_register_count: 1,
                mapped_registers: &mapped,
                p_next: ptr::null_mut(),
            };
            let mut buf = [std::mem::zeroed::<CInstruction>(); 1];
            let mut count = buf.len() as u16;
            let result =
                getParserInstructionSet(handle, &get_info, &mut count, buf.as_mut_ptr());
            assert_eq!(result, ParserError::None);
            assert_eq!(count, 1);
            assert_eq!(buf[0].kind, InstructionType::Mov as u8);
            assert_eq!(buf[0].p0.kind, CParameterKind::Register);
            assert_eq!(buf[0].p0.cell, &mut storage as *mut u16);

            destroyParser(handle);
        }
    }

    #[test]
    fn invalid_token_populates_the_chained_output_struct() {
        unsafe {
            let mut token_buf = [0 as c_char; 16];
            let mut info_out = InvalidTokenOutputInfo {
                header: OutputHeader {
                    s_type: StructureType::InvalidTokenOutputInfo,
                    p_next: ptr::null_mut(),
                },
                line: 0,
                column: 0,
                token_length: 0,
                token: token_buf.as_mut_ptr(),
                token_capacity: token_buf.len(),
            };
            let source = CString::new("bogus r0;\n").unwrap();
            let create_info = ParserCreateInfo {
                input_type: InputType::Code,
                data_length: 0,
                data: source.as_ptr(),
                p_next: &mut info_out.header,
            };

            let mut handle: *mut FfiParser = ptr::null_mut();
            let result = createParser(&create_info, &mut handle);
            assert_eq!(result, ParserError::InvalidToken);
            assert_eq!(info_out.line, 1);
            assert_eq!(info_out.column, 1);
            let token = CStr::from_ptr(info_out.token).to_str().unwrap();
            assert_eq!(token, "bogus");
        }
    }

    #[test]
    fn a_too_small_token_buffer_is_rejected_before_any_write() {
        unsafe {
            let mut token_buf = [0 as c_char; 2];
            let mut info_out = InvalidTokenOutputInfo {
                header: OutputHeader {
                    s_type: StructureType::InvalidTokenOutputInfo,
                    p_next: ptr::null_mut(),
                },
                line: 0,
                column: 0,
                token_length: 0,
                token: token_buf.as_mut_ptr(),
                token_capacity: token_buf.len(),
            };
            let source = CString::new("bogus r0;\n").unwrap();
            let create_info = ParserCreateInfo {
                input_type: InputType::Code,
                data_length: 0,
                data: source.as_ptr(),
                p_next: &mut info_out.header,
            };

            let mut handle: *mut FfiParser = ptr::null_mut();
            let result = createParser(&create_info, &mut handle);
            assert_eq!(result, ParserError::ArrayTooSmall);
            assert_eq!(info_out.token_length, "bogus".len());
        }
    }

    #[test]
    fn undefined_reference_reports_the_instruction_index() {
        unsafe {
            let mut token_buf = [0 as c_char; 16];
            let mut info_out = UndefinedReferenceOutputInfo {
                header: OutputHeader {
                    s_type: StructureType::UndefinedReferenceOutputInfo,
                    p_next: ptr::null_mut(),
                },
                instruction_index: 0,
                token_length: 0,
                token: token_buf.as_mut_ptr(),
                token_capacity: token_buf.len(),
            };
            let source = CString::new("mov r0 r1;\n").unwrap();
            let handle = make_parser(&source);

            let get_info = ParserGetInstructionSetInfo {
                mapped_register_count: 0,
                mapped_registers: ptr::null(),
                p_next: &mut info_out.header,
            };
            let mut count = 0u16;
            let result =
                getParserInstructionSet(handle, &get_info, &mut count, ptr::null_mut());
            assert_eq!(result, ParserError::UndefinedReference);
            assert_eq!(info_out.instruction_index, 0);
            let token = CStr::from_ptr(info_out.token).to_str().unwrap();
            assert_eq!(token, "r0");

            destroyParser(handle);
        }
    }

    #[test]
    fn a_too_small_instruction_buffer_is_rejected_before_any_write() {
        unsafe {
            let source = CString::new("ret;\nret;\n").unwrap();
            let handle = make_parser(&source);
            let get_info = ParserGetInstructionSetInfo {
                mapped_register_count: 0,
                mapped_registers: ptr::null(),
                p_next: ptr::null_mut(),
            };
            let mut buf = [std::mem::zeroed::<CInstruction>(); 1];
            let mut count = buf.len() as u16;
            let result =
                getParserInstructionSet(handle, &get_info, &mut count, buf.as_mut_ptr());
            assert_eq!(result, ParserError::ArrayTooSmall);
            assert_eq!(count, 2);
            assert_eq!(buf[0].kind, 0);

            destroyParser(handle);
        }
    }
}
