//! C interface to the Structured Text scanner and grammar table.
//!
//! An incremental parsing engine loads this library, calls
//! [`st_structured_text_language`] once, and drives everything through the
//! returned [`StLanguage`] function table:
//!
//! - the grammar, as `grammar.json` text,
//! - the names of token kinds and of the external tokens the scanner owns,
//! - a scanner whose state the engine serializes at every token boundary.
//!
//! Every entry point validates its pointers and lengths. Invalid input yields
//! `false`, `0` or a null pointer; nothing unwinds across the boundary.

#![allow(unsafe_code)]
#![warn(missing_docs)]

use std::ffi::{c_char, c_void, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::ptr;

use once_cell::sync::Lazy;
use st_syntax::lexer::{token_window, Cursor, Point, Scanner, ScannerState, TokenKind};
use st_syntax::syntax::SYNTAX_KINDS;
use st_syntax::grammar;
use tracing::debug;

/// Version of the [`StLanguage`] layout. Bumped on any incompatible change.
pub const ABI_VERSION: u32 = 1;

/// A scanned token. Offsets are bytes; rows and columns are zero-based.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(missing_docs)]
pub struct StToken {
    /// Token kind discriminant; see `token_kind_name`.
    pub kind: u16,
    pub start_byte: u32,
    pub end_byte: u32,
    pub start_row: u32,
    pub start_column: u32,
    pub end_row: u32,
    pub end_column: u32,
}

/// The language descriptor handed to parsing engines.
#[repr(C)]
pub struct StLanguage {
    /// Always [`ABI_VERSION`].
    pub abi_version: u32,
    /// NUL-terminated `grammar.json` document.
    pub grammar_json: extern "C" fn() -> *const c_char,
    /// Number of token kinds; kinds are numbered from zero.
    pub token_kind_count: extern "C" fn() -> u32,
    /// Name of a token kind, or null if out of range.
    pub token_kind_name: extern "C" fn(kind: u16) -> *const c_char,
    /// Number of tokens listed under `externals` in the grammar.
    pub external_token_count: extern "C" fn() -> u32,
    /// Name of the external token at `index`, or null if out of range.
    pub external_token_name: extern "C" fn(index: u32) -> *const c_char,
    /// Position of a token kind in the externals list, or -1.
    pub external_token_index: extern "C" fn(kind: u16) -> i32,
    /// Allocates a scanner in the default state.
    pub scanner_create: extern "C" fn() -> *mut c_void,
    /// Frees a scanner from `scanner_create`. Null is ignored.
    pub scanner_destroy: unsafe extern "C" fn(scanner: *mut c_void),
    /// Scans one token of `input[offset..]`.
    pub scanner_scan: unsafe extern "C" fn(
        scanner: *mut c_void,
        input: *const u8,
        len: usize,
        offset: usize,
        row: u32,
        column: u32,
        token: *mut StToken,
    ) -> bool,
    /// Writes the scanner state into `buffer`; returns the bytes written.
    pub scanner_serialize:
        unsafe extern "C" fn(scanner: *const c_void, buffer: *mut u8, len: usize) -> u32,
    /// Restores a state from `serialize`. Resets to the default state and
    /// returns `false` on malformed input.
    pub scanner_deserialize:
        unsafe extern "C" fn(scanner: *mut c_void, buffer: *const u8, len: usize) -> bool,
}

static LANGUAGE: StLanguage = StLanguage {
    abi_version: ABI_VERSION,
    grammar_json,
    token_kind_count,
    token_kind_name,
    external_token_count,
    external_token_name,
    external_token_index,
    scanner_create,
    scanner_destroy,
    scanner_scan,
    scanner_serialize,
    scanner_deserialize,
};

static GRAMMAR_JSON: Lazy<CString> = Lazy::new(|| {
    grammar()
        .to_json_string()
        .ok()
        .and_then(|json| CString::new(json).ok())
        .unwrap_or_default()
});

/// Token kind names, indexed by discriminant.
static TOKEN_NAMES: Lazy<Vec<CString>> = Lazy::new(|| {
    SYNTAX_KINDS
        .iter()
        .filter_map(|kind| kind.to_token())
        .map(c_name)
        .collect()
});

static EXTERNAL_NAMES: Lazy<Vec<CString>> =
    Lazy::new(|| grammar().externals().iter().map(|&kind| c_name(kind)).collect());

fn c_name(kind: TokenKind) -> CString {
    CString::new(kind.name()).unwrap_or_default()
}

/// Returns the language descriptor.
#[no_mangle]
pub extern "C" fn st_structured_text_language() -> *const StLanguage {
    &LANGUAGE
}

/// Runs `f`, turning a panic into `fallback`.
fn guard<T>(fallback: T, f: impl FnOnce() -> T) -> T {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or(fallback)
}

extern "C" fn grammar_json() -> *const c_char {
    guard(ptr::null(), || GRAMMAR_JSON.as_ptr())
}

extern "C" fn token_kind_count() -> u32 {
    guard(0, || TOKEN_NAMES.len() as u32)
}

extern "C" fn token_kind_name(kind: u16) -> *const c_char {
    guard(ptr::null(), || {
        TOKEN_NAMES
            .get(usize::from(kind))
            .map_or(ptr::null(), |name| name.as_ptr())
    })
}

extern "C" fn external_token_count() -> u32 {
    guard(0, || EXTERNAL_NAMES.len() as u32)
}

extern "C" fn external_token_name(index: u32) -> *const c_char {
    guard(ptr::null(), || {
        EXTERNAL_NAMES
            .get(index as usize)
            .map_or(ptr::null(), |name| name.as_ptr())
    })
}

extern "C" fn external_token_index(kind: u16) -> i32 {
    guard(-1, || {
        grammar()
            .externals()
            .iter()
            .position(|&external| external as u16 == kind)
            .and_then(|index| i32::try_from(index).ok())
            .unwrap_or(-1)
    })
}

extern "C" fn scanner_create() -> *mut c_void {
    guard(ptr::null_mut(), || {
        Box::into_raw(Box::new(Scanner::new())).cast::<c_void>()
    })
}

unsafe extern "C" fn scanner_destroy(scanner: *mut c_void) {
    if scanner.is_null() {
        return;
    }
    // SAFETY: non-null scanners come from `scanner_create` and are destroyed once.
    drop(unsafe { Box::from_raw(scanner.cast::<Scanner>()) });
}

unsafe extern "C" fn scanner_scan(
    scanner: *mut c_void,
    input: *const u8,
    len: usize,
    offset: usize,
    row: u32,
    column: u32,
    token: *mut StToken,
) -> bool {
    if scanner.is_null() || input.is_null() || token.is_null() {
        return false;
    }
    if offset > len || u32::try_from(len).is_err() {
        return false;
    }
    // SAFETY: the caller passes a live scanner and `len` readable bytes.
    let (scanner, bytes) = unsafe {
        (
            &mut *scanner.cast::<Scanner>(),
            std::slice::from_raw_parts(input, len),
        )
    };
    // Only the bytes the next token can span are validated, so a full scan
    // stays linear. An offset inside a character starts the window with a
    // continuation byte and fails.
    let rest = &bytes[offset..];
    let Ok(window) = std::str::from_utf8(&rest[..token_window(rest)]) else {
        return false;
    };

    let scanned = guard(None, || {
        let mut cursor = Cursor::at(window, 0, Point::new(row, column));
        scanner.scan(&mut cursor)
    });
    let Some(scanned) = scanned else {
        return false;
    };

    let base = offset as u32;
    let out = StToken {
        kind: scanned.kind as u16,
        start_byte: base + u32::from(scanned.range.start()),
        end_byte: base + u32::from(scanned.range.end()),
        start_row: scanned.start.row,
        start_column: scanned.start.column,
        end_row: scanned.end.row,
        end_column: scanned.end.column,
    };
    // SAFETY: `token` is non-null and points to writable storage for one token.
    unsafe { token.write(out) };
    true
}

unsafe extern "C" fn scanner_serialize(scanner: *const c_void, buffer: *mut u8, len: usize) -> u32 {
    if scanner.is_null() || (buffer.is_null() && len > 0) {
        return 0;
    }
    // SAFETY: the caller passes a live scanner.
    let state = unsafe { &*scanner.cast::<Scanner>() }.state();
    if len == 0 {
        return 0;
    }
    // SAFETY: `buffer` holds `len` writable bytes.
    let buffer = unsafe { std::slice::from_raw_parts_mut(buffer, len) };
    match state.serialize(buffer) {
        Ok(written) => written as u32,
        Err(error) => {
            debug!(%error, "scanner state does not fit the engine buffer");
            0
        }
    }
}

unsafe extern "C" fn scanner_deserialize(scanner: *mut c_void, buffer: *const u8, len: usize) -> bool {
    if scanner.is_null() {
        return false;
    }
    // SAFETY: the caller passes a live scanner.
    let scanner = unsafe { &mut *scanner.cast::<Scanner>() };
    let bytes: &[u8] = if len == 0 {
        &[]
    } else if buffer.is_null() {
        scanner.set_state(ScannerState::Default);
        return false;
    } else {
        // SAFETY: `buffer` holds `len` readable bytes.
        unsafe { std::slice::from_raw_parts(buffer, len) }
    };
    match ScannerState::deserialize(bytes) {
        Ok(state) => {
            scanner.set_state(state);
            true
        }
        Err(error) => {
            debug!(%error, "resetting scanner after malformed state");
            scanner.set_state(ScannerState::Default);
            false
        }
    }
}

/// Borrows a C string returned by the descriptor as `&str`.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by an [`StLanguage`] entry point.
pub unsafe fn name_from_ptr<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    // SAFETY: descriptor strings are NUL-terminated and live for the process.
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}
