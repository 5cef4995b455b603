//! C-ABI Foreign Function Interface for copyclean.
//!
//! Lets hosts that are not written in Rust (browser-extension native hosts,
//! desktop clipboard managers, scripting languages with C FFI) run the
//! cleaning pipeline.
//!
//! # Memory Management
//!
//! All strings returned by this library must be freed using `copyclean_free_string`.
//!
//! # Error Handling
//!
//! Functions that can fail return a null pointer on error. Use
//! `copyclean_last_error` to retrieve the error message.
//!
//! # Example (C)
//!
//! ```c
//! #include <stdio.h>
//! #include "copyclean.h"
//!
//! int main() {
//!     char* text = copyclean_clean("Rust is fast [1].", "{\"mode\":\"conservative\"}");
//!     if (!text) {
//!         fprintf(stderr, "Error: %s\n", copyclean_last_error());
//!         return 1;
//!     }
//!
//!     printf("%s\n", text);
//!     copyclean_free_string(text);
//!     return 0;
//! }
//! ```

use std::cell::RefCell;
use std::ffi::{c_char, CStr, CString};
use std::panic::catch_unwind;
use std::ptr;

use crate::error::{Error, Result};
use crate::settings::Settings;

// Thread-local storage for the last error message.
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Get the version of the library.
///
/// # Safety
///
/// Returns a static string that must not be freed.
#[no_mangle]
pub extern "C" fn copyclean_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Get the last error message.
///
/// # Safety
///
/// Returns a pointer to a thread-local error string. The pointer is valid until
/// the next call to any copyclean function on the same thread.
#[no_mangle]
pub extern "C" fn copyclean_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|s| s.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Reads an optional C string. Null maps to `None`.
unsafe fn read_str<'a>(ptr: *const c_char) -> Result<Option<&'a str>> {
    if ptr.is_null() {
        return Ok(None);
    }
    Ok(Some(CStr::from_ptr(ptr).to_str()?))
}

/// Null settings select the defaults.
fn parse_settings(json: Option<&str>) -> Result<Settings> {
    match json {
        Some(json) => Settings::from_json(json),
        None => Ok(Settings::default()),
    }
}

fn into_c_string(text: String) -> Result<*mut c_char> {
    CString::new(text)
        .map(CString::into_raw)
        .map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Shared driver for the string-returning entry points.
unsafe fn run_clean(
    text: *const c_char,
    settings_json: *const c_char,
    produce: fn(Option<&str>, &Settings) -> String,
) -> *mut c_char {
    clear_last_error();

    let result = catch_unwind(|| {
        let text = read_str(text)?;
        let settings = parse_settings(read_str(settings_json)?)?;
        into_c_string(produce(text, &settings))
    });

    match result {
        Ok(Ok(s)) => s,
        Ok(Err(e)) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
        Err(_) => {
            set_last_error("panic occurred during cleaning");
            ptr::null_mut()
        }
    }
}

/// Clean text and return the plain-text result.
///
/// # Safety
///
/// - `text` must be a valid null-terminated UTF-8 string, or null (treated as empty).
/// - `settings_json` must be a valid null-terminated UTF-8 JSON settings object,
///   or null for the defaults.
/// - Returns null on error. Use `copyclean_last_error` to get the error message.
/// - The returned string must be freed with `copyclean_free_string`.
#[no_mangle]
pub unsafe extern "C" fn copyclean_clean(
    text: *const c_char,
    settings_json: *const c_char,
) -> *mut c_char {
    run_clean(text, settings_json, |text, settings| {
        crate::clean_optional(text, settings).plain_text
    })
}

/// Clean text and return the HTML rendering of the result.
///
/// # Safety
///
/// - Same contract as `copyclean_clean`.
/// - The returned string must be freed with `copyclean_free_string`.
#[no_mangle]
pub unsafe extern "C" fn copyclean_clean_html(
    text: *const c_char,
    settings_json: *const c_char,
) -> *mut c_char {
    run_clean(text, settings_json, |text, settings| {
        crate::clean_optional(text, settings).html
    })
}

/// Free a string allocated by copyclean.
///
/// # Safety
///
/// - `s` must be a pointer returned by a copyclean function, or null.
/// - After calling this function, the pointer is invalid and must not be used.
#[no_mangle]
pub unsafe extern "C" fn copyclean_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = CString::from_raw(s);
    }
}
