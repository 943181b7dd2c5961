//! FFI interface for C/C++ interop
//!
//! Provides C-compatible functions for extracting product data from HTML.
//! All results are passed back as JSON for simplicity.

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use serde::Serialize;

use crate::extractors::extract_product_metadata;
use crate::identifier::extract_asin;

/// Result struct returned to C++
/// Both pointers are owned by Rust and must be freed via free_product_result
#[repr(C)]
pub struct ProductResultFFI {
    /// JSON-serialized result (null-terminated)
    pub json_ptr: *mut c_char,
    /// Error message if the call failed (null-terminated), or null on success
    pub error_ptr: *mut c_char,
}

#[derive(Serialize)]
struct AsinResult {
    asin: Option<String>,
}

/// Extract product metadata from a fetched product page.
///
/// # Arguments
/// * `html_ptr` - Pointer to HTML content (UTF-8, not necessarily null-terminated)
/// * `html_len` - Length of HTML content in bytes
/// * `asin` - Product identifier (null-terminated), used for log context only
///
/// # Returns
/// ProductResultFFI with json_ptr set to the serialized metadata, or error_ptr set
///
/// # Safety
/// - `html_ptr` must point to valid memory of at least `html_len` bytes
/// - `asin` must be null or a valid null-terminated C string
/// - Caller must free the result via `free_product_result`
#[no_mangle]
pub unsafe extern "C" fn extract_product_metadata_ffi(
    html_ptr: *const c_char,
    html_len: usize,
    asin: *const c_char,
) -> ProductResultFFI {
    let html = if html_ptr.is_null() || html_len == 0 {
        ""
    } else {
        let slice = std::slice::from_raw_parts(html_ptr as *const u8, html_len);
        match std::str::from_utf8(slice) {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in HTML content"),
        }
    };

    let asin = if asin.is_null() {
        ""
    } else {
        match CStr::from_ptr(asin).to_str() {
            Ok(s) => s,
            Err(_) => return make_error_result("Invalid UTF-8 in ASIN"),
        }
    };

    make_json_result(&extract_product_metadata(html, asin))
}

/// Extract the ASIN from a product link or bare identifier.
/// Returns `{"asin": "..."}` or `{"asin": null}`.
///
/// # Safety
/// - `input` must be a valid null-terminated C string
/// - Caller must free the result via `free_product_result`
#[no_mangle]
pub unsafe extern "C" fn extract_asin_ffi(input: *const c_char) -> ProductResultFFI {
    if input.is_null() {
        return make_error_result("Input is null");
    }

    let input = match CStr::from_ptr(input).to_str() {
        Ok(s) => s,
        Err(_) => return make_error_result("Invalid UTF-8 in input"),
    };

    make_json_result(&AsinResult {
        asin: extract_asin(input),
    })
}

/// Free a ProductResultFFI returned by this module
///
/// # Safety
/// - `result` must have been returned by one of the `*_ffi` functions
/// - Must only be called once per result
#[no_mangle]
pub unsafe extern "C" fn free_product_result(result: ProductResultFFI) {
    if !result.json_ptr.is_null() {
        drop(CString::from_raw(result.json_ptr));
    }
    if !result.error_ptr.is_null() {
        drop(CString::from_raw(result.error_ptr));
    }
}

fn make_json_result<T: Serialize>(value: &T) -> ProductResultFFI {
    match serde_json::to_string(value) {
        Ok(json) => match CString::new(json) {
            Ok(cstr) => ProductResultFFI {
                json_ptr: cstr.into_raw(),
                error_ptr: ptr::null_mut(),
            },
            Err(_) => make_error_result("Result JSON contains null bytes"),
        },
        Err(e) => make_error_result(&format!("Failed to serialize result: {}", e)),
    }
}

// Helper to create error result
fn make_error_result(msg: &str) -> ProductResultFFI {
    let error_ptr = CString::new(msg)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut());
    ProductResultFFI {
        json_ptr: ptr::null_mut(),
        error_ptr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    unsafe fn take_json(result: ProductResultFFI) -> Value {
        assert!(result.error_ptr.is_null());
        let json = CStr::from_ptr(result.json_ptr).to_str().unwrap().to_string();
        free_product_result(result);
        serde_json::from_str(&json).unwrap()
    }

    unsafe fn take_error(result: ProductResultFFI) -> String {
        assert!(result.json_ptr.is_null());
        let msg = CStr::from_ptr(result.error_ptr).to_str().unwrap().to_string();
        free_product_result(result);
        msg
    }

    #[test]
    fn test_extract_product_metadata_ffi() {
        let html = format!(
            r#"<html><head><meta property="og:title" content="Widget 3000"></head><body>{}</body></html>"#,
            " ".repeat(100)
        );
        let asin = CString::new("B07FZG4C8F").unwrap();

        let json = unsafe {
            take_json(extract_product_metadata_ffi(
                html.as_ptr() as *const c_char,
                html.len(),
                asin.as_ptr(),
            ))
        };

        assert_eq!(json["title"], "Widget 3000");
        assert!(json["price"].is_null());
    }

    #[test]
    fn test_null_html_gives_empty_record() {
        let json = unsafe { take_json(extract_product_metadata_ffi(ptr::null(), 0, ptr::null())) };
        assert!(json["title"].is_null());
        assert!(json["rating"].is_null());
    }

    #[test]
    fn test_invalid_utf8_html() {
        let bytes = [0xffu8, 0xfe, 0xfd];
        let msg = unsafe {
            take_error(extract_product_metadata_ffi(
                bytes.as_ptr() as *const c_char,
                bytes.len(),
                ptr::null(),
            ))
        };
        assert!(msg.contains("UTF-8"));
    }

    #[test]
    fn test_extract_asin_ffi() {
        let input = CString::new("https://www.amazon.de/dp/B07FZG4C8F/ref=abc").unwrap();
        let json = unsafe { take_json(extract_asin_ffi(input.as_ptr())) };
        assert_eq!(json["asin"], "B07FZG4C8F");

        let input = CString::new("not a valid url").unwrap();
        let json = unsafe { take_json(extract_asin_ffi(input.as_ptr())) };
        assert!(json["asin"].is_null());
    }

    #[test]
    fn test_extract_asin_ffi_null() {
        let msg = unsafe { take_error(extract_asin_ffi(ptr::null())) };
        assert_eq!(msg, "Input is null");
    }
}
