//! Platform limits, capacity arithmetic and the default comparators
//!
//! Comparators follow the `compare(a, b) -> Ordering` contract: a consistent,
//! transitive total order. Ordered containers store a [`CompareFn`] captured at
//! construction and never consult `Ord` directly.

use std::cmp::Ordering;

/// Largest power of two representable in `usize`
pub const MAX_POW_TWO: usize = 1 << (usize::BITS - 1);

/// Largest element count any container may reach
pub const MAX_ELEMENTS: usize = usize::MAX - 1;

/// Total-order comparator over `T`
pub type CompareFn<T> = fn(&T, &T) -> Ordering;

/// Rounds `n` up to the next power of two.
///
/// Zero maps to 2 (the smallest usable ring size) and anything at or above
/// [`MAX_POW_TWO`] is clamped to it.
#[inline]
pub fn upper_pow_two(n: usize) -> usize {
    if n >= MAX_POW_TWO {
        return MAX_POW_TWO;
    }
    if n <= 2 {
        return 2;
    }
    n.next_power_of_two()
}

/// Comparator using the type's own `Ord`
#[inline]
pub fn cmp_ord<T: Ord>(a: &T, b: &T) -> Ordering {
    a.cmp(b)
}

/// Identity comparator: orders references by the address they point at
#[inline]
pub fn cmp_ptr<T: ?Sized>(a: &&T, b: &&T) -> Ordering {
    let a = *a as *const T as *const () as usize;
    let b = *b as *const T as *const () as usize;
    a.cmp(&b)
}

/// C-string comparator: byte-wise order that stops at the first NUL
pub fn cmp_str<S: AsRef<[u8]> + ?Sized>(a: &S, b: &S) -> Ordering {
    c_str_bytes(a.as_ref()).cmp(c_str_bytes(b.as_ref()))
}

/// Returns the bytes of `bytes` that precede the first NUL, if any
#[inline]
pub(crate) fn c_str_bytes(bytes: &[u8]) -> &[u8] {
    match bytes.iter().position(|&b| b == 0) {
        Some(end) => &bytes[..end],
        None => bytes,
    }
}
