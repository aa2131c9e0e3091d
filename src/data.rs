const WHITESPACE: u8 = 1;
const BOUNDARY: u8 = 2;

#[inline]
pub(crate) fn is_whitespace(b: u8) -> bool {
    CHARACTER_CLASS[usize::from(b)] & WHITESPACE != 0
}

/// Spaces and tabs, the whitespace allowed between the parts of a statement
#[inline]
pub(crate) fn is_inline_whitespace(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Bytes that terminate an unquoted scalar
#[inline]
pub(crate) fn is_boundary(b: u8) -> bool {
    CHARACTER_CLASS[usize::from(b)] & BOUNDARY != 0
}

const fn create_character_class_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    table[b'\t' as usize] = WHITESPACE | BOUNDARY;
    table[b'\n' as usize] = WHITESPACE | BOUNDARY;
    table[b'\x0b' as usize] = WHITESPACE | BOUNDARY; // \v
    table[b'\x0c' as usize] = WHITESPACE | BOUNDARY; // \f
    table[b'\r' as usize] = WHITESPACE | BOUNDARY;
    table[b' ' as usize] = WHITESPACE | BOUNDARY;
    table[b'"' as usize] = BOUNDARY;
    table[b'#' as usize] = BOUNDARY;
    table[b'(' as usize] = BOUNDARY;
    table[b')' as usize] = BOUNDARY;
    table[b':' as usize] = BOUNDARY;
    table[b'[' as usize] = BOUNDARY;
    table[b']' as usize] = BOUNDARY;
    table[b'{' as usize] = BOUNDARY;
    table[b'}' as usize] = BOUNDARY;
    table
}

/// Every byte's lexical classes packed as bit flags, shared by the lexer's
/// hot paths.
pub(crate) static CHARACTER_CLASS: [u8; 256] = create_character_class_table();
