//! Cipher-mode dictionary compressor.
//!
//! Compresses a dm-crypt-style cipher/mode string (e.g.
//! `"aes-cbc-essiv:sha256"`) by substituting any of 36 well-known tokens
//! with a single byte `>= 127`; ASCII separators between tokens are kept
//! verbatim and a `0x00` byte terminates the stream. Grounded on
//! `examples/original_source/bitfun.py::CRYPTO_LIST` /
//! `pack_ciphermode` / `unpack_ciphermode`.
//!
//! The dictionary order is part of the on-disk format and must never
//! change.
pub const CRYPTO_LIST: &[&str] = &[
    "aes", "blowfish", "twofish", "serpent", "des", "rc4", "rsa", "cbc", "cfb", "ctr", "gcm",
    "ecb", "ocb", "ofb", "ccm", "xts", "md4", "md5", "crc32", "sha1", "sha256", "sha384",
    "sha512", "plain", "plain64", "plain64be", "essiv", "bennbi", "null", "lmk", "tcw", "random",
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Splits `s` into (word, following-separator-char) pairs, the way
/// Python's `re.split('\W', mode)` consumes the string one token and one
/// separator at a time in `pack_ciphermode`.
fn split_words(mut s: &str) -> Vec<(String, Option<char>)> {
    let mut out = Vec::new();
    while !s.is_empty() {
        let word_end = s.find(|c: char| !is_word_char(c)).unwrap_or(s.len());
        let word = s[..word_end].to_owned();
        s = &s[word_end..];
        let sep = s.chars().next();
        if sep.is_some() {
            s = &s[sep.unwrap().len_utf8()..];
        }
        out.push((word, sep));
    }
    out
}

/// Compresses `mode` using the dictionary, terminated by a zero byte.
pub fn pack_ciphermode(mode: &str) -> Result<Vec<u8>, String> {
    assert!(CRYPTO_LIST.len() <= 128, "dictionary exceeds one byte of headroom");
    let mut out = Vec::new();
    for (word, sep) in split_words(mode) {
        if let Some(index) = CRYPTO_LIST.iter().position(|&w| w == word) {
            out.push((index + 127) as u8);
        } else {
            for c in word.bytes() {
                if c >= 127 {
                    return Err(format!("can't encode character: {c}"));
                }
                out.push(c);
            }
        }
        if let Some(c) = sep {
            out.push(c as u8);
        }
    }
    out.push(0);
    Ok(out)
}

/// Decompresses a buffer produced by [`pack_ciphermode`], returning the
/// recovered string and the number of bytes consumed (including the
/// terminating zero).
pub fn unpack_ciphermode(data: &[u8]) -> (String, usize) {
    let mut out = String::new();
    let mut count = 0usize;
    for &c in data {
        count += 1;
        if c == 0 {
            break;
        } else if c >= 127 {
            out.push_str(CRYPTO_LIST[(c - 127) as usize]);
        } else {
            out.push(c as char);
        }
    }
    (out, count)
}
