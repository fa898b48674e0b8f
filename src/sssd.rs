//! Default domain suffix lookup in the SSSD configuration.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Error, ErrorKind};

/// Configuration key holding the default domain suffix.
pub const DEFAULT_DOMAIN_SUFFIX_KEY: &str = "default_domain_suffix";

/// Reads the default domain suffix from the configuration file at `path`.
///
/// # Errors
///
/// Returns a [`ErrorKind::ConfigUnavailable`] error if the file cannot be
/// opened or does not hold a usable value (see [`parse_default_domain_suffix`]).
pub fn default_domain_suffix(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        Error::new(
            ErrorKind::ConfigUnavailable,
            format!("failed to open {}: {e}", path.display()),
        )
    })?;
    parse_default_domain_suffix(BufReader::new(file))
}

/// Scans a line-oriented `key = value` source for the default domain suffix.
///
/// Leading spaces and tabs before the key are ignored. Only the first line
/// whose key is exactly [`DEFAULT_DOMAIN_SUFFIX_KEY`] is considered; scanning
/// stops there whether or not its value is usable. Lines are compared as raw
/// bytes, so other lines need not be valid UTF-8.
///
/// # Errors
///
/// Returns a [`ErrorKind::ConfigUnavailable`] error when the key is absent,
/// has no `=`, has a value that is empty after trimming or not valid UTF-8,
/// or the source cannot be read.
///
/// # Examples
///
/// ```
/// use adsys_session_trigger::sssd::parse_default_domain_suffix;
///
/// let conf = "[sssd]\n\tdefault_domain_suffix = example.com\n";
/// assert_eq!(parse_default_domain_suffix(conf.as_bytes()).unwrap(), "example.com");
///
/// let blank = "default_domain_suffix =   \n";
/// assert!(parse_default_domain_suffix(blank.as_bytes()).is_err());
/// ```
pub fn parse_default_domain_suffix(mut reader: impl BufRead) -> Result<String, Error> {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf).map_err(|e| {
            Error::new(
                ErrorKind::ConfigUnavailable,
                format!("failed to read configuration: {e}"),
            )
        })?;
        if read == 0 {
            break;
        }

        let indent = buf
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count();
        let line = &buf[indent..];

        let (key, value) = match line.iter().position(|&b| b == b'=') {
            Some(eq) => (&line[..eq], Some(&line[eq + 1..])),
            None => (line, None),
        };
        if trim_end(key) != DEFAULT_DOMAIN_SUFFIX_KEY.as_bytes() {
            continue;
        }

        let value = value.ok_or_else(|| {
            Error::new(
                ErrorKind::ConfigUnavailable,
                format!("could not find value for key '{DEFAULT_DOMAIN_SUFFIX_KEY}'"),
            )
        })?;
        let value = std::str::from_utf8(value).map_err(|_| {
            Error::new(
                ErrorKind::ConfigUnavailable,
                format!("value for '{DEFAULT_DOMAIN_SUFFIX_KEY}' is not valid UTF-8"),
            )
        })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::new(
                ErrorKind::ConfigUnavailable,
                format!("could not find valid value for '{DEFAULT_DOMAIN_SUFFIX_KEY}'"),
            ));
        }
        return Ok(value.to_string());
    }

    Err(Error::new(
        ErrorKind::ConfigUnavailable,
        format!("key '{DEFAULT_DOMAIN_SUFFIX_KEY}' not found"),
    ))
}

fn trim_end(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(0, |last| last + 1);
    &bytes[..end]
}
