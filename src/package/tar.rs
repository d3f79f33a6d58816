use std::io::Write;

use crate::foundation::error::{MintError, MintResult};

const BLOCK: usize = 512;
const NAME_LEN: usize = 100;
const PREFIX_LEN: usize = 155;

/// Minimal ustar writer. Entries carry fixed ownership and a zero mtime so equal inputs produce
/// equal archives.
pub struct TarWriter<W: Write> {
    out: W,
    written: u64,
}

impl<W: Write> TarWriter<W> {
    /// Wrap `out`.
    pub fn new(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Bytes written so far, headers and padding included.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Append a directory entry. `path` gets a trailing `/`.
    pub fn append_dir(&mut self, path: &str) -> MintResult<()> {
        let path = format!("{}/", path.trim_end_matches('/'));
        let header = header(&path, 0, b'5', b"0000755\0")?;
        self.write_all(&header)
    }

    /// Append a regular file entry.
    pub fn append_file(&mut self, path: &str, bytes: &[u8]) -> MintResult<()> {
        let header = header(path, bytes.len() as u64, b'0', b"0000644\0")?;
        self.write_all(&header)?;
        self.write_all(bytes)?;
        let pad = (BLOCK - bytes.len() % BLOCK) % BLOCK;
        self.write_all(&[0u8; BLOCK][..pad])
    }

    /// Write the end-of-archive marker and return the inner writer.
    pub fn finish(mut self) -> MintResult<W> {
        self.write_all(&[0u8; BLOCK * 2])?;
        self.out
            .flush()
            .map_err(|e| MintError::archive(format!("flush tar stream: {e}")))?;
        Ok(self.out)
    }

    fn write_all(&mut self, bytes: &[u8]) -> MintResult<()> {
        self.out
            .write_all(bytes)
            .map_err(|e| MintError::archive(format!("write tar stream: {e}")))?;
        self.written += bytes.len() as u64;
        Ok(())
    }
}

fn header(path: &str, size: u64, kind: u8, mode: &[u8; 8]) -> MintResult<[u8; BLOCK]> {
    let (prefix, name) = split_path(path)?;
    let mut h = [0u8; BLOCK];
    h[..name.len()].copy_from_slice(name.as_bytes());
    h[100..108].copy_from_slice(mode);
    h[108..116].copy_from_slice(b"0000000\0");
    h[116..124].copy_from_slice(b"0000000\0");
    write_octal(&mut h[124..136], size)?;
    write_octal(&mut h[136..148], 0)?;
    h[156] = kind;
    h[257..263].copy_from_slice(b"ustar\0");
    h[263..265].copy_from_slice(b"00");
    h[345..345 + prefix.len()].copy_from_slice(prefix.as_bytes());

    h[148..156].fill(b' ');
    let sum: u32 = h.iter().map(|b| u32::from(*b)).sum();
    let chk = format!("{sum:06o}\0 ");
    h[148..156].copy_from_slice(chk.as_bytes());
    Ok(h)
}

fn split_path(path: &str) -> MintResult<(&str, &str)> {
    if path.len() <= NAME_LEN {
        return Ok(("", path));
    }
    let too_long = || MintError::archive(format!("archive path too long for ustar: '{path}'"));
    let cut = path
        .char_indices()
        .filter(|&(i, c)| c == '/' && i <= PREFIX_LEN && path.len() - i - 1 <= NAME_LEN)
        .map(|(i, _)| i)
        .next()
        .ok_or_else(too_long)?;
    let name = &path[cut + 1..];
    if name.is_empty() {
        return Err(too_long());
    }
    Ok((&path[..cut], name))
}

fn write_octal(field: &mut [u8], value: u64) -> MintResult<()> {
    let digits = field.len() - 1;
    let s = format!("{value:0digits$o}");
    if s.len() > digits {
        return Err(MintError::archive(format!("value {value} does not fit a tar header field")));
    }
    field[..digits].copy_from_slice(s.as_bytes());
    field[digits] = 0;
    Ok(())
}

/// One entry located inside a tar byte stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TarEntry {
    /// Entry path; directories end in `/`.
    pub path: String,
    /// Offset of the entry data.
    pub offset: usize,
    /// Data length.
    pub len: usize,
    /// Directory entry.
    pub is_dir: bool,
}

/// Index every entry of a ustar stream, verifying header checksums.
pub fn read_entries(bytes: &[u8]) -> MintResult<Vec<TarEntry>> {
    let mut out = Vec::new();
    let mut pos = 0usize;
    while pos + BLOCK <= bytes.len() {
        let h = &bytes[pos..pos + BLOCK];
        if h.iter().all(|b| *b == 0) {
            return Ok(out);
        }

        let stored = parse_octal(&h[148..156])?;
        let sum: u64 = h
            .iter()
            .enumerate()
            .map(|(i, b)| if (148..156).contains(&i) { 32 } else { u64::from(*b) })
            .sum();
        if stored != sum {
            return Err(MintError::archive(format!("bad tar header checksum at offset {pos}")));
        }

        let name = c_str(&h[..100]);
        let prefix = c_str(&h[345..500]);
        let path = if prefix.is_empty() {
            name
        } else {
            format!("{prefix}/{name}")
        };
        let len = usize::try_from(parse_octal(&h[124..136])?)
            .map_err(|_| MintError::archive("tar entry too large"))?;
        let offset = pos + BLOCK;
        if offset + len > bytes.len() {
            return Err(MintError::archive(format!("tar entry '{path}' is truncated")));
        }
        out.push(TarEntry {
            is_dir: h[156] == b'5',
            path,
            offset,
            len,
        });
        pos = offset + len.div_ceil(BLOCK) * BLOCK;
    }
    Err(MintError::archive("tar stream ends without end-of-archive marker"))
}

fn c_str(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn parse_octal(field: &[u8]) -> MintResult<u64> {
    let digits: String = field
        .iter()
        .map(|b| *b as char)
        .filter(|c| !matches!(c, '\0' | ' '))
        .collect();
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(&digits, 8)
        .map_err(|_| MintError::archive(format!("bad octal field '{digits}' in tar header")))
}

#[cfg(test)]
#[path = "../../tests/unit/package/tar.rs"]
mod tests;
