//! Dump argument definitions

use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct DumpArgs {
    /// Start address in hex (e.g. ffffffff81000000)
    #[arg(value_name = "ADDRESS", value_parser = parse_hex, required = true)]
    pub address: Option<u64>,

    /// Number of bytes to dump, in hex
    #[arg(value_name = "LENGTH", value_parser = parse_hex, required = true)]
    pub length: Option<u64>,

    /// Write the dump to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the size, MD5, SHA-1 and SHA-256 of the dumped bytes to stderr
    #[arg(long)]
    pub hash: bool,
}

/// Parse a hexadecimal u64 with an optional `0x` prefix
pub fn parse_hex(s: &str) -> Result<u64, String> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("'{}' is not a hexadecimal number", s));
    }

    u64::from_str_radix(digits, 16).map_err(|e| format!("'{}' is not a valid hex u64: {}", s, e))
}
