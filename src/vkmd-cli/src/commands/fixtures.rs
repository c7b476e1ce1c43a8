//! Test fixtures: synthetic core images written to disk

use std::path::{Path, PathBuf};
use vkmd::mock::CoreImageBuilder;

pub use vkmd::mock::expected_bytes as expected;

pub fn write_image(dir: &Path, builder: &CoreImageBuilder) -> PathBuf {
    let path = dir.join("kcore");
    std::fs::write(&path, builder.build()).unwrap();
    path
}

/// Two adjacent segments backed by distant file ranges
pub fn two_segments() -> CoreImageBuilder {
    CoreImageBuilder::new()
        .segment(0x1000, 0x100, 0x2000, 0x100)
        .segment(0x1100, 0x100, 0x3000, 0x100)
}
