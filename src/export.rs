//! Standalone C animation program generation.
//!
//! Export-mode frames are already valid C string literal bodies, so the
//! emitter only has to quote them and wrap them in a `clear -> print -> sleep`
//! driver loop.

use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

/// A finished sequence of export-mode frames and their playback delay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationExport {
    frames: Vec<String>,
    frame_delay_us: u64,
}

impl AnimationExport {
    pub fn new(frame_delay_us: u64) -> Self {
        Self {
            frames: Vec::new(),
            frame_delay_us,
        }
    }

    /// Append one export-mode frame.
    pub fn push(&mut self, frame: String) {
        self.frames.push(frame);
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn frame_delay_us(&self) -> u64 {
        self.frame_delay_us
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// Delay between frames for a given playback rate, truncated to whole
/// microseconds. `fps` of 0 is treated as 1.
pub fn frame_delay_us(fps: u32) -> u64 {
    1_000_000 / fps.max(1) as u64
}

/// Generate the C source of a looping animation.
///
/// The program holds one string literal per frame, a microsecond delay
/// constant and an endless loop that clears the screen, prints the next frame
/// and sleeps.
///
/// An export with no frames declares a one-element placeholder array
/// `frames[1] = { "" }` with `total = 0` instead of a zero-length array,
/// which ISO C does not allow. A `total == 0` guard returns before the loop,
/// so the placeholder is never printed.
pub fn emit(export: &AnimationExport) -> String {
    let body_len: usize = export.frames.iter().map(|f| f.len() + 12).sum();
    let mut src = String::with_capacity(body_len + 512);

    src.push_str("#include <stdio.h>\n#include <unistd.h>\n\n");
    src.push_str("int main() {\n");
    // Writing into a String cannot fail
    let _ = writeln!(
        src,
        "    const int frame_time_us = {};",
        export.frame_delay_us
    );
    let _ = writeln!(src, "    const int total = {};", export.frames.len());

    if export.frames.is_empty() {
        src.push_str("    const char* frames[1] = { \"\" };\n");
    } else {
        let _ = writeln!(src, "    const char* frames[{}] = {{", export.frames.len());
        for frame in &export.frames {
            src.push_str("        \"");
            src.push_str(frame);
            src.push_str("\",\n");
        }
        src.push_str("    };\n");
    }

    src.push_str("    if (total == 0) {\n");
    src.push_str("        (void)frames;\n");
    src.push_str("        (void)frame_time_us;\n");
    src.push_str("        return 0;\n");
    src.push_str("    }\n");
    src.push_str("    while(1) {\n");
    src.push_str("        for(int i=0;i<total;i++) {\n");
    src.push_str("            printf(\"\\033[H\\033[2J\");\n");
    src.push_str("            printf(\"%s\\n\", frames[i]);\n");
    src.push_str("            fflush(stdout);\n");
    src.push_str("            usleep(frame_time_us);\n");
    src.push_str("        }\n");
    src.push_str("    }\n");
    src.push_str("    return 0;\n");
    src.push_str("}\n");

    src
}

/// Write the generated program to `dir/file_name`, creating `dir` if needed.
///
/// # Returns
/// The path of the written file.
pub fn write_program(export: &AnimationExport, dir: &Path, file_name: &str) -> io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, emit(export))?;
    log::info!(
        "Wrote {} frame animation to {}",
        export.len(),
        path.display()
    );
    Ok(path)
}
