// Terminal clipboard access via the OSC 52 escape sequence.

use std::io::Write;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::Result;

/// Escape sequence asking the terminal to place `text` on the system clipboard.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

pub fn copy_to_clipboard(out: &mut impl Write, text: &str) -> Result<()> {
    out.write_all(osc52_sequence(text).as_bytes())?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_osc52_sequence() {
        assert_eq!(osc52_sequence("sk-abc"), "\x1b]52;c;c2stYWJj\x07");

        let mut out = Vec::new();
        copy_to_clipboard(&mut out, "sk-abc").unwrap();
        assert_eq!(out, osc52_sequence("sk-abc").into_bytes());
    }
}
