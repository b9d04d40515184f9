//! Emits a finished payload as a C header so the firmware can carry a
//! built-in sample show. The output format is fixed; the firmware build
//! includes it verbatim.

use std::io;
use std::path::Path;

/// Writes `payload` to `path` as a C header defining
/// `sample_tf1_payload[]` and `sample_tf1_payload_len`.
pub fn write_header_file(payload: &[u8], path: impl AsRef<Path>) -> io::Result<()> {
    let joined = payload
        .iter()
        .map(|b| b.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let text = format!(
        "#pragma once\n\n#include <stddef.h>\n\n\
         static const unsigned char sample_tf1_payload[] = {{ {} }};\n\n\
         static const size_t sample_tf1_payload_len = {};\n",
        joined,
        payload.len()
    );
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_matches_the_firmware_format() {
        let file = tempfile::NamedTempFile::new().unwrap();
        write_header_file(&[0, 170, 255], file.path()).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(
            text,
            "#pragma once\n\n#include <stddef.h>\n\n\
             static const unsigned char sample_tf1_payload[] = { 0, 170, 255 };\n\n\
             static const size_t sample_tf1_payload_len = 3;\n"
        );
    }
}
