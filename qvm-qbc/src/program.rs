//! QBC program image
//!
//! Wire layout, all little-endian:
//!
//! | bytes | field |
//! |---|---|
//! | 4 | magic `"QBC\0"` |
//! | 2 | version (= 1) |
//! | 2 | declared qubit count |
//! | 4 | instruction count |
//! | 4 | data section length |
//! | 4 | metadata length |
//! | data | packed instructions |
//! | metadata | opaque UTF-8 blob (JSON by convention, uninterpreted) |

use crate::error::{CodecError, Result};
use crate::instruction::Instruction;

/// File magic: "QBC\0"
pub const MAGIC: [u8; 4] = [0x51, 0x42, 0x43, 0x00];

/// Current (and only) format version
pub const VERSION: u16 = 1;

/// Header size in bytes
pub const HEADER_LEN: usize = 20;

/// A decoded QBC image
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Format version; always [`VERSION`] for images this codec produces
    pub version: u16,
    /// Declared qubit count from the header
    pub qubit_count: u16,
    /// Decoded instruction stream
    pub instructions: Vec<Instruction>,
    /// Opaque metadata bytes
    pub metadata: Vec<u8>,
}

impl Program {
    /// Build a program with the current version
    pub fn new(qubit_count: u16, instructions: Vec<Instruction>, metadata: Vec<u8>) -> Self {
        Self {
            version: VERSION,
            qubit_count,
            instructions,
            metadata,
        }
    }

    /// Pack only the instruction stream (the data section)
    pub fn instruction_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.instructions.iter().map(Instruction::encoded_len).sum());
        for instr in &self.instructions {
            instr.encode(&mut data);
        }
        data
    }

    /// Encode the full image: header, data section, metadata
    pub fn encode(&self) -> Vec<u8> {
        let data = self.instruction_bytes();

        let mut out = Vec::with_capacity(HEADER_LEN + data.len() + self.metadata.len());
        out.extend_from_slice(&MAGIC);
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.qubit_count.to_le_bytes());
        out.extend_from_slice(&(self.instructions.len() as u32).to_le_bytes());
        out.extend_from_slice(&(data.len() as u32).to_le_bytes());
        out.extend_from_slice(&(self.metadata.len() as u32).to_le_bytes());
        out.extend_from_slice(&data);
        out.extend_from_slice(&self.metadata);
        out
    }

    /// Decode a full image
    ///
    /// # Errors
    /// Fails on a bad magic, unsupported version, any length field that
    /// disagrees with the buffer, and any malformed instruction.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(CodecError::Truncated {
                offset: bytes.len(),
                needed: HEADER_LEN - bytes.len(),
            });
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(CodecError::BadMagic { found: magic });
        }

        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != VERSION {
            return Err(CodecError::UnsupportedVersion { version });
        }

        let qubit_count = u16::from_le_bytes([bytes[6], bytes[7]]);
        let instruction_count =
            u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
        let data_size = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;
        let metadata_size =
            u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]) as usize;

        let expected_len = HEADER_LEN + data_size + metadata_size;
        if bytes.len() != expected_len {
            return Err(CodecError::LengthMismatch {
                field: "image length",
                declared: expected_len,
                actual: bytes.len(),
            });
        }

        let data = &bytes[HEADER_LEN..HEADER_LEN + data_size];
        let mut instructions = Vec::with_capacity(instruction_count);
        let mut offset = 0;
        while offset < data.len() {
            let (instr, next) = Instruction::decode_at(data, offset)?;
            instructions.push(instr);
            offset = next;
        }

        if instructions.len() != instruction_count {
            return Err(CodecError::LengthMismatch {
                field: "instruction count",
                declared: instruction_count,
                actual: instructions.len(),
            });
        }

        let metadata = bytes[HEADER_LEN + data_size..].to_vec();

        Ok(Self {
            version,
            qubit_count,
            instructions,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{RotationGate, SingleGate, TwoQubitGate};

    fn sample_program() -> Program {
        Program::new(
            2,
            vec![
                Instruction::Alloc { slot: 0 },
                Instruction::Alloc { slot: 1 },
                Instruction::Single {
                    gate: SingleGate::H,
                    slot: 0,
                },
                Instruction::Rotation {
                    gate: RotationGate::Rz,
                    slot: 1,
                    angle: 0.5,
                },
                Instruction::Two {
                    gate: TwoQubitGate::Cnot,
                    a: 0,
                    b: 1,
                },
                Instruction::Measure { slot: 0, dst: 0 },
                Instruction::End,
            ],
            br#"{"name":"bell"}"#.to_vec(),
        )
    }

    #[test]
    fn test_header_layout() {
        let encoded = sample_program().encode();
        assert_eq!(&encoded[0..4], &MAGIC);
        assert_eq!(u16::from_le_bytes([encoded[4], encoded[5]]), VERSION);
        assert_eq!(u16::from_le_bytes([encoded[6], encoded[7]]), 2);
        assert_eq!(
            u32::from_le_bytes([encoded[8], encoded[9], encoded[10], encoded[11]]),
            7
        );
    }

    #[test]
    fn test_image_round_trip() {
        let program = sample_program();
        let decoded = Program::decode(&program.encode()).unwrap();
        assert_eq!(decoded, program);
    }

    #[test]
    fn test_metadata_is_opaque_json() {
        let program = sample_program();
        let decoded = Program::decode(&program.encode()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&decoded.metadata).unwrap();
        assert_eq!(value["name"], "bell");
    }

    #[test]
    fn test_empty_program() {
        let program = Program::new(0, Vec::new(), Vec::new());
        let decoded = Program::decode(&program.encode()).unwrap();
        assert!(decoded.instructions.is_empty());
        assert!(decoded.metadata.is_empty());
    }

    #[test]
    fn test_bad_magic_rejected() {
        let mut encoded = sample_program().encode();
        encoded[0] = b'X';
        let err = Program::decode(&encoded).unwrap_err();
        assert!(matches!(err, CodecError::BadMagic { .. }));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut encoded = sample_program().encode();
        encoded[4] = 2;
        let err = Program::decode(&encoded).unwrap_err();
        assert_eq!(err, CodecError::UnsupportedVersion { version: 2 });
    }

    #[test]
    fn test_truncated_image_rejected() {
        let encoded = sample_program().encode();
        let err = Program::decode(&encoded[..encoded.len() - 3]).unwrap_err();
        assert!(matches!(err, CodecError::LengthMismatch { .. }));
    }

    #[test]
    fn test_instruction_count_mismatch_rejected() {
        let mut encoded = sample_program().encode();
        encoded[8] = 99;
        let err = Program::decode(&encoded).unwrap_err();
        assert!(matches!(
            err,
            CodecError::LengthMismatch {
                field: "instruction count",
                ..
            }
        ));
    }

    #[test]
    fn test_short_header_rejected() {
        let err = Program::decode(&MAGIC).unwrap_err();
        assert!(matches!(err, CodecError::Truncated { .. }));
    }
}
