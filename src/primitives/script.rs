//! Reference scripts attachable to outputs.
//!
//! The teacher's `primitives::script` module is missing from the
//! retrieved sources; this is reconstructed from its usage in
//! `Output::build_babbage`, which matches on exactly these four kinds.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptKind {
    Native,
    PlutusV1,
    PlutusV2,
    PlutusV3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub kind: ScriptKind,
    pub bytes: Vec<u8>,
}

impl Script {
    pub fn new(kind: ScriptKind, bytes: Vec<u8>) -> Self {
        Self { kind, bytes }
    }
}
