use crate::il::MethodSignature;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A global instruction pointer: a method and an offset into its bytecode.
///
/// Program counters order by signature first, then by offset.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct ProgramCounter {
    signature: MethodSignature,
    offset: usize,
}

impl ProgramCounter {
    pub fn new(signature: MethodSignature, offset: usize) -> ProgramCounter {
        ProgramCounter { signature, offset }
    }

    /// The entry point of the given method.
    pub fn entry(signature: MethodSignature) -> ProgramCounter {
        ProgramCounter::new(signature, 0)
    }

    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The instruction following this one.
    pub fn next(&self) -> ProgramCounter {
        ProgramCounter::new(self.signature.clone(), self.offset + 1)
    }

    /// The instruction preceeding this one, if this is not the entry.
    pub fn prev(&self) -> Option<ProgramCounter> {
        self.offset
            .checked_sub(1)
            .map(|offset| ProgramCounter::new(self.signature.clone(), offset))
    }

    /// An instruction in the same method.
    pub fn jump(&self, offset: usize) -> ProgramCounter {
        ProgramCounter::new(self.signature.clone(), offset)
    }
}

impl fmt::Display for ProgramCounter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}", self.signature, self.offset)
    }
}

#[test]
fn program_counter_moves() {
    let signature = MethodSignature::new("A", "f", None, vec![]);
    let pc = ProgramCounter::entry(signature.clone());

    assert!(pc.prev().is_none());
    assert_eq!(pc.next().offset(), 1);
    assert_eq!(pc.next().prev(), Some(pc.clone()));
    assert_eq!(pc.jump(7), ProgramCounter::new(signature, 7));
}

#[test]
fn program_counter_order() {
    let a = MethodSignature::new("A", "f", None, vec![]);
    let b = MethodSignature::new("B", "f", None, vec![]);

    assert!(ProgramCounter::new(a.clone(), 9) < ProgramCounter::new(b.clone(), 0));
    assert!(ProgramCounter::new(a.clone(), 1) < ProgramCounter::new(a, 2));
}
