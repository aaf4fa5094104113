//! Opcodes of the Opal stack machine
//!
//! Every instruction starts with a single-byte opcode. The opcode fixes the
//! number and the kinds of operands that follow it; operand kinds are never
//! inferred from context.

use serde::{Deserialize, Serialize};

/// Opcode enumeration
///
/// Opcodes are organized into categories:
/// - 0x00-0x0F: Stack manipulation & constants
/// - 0x10-0x1F: Local variables
/// - 0x20-0x2F: Arithmetic
/// - 0x30-0x3F: Type conversions
/// - 0x40-0x4F: Field access
/// - 0x50-0x5F: Arrays
/// - 0x60-0x6F: Object allocation
/// - 0x70-0x7F: Calls
/// - 0x80-0x8F: Control flow
/// - 0x90-0x9F: Returns
/// - 0xA0-0xAF: Exceptions
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Opcode {
    // ===== Stack Manipulation & Constants (0x00-0x0F) =====
    /// No operation
    Nop = 0x00,
    /// Discard top of stack
    Pop = 0x01,
    /// Duplicate top of stack
    Dup = 0x02,
    /// Swap top two stack values
    Swap = 0x03,
    /// Push null
    ConstNull = 0x04,
    /// Push boolean constant (operand: int 0 or 1)
    ConstBool = 0x05,
    /// Push 32-bit integer constant (operand: int)
    ConstI32 = 0x06,
    /// Push 64-bit integer constant (operand: int)
    ConstI64 = 0x07,
    /// Push 32-bit float constant (operand: float)
    ConstF32 = 0x08,
    /// Push 64-bit float constant (operand: float)
    ConstF64 = 0x09,
    /// Push string constant (operand: str)
    ConstStr = 0x0A,

    // ===== Local Variables (0x10-0x1F) =====
    /// Push local variable (operands: int slot, type)
    Load = 0x10,
    /// Pop value into local variable (operands: int slot, type)
    Store = 0x11,

    // ===== Arithmetic (0x20-0x2F) =====
    /// Pop b, pop a, push a + b
    Add = 0x20,
    /// Pop b, pop a, push a - b
    Sub = 0x21,
    /// Pop b, pop a, push a * b
    Mul = 0x22,
    /// Pop b, pop a, push a / b
    Div = 0x23,
    /// Pop b, pop a, push a % b
    Mod = 0x24,
    /// Pop a, push -a
    Neg = 0x25,

    // ===== Type Conversions (0x30-0x3F) =====
    /// Numeric conversion: pop a, push a as target type (operand: type)
    Cast = 0x30,
    /// Runtime type check: pop a, push a checked against type (operand: type)
    CheckCast = 0x31,

    // ===== Field Access (0x40-0x4F) =====
    /// Pop object, push field value (operands: str owner, str name, type)
    GetField = 0x40,
    /// Pop value, pop object, write field (operands: str owner, str name, type)
    PutField = 0x41,
    /// Push static field value (operands: str owner, str name, type)
    GetStatic = 0x42,
    /// Pop value, write static field (operands: str owner, str name, type)
    PutStatic = 0x43,

    // ===== Arrays (0x50-0x5F) =====
    /// Pop length, push new array (operand: element type)
    NewArray = 0x50,
    /// Pop index, pop array, push element
    LoadArray = 0x51,
    /// Pop value, pop index, pop array, write element
    StoreArray = 0x52,
    /// Pop array, push length
    ArrayLen = 0x53,

    // ===== Object Allocation (0x60-0x6F) =====
    /// Push address of a new uninitialized object (operand: str class)
    New = 0x60,

    // ===== Calls (0x70-0x7F) =====
    /// Virtual call: pop args, pop receiver (operands: str owner, str name, str signature)
    Invoke = 0x70,
    /// Static call: pop args (operands: str owner, str name, str signature)
    InvokeStatic = 0x71,
    /// Interface call: pop args, pop receiver (operands: str owner, str name, str signature)
    InvokeInterface = 0x72,
    /// Dynamic call: pop args (operands: str name, str signature)
    InvokeDynamic = 0x73,
    /// Constructor call: pop args, pop address (operands: str owner, str signature)
    InvokeCtor = 0x74,
    /// Super-constructor call: pop args, pop receiver (operands: str owner, str signature)
    InvokeSuper = 0x75,

    // ===== Control Flow (0x80-0x8F) =====
    /// Pop b, pop a, branch if a == b (operand: label)
    IfEq = 0x80,
    /// Pop b, pop a, branch if a != b (operand: label)
    IfNe = 0x81,
    /// Pop b, pop a, branch if a < b (operand: label)
    IfLt = 0x82,
    /// Pop b, pop a, branch if a <= b (operand: label)
    IfLe = 0x83,
    /// Pop b, pop a, branch if a > b (operand: label)
    IfGt = 0x84,
    /// Pop b, pop a, branch if a >= b (operand: label)
    IfGe = 0x85,
    /// Unconditional branch (operand: label)
    Goto = 0x86,
    /// Branch target marker (operand: label)
    Label = 0x87,

    // ===== Returns (0x90-0x9F) =====
    /// Return from a void method
    Return = 0x90,
    /// Pop value, return it (operand: type)
    ReturnValue = 0x91,

    // ===== Exceptions (0xA0-0xAF) =====
    /// Pop error value, raise it
    Throw = 0xA0,
}

impl Opcode {
    /// Convert byte to opcode
    ///
    /// Returns None if the byte does not correspond to a valid opcode.
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0x00 => Some(Self::Nop),
            0x01 => Some(Self::Pop),
            0x02 => Some(Self::Dup),
            0x03 => Some(Self::Swap),
            0x04 => Some(Self::ConstNull),
            0x05 => Some(Self::ConstBool),
            0x06 => Some(Self::ConstI32),
            0x07 => Some(Self::ConstI64),
            0x08 => Some(Self::ConstF32),
            0x09 => Some(Self::ConstF64),
            0x0A => Some(Self::ConstStr),
            0x10 => Some(Self::Load),
            0x11 => Some(Self::Store),
            0x20 => Some(Self::Add),
            0x21 => Some(Self::Sub),
            0x22 => Some(Self::Mul),
            0x23 => Some(Self::Div),
            0x24 => Some(Self::Mod),
            0x25 => Some(Self::Neg),
            0x30 => Some(Self::Cast),
            0x31 => Some(Self::CheckCast),
            0x40 => Some(Self::GetField),
            0x41 => Some(Self::PutField),
            0x42 => Some(Self::GetStatic),
            0x43 => Some(Self::PutStatic),
            0x50 => Some(Self::NewArray),
            0x51 => Some(Self::LoadArray),
            0x52 => Some(Self::StoreArray),
            0x53 => Some(Self::ArrayLen),
            0x60 => Some(Self::New),
            0x70 => Some(Self::Invoke),
            0x71 => Some(Self::InvokeStatic),
            0x72 => Some(Self::InvokeInterface),
            0x73 => Some(Self::InvokeDynamic),
            0x74 => Some(Self::InvokeCtor),
            0x75 => Some(Self::InvokeSuper),
            0x80 => Some(Self::IfEq),
            0x81 => Some(Self::IfNe),
            0x82 => Some(Self::IfLt),
            0x83 => Some(Self::IfLe),
            0x84 => Some(Self::IfGt),
            0x85 => Some(Self::IfGe),
            0x86 => Some(Self::Goto),
            0x87 => Some(Self::Label),
            0x90 => Some(Self::Return),
            0x91 => Some(Self::ReturnValue),
            0xA0 => Some(Self::Throw),
            _ => None,
        }
    }

    /// Convert opcode to byte
    #[inline]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Get the human-readable name of the opcode
    pub fn name(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Pop => "POP",
            Self::Dup => "DUP",
            Self::Swap => "SWAP",
            Self::ConstNull => "CONST_NULL",
            Self::ConstBool => "CONST_BOOL",
            Self::ConstI32 => "CONST_I32",
            Self::ConstI64 => "CONST_I64",
            Self::ConstF32 => "CONST_F32",
            Self::ConstF64 => "CONST_F64",
            Self::ConstStr => "CONST_STR",
            Self::Load => "LOAD",
            Self::Store => "STORE",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MOD",
            Self::Neg => "NEG",
            Self::Cast => "CAST",
            Self::CheckCast => "CHECK_CAST",
            Self::GetField => "GET_FIELD",
            Self::PutField => "PUT_FIELD",
            Self::GetStatic => "GET_STATIC",
            Self::PutStatic => "PUT_STATIC",
            Self::NewArray => "NEW_ARRAY",
            Self::LoadArray => "LOAD_ARRAY",
            Self::StoreArray => "STORE_ARRAY",
            Self::ArrayLen => "ARRAY_LEN",
            Self::New => "NEW",
            Self::Invoke => "INVOKE",
            Self::InvokeStatic => "INVOKE_STATIC",
            Self::InvokeInterface => "INVOKE_INTERFACE",
            Self::InvokeDynamic => "INVOKE_DYNAMIC",
            Self::InvokeCtor => "INVOKE_CTOR",
            Self::InvokeSuper => "INVOKE_SUPER",
            Self::IfEq => "IF_EQ",
            Self::IfNe => "IF_NE",
            Self::IfLt => "IF_LT",
            Self::IfLe => "IF_LE",
            Self::IfGt => "IF_GT",
            Self::IfGe => "IF_GE",
            Self::Goto => "GOTO",
            Self::Label => "LABEL",
            Self::Return => "RETURN",
            Self::ReturnValue => "RETURN_VALUE",
            Self::Throw => "THROW",
        }
    }

    /// Look up an opcode by its human-readable name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NOP" => Some(Self::Nop),
            "POP" => Some(Self::Pop),
            "DUP" => Some(Self::Dup),
            "SWAP" => Some(Self::Swap),
            "CONST_NULL" => Some(Self::ConstNull),
            "CONST_BOOL" => Some(Self::ConstBool),
            "CONST_I32" => Some(Self::ConstI32),
            "CONST_I64" => Some(Self::ConstI64),
            "CONST_F32" => Some(Self::ConstF32),
            "CONST_F64" => Some(Self::ConstF64),
            "CONST_STR" => Some(Self::ConstStr),
            "LOAD" => Some(Self::Load),
            "STORE" => Some(Self::Store),
            "ADD" => Some(Self::Add),
            "SUB" => Some(Self::Sub),
            "MUL" => Some(Self::Mul),
            "DIV" => Some(Self::Div),
            "MOD" => Some(Self::Mod),
            "NEG" => Some(Self::Neg),
            "CAST" => Some(Self::Cast),
            "CHECK_CAST" => Some(Self::CheckCast),
            "GET_FIELD" => Some(Self::GetField),
            "PUT_FIELD" => Some(Self::PutField),
            "GET_STATIC" => Some(Self::GetStatic),
            "PUT_STATIC" => Some(Self::PutStatic),
            "NEW_ARRAY" => Some(Self::NewArray),
            "LOAD_ARRAY" => Some(Self::LoadArray),
            "STORE_ARRAY" => Some(Self::StoreArray),
            "ARRAY_LEN" => Some(Self::ArrayLen),
            "NEW" => Some(Self::New),
            "INVOKE" => Some(Self::Invoke),
            "INVOKE_STATIC" => Some(Self::InvokeStatic),
            "INVOKE_INTERFACE" => Some(Self::InvokeInterface),
            "INVOKE_DYNAMIC" => Some(Self::InvokeDynamic),
            "INVOKE_CTOR" => Some(Self::InvokeCtor),
            "INVOKE_SUPER" => Some(Self::InvokeSuper),
            "IF_EQ" => Some(Self::IfEq),
            "IF_NE" => Some(Self::IfNe),
            "IF_LT" => Some(Self::IfLt),
            "IF_LE" => Some(Self::IfLe),
            "IF_GT" => Some(Self::IfGt),
            "IF_GE" => Some(Self::IfGe),
            "GOTO" => Some(Self::Goto),
            "LABEL" => Some(Self::Label),
            "RETURN" => Some(Self::Return),
            "RETURN_VALUE" => Some(Self::ReturnValue),
            "THROW" => Some(Self::Throw),
            _ => None,
        }
    }

    /// Check if this opcode is a branch instruction
    pub fn is_branch(self) -> bool {
        matches!(
            self,
            Self::IfEq
                | Self::IfNe
                | Self::IfLt
                | Self::IfLe
                | Self::IfGt
                | Self::IfGe
                | Self::Goto
        )
    }

    /// Check if this opcode is a call instruction
    pub fn is_invoke(self) -> bool {
        matches!(
            self,
            Self::Invoke
                | Self::InvokeStatic
                | Self::InvokeInterface
                | Self::InvokeDynamic
                | Self::InvokeCtor
                | Self::InvokeSuper
        )
    }

    /// Check if this opcode is a return instruction
    pub fn is_return(self) -> bool {
        matches!(self, Self::Return | Self::ReturnValue)
    }

    /// Check if this opcode pushes a constant
    pub fn is_const(self) -> bool {
        matches!(
            self,
            Self::ConstNull
                | Self::ConstBool
                | Self::ConstI32
                | Self::ConstI64
                | Self::ConstF32
                | Self::ConstF64
                | Self::ConstStr
        )
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_byte_roundtrip() {
        let opcodes = [
            Opcode::Nop,
            Opcode::Pop,
            Opcode::Dup,
            Opcode::ConstI32,
            Opcode::ConstStr,
            Opcode::Load,
            Opcode::Store,
            Opcode::Add,
            Opcode::Mul,
            Opcode::Cast,
            Opcode::GetField,
            Opcode::PutStatic,
            Opcode::NewArray,
            Opcode::New,
            Opcode::Invoke,
            Opcode::InvokeCtor,
            Opcode::IfGt,
            Opcode::Label,
            Opcode::Return,
            Opcode::ReturnValue,
            Opcode::Throw,
        ];
        for opcode in &opcodes {
            let byte = opcode.to_u8();
            assert_eq!(Opcode::from_u8(byte), Some(*opcode), "failed for {:?}", opcode);
        }
    }

    #[test]
    fn rejects_invalid_bytes() {
        assert_eq!(Opcode::from_u8(0x0F), None);
        assert_eq!(Opcode::from_u8(0xFF), None);
        assert_eq!(Opcode::from_u8(0x76), None);
    }

    #[test]
    fn opcode_names() {
        assert_eq!(Opcode::Add.name(), "ADD");
        assert_eq!(Opcode::InvokeStatic.name(), "INVOKE_STATIC");
        assert_eq!(Opcode::IfGt.name(), "IF_GT");
        assert_eq!(Opcode::ConstNull.name(), "CONST_NULL");
    }

    #[test]
    fn name_lookup_roundtrip() {
        for byte in 0x00..=0xA0u8 {
            if let Some(opcode) = Opcode::from_u8(byte) {
                assert_eq!(Opcode::from_name(opcode.name()), Some(opcode));
            }
        }
        assert_eq!(Opcode::from_name("BOGUS"), None);
    }

    #[test]
    fn branch_detection() {
        assert!(Opcode::IfEq.is_branch());
        assert!(Opcode::IfGe.is_branch());
        assert!(Opcode::Goto.is_branch());
        assert!(!Opcode::Label.is_branch());
        assert!(!Opcode::Return.is_branch());
    }

    #[test]
    fn invoke_detection() {
        assert!(Opcode::Invoke.is_invoke());
        assert!(Opcode::InvokeDynamic.is_invoke());
        assert!(Opcode::InvokeSuper.is_invoke());
        assert!(!Opcode::New.is_invoke());
    }

    #[test]
    fn const_detection() {
        assert!(Opcode::ConstI32.is_const());
        assert!(Opcode::ConstNull.is_const());
        assert!(!Opcode::Load.is_const());
    }
}
