use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    OpConstant = 0,
    OpPop = 1,
    OpTrue = 2,
    OpFalse = 3,
    OpUndefined = 4,
    OpBinaryOp = 5,
    OpEqual = 6,
    OpNotEqual = 7,
    OpMinus = 8,
    OpBang = 9,
    OpComplement = 10,
    OpJump = 11,
    OpJumpFalsy = 12,
    OpAndJump = 13,
    OpOrJump = 14,
    OpGetGlobal = 15,
    OpSetGlobal = 16,
    OpGetLocal = 17,
    OpSetLocal = 18,
    OpDefineLocal = 19,
    OpGetFree = 20,
    OpSetFree = 21,
    OpGetLocalPtr = 22,
    OpGetFreePtr = 23,
    OpGetBuiltin = 24,
    OpClosure = 25,
    OpArray = 26,
    OpMap = 27,
    OpIndex = 28,
    OpSliceIndex = 29,
    OpSetIndex = 30,
    OpError = 31,
    OpCall = 32,
    OpReturnValue = 33,
    OpReturn = 34,
    OpIteratorInit = 35,
    OpIteratorNext = 36,
    OpIteratorKey = 37,
    OpIteratorValue = 38,
    OpSuspend = 39,
}

const ALL_OPCODES: [OpCode; 40] = [
    OpCode::OpConstant,
    OpCode::OpPop,
    OpCode::OpTrue,
    OpCode::OpFalse,
    OpCode::OpUndefined,
    OpCode::OpBinaryOp,
    OpCode::OpEqual,
    OpCode::OpNotEqual,
    OpCode::OpMinus,
    OpCode::OpBang,
    OpCode::OpComplement,
    OpCode::OpJump,
    OpCode::OpJumpFalsy,
    OpCode::OpAndJump,
    OpCode::OpOrJump,
    OpCode::OpGetGlobal,
    OpCode::OpSetGlobal,
    OpCode::OpGetLocal,
    OpCode::OpSetLocal,
    OpCode::OpDefineLocal,
    OpCode::OpGetFree,
    OpCode::OpSetFree,
    OpCode::OpGetLocalPtr,
    OpCode::OpGetFreePtr,
    OpCode::OpGetBuiltin,
    OpCode::OpClosure,
    OpCode::OpArray,
    OpCode::OpMap,
    OpCode::OpIndex,
    OpCode::OpSliceIndex,
    OpCode::OpSetIndex,
    OpCode::OpError,
    OpCode::OpCall,
    OpCode::OpReturnValue,
    OpCode::OpReturn,
    OpCode::OpIteratorInit,
    OpCode::OpIteratorNext,
    OpCode::OpIteratorKey,
    OpCode::OpIteratorValue,
    OpCode::OpSuspend,
];

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        ALL_OPCODES.get(byte as usize).copied().ok_or(byte)
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn operand_widths(op: OpCode) -> &'static [usize] {
    match op {
        OpCode::OpConstant
        | OpCode::OpJump
        | OpCode::OpJumpFalsy
        | OpCode::OpAndJump
        | OpCode::OpOrJump
        | OpCode::OpGetGlobal
        | OpCode::OpSetGlobal
        | OpCode::OpArray
        | OpCode::OpMap => &[2],
        OpCode::OpBinaryOp
        | OpCode::OpGetLocal
        | OpCode::OpSetLocal
        | OpCode::OpDefineLocal
        | OpCode::OpGetFree
        | OpCode::OpSetFree
        | OpCode::OpGetLocalPtr
        | OpCode::OpGetFreePtr
        | OpCode::OpGetBuiltin => &[1],
        OpCode::OpClosure => &[2, 1],
        OpCode::OpCall => &[1, 1],
        _ => &[],
    }
}

/// Total encoded size of an instruction, opcode byte included.
pub fn instruction_width(op: OpCode) -> usize {
    1 + operand_widths(op).iter().sum::<usize>()
}

pub type Instructions = Vec<u8>;

pub fn make(op: OpCode, operands: &[usize]) -> Instructions {
    let widths = operand_widths(op);
    let mut instruction = vec![op as u8];

    for (i, operand) in operands.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        match width {
            1 => instruction.push(*operand as u8),
            2 => {
                instruction.push((*operand >> 8) as u8);
                instruction.push(*operand as u8);
            }
            _ => {}
        }
    }

    instruction
}

/// An operand too large for the slot its instruction encodes it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperandOverflow {
    pub op: OpCode,
    /// Position of the operand within the instruction.
    pub slot: usize,
    pub operand: usize,
    pub max: usize,
}

/// Like [`make`], but fails instead of truncating an operand that does not
/// fit its width.
pub fn try_make(op: OpCode, operands: &[usize]) -> Result<Instructions, OperandOverflow> {
    for (slot, (&operand, &width)) in operands.iter().zip(operand_widths(op)).enumerate() {
        let max = (1usize << (8 * width)) - 1;
        if operand > max {
            return Err(OperandOverflow {
                op,
                slot,
                operand,
                max,
            });
        }
    }
    Ok(make(op, operands))
}

pub fn read_u16(instructions: &[u8], offset: usize) -> u16 {
    ((instructions[offset] as u16) << 8) | (instructions[offset + 1] as u16)
}

pub fn read_u8(instructions: &[u8], offset: usize) -> u8 {
    instructions[offset]
}

/// Decodes the operands of the instruction starting at `ip`.
pub fn read_operands(instructions: &[u8], op: OpCode, ip: usize) -> Vec<usize> {
    let mut operands = Vec::new();
    let mut offset = ip + 1;
    for width in operand_widths(op) {
        match width {
            1 => operands.push(read_u8(instructions, offset) as usize),
            2 => operands.push(read_u16(instructions, offset) as usize),
            _ => {}
        }
        offset += width;
    }
    operands
}

/// One line per instruction: zero-padded offset, opcode, operands.
pub fn disassemble(instructions: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i < instructions.len() {
        let Ok(op) = OpCode::try_from(instructions[i]) else {
            result.push_str(&format!("{:04} <unknown {}>\n", i, instructions[i]));
            i += 1;
            continue;
        };

        let operand_str: String = read_operands(instructions, op, i)
            .iter()
            .map(|o| format!(" {}", o))
            .collect();
        result.push_str(&format!("{:04} {}{}\n", i, op, operand_str));
        i += instruction_width(op);
    }

    result
}
