//! End-to-end lifting scenarios

use opal_ast::{AstNode, Value};
use opal_bytecode::{DataType, Instruction, LabelId, Opcode, Operand};
use opal_decompiler::{DecompileError, DecompilerMachine, TraceOutput};

fn int(value: i64) -> Instruction {
    Instruction::new(Opcode::ConstI32, vec![Operand::Int(value)])
}

fn store(slot: i64, ty: DataType) -> Instruction {
    Instruction::new(Opcode::Store, vec![Operand::Int(slot), Operand::Type(ty)])
}

#[test]
fn arithmetic_return_lifts_to_one_statement() {
    let ast = DecompilerMachine::new()
        .decompile(vec![
            int(2),
            int(3),
            Instruction::bare(Opcode::Add),
            Instruction::new(Opcode::ReturnValue, vec![Operand::Type(DataType::Int)]),
        ])
        .unwrap();
    assert_eq!(ast.statements().len(), 1);
    assert_eq!(
        ast.statements()[0],
        AstNode::Return {
            value: Some(Box::new(AstNode::Add {
                left: Box::new(AstNode::Literal(Value::Int(2))),
                right: Box::new(AstNode::Literal(Value::Int(3))),
            })),
        }
    );
}

#[test]
fn duplicated_value_is_shared_not_copied() {
    let ast = DecompilerMachine::new()
        .decompile(vec![
            int(7),
            Instruction::bare(Opcode::Dup),
            store(0, DataType::Int),
            store(1, DataType::Int),
        ])
        .unwrap();

    let ids: Vec<_> = ast
        .statements()
        .iter()
        .map(|statement| match statement {
            AstNode::StoreLocal { value, .. } => match **value {
                AstNode::Duplicate(id) => id,
                ref other => panic!("expected a handle, got {other:?}"),
            },
            other => panic!("expected a store, got {other:?}"),
        })
        .collect();
    assert_eq!(ids[0], ids[1]);
    assert_eq!(
        ast.pool().get(ids[0]).unwrap(),
        &AstNode::Literal(Value::Int(7))
    );

    // first occurrence renders in full, the second as a bare alias
    let ir = ast.to_ir().unwrap();
    assert_eq!(ir.children[0].children[0].name, "duplicated");
    assert_eq!(ir.children[1].children[0].name, "ref");
    assert_eq!(
        ir.children[0].children[0].get_str("name"),
        ir.children[1].children[0].get_str("name")
    );
}

#[test]
fn each_duplication_point_gets_its_own_slot() {
    let ast = DecompilerMachine::new()
        .decompile(vec![
            int(7),
            Instruction::bare(Opcode::Dup),
            Instruction::bare(Opcode::Dup),
            store(0, DataType::Int),
            store(1, DataType::Int),
            store(2, DataType::Int),
        ])
        .unwrap();

    let ids: Vec<_> = ast
        .statements()
        .iter()
        .map(|statement| match statement {
            AstNode::StoreLocal { value, .. } => match **value {
                AstNode::Duplicate(id) => id,
                ref other => panic!("expected a handle, got {other:?}"),
            },
            other => panic!("expected a store, got {other:?}"),
        })
        .collect();
    // the first two stores consumed the second duplication point, the last
    // one the first; the outer slot nests a handle to the inner one
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[0], ids[2]);
    assert_eq!(ast.pool().len(), 2);
    assert_eq!(
        ast.pool().get(ids[0]).unwrap(),
        &AstNode::Duplicate(ids[2])
    );
    assert_eq!(
        ast.pool().get(ids[2]).unwrap(),
        &AstNode::Literal(Value::Int(7))
    );
}

#[test]
fn constructor_protocol_rebinds_the_duplicated_address() {
    let ast = DecompilerMachine::new()
        .decompile(vec![
            Instruction::new(Opcode::New, vec![Operand::Str("geo.Point".into())]),
            Instruction::bare(Opcode::Dup),
            int(4),
            Instruction::new(
                Opcode::InvokeCtor,
                vec![Operand::Str("geo.Point".into()), Operand::Str("(I)V".into())],
            ),
            store(0, DataType::Object("geo.Point".into())),
        ])
        .unwrap();

    match &ast.statements()[0] {
        AstNode::StoreLocal { value, .. } => match **value {
            AstNode::Duplicate(id) => match ast.pool().get(id).unwrap() {
                AstNode::Construct { callee, args, .. } => {
                    assert_eq!(callee.owner, "geo.Point");
                    assert_eq!(args, &[AstNode::Literal(Value::Int(4))]);
                }
                other => panic!("slot holds {other:?}"),
            },
            ref other => panic!("expected a handle, got {other:?}"),
        },
        other => panic!("expected a store, got {other:?}"),
    }
}

#[test]
fn unrecognized_opcodes_degrade_instead_of_failing() {
    let ast = DecompilerMachine::new()
        .decompile(vec![
            int(6),
            int(2),
            Instruction::bare(Opcode::Div),
            store(0, DataType::Int),
        ])
        .unwrap();
    // DIV rides the stack verbatim and the store consumes it
    match &ast.statements()[0] {
        AstNode::StoreLocal { value, .. } => {
            assert_eq!(**value, AstNode::Raw(Instruction::bare(Opcode::Div)));
        }
        other => panic!("expected a store, got {other:?}"),
    }
}

#[test]
fn branch_and_marker_survive_the_lift() {
    let exit = LabelId::new("exit");
    let ast = DecompilerMachine::new()
        .decompile(vec![
            Instruction::new(
                Opcode::Load,
                vec![Operand::Int(0), Operand::Type(DataType::Int)],
            ),
            int(10),
            Instruction::new(Opcode::IfGe, vec![Operand::Label(exit.clone())]),
            int(1),
            store(1, DataType::Int),
            Instruction::new(Opcode::Label, vec![Operand::Label(exit.clone())]),
            Instruction::bare(Opcode::Return),
        ])
        .unwrap();
    assert!(matches!(ast.statements()[0], AstNode::If { .. }));
    assert_eq!(ast.statements()[2], AstNode::Label(exit));
}

#[test]
fn dangling_branch_target_aborts() {
    let result = DecompilerMachine::new().decompile(vec![
        int(1),
        int(2),
        Instruction::new(Opcode::IfEq, vec![Operand::Label(LabelId::new("gone"))]),
    ]);
    assert!(matches!(
        result,
        Err(DecompileError::MalformedInput { index: 2, .. })
    ));
}

#[test]
fn underflow_names_the_offending_instruction() {
    let result = DecompilerMachine::new().decompile(vec![int(1), Instruction::bare(Opcode::Add)]);
    match result {
        Err(DecompileError::StackUnderflow { index, opcode }) => {
            assert_eq!(index, 1);
            assert_eq!(opcode, Opcode::Add);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn lift_then_lower_reproduces_the_sequence() {
    let source = vec![
        int(2),
        int(3),
        Instruction::bare(Opcode::Mul),
        Instruction::new(Opcode::ReturnValue, vec![Operand::Type(DataType::Int)]),
    ];
    let ast = DecompilerMachine::new().decompile(source.clone()).unwrap();
    assert_eq!(ast.lower().unwrap(), source);
}

#[test]
fn traced_machine_records_every_agent_step() {
    let (output, buffer) = TraceOutput::capture();
    DecompilerMachine::traced(output)
        .decompile(vec![int(1), Instruction::bare(Opcode::Pop)])
        .unwrap();
    let lines = buffer.lock();
    // two instructions, one before and one after line each
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("CONST_I32 #0 before"));
    assert!(lines[3].starts_with("POP #1 after"));
}
