use super::parse_module;
use crate::ir_frontend::ast::ast_nodes::{InstKind, ModuleDef, OperandKind, RhsExpr};
use crate::ir_frontend::compiler_errors::ErrorType;
use crate::ir_frontend::ir::ir_nodes::{BinaryOp, ICmpPredicate};
use crate::ir_frontend::tokenizer::tokenizer::tokenize;
use std::path::Path;

fn parse(source: &str) -> ModuleDef {
    let path = Path::new("cases/sample.ll");
    let tokens = tokenize(source, path).expect("source should tokenize");
    parse_module(tokens, path).expect("source should parse")
}

fn parse_error(source: &str) -> String {
    let path = Path::new("cases/sample.ll");
    let tokens = tokenize(source, path).expect("source should tokenize");
    let error = parse_module(tokens, path).expect_err("source should not parse");
    assert_eq!(error.error_type, ErrorType::Syntax);
    error.msg
}

#[test]
fn module_takes_the_file_stem_as_name() {
    let module = parse("");
    assert_eq!(module.name, "sample");
    assert!(module.functions.is_empty());
}

#[test]
fn parses_clang_style_function() {
    let source = "
define dso_local i32 @main(i32 noundef %a) #0 {
entry:
  %retval = alloca i32, align 4
  store i32 0, i32* %retval, align 4
  %0 = load i32, i32* %retval, align 4
  %add = add nsw i32 %0, %a
  ret i32 %add
}
";

    let module = parse(source);
    assert_eq!(module.functions.len(), 1);

    let function = &module.functions[0];
    assert_eq!(function.signature.name, "main");
    assert_eq!(function.signature.return_type.name, "i32");
    assert_eq!(function.signature.params.len(), 1);
    assert_eq!(function.signature.params[0].name.as_deref(), Some("a"));

    assert_eq!(function.blocks.len(), 1);
    let block = &function.blocks[0];
    assert_eq!(block.label.as_deref(), Some("entry"));
    assert_eq!(block.instructions.len(), 5);

    let InstKind::Store { src, dst } = &block.instructions[1].kind else {
        panic!("expected a store, got {:?}", block.instructions[1].kind);
    };
    assert_eq!(src.value.kind, OperandKind::Digits(String::from("0")));
    assert_eq!(dst.data_type.pointer_depth, 1);
    assert_eq!(dst.value.kind, OperandKind::Local(String::from("retval")));

    let InstKind::Assign { dst, rhs } = &block.instructions[3].kind else {
        panic!("expected an assignment");
    };
    assert_eq!(dst, "add");
    assert!(matches!(rhs, RhsExpr::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn first_block_may_be_unlabeled() {
    let source = "
define i32 @f() {
  br label %next
next:
  ret i32 1
}
";

    let module = parse(source);
    let blocks = &module.functions[0].blocks;
    assert_eq!(blocks[0].label, None);
    assert_eq!(blocks[1].label.as_deref(), Some("next"));
}

#[test]
fn numeric_labels_are_accepted() {
    let source = "
define i32 @f(i32 %0) {
  br label %2
2:
  ret i32 %0
}
";

    let module = parse(source);
    assert_eq!(module.functions[0].blocks[1].label.as_deref(), Some("2"));
}

#[test]
fn parses_branches_compares_and_calls() {
    let source = "
declare i32 @g(i32, i32) #1

define i32 @f(i32 %a) {
entry:
  %c = icmp slt i32 %a, 10
  br i1 %c, label %then, label %done
then:
  %r = call i32 @g(i32 %a, i32 -1) #2
  br label %done
done:
  ret i32 0
}
";

    let module = parse(source);
    assert_eq!(module.declarations.len(), 1);
    assert_eq!(module.declarations[0].name, "g");
    assert_eq!(module.declarations[0].params[0].name, None);

    let blocks = &module.functions[0].blocks;
    let InstKind::Assign { rhs, .. } = &blocks[0].instructions[0].kind else {
        panic!("expected an icmp");
    };
    assert!(matches!(
        rhs,
        RhsExpr::ICmp {
            predicate: ICmpPredicate::Slt,
            ..
        }
    ));

    assert!(matches!(
        &blocks[0].instructions[1].kind,
        InstKind::Br {
            cond: Some(_),
            true_label,
            false_label: Some(false_label),
        } if true_label == "then" && false_label == "done"
    ));

    let InstKind::Assign { rhs, .. } = &blocks[1].instructions[0].kind else {
        panic!("expected a call");
    };
    let RhsExpr::Call { callee, args, .. } = rhs else {
        panic!("expected a call");
    };
    assert_eq!(callee, "g");
    assert_eq!(args.len(), 2);
    assert_eq!(args[1].value.kind, OperandKind::Digits(String::from("-1")));
}

#[test]
fn records_instruction_lines() {
    let source = "define i32 @f() {\nentry:\n  ret i32 0\n}\n";
    let module = parse(source);
    let ret = &module.functions[0].blocks[0].instructions[0];
    assert_eq!(ret.location.display_line(), 3);
}

#[test]
fn rejects_ret_void() {
    let message = parse_error("define void @f() {\nentry:\n  ret void\n}\n");
    assert!(message.contains("ret void"));
}

#[test]
fn rejects_unsupported_operations() {
    let message = parse_error(
        "define i32 @f(i1 %c) {\nentry:\n  %p = select i1 %c, i32 1, i32 2\n  ret i32 %p\n}\n",
    );
    assert!(message.contains("Unsupported operation 'select'"));
}

#[test]
fn rejects_missing_closing_brace() {
    let message = parse_error("define i32 @f() {\nentry:\n  ret i32 0\n");
    assert!(message.contains("missing its closing"));
}

#[test]
fn rejects_junk_at_top_level() {
    let message = parse_error("global i32 0\n");
    assert!(message.contains("Expected 'define' or 'declare'"));
}
