use super::{bfs_levels, escape_latex, node_name, render_function, render_module, write_plot};
use crate::ir_frontend::ast::parse_module::parse_module;
use crate::ir_frontend::ir::ir_builder::build_module;
use crate::ir_frontend::ir::ir_nodes::{BlockId, Module};
use crate::ir_frontend::tokenizer::tokenizer::tokenize;
use std::fs;
use std::path::Path;

fn build(source: &str) -> Module {
    let path = Path::new("plot.ll");
    let tokens = tokenize(source, path).expect("source should tokenize");
    let ast = parse_module(tokens, path).expect("source should parse");
    build_module(&ast, path).expect("module should build")
}

const LOOP: &str = "
define i32 @sum(i32 %n) {
entry:
  %acc = alloca i32
  store i32 0, i32* %acc
  br label %for.cond
for.cond:
  %c = icmp sgt i32 %n, 0
  br i1 %c, label %for.body, label %for.end
for.body:
  br label %for.cond
for.end:
  %v = load i32, i32* %acc
  ret i32 %v
dead:
  ret i32 0
}
";

#[test]
fn levels_follow_bfs_depth() {
    let module = build(LOOP);
    let levels = bfs_levels(&module.functions[0]);

    assert_eq!(
        levels,
        vec![
            vec![BlockId(0)],
            vec![BlockId(1)],
            vec![BlockId(2), BlockId(3)],
        ]
    );
}

#[test]
fn unreachable_blocks_are_left_out() {
    let module = build(LOOP);
    let rendered = render_function(&module.functions[0]);

    assert!(rendered.contains("(for_body)"));
    assert!(!rendered.contains("(dead)"));
}

#[test]
fn renders_nodes_and_edges() {
    let module = build(LOOP);
    let rendered = render_function(&module.functions[0]);

    assert!(rendered.starts_with("\\section{\\texttt{i32\\ @sum(i32\\ \\%n)}}"));
    assert!(rendered.contains("\\node[block](entry){entry:"));
    assert!(rendered.contains("below of=entry"));
    assert!(rendered.contains("right of=for_body"));

    // Forward edge downwards, back edge to the row above
    assert!(rendered.contains("\\draw[->]({entry}.south)--({for_cond}.north);"));
    assert!(rendered.contains("\\draw[->]({for_body}.west)to[out=180, in=180]({for_cond}.west);"));
    assert!(rendered.trim_end().ends_with("\\end{tikzpicture}"));
}

#[test]
fn module_document_wraps_every_function() {
    let module = build(&format!("{LOOP}\ndefine i32 @id(i32 %a) {{\nentry:\n  ret i32 %a\n}}\n"));
    let document = render_module(&module);

    assert!(document.starts_with("\\documentclass[a4paper]{article}"));
    assert!(document.ends_with("\\end{document}"));
    assert_eq!(document.matches("\\begin{tikzpicture}").count(), 2);
}

#[test]
fn escapes_whitespace_and_percent() {
    assert_eq!(escape_latex("%x = add"), "\\%x\\ =\\ add");
    assert_eq!(node_name("if.then.2"), "if_then_2");
}

#[test]
fn writes_the_tex_file() {
    let module = build(LOOP);
    let dir = tempfile::tempdir().expect("temp dir");
    let out_dir = dir.path().join("figures");

    let file = write_plot(&module, &out_dir).expect("plot should be written");
    assert_eq!(file, out_dir.join("plot.tex"));

    let written = fs::read_to_string(&file).expect("plot file exists");
    assert_eq!(written, render_module(&module));
}
