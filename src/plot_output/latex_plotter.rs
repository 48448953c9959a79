//! LaTeX/TikZ export of control-flow graphs.
//!
//! Each function becomes its own section. Blocks are laid out in rows by BFS depth from the
//! entry block, so blocks the entry can't reach are left out of the picture.

use crate::ir_frontend::compiler_errors::CompilerError;
use crate::ir_frontend::ir::ir_nodes::{BlockId, Function, Module};
use crate::return_file_error;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const DOCUMENT_HEADER: &str = "\\documentclass[a4paper]{article}
\\usepackage{geometry}
\\usepackage{tikz}
\\usetikzlibrary{arrows, shapes}
\\tikzstyle{block}=[rectangle, align=left, draw]
\\geometry{left=2.5cm, right=2.5cm, top=2.5cm, bottom=2.5cm}
\\begin{document}
\\tt
";
const DOCUMENT_FOOTER: &str = "\\end{document}";

// Rough point sizes per text line and per character used for node spacing
const LINE_SPACING: usize = 6;
const CHAR_SPACING: usize = 3;
const ROW_GAP: usize = 10;
const COLUMN_GAP: usize = 20;

/// Writes `<dir>/<module name>.tex`, creating `dir` when needed
pub fn write_plot(module: &Module, dir: &Path) -> Result<PathBuf, CompilerError> {
    if let Err(e) = fs::create_dir_all(dir) {
        return_file_error!(dir, format!("Could not create plot directory: {e}"));
    }

    let file_path = dir.join(format!("{}.tex", module.name));
    if let Err(e) = fs::write(&file_path, render_module(module)) {
        return_file_error!(&file_path, format!("Could not write plot: {e}"));
    }

    Ok(file_path)
}

pub fn render_module(module: &Module) -> String {
    let mut document = String::from(DOCUMENT_HEADER);
    for function in &module.functions {
        document.push_str(&render_function(function));
    }
    document.push_str(DOCUMENT_FOOTER);
    document
}

struct FigureNode {
    level: usize,
    index: usize,
    name: String,
    lines: Vec<String>,
}

impl FigureNode {
    fn width(&self) -> usize {
        self.lines.iter().map(String::len).max().unwrap_or(0)
    }

    fn height(&self) -> usize {
        self.lines.len() + 1
    }
}

pub fn render_function(function: &Function) -> String {
    let levels = bfs_levels(function);

    let mut nodes: FxHashMap<BlockId, FigureNode> = FxHashMap::default();
    for (level, row) in levels.iter().enumerate() {
        for (index, &block_id) in row.iter().enumerate() {
            let Some(block) = function.block(block_id) else {
                continue;
            };

            let mut lines = vec![format!("{}:", block.name)];
            lines.extend(block.instructions.iter().map(ToString::to_string));

            nodes.insert(
                block_id,
                FigureNode {
                    level,
                    index,
                    name: node_name(&block.name),
                    lines,
                },
            );
        }
    }

    let row_height = |row: &[BlockId]| {
        row.iter()
            .filter_map(|id| nodes.get(id))
            .map(FigureNode::height)
            .max()
            .unwrap_or(0)
    };

    let mut body = String::new();

    // Nodes, row by row
    for (level, row) in levels.iter().enumerate() {
        for (index, block_id) in row.iter().enumerate() {
            let Some(node) = nodes.get(block_id) else {
                continue;
            };
            let text = node
                .lines
                .iter()
                .map(|line| escape_latex(line))
                .collect::<Vec<_>>()
                .join("\\\\");

            if index > 0 {
                let Some(left) = nodes.get(&row[index - 1]) else {
                    continue;
                };
                let distance = CHAR_SPACING * (node.width() + left.width()) + COLUMN_GAP;
                let _ = writeln!(
                    body,
                    "\\node[block, right of={}, node distance={distance}pt]({}){{{text}}};",
                    left.name, node.name
                );
            } else if level > 0 {
                let above_row = &levels[level - 1];
                let Some(above) = above_row.first().and_then(|id| nodes.get(id)) else {
                    continue;
                };
                let distance = LINE_SPACING * (row_height(row) + row_height(above_row)) + ROW_GAP;
                let _ = writeln!(
                    body,
                    "\\node[block, below of={}, node distance={distance}pt]({}){{{text}}};",
                    above.name, node.name
                );
            } else {
                let _ = writeln!(body, "\\node[block]({}){{{text}}};", node.name);
            }
        }
    }

    // Arrows, in block order so output is stable
    for block in &function.blocks {
        let Some(node) = nodes.get(&block.id) else {
            continue;
        };

        for succ in &block.succs {
            let Some(target) = nodes.get(succ) else {
                continue;
            };
            let _ = writeln!(body, "{}", arrow(node, target, levels[node.level].len()));
        }
    }

    format!(
        "\\section{{\\texttt{{{}}}}}\n\\begin{{tikzpicture}}\n{body}\\end{{tikzpicture}}\n",
        escape_latex(&function.signature())
    )
}

fn arrow(from: &FigureNode, to: &FigureNode, row_len: usize) -> String {
    let (source, target) = (&from.name, &to.name);

    if to.level > from.level {
        return format!("\\draw[->]({{{source}}}.south)--({{{target}}}.north);");
    }

    // Same row or a back edge to a row above
    if to.index > from.index {
        return format!("\\draw[->]({{{source}}}.east)--({{{target}}}.west);");
    }
    if to.index < from.index || to.level == from.level {
        return format!("\\draw[->]({{{source}}}.west)--({{{target}}}.east);");
    }

    // Straight above: loop around whichever side is closer
    if from.index * 2 < row_len {
        format!("\\draw[->]({{{source}}}.west)to[out=180, in=180]({{{target}}}.west);")
    } else {
        format!("\\draw[->]({{{source}}}.east)to[out=0, in=0]({{{target}}}.east);")
    }
}

/// Blocks grouped by BFS depth from the entry. Each block appears once, at its first depth.
pub fn bfs_levels(function: &Function) -> Vec<Vec<BlockId>> {
    let mut levels: Vec<Vec<BlockId>> = Vec::new();
    let Some(entry) = function.entry() else {
        return levels;
    };

    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::from([(entry.id, 0usize)]);
    seen.insert(entry.id);

    while let Some((block_id, level)) = queue.pop_front() {
        if level >= levels.len() {
            levels.push(Vec::new());
        }
        levels[level].push(block_id);

        let Some(block) = function.block(block_id) else {
            continue;
        };
        for &succ in &block.succs {
            if seen.insert(succ) {
                queue.push_back((succ, level + 1));
            }
        }
    }

    levels
}

fn node_name(block_name: &str) -> String {
    block_name.replace('.', "_")
}

/// Escapes whitespace and `%` so TikZ keeps them literally
fn escape_latex(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '%' {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
#[path = "tests/latex_plotter_tests.rs"]
mod latex_plotter_tests;
