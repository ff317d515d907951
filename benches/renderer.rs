use ast_explorer::ast::{Ast, AstNode, ChildShape, NodeRef};
use ast_explorer::config::{LayoutConfig, RenderConfig, TreeConfig};
use ast_explorer::layout::{layout_graph, layout_tree};
use ast_explorer::render::render_bubble_svg;
use ast_explorer::theme::Theme;
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;

/// Balanced tree with `fanout` children per inner node.
fn balanced_ast(depth: usize, fanout: usize) -> Ast {
    let mut ast = Ast::new();
    let root = ast.push(AstNode::new("Program").with_id(0));
    ast.set_root(Some(root));
    let mut frontier = vec![root];
    let mut next_id = 1i64;
    for level in 0..depth {
        let mut next = Vec::new();
        for parent in frontier {
            let mut kids: Vec<NodeRef> = Vec::with_capacity(fanout);
            for _ in 0..fanout {
                let kind = if level + 1 == depth { "Literal" } else { "Expr" };
                kids.push(ast.push(AstNode::new(kind).with_id(next_id)));
                next_id += 1;
            }
            ast.set_shape(parent, ChildShape::Children(kids.clone()));
            next.extend(kids);
        }
        frontier = next;
    }
    ast
}

/// Left-leaning chain of binary expressions, as `a + b + c + ...` parses.
fn binary_chain(len: usize) -> Ast {
    let mut ast = Ast::new();
    let mut current = ast.push(AstNode::new("Identifier"));
    for _ in 0..len {
        let right = ast.push(AstNode::new("Identifier"));
        let parent = ast.push(AstNode::new("BinaryExpression"));
        ast.set_shape(parent, ChildShape::Binary([current, right]));
        current = parent;
    }
    ast.set_root(Some(current));
    ast
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("bubble_layout");
    let config = LayoutConfig {
        max_depth: 10_000,
        ..LayoutConfig::default()
    };
    for (name, ast) in [
        ("balanced_4x4", balanced_ast(4, 4)),
        ("balanced_6x3", balanced_ast(6, 3)),
        ("binary_chain_500", binary_chain(500)),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), &ast, |b, ast| {
            b.iter(|| layout_graph(black_box(ast), &config).unwrap())
        });
    }
    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let ast = balanced_ast(5, 3);
    let layout = layout_graph(&ast, &LayoutConfig::default()).unwrap();
    let theme = Theme::explorer();
    let render = RenderConfig::default();
    c.bench_function("render_bubble_svg", |b| {
        b.iter(|| render_bubble_svg(black_box(&layout), None, &theme, &render))
    });
    c.bench_function("tree_layout", |b| {
        b.iter(|| {
            layout_tree(
                black_box(&ast),
                &TreeConfig::default(),
                &LayoutConfig::default(),
                &theme.font_family,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_layout, bench_render);
criterion_main!(benches);
