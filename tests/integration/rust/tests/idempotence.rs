//! Round-trip Integration Tests
//!
//! Generated code must parse back to a tree that generates the same text,
//! whether it comes straight from the parser or out of the optimizer.

use codegen::{compress, GeneratorOptions};
use optimizer::{Optimization, Permutation, Pipeline, PipelineOptions};
use parser::parse;
use pretty_assertions::assert_eq;

const CORPUS: &[&str] = &[
    "
    var registry = {};
    function define(name, factory) {
        if (registry[name]) {
            throw new Error('Duplicate ' + name);
        }
        registry[name] = factory();
    }
    ",
    "
    function walk(node, visit) {
        let depth = 0;
        var [first, , rest] = node.children, {kind: type} = node;
        outer: for (var i = 0; i < node.length; i++) {
            switch (node[i].type) {
                case 'skip': continue outer;
                case 'stop': break outer;
                default: depth++;
            }
        }
        return visit(first, rest, type, depth);
    }
    ",
    "
    function squares(list) {
        var doubled = [x * x for each (x in list) if (x > 0)];
        return sum(y for (y in doubled));
    }
    ",
    "
    function counter() {
        var n = 0;
        while (true) {
            yield n++;
        }
    }
    ",
    "
    var point = {
        get x() { return this._x; },
        set x(value) { this._x = value; },
        'has space': [1, , 3, ],
        toString: function() 'point'
    };
    ",
    "
    try {
        risky();
    } catch (e if e instanceof TypeError) {
        recover(e);
    } catch (e) {
        log(e.message);
    } finally {
        cleanup();
    }
    ",
    "
    let (a = 1, b = 2) {
        with (scope) { total = a / b / c; pattern = /[a-z]+\\//gi; }
    }
    x = -(-y) + - -z, w = (function() { return new (factory())(); })();
    ",
];

fn generate(source: &str) -> String {
    let ast = parse(source, "corpus.js").unwrap_or_else(|e| panic!("{}\nsource: {}", e, source));
    compress(&ast, &GeneratorOptions::default())
}

/// Test: generate -> parse -> generate is a fixed point
#[test]
fn test_generated_code_is_stable() {
    for source in CORPUS {
        let first = generate(source);
        let second = generate(&first);
        assert_eq!(first, second, "source: {}", source);
    }
}

/// Test: optimized output parses and generates unchanged
#[test]
fn test_optimized_code_reparses() {
    let configurations = [
        PipelineOptions::new(),
        PipelineOptions::new().with_optimization(Optimization::DECLARATIONS | Optimization::BLOCKS),
        PipelineOptions::new().with_optimization(Optimization::VARIABLES),
    ];
    for options in configurations {
        let pipeline = Pipeline::new(options);
        for source in CORPUS {
            let output = pipeline
                .compile(source, "corpus.js", &Permutation::default())
                .unwrap_or_else(|e| panic!("{}\nsource: {}", e, source));
            assert_eq!(generate(&output.code), output.code, "source: {}", source);
        }
    }
}

/// Test: compiling twice gives the same bytes
#[test]
fn test_compilation_is_deterministic() {
    let pipeline = Pipeline::default();
    for source in CORPUS {
        let first = pipeline.compile(source, "corpus.js", &Permutation::default()).unwrap();
        let second = pipeline.compile(source, "corpus.js", &Permutation::default()).unwrap();
        assert_eq!(first.code, second.code);
    }
}
