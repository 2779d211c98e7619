//! Compilation pipeline
//!
//! Runs the passes over one unit in a fixed order and generates the output:
//!
//! 1. permutation substitution
//! 2. dead code elimination
//! 3. unused declaration removal
//! 4. declaration combining (`Optimization::DECLARATIONS`)
//! 5. block reduction (`Optimization::BLOCKS`)
//! 6. local variable renaming (`Optimization::VARIABLES`)
//! 7. private member obfuscation (`Optimization::PRIVATES`)
//! 8. code generation
//!
//! A step failing with an optimization error is skipped: the tree is put
//! back the way it was before the step and the error is reported in
//! [`CompileOutput::skipped`]. Lexical and syntax errors end the run.

use codegen::Compressor;
use core_types::{CompileError, CompileResult};
use parser::{parse, scan_tree, Ast};
use tracing::{debug, warn};

use crate::options::{Optimization, PipelineOptions};
use crate::permutation::Permutation;
use crate::{block_reduce, combine_declarations, crypt_privates, dead_code, local_variables, substitution, unused};

/// Upper bound of block reduction rounds
const MAX_BLOCK_ROUNDS: usize = 10;

/// Result of compiling one unit
#[derive(Debug, Clone, PartialEq)]
pub struct CompileOutput {
    /// Generated code
    pub code: String,
    /// Optimization errors of the steps that were skipped
    pub skipped: Vec<CompileError>,
}

/// Pass pipeline configured once and run per unit
///
/// # Examples
///
/// ```
/// use optimizer::{Optimization, Permutation, Pipeline, PipelineOptions};
///
/// let pipeline = Pipeline::new(PipelineOptions::new().with_optimization(Optimization::DECLARATIONS));
/// let output = pipeline
///     .compile("if (true) { var a = 4; var b = 5; use(a); }", "demo.js", &Permutation::default())
///     .unwrap();
/// assert_eq!(output.code, "var a=4;use(a);");
/// assert!(output.skipped.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline
    pub fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Configuration of this pipeline
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Parse and compile a source text
    pub fn compile(&self, source: &str, file: &str, permutation: &Permutation) -> CompileResult<CompileOutput> {
        let mut ast = parse(source, file)?;
        self.run(&mut ast, permutation)
    }

    /// Optimize a parsed tree in place and generate its code
    pub fn run(&self, ast: &mut Ast, permutation: &Permutation) -> CompileResult<CompileOutput> {
        let optimization = self.options.optimization;
        let mut skipped = Vec::new();

        step(ast, "permutation substitution", &mut skipped, |ast| {
            substitution::substitute(ast, permutation)
        })?;
        step(ast, "dead code", &mut skipped, |ast| {
            let changed = dead_code::optimize(ast);
            scan_tree(ast);
            Ok(changed)
        })?;
        step(ast, "unused declarations", &mut skipped, unused::optimize)?;

        if optimization.contains(Optimization::DECLARATIONS) {
            step(ast, "declarations", &mut skipped, |ast| Ok(combine_declarations::optimize(ast)))?;
        }
        if optimization.contains(Optimization::BLOCKS) {
            step(ast, "blocks", &mut skipped, |ast| {
                let mut changed = false;
                for _ in 0..MAX_BLOCK_ROUNDS {
                    if !block_reduce::optimize(ast) {
                        break;
                    }
                    changed = true;
                }
                Ok(changed)
            })?;
        }
        if optimization.contains(Optimization::VARIABLES) {
            step(ast, "variables", &mut skipped, local_variables::optimize)?;
        }
        if optimization.contains(Optimization::PRIVATES) {
            let context_id = self.options.context_id.as_str();
            step(ast, "privates", &mut skipped, |ast| crypt_privates::optimize(ast, context_id))?;
        }

        let root = ast.root();
        let code = Compressor::new(ast, self.options.generator_options()).compress(root);
        debug!(file = %ast.file, bytes = code.len(), skipped = skipped.len(), "compiled unit");
        Ok(CompileOutput { code, skipped })
    }
}

/// Run one step, restoring the tree when it fails with an optimization error
fn step<F>(ast: &mut Ast, name: &str, skipped: &mut Vec<CompileError>, pass: F) -> CompileResult<bool>
where
    F: FnOnce(&mut Ast) -> CompileResult<bool>,
{
    let backup = ast.clone();
    match pass(ast) {
        Ok(changed) => Ok(changed),
        Err(error) if !error.is_fatal() => {
            warn!(step = name, %error, "skipping optimization step");
            *ast = backup;
            skipped.push(error);
            Ok(false)
        }
        Err(error) => Err(error),
    }
}
