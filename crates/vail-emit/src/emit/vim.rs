//! Target editor-script generator.
//!
//! # What This Pass Does
//!
//! Lowers a checked unit into editor script text, one chunk per hoisted
//! definition and top-level statement:
//!
//! - **Name scoping** - top-level bindings become script-local (`s:x`),
//!   function parameters are referenced through the argument namespace
//!   (`a:x`), function locals stay bare
//! - **Function visibility** - a named function lowers to `s:Name` by
//!   default, `Name` with the `global` modifier, `stem#Name` with
//!   `autoload`; bodies get `abort` unless `noabort` is set
//! - **Lambda hoisting** - the target only supports single-expression
//!   anonymous functions, so a block-bodied function literal in
//!   expression position is hoisted into a synthetic `s:VailLambdaN`
//!   definition emitted before the unit body; the expression site becomes
//!   a function reference
//! - **Statement placement** - a bare call statement gets the `call`
//!   keyword; any other bare expression statement is commented out, since
//!   its value cannot legally be discarded in the target

use std::collections::HashMap;
use std::fmt::Write;

use vail_ast::ast::walk::{walk, Flow};
use vail_ast::strings::uneval;
use vail_ast::{
    BinaryOp, ElseBranch, FuncModifier, Node, NodeId, NodeKind, Param, Pattern,
};

use super::{
    binary_child_parens, float_literal, postfix_base_parens, ternary_branch_parens,
    ternary_cond_parens, unary_operand_parens, Chunk, EmitError,
};

const INDENT: &str = "  ";

pub fn render(program: &Node, stem: &str) -> Vec<Chunk> {
    let NodeKind::Program { body } = program.terminal() else {
        return vec![Err(EmitError::Internal(
            "generator expects a top-level unit".into(),
        ))];
    };

    let mut gen = VimGen {
        stem: stem.to_string(),
        scopes: vec![script_scope(body, stem)],
        lambda_names: assign_lambda_names(program),
    };

    let mut chunks = Vec::new();
    for def in gen.hoisted_definitions(program) {
        chunks.push(def);
    }
    for stmt in body {
        chunks.push(gen.statement(stmt, 0));
    }
    chunks
}

/// How an in-scope name is spelled at its reference sites.
#[derive(Debug, Clone)]
enum Symbol {
    /// `s:name`
    Script,
    /// `a:name`
    Arg,
    /// bare function-local
    Local,
    /// fully spelled out (global and autoload functions)
    Exact(String),
}

type Scope = HashMap<String, Symbol>;

/// Top-level names: declared variables become script-local, function
/// names follow their modifier list, imports stay bare.
fn script_scope(body: &[Node], stem: &str) -> Scope {
    let mut scope = Scope::new();
    for stmt in body {
        match stmt.terminal() {
            NodeKind::Decl { pattern, .. } => {
                for binding in pattern.bindings() {
                    scope.insert(binding.name.clone(), Symbol::Script);
                }
            }
            NodeKind::Func {
                mods,
                name: Some(name),
                ..
            } => {
                scope.insert(name.clone(), Symbol::Exact(function_name(mods, name, stem)));
            }
            _ => {}
        }
    }
    scope
}

fn function_name(mods: &[FuncModifier], name: &str, stem: &str) -> String {
    if mods.contains(&FuncModifier::Autoload) {
        format!("{stem}#{name}")
    } else if mods.contains(&FuncModifier::Global) {
        name.to_string()
    } else {
        format!("s:{name}")
    }
}

/// Pre-assign a synthetic name to every block-bodied function literal in
/// expression position, in pre-order.
fn assign_lambda_names(program: &Node) -> HashMap<NodeId, String> {
    let mut names = HashMap::new();
    walk(program, &mut |node| {
        if let NodeKind::Func {
            is_block: true,
            is_expr: true,
            ..
        } = node.terminal()
        {
            names.insert(node.id, format!("s:VailLambda{}", names.len()));
        }
        Flow::Continue
    });
    names
}

struct VimGen {
    stem: String,
    scopes: Vec<Scope>,
    lambda_names: HashMap<NodeId, String>,
}

impl VimGen {
    /// Render every hoisted lambda as a full function definition.
    fn hoisted_definitions(&mut self, program: &Node) -> Vec<Chunk> {
        let mut lambdas: Vec<&Node> = Vec::new();
        walk(program, &mut |node| {
            if let NodeKind::Func {
                is_block: true,
                is_expr: true,
                ..
            } = node.terminal()
            {
                lambdas.push(node);
            }
            Flow::Continue
        });

        lambdas
            .iter()
            .map(|node| {
                let NodeKind::Func {
                    mods, params, body, ..
                } = node.terminal()
                else {
                    unreachable!("hoist walk collects function literals only");
                };
                let name = self.lambda_names[&node.id].clone();
                self.function_definition(&name, mods, params, body, 0)
            })
            .collect()
    }

    fn statement(&mut self, stmt: &Node, depth: usize) -> Chunk {
        let pad = INDENT.repeat(depth);
        match stmt.terminal() {
            NodeKind::Comment { text } => Ok(format!("{pad}\" {text}\n")),
            NodeKind::Import {
                package,
                alias,
                names,
            } => {
                // Module resolution happens outside the generated file;
                // the import survives as a comment for the reader.
                let mut line = format!("{pad}\" import {}", uneval(package));
                if let Some(alias) = alias {
                    write!(line, " as {alias}").ok();
                }
                if !names.is_empty() {
                    let list: Vec<String> = names
                        .iter()
                        .map(|n| match &n.rename {
                            Some(rename) => format!("{} as {rename}", n.name),
                            None => n.name.clone(),
                        })
                        .collect();
                    write!(line, " ({})", list.join(", ")).ok();
                }
                line.push('\n');
                Ok(line)
            }
            NodeKind::Decl { pattern, value, .. } => {
                let value = self.expr(value)?;
                Ok(format!("{pad}let {} = {value}\n", self.pattern(pattern)))
            }
            NodeKind::Assign { target, value } => {
                let target = self.expr(target)?;
                let value = self.expr(value)?;
                Ok(format!("{pad}let {target} = {value}\n"))
            }
            NodeKind::Func {
                mods,
                name: Some(name),
                params,
                body,
                ..
            } => {
                let full = function_name(mods, name, &self.stem);
                self.function_definition(&full, mods, params, body, depth)
            }
            NodeKind::Return { value } => match value {
                Some(value) => Ok(format!("{pad}return {}\n", self.expr(value)?)),
                None => Ok(format!("{pad}return\n")),
            },
            NodeKind::If { .. } => self.if_chain(stmt, depth, "if"),
            NodeKind::While { cond, body } => {
                let cond = self.expr(cond)?;
                let mut out = format!("{pad}while {cond}\n");
                out.push_str(&self.block(body, depth + 1)?);
                out.push_str(&format!("{pad}endwhile\n"));
                Ok(out)
            }
            NodeKind::For {
                pattern,
                iter,
                body,
            } => {
                let iter = self.expr(iter)?;
                self.scopes.push(local_scope_from_pattern(pattern));
                let target = match pattern {
                    Pattern::Ident(b) => b.name.clone(),
                    Pattern::List(bs) => {
                        let names: Vec<&str> = bs.iter().map(|b| b.name.as_str()).collect();
                        format!("[{}]", names.join(", "))
                    }
                };
                let mut out = format!("{pad}for {target} in {iter}\n");
                let block = self.block(body, depth + 1);
                self.scopes.pop();
                out.push_str(&block?);
                out.push_str(&format!("{pad}endfor\n"));
                Ok(out)
            }
            NodeKind::Error { message } => Err(EmitError::ErrorNode(message.clone())),
            NodeKind::Call { .. } => Ok(format!("{pad}call {}\n", self.expr(stmt)?)),
            // A non-call expression statement has no legal discard form.
            _ => Ok(format!("{pad}\" {}\n", self.expr(stmt)?)),
        }
    }

    fn if_chain(&mut self, stmt: &Node, depth: usize, keyword: &str) -> Chunk {
        let pad = INDENT.repeat(depth);
        let NodeKind::If {
            cond,
            body,
            else_branch,
        } = stmt.terminal()
        else {
            return Err(EmitError::Internal("if chain on a non-if node".into()));
        };
        let cond = self.expr(cond)?;
        let mut out = format!("{pad}{keyword} {cond}\n");
        out.push_str(&self.block(body, depth + 1)?);
        match else_branch {
            ElseBranch::None => out.push_str(&format!("{pad}endif\n")),
            ElseBranch::ElseIf(chained) => {
                out.push_str(&self.if_chain(chained, depth, "elseif")?);
            }
            ElseBranch::Else(stmts) => {
                out.push_str(&format!("{pad}else\n"));
                out.push_str(&self.block(stmts, depth + 1)?);
                out.push_str(&format!("{pad}endif\n"));
            }
        }
        Ok(out)
    }

    fn block(&mut self, stmts: &[Node], depth: usize) -> Chunk {
        self.scopes.push(Scope::new());
        let mut out = String::new();
        let mut result = Ok(());
        for stmt in stmts {
            match self.statement(stmt, depth) {
                Ok(text) => out.push_str(&text),
                Err(err) => {
                    result = Err(err);
                    break;
                }
            }
        }
        self.scopes.pop();
        result.map(|()| out)
    }

    fn function_definition(
        &mut self,
        full_name: &str,
        mods: &[FuncModifier],
        params: &[Param],
        body: &[Node],
        depth: usize,
    ) -> Chunk {
        let pad = INDENT.repeat(depth);
        let mut attrs = String::new();
        if !mods.contains(&FuncModifier::NoAbort) {
            attrs.push_str(" abort");
        }
        for modifier in [FuncModifier::Range, FuncModifier::Dict, FuncModifier::Closure] {
            if mods.contains(&modifier) {
                write!(attrs, " {}", modifier.as_str()).ok();
            }
        }

        // Function bodies see script scope plus their own arguments,
        // never enclosing function locals.
        let script = self.scopes[0].clone();
        let saved = std::mem::replace(&mut self.scopes, vec![script, Scope::new()]);
        let parts = self.signature_and_body(params, body, depth);
        self.scopes = saved;
        let (sig, block) = parts?;
        Ok(format!(
            "{pad}function! {full_name}({sig}){attrs}\n{block}{pad}endfunction\n"
        ))
    }

    /// Render a signature and body with the function's frame installed.
    /// A default value may reference parameters declared before it.
    fn signature_and_body(
        &mut self,
        params: &[Param],
        body: &[Node],
        depth: usize,
    ) -> Result<(String, String), EmitError> {
        let mut sig = Vec::new();
        for param in params {
            match &param.default {
                Some(default) => {
                    sig.push(format!("{} = {}", param.name.name, self.expr(default)?));
                }
                None => sig.push(param.name.name.clone()),
            }
            self.scopes
                .last_mut()
                .expect("scope stack never empty")
                .insert(param.name.name.clone(), Symbol::Arg);
        }
        let block = self.block(body, depth + 1)?;
        Ok((sig.join(", "), block))
    }

    fn pattern(&mut self, pattern: &Pattern) -> String {
        match pattern {
            Pattern::Ident(binding) => self.declare(&binding.name),
            Pattern::List(bindings) => {
                let names: Vec<String> = bindings.iter().map(|b| self.declare(&b.name)).collect();
                format!("[{}]", names.join(", "))
            }
        }
    }

    /// Record a declared name in the innermost scope and return its
    /// target spelling.
    fn declare(&mut self, name: &str) -> String {
        let symbol = if self.scopes.len() == 1 {
            Symbol::Script
        } else {
            Symbol::Local
        };
        let scopes = &mut self.scopes;
        scopes
            .last_mut()
            .expect("scope stack never empty")
            .insert(name.to_string(), symbol.clone());
        spell(&symbol, name)
    }

    fn reference(&self, name: &str) -> String {
        for scope in self.scopes.iter().rev() {
            if let Some(symbol) = scope.get(name) {
                return spell(symbol, name);
            }
        }
        // Checked units cannot reach here with locals; imported names
        // and editor builtins pass through unchanged.
        name.to_string()
    }

    fn expr(&mut self, node: &Node) -> Result<String, EmitError> {
        Ok(match node.terminal() {
            NodeKind::Ident { name } => self.reference(name),
            NodeKind::Int { value } => value.to_string(),
            NodeKind::Float { value } => float_literal(*value),
            NodeKind::Bool { value } => if *value { "v:true" } else { "v:false" }.to_string(),
            NodeKind::Null => "v:null".to_string(),
            NodeKind::Str { value } => uneval(value),
            NodeKind::OptionVar { name } => format!("&{name}"),
            NodeKind::Env { name } => format!("${name}"),
            NodeKind::Reg { name } => format!("@{name}"),
            NodeKind::List { items } => {
                let items: Result<Vec<_>, _> = items.iter().map(|i| self.expr(i)).collect();
                format!("[{}]", items?.join(", "))
            }
            NodeKind::Dict { entries } => {
                let mut parts = Vec::new();
                for (key, value) in entries {
                    parts.push(format!("{}: {}", self.expr(key)?, self.expr(value)?));
                }
                format!("{{{}}}", parts.join(", "))
            }
            NodeKind::Binary { op, left, right } => {
                let l = self.wrapped(left, binary_child_parens(op, left, false))?;
                let r = self.wrapped(right, binary_child_parens(op, right, true))?;
                format!("{l} {} {r}", vim_op(op))
            }
            NodeKind::Unary { op, operand } => {
                let inner = self.wrapped(operand, unary_operand_parens(operand))?;
                format!("{}{inner}", op.as_str())
            }
            NodeKind::Ternary { cond, then, else_ } => {
                let c = self.wrapped(cond, ternary_cond_parens(cond))?;
                let t = self.wrapped(then, ternary_branch_parens(then))?;
                let e = self.wrapped(else_, ternary_branch_parens(else_))?;
                format!("{c} ? {t} : {e}")
            }
            NodeKind::Call { callee, args } => {
                let base = self.wrapped(callee, postfix_base_parens(callee))?;
                let args: Result<Vec<_>, _> = args.iter().map(|a| self.expr(a)).collect();
                format!("{base}({})", args?.join(", "))
            }
            NodeKind::Subscript { base, index } => {
                let base = self.wrapped(base, postfix_base_parens(base))?;
                format!("{base}[{}]", self.expr(index)?)
            }
            NodeKind::Slice { base, from, to } => {
                let base = self.wrapped(base, postfix_base_parens(base))?;
                let from = match from {
                    Some(from) => self.expr(from)?,
                    None => String::new(),
                };
                let to = match to {
                    Some(to) => self.expr(to)?,
                    None => String::new(),
                };
                format!("{base}[{from} : {to}]")
            }
            NodeKind::Dot { base, name } => {
                let base = self.wrapped(base, postfix_base_parens(base))?;
                format!("{base}.{name}")
            }
            NodeKind::Func {
                is_block, params, body, ..
            } => {
                if *is_block {
                    // Hoisted earlier; the expression site becomes a
                    // reference to the synthetic definition.
                    let name = self.lambda_names.get(&node.id).ok_or_else(|| {
                        EmitError::Internal("block lambda was not hoisted".into())
                    })?;
                    format!("function('{name}')")
                } else {
                    self.lambda(params, body)?
                }
            }
            NodeKind::Error { message } => {
                return Err(EmitError::ErrorNode(message.clone()));
            }
            other => {
                return Err(EmitError::Internal(format!(
                    "statement node in expression position: {other:?}"
                )));
            }
        })
    }

    /// `{a, b -> expr}` form for single-expression lambdas.
    fn lambda(&mut self, params: &[Param], body: &[Node]) -> Result<String, EmitError> {
        let expr = body.first().ok_or_else(|| {
            EmitError::Internal("single-expression lambda with an empty body".into())
        })?;
        // Lambda parameters are referenced bare inside the arrow body.
        let mut frame = Scope::new();
        for param in params {
            frame.insert(param.name.name.clone(), Symbol::Local);
        }
        let script = self.scopes[0].clone();
        let saved = std::mem::replace(&mut self.scopes, vec![script, frame]);
        let rendered = self.expr(expr);
        self.scopes = saved;

        let names: Vec<&str> = params.iter().map(|p| p.name.name.as_str()).collect();
        Ok(format!("{{{} -> {}}}", names.join(", "), rendered?))
    }

    fn wrapped(&mut self, node: &Node, parens: bool) -> Result<String, EmitError> {
        let inner = self.expr(node)?;
        Ok(if parens { format!("({inner})") } else { inner })
    }
}

fn local_scope_from_pattern(pattern: &Pattern) -> Scope {
    pattern
        .bindings()
        .map(|b| (b.name.clone(), Symbol::Local))
        .collect()
}

fn spell(symbol: &Symbol, name: &str) -> String {
    match symbol {
        Symbol::Script => format!("s:{name}"),
        Symbol::Arg => format!("a:{name}"),
        Symbol::Local => name.to_string(),
        Symbol::Exact(full) => full.clone(),
    }
}

fn vim_op(op: &BinaryOp) -> String {
    match op {
        BinaryOp::Cmp { op, ignore_case } => {
            // The target's bare comparisons follow an editor setting, so
            // emitted comparisons are always explicit about case.
            format!("{}{}", op.base_str(), if *ignore_case { "?" } else { "#" })
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vail_ast::NodeIdGen;

    fn emit(src: &str) -> String {
        let tokens = vail_lexer::lex(src, 0);
        let mut ids = NodeIdGen::new();
        let program = vail_parser::parse(&tokens, 0, &mut ids);
        assert!(vail_parser::collect_errors(&program).is_empty(), "{src:?}");
        render(&program, "mod")
            .into_iter()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .join("")
    }

    #[test]
    fn toplevel_declarations_are_script_local() {
        assert_eq!(emit("let x = 1\nx = x + 1\n"), "let s:x = 1\nlet s:x = s:x + 1\n");
    }

    #[test]
    fn parameters_use_the_argument_namespace() {
        let out = emit("func f(a, b) {\n  return a + b\n}\n");
        assert_eq!(
            out,
            "function! s:f(a, b) abort\n  return a:a + a:b\nendfunction\n"
        );
    }

    #[test]
    fn function_locals_stay_bare() {
        let out = emit("func f() {\n  let n = 1\n  return n\n}\n");
        assert!(out.contains("let n = 1"));
        assert!(out.contains("return n"));
    }

    #[test]
    fn modifier_list_controls_name_and_attributes() {
        let out = emit("func [global] G() {\n  return 1\n}\nfunc [autoload, noabort] A() {\n  return 2\n}\n");
        assert!(out.contains("function! G() abort\n"));
        assert!(out.contains("function! mod#A()\n"));
    }

    #[test]
    fn call_statements_get_the_call_keyword() {
        let out = emit("func f() {\n  return 1\n}\nf()\n");
        assert!(out.contains("call s:f()\n"));
    }

    #[test]
    fn non_call_expression_statements_are_commented_out() {
        let out = emit("let x = 1\nx + 2\n");
        assert!(out.contains("\" s:x + 2\n"));
    }

    #[test]
    fn precedence_is_preserved_without_extra_parens() {
        let out = emit("let r = 1 + 2 * 3\n");
        assert_eq!(out, "let s:r = 1 + 2 * 3\n");
        let out = emit("let r = (1 + 2) * 3\n");
        assert_eq!(out, "let s:r = (1 + 2) * 3\n");
    }

    #[test]
    fn comparisons_are_explicit_about_case() {
        let out = emit("let r = \"a\" == \"b\"\nlet s = \"a\" ==? \"b\"\n");
        assert!(out.contains(r#""a" ==# "b""#));
        assert!(out.contains(r#""a" ==? "b""#));
    }

    #[test]
    fn single_expression_lambdas_use_arrow_form() {
        let out = emit("let f = func(x) x + 1\n");
        assert_eq!(out, "let s:f = {x -> x + 1}\n");
    }

    #[test]
    fn block_lambdas_are_hoisted_before_the_body() {
        let out = emit("let f = func(x) {\n  return x + 1\n}\n");
        let def = out.find("function! s:VailLambda0(x) abort").unwrap();
        let site = out.find("let s:f = function('s:VailLambda0')").unwrap();
        assert!(def < site);
        assert!(out.contains("return a:x + 1"));
    }

    #[test]
    fn if_chains_lower_to_elseif() {
        let out = emit("let x = 1\nif x {\n  x = 2\n} else if x {\n  x = 3\n} else {\n  x = 4\n}\n");
        assert!(out.contains("if s:x\n"));
        assert!(out.contains("elseif s:x\n"));
        assert!(out.contains("else\n"));
        assert!(out.ends_with("endif\n"));
    }

    #[test]
    fn loops_close_with_matching_keywords() {
        let out = emit("let xs = [1, 2]\nfor [i, v] in xs {\n  call(i + v)\n}\nwhile xs {\n  xs = xs[1 :]\n}\n");
        assert!(out.contains("for [i, v] in s:xs\n"));
        assert!(out.contains("endfor\n"));
        assert!(out.contains("while s:xs\n"));
        assert!(out.contains("endwhile\n"));
    }

    #[test]
    fn literals_use_editor_spellings() {
        let out = emit("let a = true\nlet b = false\nlet c = null\nlet d = 1.5\n");
        assert!(out.contains("v:true"));
        assert!(out.contains("v:false"));
        assert!(out.contains("v:null"));
        assert!(out.contains("1.5"));
    }

    #[test]
    fn exponent_floats_keep_a_dotted_mantissa() {
        // The target language rejects a bare `1e-8`.
        let out = emit("let tiny = 1.0e-8\n");
        assert!(out.contains("let s:tiny = 1.0e-8"), "{out}");
    }

    #[test]
    fn comments_and_imports_pass_through_as_comments() {
        let out = emit("# setup\nimport \"strings\" as str\n");
        assert_eq!(out, "\" setup\n\" import \"strings\" as str\n");
    }

    #[test]
    fn error_nodes_become_error_chunks() {
        let tokens = vail_lexer::lex("let x = (\n", 0);
        let mut ids = NodeIdGen::new();
        let program = vail_parser::parse(&tokens, 0, &mut ids);
        let chunks = render(&program, "mod");
        assert!(chunks.iter().any(|c| c.is_err()));
    }
}
