//! Canonical source-form printer.
//!
//! Prints a parsed unit back as source text with canonical spacing, one
//! statement per line, two-space indentation, and double-quoted strings.
//! The output reparses to the same tree, so printing is idempotent; the
//! format checker relies on that.

use std::fmt::Write;

use vail_ast::strings::uneval;
use vail_ast::{ElseBranch, Node, NodeKind, Param, Pattern};

use super::{
    binary_child_parens, float_literal, postfix_base_parens, ternary_branch_parens,
    ternary_cond_parens, unary_operand_parens, Chunk, EmitError,
};

const INDENT: &str = "  ";

pub fn render(program: &Node) -> Vec<Chunk> {
    let NodeKind::Program { body } = program.terminal() else {
        return vec![Err(EmitError::Internal(
            "generator expects a top-level unit".into(),
        ))];
    };
    body.iter().map(|stmt| statement(stmt, 0)).collect()
}

fn statement(stmt: &Node, depth: usize) -> Chunk {
    let pad = INDENT.repeat(depth);
    match stmt.terminal() {
        NodeKind::Comment { text } => Ok(format!("{pad}# {text}\n")),
        NodeKind::Import {
            package,
            alias,
            names,
        } => {
            if names.is_empty() {
                let mut line = format!("{pad}import {}", uneval(package));
                if let Some(alias) = alias {
                    write!(line, " as {alias}").ok();
                }
                line.push('\n');
                Ok(line)
            } else {
                let list: Vec<String> = names
                    .iter()
                    .map(|n| match &n.rename {
                        Some(rename) => format!("{} as {rename}", n.name),
                        None => n.name.clone(),
                    })
                    .collect();
                Ok(format!(
                    "{pad}from {} import {}\n",
                    uneval(package),
                    list.join(", ")
                ))
            }
        }
        NodeKind::Decl {
            is_const,
            pattern,
            value,
        } => Ok(format!(
            "{pad}{} {} = {}\n",
            if *is_const { "const" } else { "let" },
            pattern_text(pattern),
            expr(value)?
        )),
        NodeKind::Assign { target, value } => {
            Ok(format!("{pad}{} = {}\n", expr(target)?, expr(value)?))
        }
        NodeKind::Func {
            name: Some(_), ..
        } => {
            let mut out = format!("{pad}{}", func_header(stmt)?);
            out.push_str(&body_suffix(stmt, depth)?);
            Ok(out)
        }
        NodeKind::Return { value } => match value {
            Some(value) => Ok(format!("{pad}return {}\n", expr(value)?)),
            None => Ok(format!("{pad}return\n")),
        },
        NodeKind::If { .. } => {
            let mut out = String::new();
            if_chain(stmt, depth, &format!("{pad}if"), &mut out)?;
            Ok(out)
        }
        NodeKind::While { cond, body } => {
            let mut out = format!("{pad}while {} {{\n", expr(cond)?);
            out.push_str(&block(body, depth + 1)?);
            out.push_str(&format!("{pad}}}\n"));
            Ok(out)
        }
        NodeKind::For {
            pattern,
            iter,
            body,
        } => {
            let mut out = format!("{pad}for {} in {} {{\n", pattern_text(pattern), expr(iter)?);
            out.push_str(&block(body, depth + 1)?);
            out.push_str(&format!("{pad}}}\n"));
            Ok(out)
        }
        NodeKind::Error { message } => Err(EmitError::ErrorNode(message.clone())),
        _ => Ok(format!("{pad}{}\n", expr(stmt)?)),
    }
}

fn if_chain(stmt: &Node, depth: usize, keyword: &str, out: &mut String) -> Result<(), EmitError> {
    let pad = INDENT.repeat(depth);
    let NodeKind::If {
        cond,
        body,
        else_branch,
    } = stmt.terminal()
    else {
        return Err(EmitError::Internal("if chain on a non-if node".into()));
    };
    write!(out, "{keyword} {} {{\n", expr(cond)?).ok();
    out.push_str(&block(body, depth + 1)?);
    match else_branch {
        ElseBranch::None => out.push_str(&format!("{pad}}}\n")),
        ElseBranch::ElseIf(chained) => {
            if_chain(chained, depth, &format!("{pad}}} else if"), out)?;
        }
        ElseBranch::Else(stmts) => {
            out.push_str(&format!("{pad}}} else {{\n"));
            out.push_str(&block(stmts, depth + 1)?);
            out.push_str(&format!("{pad}}}\n"));
        }
    }
    Ok(())
}

fn block(stmts: &[Node], depth: usize) -> Result<String, EmitError> {
    let mut out = String::new();
    for stmt in stmts {
        out.push_str(&statement(stmt, depth)?);
    }
    Ok(out)
}

/// `func [mods] name(params): Ret` without body.
fn func_header(node: &Node) -> Result<String, EmitError> {
    let NodeKind::Func {
        mods,
        name,
        params,
        ret,
        ..
    } = node.terminal()
    else {
        return Err(EmitError::Internal("func header on a non-func node".into()));
    };
    let mut out = String::from("func");
    if !mods.is_empty() {
        let words: Vec<&str> = mods.iter().map(|m| m.as_str()).collect();
        write!(out, " [{}]", words.join(", ")).ok();
    }
    if let Some(name) = name {
        write!(out, " {name}").ok();
    }
    let params: Result<Vec<_>, _> = params.iter().map(param_text).collect();
    write!(out, "({})", params?.join(", ")).ok();
    if let Some(ret) = ret {
        write!(out, ": {ret}").ok();
    }
    Ok(out)
}

/// Function body following a header: a block, or a single lambda expr.
fn body_suffix(node: &Node, depth: usize) -> Result<String, EmitError> {
    let NodeKind::Func { is_block, body, .. } = node.terminal() else {
        return Err(EmitError::Internal("func body on a non-func node".into()));
    };
    if *is_block {
        let pad = INDENT.repeat(depth);
        let mut out = String::from(" {\n");
        out.push_str(&block(body, depth + 1)?);
        out.push_str(&format!("{pad}}}\n"));
        Ok(out)
    } else {
        let body = body.first().ok_or_else(|| {
            EmitError::Internal("single-expression lambda with an empty body".into())
        })?;
        Ok(format!(" {}\n", expr(body)?))
    }
}

fn param_text(param: &Param) -> Result<String, EmitError> {
    match (&param.ty, &param.default) {
        (Some(ty), _) => Ok(format!("{}: {ty}", param.name.name)),
        (None, Some(default)) => Ok(format!("{} = {}", param.name.name, expr(default)?)),
        (None, None) => Ok(param.name.name.clone()),
    }
}

fn pattern_text(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Ident(b) => b.name.clone(),
        Pattern::List(bs) => {
            let names: Vec<&str> = bs.iter().map(|b| b.name.as_str()).collect();
            format!("[{}]", names.join(", "))
        }
    }
}

fn expr(node: &Node) -> Result<String, EmitError> {
    Ok(match node.terminal() {
        NodeKind::Ident { name } => name.clone(),
        NodeKind::Int { value } => value.to_string(),
        NodeKind::Float { value } => float_literal(*value),
        NodeKind::Bool { value } => value.to_string(),
        NodeKind::Null => "null".to_string(),
        NodeKind::Str { value } => uneval(value),
        NodeKind::OptionVar { name } => format!("&{name}"),
        NodeKind::Env { name } => format!("${name}"),
        NodeKind::Reg { name } => format!("@{name}"),
        NodeKind::List { items } => {
            let items: Result<Vec<_>, _> = items.iter().map(expr).collect();
            format!("[{}]", items?.join(", "))
        }
        NodeKind::Dict { entries } => {
            let mut parts = Vec::new();
            for (key, value) in entries {
                parts.push(format!("{}: {}", dict_key(key)?, expr(value)?));
            }
            format!("{{{}}}", parts.join(", "))
        }
        NodeKind::Binary { op, left, right } => {
            let l = wrapped(left, binary_child_parens(op, left, false))?;
            let r = wrapped(right, binary_child_parens(op, right, true))?;
            format!("{l} {op} {r}")
        }
        NodeKind::Unary { op, operand } => {
            format!("{}{}", op.as_str(), wrapped(operand, unary_operand_parens(operand))?)
        }
        NodeKind::Ternary { cond, then, else_ } => format!(
            "{} ? {} : {}",
            wrapped(cond, ternary_cond_parens(cond))?,
            wrapped(then, ternary_branch_parens(then))?,
            wrapped(else_, ternary_branch_parens(else_))?
        ),
        NodeKind::Call { callee, args } => {
            let base = wrapped(callee, postfix_base_parens(callee))?;
            let args: Result<Vec<_>, _> = args.iter().map(expr).collect();
            format!("{base}({})", args?.join(", "))
        }
        NodeKind::Subscript { base, index } => {
            format!("{}[{}]", wrapped(base, postfix_base_parens(base))?, expr(index)?)
        }
        NodeKind::Slice { base, from, to } => {
            let base = wrapped(base, postfix_base_parens(base))?;
            let from = match from {
                Some(from) => expr(from)?,
                None => String::new(),
            };
            let to = match to {
                Some(to) => expr(to)?,
                None => String::new(),
            };
            format!("{base}[{from} : {to}]")
        }
        NodeKind::Dot { base, name } => {
            format!("{}.{name}", wrapped(base, postfix_base_parens(base))?)
        }
        NodeKind::Func { is_block, .. } => {
            let header = func_header(node)?;
            if *is_block {
                // An inline block lambda keeps its braces on one level.
                let mut out = format!("{header} {{\n");
                let NodeKind::Func { body, .. } = node.terminal() else {
                    unreachable!();
                };
                out.push_str(&block(body, 1)?);
                out.push('}');
                out
            } else {
                format!("{header}{}", body_suffix(node, 0)?.trim_end_matches('\n'))
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

/// Identifier-shaped string keys print bare, exactly as the grammar
/// reads them back.
fn dict_key(key: &Node) -> Result<String, EmitError> {
    if let NodeKind::Str { value } = key.terminal() {
        let mut chars = value.chars();
        let ident_like = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if ident_like {
            return Ok(value.clone());
        }
    }
    expr(key)
}

fn wrapped(node: &Node, parens: bool) -> Result<String, EmitError> {
    let inner = expr(node)?;
    Ok(if parens { format!("({inner})") } else { inner })
}
