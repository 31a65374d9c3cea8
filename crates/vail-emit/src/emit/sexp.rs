//! Debug s-expression dump.
//!
//! One chunk per top-level statement, each a single line. Meant for
//! inspecting what the parser and analyzer produced, not for reparsing;
//! omitted slice bounds print as `null` so both ends are always visible.

use vail_ast::strings::uneval;
use vail_ast::{ElseBranch, Node, NodeKind, Param, Pattern};

use super::{float_literal, Chunk, EmitError};

pub fn render(program: &Node) -> Vec<Chunk> {
    let NodeKind::Program { body } = program.terminal() else {
        return vec![Err(EmitError::Internal(
            "generator expects a top-level unit".into(),
        ))];
    };
    body.iter()
        .map(|stmt| node(stmt).map(|text| format!("{text}\n")))
        .collect()
}

fn node(n: &Node) -> Result<String, EmitError> {
    Ok(match n.terminal() {
        NodeKind::Program { body } => list("program", body)?,
        NodeKind::Comment { text } => format!("(comment {})", uneval(text)),
        NodeKind::Import {
            package,
            alias,
            names,
        } => {
            let mut parts = vec!["import".to_string(), uneval(package)];
            if let Some(alias) = alias {
                parts.push(format!("(as {alias})"));
            }
            for import in names {
                match &import.rename {
                    Some(rename) => parts.push(format!("(name {} {rename})", import.name)),
                    None => parts.push(format!("(name {})", import.name)),
                }
            }
            parenthesize(parts)
        }
        NodeKind::Func {
            mods,
            name,
            params,
            ret,
            is_block,
            body,
            ..
        } => {
            let mut parts = vec!["func".to_string()];
            if !mods.is_empty() {
                let words: Vec<&str> = mods.iter().map(|m| m.as_str()).collect();
                parts.push(format!("(mods {})", words.join(" ")));
            }
            parts.push(match name {
                Some(name) => name.clone(),
                None => "anonymous".to_string(),
            });
            parts.push(params_sexp(params)?);
            if let Some(ret) = ret {
                parts.push(format!("(ret {ret})"));
            }
            parts.push(if *is_block { "block" } else { "lambda" }.to_string());
            for stmt in body {
                parts.push(node(stmt)?);
            }
            parenthesize(parts)
        }
        NodeKind::Return { value } => match value {
            Some(value) => format!("(return {})", node(value)?),
            None => "(return)".to_string(),
        },
        NodeKind::Decl {
            is_const,
            pattern,
            value,
        } => format!(
            "({} {} {})",
            if *is_const { "const" } else { "let" },
            pattern_sexp(pattern),
            node(value)?
        ),
        NodeKind::Assign { target, value } => {
            format!("(assign {} {})", node(target)?, node(value)?)
        }
        NodeKind::If {
            cond,
            body,
            else_branch,
        } => {
            let mut parts = vec!["if".to_string(), node(cond)?, list("then", body)?];
            match else_branch {
                ElseBranch::None => {}
                ElseBranch::ElseIf(chained) => parts.push(format!("(else {})", node(chained)?)),
                ElseBranch::Else(stmts) => parts.push(list("else", stmts)?),
            }
            parenthesize(parts)
        }
        NodeKind::While { cond, body } => {
            format!("(while {} {})", node(cond)?, list("do", body)?)
        }
        NodeKind::For {
            pattern,
            iter,
            body,
        } => format!(
            "(for {} {} {})",
            pattern_sexp(pattern),
            node(iter)?,
            list("do", body)?
        ),
        NodeKind::Ternary { cond, then, else_ } => {
            format!("(ternary {} {} {})", node(cond)?, node(then)?, node(else_)?)
        }
        NodeKind::Binary { op, left, right } => {
            format!("({op} {} {})", node(left)?, node(right)?)
        }
        NodeKind::Unary { op, operand } => format!("({} {})", op.as_str(), node(operand)?),
        NodeKind::Slice { base, from, to } => format!(
            "(slice {} {} {})",
            node(base)?,
            opt(from.as_deref())?,
            opt(to.as_deref())?
        ),
        NodeKind::Call { callee, args } => {
            let mut parts = vec!["call".to_string(), node(callee)?];
            for arg in args {
                parts.push(node(arg)?);
            }
            parenthesize(parts)
        }
        NodeKind::Subscript { base, index } => {
            format!("(subscript {} {})", node(base)?, node(index)?)
        }
        NodeKind::Dot { base, name } => format!("(dot {} {name})", node(base)?),
        NodeKind::Ident { name } => name.clone(),
        NodeKind::Int { value } => value.to_string(),
        NodeKind::Float { value } => float_literal(*value),
        NodeKind::Bool { value } => value.to_string(),
        NodeKind::Null => "null".to_string(),
        NodeKind::Str { value } => uneval(value),
        NodeKind::List { items } => list("list", items)?,
        NodeKind::Dict { entries } => {
            let mut parts = vec!["dict".to_string()];
            for (key, value) in entries {
                parts.push(format!("({} {})", node(key)?, node(value)?));
            }
            parenthesize(parts)
        }
        NodeKind::OptionVar { name } => format!("(option {name})"),
        NodeKind::Env { name } => format!("(env {name})"),
        NodeKind::Reg { name } => format!("(reg {name})"),
        NodeKind::Error { message } => {
            return Err(EmitError::ErrorNode(message.clone()));
        }
    })
}

fn opt(n: Option<&Node>) -> Result<String, EmitError> {
    match n {
        Some(n) => node(n),
        None => Ok("null".to_string()),
    }
}

fn list(head: &str, items: &[Node]) -> Result<String, EmitError> {
    let mut parts = vec![head.to_string()];
    for item in items {
        parts.push(node(item)?);
    }
    Ok(parenthesize(parts))
}

fn pattern_sexp(pattern: &Pattern) -> String {
    match pattern {
        Pattern::Ident(b) => b.name.clone(),
        Pattern::List(bs) => {
            let names: Vec<&str> = bs.iter().map(|b| b.name.as_str()).collect();
            format!("[{}]", names.join(" "))
        }
    }
}

fn params_sexp(params: &[Param]) -> Result<String, EmitError> {
    let mut parts = vec!["params".to_string()];
    for param in params {
        match (&param.ty, &param.default) {
            (Some(ty), _) => parts.push(format!("({}: {ty})", param.name.name)),
            (None, Some(default)) => {
                parts.push(format!("({} = {})", param.name.name, node(default)?));
            }
            (None, None) => parts.push(param.name.name.clone()),
        }
    }
    Ok(parenthesize(parts))
}

fn parenthesize(parts: Vec<String>) -> String {
    format!("({})", parts.join(" "))
}
