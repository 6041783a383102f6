//! Renders a [`ScriptTree`] back to a Groovy `dependencies` block.

use deps_core::{Expr, NodeId, ScriptDocument, ScriptTree, ValueForm};

use crate::config::{FormatterConfig, QuoteStyle};

/// Renders every configuration list as one `dependencies { }` block.
///
/// One statement per list entry, configurations in first-declaration order.
/// Maps render as named arguments at statement level and as `[k: v]` inside
/// calls, so re-parsing the output yields the same tree shape. A declaration
/// with a configuration closure switches to parenthesized form and the
/// closure source is emitted after it unchanged.
///
/// # Examples
///
/// ```
/// use deps_core::{ScriptDocument, ScriptTree};
/// use deps_gradle::{config::FormatterConfig, render_dependencies};
///
/// let mut tree = ScriptTree::new();
/// tree.append_literal("compile", "com.google.guava:guava:18.0");
///
/// assert_eq!(
///     render_dependencies(&tree, &FormatterConfig::default()),
///     "dependencies {\n    compile 'com.google.guava:guava:18.0'\n}\n"
/// );
/// ```
pub fn render_dependencies(tree: &ScriptTree, config: &FormatterConfig) -> String {
    let indent = " ".repeat(config.indent);
    let mut out = String::from("dependencies {\n");

    for configuration in tree.list_names() {
        for node in tree.list(&configuration) {
            let Some(arguments) = render_node(tree, node, config.quote_style, false) else {
                continue;
            };
            out.push_str(&indent);
            out.push_str(&configuration);
            match tree.closure(node) {
                Some(closure) => {
                    out.push('(');
                    out.push_str(&arguments);
                    out.push_str(") ");
                    out.push_str(closure);
                }
                None => {
                    out.push(' ');
                    out.push_str(&arguments);
                }
            }
            out.push('\n');
        }
    }

    out.push_str("}\n");
    out
}

fn render_node(tree: &ScriptTree, node: NodeId, style: QuoteStyle, nested: bool) -> Option<String> {
    let rendered = match tree.expr(node)? {
        Expr::Literal(text) => quote(text, style),
        Expr::Template(text) => quote_template(text),
        Expr::Reference(text) => text.clone(),
        Expr::Map(entries) if entries.is_empty() => "[:]".to_string(),
        Expr::Map(entries) => {
            let pairs = entries
                .iter()
                .map(|entry| {
                    let value = match entry.form {
                        ValueForm::Plain => quote(&entry.value, style),
                        ValueForm::Template => quote_template(&entry.value),
                        ValueForm::Reference => entry.value.clone(),
                    };
                    format!("{}: {value}", entry.key)
                })
                .collect::<Vec<_>>()
                .join(", ");
            if nested { format!("[{pairs}]") } else { pairs }
        }
        Expr::Call { callee, arguments } => {
            let arguments = arguments
                .iter()
                .filter_map(|&argument| render_node(tree, argument, style, true))
                .collect::<Vec<_>>()
                .join(", ");
            match tree.closure(node).filter(|_| nested) {
                Some(closure) => format!("{callee}({arguments}) {closure}"),
                None => format!("{callee}({arguments})"),
            }
        }
    };
    Some(rendered)
}

fn quote(text: &str, style: QuoteStyle) -> String {
    quote_with(text, style.as_char(), true)
}

/// Templates always use double quotes so their placeholders stay live.
fn quote_template(text: &str) -> String {
    quote_with(text, '"', false)
}

fn quote_with(text: &str, quote: char, escape_dollar: bool) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '$' if escape_dollar && quote == '"' => out.push_str("\\$"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}
