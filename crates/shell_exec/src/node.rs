//! Command tree consumed by the evaluator
//!
//! Trees are built once by the parser (which lives outside this crate) and are
//! only read here. Each node owns its children, so a tree is acyclic and no
//! node is shared.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Node type of a [`CommandNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A single program or built-in: `ls -l`
    Simple,
    /// `left | right`
    Pipe,
    /// `left && right`
    And,
    /// `left || right`
    Or,
    /// `left ; right`
    Sequence,
    /// `left & right`
    Background,
    /// `( left )`
    Subshell,
}

/// Source of a node's standard input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum InputRedirect {
    #[default]
    None,
    /// `< path`
    File(PathBuf),
    /// `<< EOF ... EOF`, delivered byte-for-byte.
    Heredoc(String),
}

/// Destination of a node's standard output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum OutputRedirect {
    #[default]
    None,
    /// `> path`
    Truncate(PathBuf),
    /// `>> path`
    Append(PathBuf),
}

/// One node of a parsed command line.
///
/// `Simple` nodes carry a non-empty `argv` and no children. `Pipe`, `And`,
/// `Or`, `Sequence` and `Background` carry a `left` and an optional `right`
/// (a trailing `;` or `&` leaves `right` empty). `Subshell` carries only
/// `left`, the parenthesized sub-tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandNode {
    pub kind: NodeKind,
    #[serde(default)]
    pub argv: Vec<String>,
    #[serde(default)]
    pub left: Option<Box<CommandNode>>,
    #[serde(default)]
    pub right: Option<Box<CommandNode>>,
    #[serde(default)]
    pub input_redirect: InputRedirect,
    #[serde(default)]
    pub output_redirect: OutputRedirect,
    /// `NAME=value` pairs exported only into the process running this node.
    #[serde(default)]
    pub local_bindings: Vec<(String, String)>,
}

impl CommandNode {
    fn structural(
        kind: NodeKind,
        left: Option<CommandNode>,
        right: Option<CommandNode>,
    ) -> Self {
        Self {
            kind,
            argv: Vec::new(),
            left: left.map(Box::new),
            right: right.map(Box::new),
            input_redirect: InputRedirect::None,
            output_redirect: OutputRedirect::None,
            local_bindings: Vec::new(),
        }
    }

    /// A simple command from its argument vector.
    pub fn simple<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            ..Self::structural(NodeKind::Simple, None, None)
        }
    }

    pub fn pipe(left: CommandNode, right: CommandNode) -> Self {
        Self::structural(NodeKind::Pipe, Some(left), Some(right))
    }

    pub fn and(left: CommandNode, right: CommandNode) -> Self {
        Self::structural(NodeKind::And, Some(left), Some(right))
    }

    pub fn or(left: CommandNode, right: CommandNode) -> Self {
        Self::structural(NodeKind::Or, Some(left), Some(right))
    }

    pub fn sequence(left: CommandNode, right: Option<CommandNode>) -> Self {
        Self::structural(NodeKind::Sequence, Some(left), right)
    }

    pub fn background(left: CommandNode, right: Option<CommandNode>) -> Self {
        Self::structural(NodeKind::Background, Some(left), right)
    }

    pub fn subshell(inner: CommandNode) -> Self {
        Self::structural(NodeKind::Subshell, Some(inner), None)
    }

    pub fn with_input(mut self, redirect: InputRedirect) -> Self {
        self.input_redirect = redirect;
        self
    }

    pub fn with_output(mut self, redirect: OutputRedirect) -> Self {
        self.output_redirect = redirect;
        self
    }

    pub fn with_binding(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.local_bindings.push((name.into(), value.into()));
        self
    }

    /// The program or built-in name, if this node has one.
    pub fn name(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn left(&self) -> Option<&CommandNode> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&CommandNode> {
        self.right.as_deref()
    }
}
