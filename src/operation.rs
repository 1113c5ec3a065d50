//! Operation templates.
//!
//! A template is a closed sum of literal text fragments and operand type
//! references. It holds no generator state and renders by plain concatenation,
//! so one instance is shared by every synthesis call on every thread.
use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ty::TypeId;

pub type Fragment = Cow<'static, str>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operation {
    Unary {
        prefix: Fragment,
        operand: TypeId,
        suffix: Fragment,
    },
    Binary {
        prefix: Fragment,
        left: TypeId,
        infix: Fragment,
        right: TypeId,
        suffix: Fragment,
    },
    Ternary {
        prefix: Fragment,
        cond: TypeId,
        mid1: Fragment,
        middle: TypeId,
        mid2: Fragment,
        right: TypeId,
        suffix: Fragment,
    },
}

impl Operation {
    pub fn unary(prefix: impl Into<Fragment>, operand: TypeId, suffix: impl Into<Fragment>) -> Self {
        Self::Unary { prefix: prefix.into(), operand, suffix: suffix.into() }
    }

    pub fn binary(
        prefix: impl Into<Fragment>,
        left: TypeId,
        infix: impl Into<Fragment>,
        right: TypeId,
        suffix: impl Into<Fragment>,
    ) -> Self {
        Self::Binary {
            prefix: prefix.into(),
            left,
            infix: infix.into(),
            right,
            suffix: suffix.into(),
        }
    }

    pub fn ternary(
        prefix: impl Into<Fragment>,
        cond: TypeId,
        mid1: impl Into<Fragment>,
        middle: TypeId,
        mid2: impl Into<Fragment>,
        right: TypeId,
        suffix: impl Into<Fragment>,
    ) -> Self {
        Self::Ternary {
            prefix: prefix.into(),
            cond,
            mid1: mid1.into(),
            middle,
            mid2: mid2.into(),
            right,
            suffix: suffix.into(),
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Self::Unary { .. } => 1,
            Self::Binary { .. } => 2,
            Self::Ternary { .. } => 3,
        }
    }

    /// Operand types in slot order.
    pub fn operand_types(&self) -> Vec<&TypeId> {
        match self {
            Self::Unary { operand, .. } => vec![operand],
            Self::Binary { left, right, .. } => vec![left, right],
            Self::Ternary { cond, middle, right, .. } => vec![cond, middle, right],
        }
    }

    /// Text fragments; always `arity() + 1` of them.
    fn fragments(&self) -> Vec<&str> {
        match self {
            Self::Unary { prefix, suffix, .. } => vec![prefix.as_ref(), suffix.as_ref()],
            Self::Binary { prefix, infix, suffix, .. } => {
                vec![prefix.as_ref(), infix.as_ref(), suffix.as_ref()]
            }
            Self::Ternary { prefix, mid1, mid2, suffix, .. } => {
                vec![prefix.as_ref(), mid1.as_ref(), mid2.as_ref(), suffix.as_ref()]
            }
        }
    }

    /// Substitute already-rendered operands into the fragments, in slot order.
    pub fn render<S: AsRef<str>>(&self, operands: &[S]) -> String {
        debug_assert_eq!(operands.len(), self.arity());
        let fragments = self.fragments();
        let cap = fragments.iter().map(|f| f.len()).sum::<usize>()
            + operands.iter().map(|o| o.as_ref().len()).sum::<usize>();
        let mut out = String::with_capacity(cap);
        out.push_str(fragments[0]);
        for (operand, fragment) in operands.iter().zip(&fragments[1..]) {
            out.push_str(operand.as_ref());
            out.push_str(fragment);
        }
        out
    }

    /// Render with a neutral placeholder in every slot; used for validation and listings.
    pub fn render_probe(&self) -> String {
        let names: Vec<String> = self.operand_types().iter().map(|t| format!("<{t}>")).collect();
        self.render(names.as_slice())
    }
}

// ------------------------------ Delimiting ------------------------------- //

static CALL_HEAD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*\(").expect("valid regex")
});

/// True when `text` is one syntactic unit: either fully enclosed by a single
/// pair of parentheses, or a qualified call `Name.call(...)`. Either form can
/// be embedded in any other template without precedence ambiguity.
///
/// Parentheses inside operands are assumed balanced.
pub fn is_self_delimiting(text: &str) -> bool {
    let body = match CALL_HEAD.find(text) {
        Some(m) => &text[m.end() - 1..],
        None => text,
    };
    if !body.starts_with('(') || !body.ends_with(')') {
        return false;
    }
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                let Some(d) = depth.checked_sub(1) else { return false };
                depth = d;
                if depth == 0 && i + 1 != body.len() {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Parentheses are balanced and never close more than they opened.
pub fn parens_balanced(text: &str) -> bool {
    let mut depth = 0usize;
    for c in text.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}
