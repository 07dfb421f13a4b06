//! Connector expressions and their expansion into disjuncts.
//!
//! A word's dictionary expression is a boolean formula over connectors. Before
//! parsing it is expanded into a flat list of [`Disjunct`]s, each naming exactly
//! which connectors the word uses to its left and to its right.

use std::fmt;

use serde::Serialize;

/// Upper bound on disjuncts produced by a single expression.
pub const MAX_DISJUNCTS_PER_WORD: usize = 4096;

// ============================================================================
// CONNECTORS
// ============================================================================

/// Which side of its word a connector points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Direction {
    /// `-`: links to a word on the left
    Left,
    /// `+`: links to a word on the right
    Right,
}

impl Direction {
    pub fn symbol(&self) -> char {
        match self {
            Direction::Left => '-',
            Direction::Right => '+',
        }
    }
}

/// A single connector, e.g. `Ss+` or `@A-`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Connector {
    head: String,
    subscript: String,
    direction: Direction,
    multi: bool,
}

impl Connector {
    pub fn new(
        head: impl Into<String>,
        subscript: impl Into<String>,
        direction: Direction,
        multi: bool,
    ) -> Self {
        Self {
            head: head.into(),
            subscript: subscript.into(),
            direction,
            multi,
        }
    }

    /// Parse connector text such as `@MVp+`. Returns `None` if it is not a connector.
    pub fn parse(text: &str) -> Option<Self> {
        let (multi, rest) = match text.strip_prefix('@') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let direction = match rest.chars().last()? {
            '+' => Direction::Right,
            '-' => Direction::Left,
            _ => return None,
        };
        let body = &rest[..rest.len() - 1];
        let head_len = body
            .find(|c: char| !c.is_ascii_uppercase())
            .unwrap_or(body.len());
        if head_len == 0 {
            return None;
        }
        let (head, subscript) = body.split_at(head_len);
        if !subscript
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '*')
        {
            return None;
        }
        Some(Self::new(head, subscript, direction, multi))
    }

    pub fn head(&self) -> &str {
        &self.head
    }

    pub fn subscript(&self) -> &str {
        &self.subscript
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Connector name without direction or multi marker.
    pub fn name(&self) -> String {
        format!("{}{}", self.head, self.subscript)
    }

    /// Whether `self` (on the left word) can link to `other` (on the right word).
    pub fn links_to(&self, other: &Connector) -> bool {
        self.direction == Direction::Right
            && other.direction == Direction::Left
            && self.head == other.head
            && self
                .subscript
                .chars()
                .zip(other.subscript.chars())
                .all(|(a, b)| a == '*' || b == '*' || a == b)
    }

    /// The label of the link formed by `self` and `other`: the more specific of
    /// the two subscripts at every position.
    pub fn link_label(&self, other: &Connector) -> String {
        let a: Vec<char> = self.subscript.chars().collect();
        let b: Vec<char> = other.subscript.chars().collect();
        let mut label = self.head.clone();
        for i in 0..a.len().max(b.len()) {
            let ch = match (a.get(i), b.get(i)) {
                (Some('*'), Some(&y)) => y,
                (Some(&x), _) => x,
                (None, Some(&y)) => y,
                (None, None) => break,
            };
            label.push(ch);
        }
        label
    }
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.multi {
            f.write_str("@")?;
        }
        write!(f, "{}{}{}", self.head, self.subscript, self.direction.symbol())
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// A dictionary expression, after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Connector(Connector),
    And(Vec<Expr>),
    Or(Vec<Expr>),
    /// `{e}`: `e` or nothing
    Optional(Box<Expr>),
    /// `[e]`: `e` with one unit of cost
    Cost(Box<Expr>),
    /// `()`
    Empty,
    /// `<name>`: resolved against the dictionary's macros before expansion
    Macro(String),
}

// ============================================================================
// DISJUNCTS
// ============================================================================

/// One way a word may connect: the connectors it uses on each side.
///
/// Both lists are ordered farthest-first: `left[0]` links to the leftmost
/// partner, `right[0]` to the rightmost one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Disjunct {
    pub left: Vec<Connector>,
    pub right: Vec<Connector>,
    pub cost: u32,
}

impl fmt::Display for Disjunct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let conns: Vec<String> = self
            .left
            .iter()
            .chain(self.right.iter().rev())
            .map(ToString::to_string)
            .collect();
        if conns.is_empty() {
            f.write_str("()")
        } else {
            f.write_str(&conns.join(" "))
        }
    }
}

/// Connectors in written order plus accumulated cost.
#[derive(Debug, Clone)]
struct Clause {
    conns: Vec<Connector>,
    cost: u32,
}

/// Why an expression could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    UnresolvedMacro(String),
    TooManyDisjuncts(usize),
}

impl fmt::Display for ExpandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpandError::UnresolvedMacro(name) => write!(f, "macro {} is not defined", name),
            ExpandError::TooManyDisjuncts(n) => {
                write!(f, "expression expands to more than {} disjuncts", n)
            }
        }
    }
}

/// Expand a macro-free expression into its disjuncts.
///
/// Connectors are written in sentence order: `-` connectors farthest first,
/// `+` connectors nearest first. Duplicate disjuncts keep their lowest cost.
pub fn expand(expr: &Expr) -> Result<Vec<Disjunct>, ExpandError> {
    let clauses = expand_clauses(expr)?;
    let mut out: Vec<Disjunct> = Vec::with_capacity(clauses.len());
    for clause in clauses {
        let left: Vec<Connector> = clause
            .conns
            .iter()
            .filter(|c| c.direction == Direction::Left)
            .cloned()
            .collect();
        let mut right: Vec<Connector> = clause
            .conns
            .iter()
            .filter(|c| c.direction == Direction::Right)
            .cloned()
            .collect();
        right.reverse();
        if let Some(existing) = out.iter_mut().find(|d| d.left == left && d.right == right) {
            existing.cost = existing.cost.min(clause.cost);
            continue;
        }
        out.push(Disjunct {
            left,
            right,
            cost: clause.cost,
        });
    }
    Ok(out)
}

fn expand_clauses(expr: &Expr) -> Result<Vec<Clause>, ExpandError> {
    let clauses = match expr {
        Expr::Connector(c) => vec![Clause {
            conns: vec![c.clone()],
            cost: 0,
        }],
        Expr::Empty => vec![Clause {
            conns: Vec::new(),
            cost: 0,
        }],
        Expr::Optional(inner) => {
            let mut clauses = vec![Clause {
                conns: Vec::new(),
                cost: 0,
            }];
            clauses.extend(expand_clauses(inner)?);
            clauses
        }
        Expr::Cost(inner) => {
            let mut clauses = expand_clauses(inner)?;
            for clause in &mut clauses {
                clause.cost += 1;
            }
            clauses
        }
        Expr::Or(items) => {
            let mut clauses = Vec::new();
            for item in items {
                clauses.extend(expand_clauses(item)?);
            }
            clauses
        }
        Expr::And(items) => {
            let mut acc = vec![Clause {
                conns: Vec::new(),
                cost: 0,
            }];
            for item in items {
                let rhs = expand_clauses(item)?;
                if acc.len().saturating_mul(rhs.len()) > MAX_DISJUNCTS_PER_WORD {
                    return Err(ExpandError::TooManyDisjuncts(MAX_DISJUNCTS_PER_WORD));
                }
                let mut next = Vec::with_capacity(acc.len() * rhs.len());
                for a in &acc {
                    for b in &rhs {
                        let mut conns = a.conns.clone();
                        conns.extend(b.conns.iter().cloned());
                        next.push(Clause {
                            conns,
                            cost: a.cost + b.cost,
                        });
                    }
                }
                acc = next;
            }
            acc
        }
        Expr::Macro(name) => return Err(ExpandError::UnresolvedMacro(name.clone())),
    };
    if clauses.len() > MAX_DISJUNCTS_PER_WORD {
        return Err(ExpandError::TooManyDisjuncts(MAX_DISJUNCTS_PER_WORD));
    }
    Ok(clauses)
}
