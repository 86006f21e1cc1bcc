//! XPath subset evaluated against a [`UiTree`]
//!
//! Supported: absolute location paths with `/` and `//`, the `child`,
//! `descendant`, `following-sibling`, `parent`, `ancestor` and `self` axes
//! (plus `.` and `..`), name and `*` tests, and predicates built from
//! attribute comparisons, `text()`, `contains()`, `starts-with()`, `not()`,
//! `and`, `or` and positions. String literals may use `concat()`.

use super::ui_tree::UiTree;
use crate::Error;

/// Parsed location path
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Axis {
    Child,
    Descendant,
    FollowingSibling,
    Parent,
    Ancestor,
    SelfNode,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Any,
    Name(String),
}

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Attr(String),
    Text,
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Or(Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Position(usize),
    Exists(String),
    Eq(Operand, String),
    Ne(Operand, String),
    Contains(Operand, String),
    StartsWith(Operand, String),
}

/// Parse an XPath expression
pub fn parse(source: &str) -> Result<XPath, Error> {
    let mut parser = Parser {
        chars: source.chars().collect(),
        pos: 0,
        source,
    };
    let path = parser.path()?;
    parser.skip_ws();
    if parser.pos != parser.chars.len() {
        return Err(parser.error("unexpected trailing input"));
    }
    Ok(path)
}

/// Evaluate a parsed path from the document root; matches in document order
pub fn evaluate(tree: &UiTree, path: &XPath) -> Vec<usize> {
    if tree.is_empty() {
        return Vec::new();
    }

    // `None` is the document node above the hierarchy root
    let mut context: Vec<Option<usize>> = vec![None];
    for step in &path.steps {
        let mut next: Vec<usize> = Vec::new();
        for node in &context {
            let mut candidates: Vec<usize> = axis_nodes(tree, *node, step.axis)
                .into_iter()
                .filter(|&i| node_test(tree, i, &step.test))
                .collect();
            for predicate in &step.predicates {
                candidates = candidates
                    .iter()
                    .enumerate()
                    .filter(|&(pos, &i)| eval_expr(tree, i, pos + 1, predicate))
                    .map(|(_, &i)| i)
                    .collect();
            }
            next.extend(candidates);
        }
        next.sort_unstable();
        next.dedup();
        context = next.into_iter().map(Some).collect();
    }

    context.into_iter().flatten().collect()
}

fn axis_nodes(tree: &UiTree, node: Option<usize>, axis: Axis) -> Vec<usize> {
    let Some(index) = node else {
        return match axis {
            Axis::Child => vec![0],
            Axis::Descendant => {
                let mut all = vec![0];
                all.extend(tree.descendants(0));
                all
            }
            _ => Vec::new(),
        };
    };

    let flat = tree.node(index);
    match axis {
        Axis::Child => flat.children.clone(),
        Axis::Descendant => tree.descendants(index),
        Axis::FollowingSibling => match flat.parent {
            Some(parent) => tree
                .node(parent)
                .children
                .iter()
                .copied()
                .skip_while(|&c| c != index)
                .skip(1)
                .collect(),
            None => Vec::new(),
        },
        Axis::Parent => flat.parent.into_iter().collect(),
        Axis::Ancestor => {
            let mut out = Vec::new();
            let mut current = flat.parent;
            while let Some(p) = current {
                out.push(p);
                current = tree.node(p).parent;
            }
            out
        }
        Axis::SelfNode => vec![index],
    }
}

fn node_test(tree: &UiTree, index: usize, test: &NodeTest) -> bool {
    match test {
        NodeTest::Any => true,
        NodeTest::Name(name) => tree.node(index).class == *name,
    }
}

fn operand_value(tree: &UiTree, index: usize, operand: &Operand) -> Option<String> {
    let node = tree.node(index);
    match operand {
        Operand::Attr(name) => node.attribute(name),
        Operand::Text => Some(node.text.clone()),
    }
}

fn eval_expr(tree: &UiTree, index: usize, position: usize, expr: &Expr) -> bool {
    match expr {
        Expr::Or(a, b) => eval_expr(tree, index, position, a) || eval_expr(tree, index, position, b),
        Expr::And(a, b) => eval_expr(tree, index, position, a) && eval_expr(tree, index, position, b),
        Expr::Not(e) => !eval_expr(tree, index, position, e),
        Expr::Position(n) => position == *n,
        Expr::Exists(name) => tree.node(index).attribute(name).is_some(),
        Expr::Eq(op, lit) => operand_value(tree, index, op).as_deref() == Some(lit.as_str()),
        Expr::Ne(op, lit) => operand_value(tree, index, op).is_some_and(|v| v != *lit),
        Expr::Contains(op, lit) => operand_value(tree, index, op).is_some_and(|v| v.contains(lit.as_str())),
        Expr::StartsWith(op, lit) => {
            operand_value(tree, index, op).is_some_and(|v| v.starts_with(lit.as_str()))
        }
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn error(&self, what: &str) -> Error {
        Error::invalid_selector(format!("{} at offset {} in '{}'", what, self.pos, self.source))
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, token: &str) -> bool {
        self.skip_ws();
        let len = token.chars().count();
        if self.chars.len() >= self.pos + len
            && self.chars[self.pos..self.pos + len].iter().copied().eq(token.chars())
        {
            self.pos += len;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &str) -> Result<(), Error> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{}'", token)))
        }
    }

    /// Keyword followed by a non-name character
    fn eat_keyword(&mut self, word: &str) -> bool {
        let start = self.pos;
        if self.eat(word) && !self.peek().is_some_and(is_name_char) {
            return true;
        }
        self.pos = start;
        false
    }

    fn name(&mut self) -> Result<String, Error> {
        self.skip_ws();
        let start = self.pos;
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn path(&mut self) -> Result<XPath, Error> {
        let mut steps = Vec::new();
        loop {
            self.skip_ws();
            let descendant = if self.eat("//") {
                true
            } else if self.eat("/") {
                false
            } else {
                break;
            };
            steps.push(self.step(descendant)?);
        }
        if steps.is_empty() {
            return Err(self.error("expected '/' or '//'"));
        }
        Ok(XPath { steps })
    }

    fn step(&mut self, descendant: bool) -> Result<Step, Error> {
        if self.eat("..") {
            return self.abbreviated(descendant, Axis::Parent);
        }
        if self.eat(".") {
            return self.abbreviated(descendant, Axis::SelfNode);
        }

        let mut axis = if descendant { Axis::Descendant } else { Axis::Child };
        let start = self.pos;
        let name = if self.eat("*") { None } else { Some(self.name()?) };

        let test = if self.eat("::") {
            let explicit = match name.as_deref() {
                Some("child") => Axis::Child,
                Some("descendant") => Axis::Descendant,
                Some("following-sibling") => Axis::FollowingSibling,
                Some("parent") => Axis::Parent,
                Some("ancestor") => Axis::Ancestor,
                Some("self") => Axis::SelfNode,
                _ => {
                    self.pos = start;
                    return Err(self.error("unsupported axis"));
                }
            };
            if descendant && explicit != Axis::Child {
                return Err(self.error("'//' may only be followed by the child axis"));
            }
            if !descendant {
                axis = explicit;
            }
            if self.eat("*") {
                NodeTest::Any
            } else {
                NodeTest::Name(self.name()?)
            }
        } else {
            match name {
                Some(n) => NodeTest::Name(n),
                None => NodeTest::Any,
            }
        };

        let mut predicates = Vec::new();
        while self.eat("[") {
            predicates.push(self.or_expr()?);
            self.expect("]")?;
        }

        Ok(Step { axis, test, predicates })
    }

    fn abbreviated(&self, descendant: bool, axis: Axis) -> Result<Step, Error> {
        if descendant {
            return Err(self.error("'//' before '.' or '..' is not supported"));
        }
        Ok(Step {
            axis,
            test: NodeTest::Any,
            predicates: Vec::new(),
        })
    }

    fn or_expr(&mut self) -> Result<Expr, Error> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, Error> {
        let mut left = self.unary()?;
        while self.eat_keyword("and") {
            let right = self.unary()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<Expr, Error> {
        let start = self.pos;
        if self.eat_keyword("not") {
            if self.eat("(") {
                let inner = self.or_expr()?;
                self.expect(")")?;
                return Ok(Expr::Not(Box::new(inner)));
            }
            self.pos = start;
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, Error> {
        self.skip_ws();
        if self.eat("(") {
            let inner = self.or_expr()?;
            self.expect(")")?;
            return Ok(inner);
        }

        if self.peek().is_some_and(|c| c.is_ascii_digit()) {
            let start = self.pos;
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let digits: String = self.chars[start..self.pos].iter().collect();
            return digits
                .parse()
                .map(Expr::Position)
                .map_err(|_| self.error("invalid position"));
        }

        for (func, build) in [
            ("contains", Expr::Contains as fn(Operand, String) -> Expr),
            ("starts-with", Expr::StartsWith as fn(Operand, String) -> Expr),
        ] {
            let start = self.pos;
            if self.eat(func) && self.eat("(") {
                let operand = self.operand()?;
                self.expect(",")?;
                let literal = self.string()?;
                self.expect(")")?;
                return Ok(build(operand, literal));
            }
            self.pos = start;
        }

        let is_attr = self.peek() == Some('@');
        let operand = self.operand()?;
        if self.eat("!=") {
            return Ok(Expr::Ne(operand, self.string()?));
        }
        if self.eat("=") {
            return Ok(Expr::Eq(operand, self.string()?));
        }
        match operand {
            Operand::Attr(name) if is_attr => Ok(Expr::Exists(name)),
            _ => Err(self.error("expected comparison")),
        }
    }

    fn operand(&mut self) -> Result<Operand, Error> {
        if self.eat("@") {
            return Ok(Operand::Attr(self.name()?));
        }
        if self.eat("text()") || self.eat(".") {
            return Ok(Operand::Text);
        }
        Err(self.error("expected '@attribute', 'text()' or '.'"))
    }

    fn string(&mut self) -> Result<String, Error> {
        self.skip_ws();
        if self.eat_keyword("concat") {
            self.expect("(")?;
            let mut out = self.string()?;
            while self.eat(",") {
                out.push_str(&self.string()?);
            }
            self.expect(")")?;
            return Ok(out);
        }

        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected string literal")),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek().is_none() {
            return Err(self.error("unterminated string literal"));
        }
        let literal: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(literal)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | '_' | '-')
}
