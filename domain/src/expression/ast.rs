//! Expression syntax tree

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Minus,
    Invert,
    Not,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::FloorDiv => "//",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
        }
    }

    /// Arithmetic operators the evaluator is allowed to apply
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Sub
                | BinaryOp::Mul
                | BinaryOp::Div
                | BinaryOp::FloorDiv
                | BinaryOp::Mod
                | BinaryOp::Pow
        )
    }
}

/// Comparison operators (parsed, never evaluated)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    NotEq,
    In,
    NotIn,
    Is,
    IsNot,
}

/// Boolean connectives (parsed, never evaluated)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    And,
    Or,
}

/// A node of the parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal source text
    Number(String),
    Str(String),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Compare {
        left: Box<Expr>,
        comparisons: Vec<(CompareOp, Expr)>,
    },
    Bool {
        op: BoolOp,
        values: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    /// Human-readable name of this node kind, used in rejection messages
    pub fn describe(&self) -> String {
        match self {
            Expr::Number(text) => format!("number {}", text),
            Expr::Str(_) => "string literal".to_string(),
            Expr::Name(name) => format!("name '{}'", name),
            Expr::Unary { op, .. } => match op {
                UnaryOp::Plus => "unary plus".to_string(),
                UnaryOp::Minus => "unary minus".to_string(),
                UnaryOp::Invert => "bitwise inversion '~'".to_string(),
                UnaryOp::Not => "boolean operation 'not'".to_string(),
            },
            Expr::Binary { op, .. } if op.is_arithmetic() => {
                format!("arithmetic operator '{}'", op.symbol())
            }
            Expr::Binary { op, .. } => format!("bitwise operator '{}'", op.symbol()),
            Expr::Compare { .. } => "comparison".to_string(),
            Expr::Bool { op, .. } => match op {
                BoolOp::And => "boolean operation 'and'".to_string(),
                BoolOp::Or => "boolean operation 'or'".to_string(),
            },
            Expr::Call { func, .. } => match func.as_ref() {
                Expr::Name(name) => format!("function call '{}()'", name),
                _ => "function call".to_string(),
            },
            Expr::Attribute { attr, .. } => format!("attribute access '.{}'", attr),
            Expr::Subscript { .. } => "subscript".to_string(),
            Expr::List(_) => "list display".to_string(),
            Expr::Tuple(_) => "tuple".to_string(),
        }
    }
}
