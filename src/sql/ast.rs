//! Parsed statement representation

use std::fmt;

use crate::types::{ColumnType, Value};

#[derive(Debug, Clone)]
pub(crate) struct ColumnDef {
    pub name: String,
    pub ctype: ColumnType,
    /// Maximum byte size for VARCHAR2/RAW columns
    pub size: usize,
    pub not_null: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Returning {
    pub exprs: Vec<Expr>,
    /// Parameter indexes the returned values go into, one per expression
    pub into: Vec<usize>,
}

#[derive(Debug, Clone)]
pub(crate) enum SelectItem {
    Wildcard,
    Expr { expr: Expr, alias: Option<String> },
}

#[derive(Debug, Clone)]
pub(crate) struct OrderItem {
    pub expr: Expr,
    pub desc: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum Stmt {
    CreateTable { name: String, columns: Vec<ColumnDef> },
    DropTable   { name: String },
    Truncate    { name: String },
    Insert {
        table: String,
        columns: Option<Vec<String>>,
        values: Vec<Expr>,
        returning: Option<Returning>,
    },
    Update {
        table: String,
        set: Vec<(String, Expr)>,
        filter: Option<Expr>,
        returning: Option<Returning>,
    },
    Delete {
        table: String,
        filter: Option<Expr>,
        returning: Option<Returning>,
    },
    Select {
        items: Vec<SelectItem>,
        table: String,
        filter: Option<Expr>,
        order: Vec<OrderItem>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StmtKind {
    Query,
    Dml,
    Ddl,
}

impl Stmt {
    pub fn kind(&self) -> StmtKind {
        match self {
            Stmt::Select { .. } => StmtKind::Query,
            Stmt::Insert { .. } | Stmt::Update { .. } | Stmt::Delete { .. } => StmtKind::Dml,
            Stmt::CreateTable { .. } | Stmt::DropTable { .. } | Stmt::Truncate { .. } => StmtKind::Ddl,
        }
    }

    pub fn returning(&self) -> Option<&Returning> {
        match self {
            Stmt::Insert { returning, .. }
            | Stmt::Update { returning, .. }
            | Stmt::Delete { returning, .. } => returning.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Func {
    ToChar,
    Nvl,
    Length,
    Upper,
    Lower,
    Abs,
}

impl Func {
    pub fn lookup(name: &str) -> Option<(Func, usize)> {
        match name {
            "TO_CHAR" => Some((Func::ToChar, 1)),
            "NVL"     => Some((Func::Nvl,    2)),
            "LENGTH"  => Some((Func::Length, 1)),
            "UPPER"   => Some((Func::Upper,  1)),
            "LOWER"   => Some((Func::Lower,  1)),
            "ABS"     => Some((Func::Abs,    1)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Expr {
    Null,
    Literal(Value),
    Column(String),
    /// Parameter placeholder, by index into the statement parameter list
    Bind(usize),
    Neg(Box<Expr>),
    Not(Box<Expr>),
    IsNull { expr: Box<Expr>, negated: bool },
    Binary { op: BinOp, lhs: Box<Expr>, rhs: Box<Expr> },
    Call { func: Func, args: Vec<Expr> },
}

// Rendering is used for generated column labels and diagnostics.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Null => f.write_str("NULL"),
            Expr::Literal(Value::Varchar(txt)) => write!(f, "'{}'", txt),
            Expr::Literal(val) => match val.as_text() {
                Some(txt) => f.write_str(&txt),
                None => f.write_str("NULL"),
            },
            Expr::Column(name) => f.write_str(name),
            Expr::Bind(ix) => write!(f, ":{}", ix + 1),
            Expr::Neg(expr) => write!(f, "-{}", expr),
            Expr::Not(expr) => write!(f, "NOT {}", expr),
            Expr::IsNull { expr, negated } => {
                write!(f, "{} IS {}NULL", expr, if *negated { "NOT " } else { "" })
            }
            Expr::Binary { op, lhs, rhs } => {
                let op = match op {
                    BinOp::Add => "+",  BinOp::Sub => "-",
                    BinOp::Mul => "*",  BinOp::Div => "/",
                    BinOp::Concat => "||",
                    BinOp::Eq => "=",   BinOp::Ne => "<>",
                    BinOp::Lt => "<",   BinOp::Le => "<=",
                    BinOp::Gt => ">",   BinOp::Ge => ">=",
                    BinOp::And => "AND", BinOp::Or => "OR",
                };
                write!(f, "{}{}{}", lhs, op, rhs)
            }
            Expr::Call { func, args } => {
                let name = match func {
                    Func::ToChar => "TO_CHAR",
                    Func::Nvl    => "NVL",
                    Func::Length => "LENGTH",
                    Func::Upper  => "UPPER",
                    Func::Lower  => "LOWER",
                    Func::Abs    => "ABS",
                };
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
