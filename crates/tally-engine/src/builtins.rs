//! Built-in operators and functions, and the registry that maps names to them.
//!
//! Conventions:
//! - Names are matched case-insensitively and stored upper-case.
//! - Operators are registered under their symbol (`+`, `<=`, ...) because the
//!   parser rewrites `a + b` into the call `+(a, b)`.
//! - Builtins receive their arguments unevaluated. Arity is checked before any
//!   argument is evaluated, and `IF` evaluates only the branch it returns.
//! - If you add a builtin, add it to [`BUILTINS`] so it shows up in listings.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::engine::{ErrorKind, Evaluator, Expr, Value};

/// A builtin implementation. Errors are folded into [`Value::Error`] by the
/// evaluator.
pub type Builtin = fn(&[Expr], &mut Evaluator<'_>) -> Result<Value, ErrorKind>;

pub struct BuiltinSpec {
    pub name: &'static str,
    pub arity: &'static str,
    pub description: &'static str,
    pub function: Builtin,
}

pub const BUILTINS: &[BuiltinSpec] = &[
    BuiltinSpec {
        name: "+",
        arity: "1-2",
        description: "Unary plus, or integer sum",
        function: op_add,
    },
    BuiltinSpec {
        name: "-",
        arity: "1-2",
        description: "Negation, or integer difference",
        function: op_minus,
    },
    BuiltinSpec {
        name: "*",
        arity: "2",
        description: "Integer product",
        function: op_multiply,
    },
    BuiltinSpec {
        name: "/",
        arity: "2",
        description: "Integer quotient, truncated toward zero",
        function: op_divide,
    },
    BuiltinSpec {
        name: "&",
        arity: "2",
        description: "Text concatenation",
        function: op_concat,
    },
    BuiltinSpec {
        name: "=",
        arity: "2",
        description: "Equal (FALSE for values of different kinds)",
        function: op_eq,
    },
    BuiltinSpec {
        name: "<>",
        arity: "2",
        description: "Not equal (FALSE for values of different kinds)",
        function: op_neq,
    },
    BuiltinSpec {
        name: "<",
        arity: "2",
        description: "Less than",
        function: op_less,
    },
    BuiltinSpec {
        name: "<=",
        arity: "2",
        description: "Less than or equal",
        function: op_leq,
    },
    BuiltinSpec {
        name: ">",
        arity: "2",
        description: "Greater than",
        function: op_greater,
    },
    BuiltinSpec {
        name: ">=",
        arity: "2",
        description: "Greater than or equal",
        function: op_geq,
    },
    BuiltinSpec {
        name: "SUM",
        arity: "0+",
        description: "Sum of integer arguments",
        function: sum,
    },
    BuiltinSpec {
        name: "IF",
        arity: "3",
        description: "IF(condition, then, else); only the chosen branch is evaluated",
        function: if_func,
    },
];

/// Case-insensitive name to builtin mapping.
#[derive(Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Builtin>,
}

impl FunctionRegistry {
    /// A registry with no functions at all, not even operators.
    pub fn empty() -> Self {
        FunctionRegistry {
            functions: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for spec in BUILTINS {
            registry.register(spec.name, spec.function);
        }
        registry
    }

    /// Add or replace a function.
    pub fn register(&mut self, name: &str, function: Builtin) {
        self.functions.insert(name.to_ascii_uppercase(), function);
    }

    pub fn lookup(&self, name: &str) -> Option<Builtin> {
        self.functions.get(&name.to_ascii_uppercase()).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn expect_arity(args: &[Expr], n: usize) -> Result<(), ErrorKind> {
    if args.len() == n { Ok(()) } else { Err(ErrorKind::Arg) }
}

fn op_add(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    match args {
        [x] => Ok(Value::Integer(ev.integer(x)?)),
        [a, b] => {
            let (a, b) = (ev.integer(a)?, ev.integer(b)?);
            a.checked_add(b).map(Value::Integer).ok_or(ErrorKind::Value)
        }
        _ => Err(ErrorKind::Arg),
    }
}

fn op_minus(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    match args {
        [x] => ev.integer(x)?.checked_neg().map(Value::Integer).ok_or(ErrorKind::Value),
        [a, b] => {
            let (a, b) = (ev.integer(a)?, ev.integer(b)?);
            a.checked_sub(b).map(Value::Integer).ok_or(ErrorKind::Value)
        }
        _ => Err(ErrorKind::Arg),
    }
}

fn op_multiply(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    expect_arity(args, 2)?;
    let (a, b) = (ev.integer(&args[0])?, ev.integer(&args[1])?);
    a.checked_mul(b).map(Value::Integer).ok_or(ErrorKind::Value)
}

fn op_divide(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    expect_arity(args, 2)?;
    let (a, b) = (ev.integer(&args[0])?, ev.integer(&args[1])?);
    if b == 0 {
        return Err(ErrorKind::Div0);
    }
    // i64::MIN / -1
    a.checked_div(b).map(Value::Integer).ok_or(ErrorKind::Value)
}

fn op_concat(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    expect_arity(args, 2)?;
    let mut out = ev.text(&args[0])?;
    out.push_str(&ev.text(&args[1])?);
    Ok(Value::Text(out))
}

#[derive(Clone, Copy)]
enum Comparison {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparison {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Comparison::Eq => ordering.is_eq(),
            Comparison::Ne => ordering.is_ne(),
            Comparison::Lt => ordering.is_lt(),
            Comparison::Le => ordering.is_le(),
            Comparison::Gt => ordering.is_gt(),
            Comparison::Ge => ordering.is_ge(),
        }
    }
}

fn compare(
    args: &[Expr],
    ev: &mut Evaluator<'_>,
    op: Comparison,
) -> Result<Value, ErrorKind> {
    expect_arity(args, 2)?;
    let left = ev.operand(&args[0])?;
    let right = ev.operand(&args[1])?;
    let ordering = match (&left, &right) {
        (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
        _ => {
            return match op {
                Comparison::Eq | Comparison::Ne => Ok(Value::Boolean(false)),
                _ => Err(ErrorKind::Value),
            };
        }
    };
    Ok(Value::Boolean(op.holds(ordering)))
}

fn op_eq(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Eq)
}

fn op_neq(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Ne)
}

fn op_less(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Lt)
}

fn op_leq(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Le)
}

fn op_greater(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Gt)
}

fn op_geq(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    compare(args, ev, Comparison::Ge)
}

fn sum(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    let mut total = 0i64;
    for arg in args {
        total = total.checked_add(ev.integer(arg)?).ok_or(ErrorKind::Value)?;
    }
    Ok(Value::Integer(total))
}

fn if_func(args: &[Expr], ev: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
    expect_arity(args, 3)?;
    let branch = if ev.boolean(&args[0])? { &args[1] } else { &args[2] };
    Ok(ev.evaluate(branch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{evaluate_standalone, parse};

    fn eval(formula: &str) -> Value {
        evaluate_standalone(&parse(formula).unwrap())
    }

    fn err(kind: ErrorKind) -> Value {
        Value::Error(kind)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1+2*3"), Value::Integer(7));
        assert_eq!(eval("(1+2)*3"), Value::Integer(9));
        assert_eq!(eval("10-3-2"), Value::Integer(5));
        assert_eq!(eval("-5"), Value::Integer(-5));
        assert_eq!(eval("-(2+3)"), Value::Integer(-5));
        assert_eq!(eval("+(4)"), Value::Integer(4));
        assert_eq!(eval("3-2"), Value::Integer(1));
        assert_eq!(eval("7/2"), Value::Integer(3));
        assert_eq!(eval("-7/2"), Value::Integer(-3));
        assert_eq!(eval("2*-3"), Value::Integer(-6));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(eval("10/0"), err(ErrorKind::Div0));
        assert_eq!(eval("1+10/(5-5)"), err(ErrorKind::Div0));
    }

    #[test]
    fn test_overflow_is_value_error() {
        assert_eq!(eval("9223372036854775807+1"), err(ErrorKind::Value));
        assert_eq!(eval("SUM(-9223372036854775807, -1)/-1"), err(ErrorKind::Value));
        assert_eq!(eval("SUM(9223372036854775807, 1)"), err(ErrorKind::Value));
    }

    #[test]
    fn test_type_errors() {
        assert_eq!(eval("1+\"a\""), err(ErrorKind::Value));
        assert_eq!(eval("-TRUE"), err(ErrorKind::Value));
        assert_eq!(eval("\"a\"&1"), err(ErrorKind::Value));
        assert_eq!(eval("SUM(1,\"2\")"), err(ErrorKind::Value));
    }

    #[test]
    fn test_concat() {
        assert_eq!(eval("\"foo\"&\"bar\""), Value::Text("foobar".into()));
        assert_eq!(eval("\"a\"&\"b\"&\"c\""), Value::Text("abc".into()));
    }

    #[test]
    fn test_comparisons_same_kind() {
        assert_eq!(eval("1<2"), Value::Boolean(true));
        assert_eq!(eval("2<=2"), Value::Boolean(true));
        assert_eq!(eval("3>4"), Value::Boolean(false));
        assert_eq!(eval("3>=4"), Value::Boolean(false));
        assert_eq!(eval("\"abc\"=\"abc\""), Value::Boolean(true));
        assert_eq!(eval("\"abc\"<\"abd\""), Value::Boolean(true));
        assert_eq!(eval("TRUE<>FALSE"), Value::Boolean(true));
        assert_eq!(eval("FALSE<TRUE"), Value::Boolean(true));
        assert_eq!(eval("1+1=2"), Value::Boolean(true));
    }

    #[test]
    fn test_comparisons_mixed_kinds() {
        assert_eq!(eval("1=\"1\""), Value::Boolean(false));
        assert_eq!(eval("1<>\"1\""), Value::Boolean(false));
        assert_eq!(eval("1<\"1\""), err(ErrorKind::Value));
        assert_eq!(eval("TRUE>=1"), err(ErrorKind::Value));
    }

    #[test]
    fn test_arity() {
        assert_eq!(eval("IF(TRUE, 1)"), err(ErrorKind::Arg));
        assert_eq!(
            evaluate_standalone(&Expr::call("*", vec![Expr::Integer(1)])),
            err(ErrorKind::Arg)
        );
        assert_eq!(
            evaluate_standalone(&Expr::call("-", vec![Expr::Integer(1); 3])),
            err(ErrorKind::Arg)
        );
        assert_eq!(eval("SUM()"), Value::Integer(0));
        assert_eq!(eval("SUM(1,SUM(2,3))"), Value::Integer(6));
    }

    #[test]
    fn test_arity_checked_before_evaluation() {
        assert_eq!(eval("IF(1/0, 1)"), err(ErrorKind::Arg));
    }

    #[test]
    fn test_if_short_circuits() {
        assert_eq!(eval("IF(TRUE,1,UNDEFINEDFUNC())"), Value::Integer(1));
        assert_eq!(eval("IF(1>2, 1/0, \"ok\")"), Value::Text("ok".into()));
        assert_eq!(eval("IF(1, 2, 3)"), err(ErrorKind::Value));
        assert_eq!(eval("IF(FALSE, 1, NOPE())"), err(ErrorKind::Name));
    }

    #[test]
    fn test_error_operands_propagate() {
        assert_eq!(eval("(1/0)&\"x\""), err(ErrorKind::Div0));
        assert_eq!(eval("NOPE()=1"), err(ErrorKind::Name));
        assert_eq!(eval("SUM(1, 2/0, NOPE())"), err(ErrorKind::Div0));
    }

    #[test]
    fn test_registry() {
        fn answer(_: &[Expr], _: &mut Evaluator<'_>) -> Result<Value, ErrorKind> {
            Ok(Value::Integer(42))
        }

        let mut registry = FunctionRegistry::with_builtins();
        assert!(registry.contains("if"));
        assert!(registry.contains("<>"));
        assert!(!registry.contains("ANSWER"));

        registry.register("answer", answer);
        assert!(registry.contains("Answer"));
        assert!(FunctionRegistry::empty().lookup("+").is_none());
    }
}
