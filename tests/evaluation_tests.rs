// Evaluation Tests for the lamb language
//
// End-to-end programs through `execute`, plus direct checks of the
// environment, substitution and evaluator building blocks.

use lamb::ast::{Builtin, Record};
use lamb::substitute::substitute;
use lamb::{
    execute, parse, run_with, tokenize, Environment, ErrorKind, Evaluator, Expr, LambError,
    RuntimeErrorKind, TokenType, Value,
};

fn eval(source: &str) -> Value {
    execute(source).unwrap_or_else(|e| panic!("`{}` failed: {}", source, e))
}

fn eval_int(source: &str) -> i64 {
    let value = eval(source);
    value
        .as_integer()
        .unwrap_or_else(|| panic!("`{}` reduced to non-integer {}", source, value))
}

fn eval_err(source: &str) -> LambError {
    match execute(source) {
        Ok(value) => panic!("`{}` should have failed, got {}", source, value),
        Err(error) => error,
    }
}

/// Parses a single expression statement.
fn parse_expr(source: &str) -> Expr {
    let tokens = tokenize(source).expect("lex");
    let mut program = parse(tokens).expect("parse");
    program.statements.remove(0).expr
}

// ============================================================================
// Arithmetic
// ============================================================================

#[test]
fn arithmetic_builtins() {
    assert_eq!(eval_int("add 1 2"), 3);
    assert_eq!(eval_int("minus 10 3"), 7);
    assert_eq!(eval_int("mult 6 7"), 42);
    assert_eq!(eval_int("div 8 2"), 4);
}

#[test]
fn nested_arithmetic_follows_nesting() {
    assert_eq!(eval_int("mult (add 1 2) 4"), 12);
    assert_eq!(eval_int("add (mult 2 3) (div 8 (minus 5 1))"), 8);
}

#[test]
fn division_truncates_toward_zero() {
    assert_eq!(eval_int("div 7 2"), 3);
    assert_eq!(eval_int("div (minus 0 7) 2"), -3);
}

#[test]
fn partially_applied_builtin_is_a_value() {
    let value = eval("add 1;");
    assert!(value.as_integer().is_none());
    assert_eq!(value.to_string(), "(add 1)");
    assert_eq!(eval_int("inc = add 1; inc 41;"), 42);
}

// ============================================================================
// Conditionals
// ============================================================================

#[test]
fn cond_on_integers() {
    assert_eq!(eval_int("cond 0 1 2"), 2);
    assert_eq!(eval_int("cond 5 1 2"), 1);
    assert_eq!(eval_int("cond (minus 3 3) 10 20"), 20);
}

#[test]
fn cond_on_records_tests_for_entries() {
    assert_eq!(eval_int("cond ([]) 10 20"), 20);
    assert_eq!(eval_int("cond ([a = 1]) 10 20"), 10);
}

#[test]
fn cond_on_record_trees() {
    let cond = |test: Expr| {
        Expr::apply(
            Expr::apply(Expr::apply(Expr::name("cond"), test), Expr::Integer(10)),
            Expr::Integer(20),
        )
    };
    let mut filled = Record::new();
    filled.insert("x".to_string(), Expr::Integer(1));

    let mut env = Environment::global();
    let mut evaluator = Evaluator::new();
    let empty = evaluator.reduce(cond(Expr::Env(Record::new())), &mut env).unwrap();
    let full = evaluator.reduce(cond(Expr::Env(filled)), &mut env).unwrap();

    assert_eq!(empty.to_string(), "20");
    assert_eq!(full.to_string(), "10");
}

#[test]
fn record_followed_by_expression_is_scope_application() {
    // `[] 10 20` parses as "evaluate `10 20` in scope []"
    let error = eval_err("cond [] 10 20");
    assert_eq!(
        error.runtime_kind(),
        Some(RuntimeErrorKind::InvalidApplication)
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn beta_reduction() {
    assert_eq!(eval_int("(λ(x): add x 1) 4"), 5);
}

#[test]
fn curried_parameters_bind_in_order() {
    assert_eq!(eval_int("(λ(x, y): add x y) 2 3"), 5);
    assert_eq!(eval_int("(λ(x, y): minus x y) 10 4"), 6);
}

#[test]
fn inner_parameter_shadows_outer() {
    assert_eq!(eval_int("(λ(x): λ(x): x) 1 2"), 2);
    assert_eq!(eval_int("(λ(x): λ(y): x) 1 2"), 1);
}

#[test]
fn function_is_a_value() {
    assert_eq!(eval("λ(x): x;").to_string(), "λ(x): x");
}

#[test]
fn recursive_definition_terminates() {
    let source = "
        # factorial by unbounded self reference
        fact = λ(n): cond n (mult n (fact (minus n 1))) 1;
        fact 5;
    ";
    assert_eq!(eval_int(source), 120);
}

#[test]
fn higher_order_functions() {
    let source = "
        twice = λ(f, x): f (f x);
        twice (add 3) 10;
    ";
    assert_eq!(eval_int(source), 16);
}

// ============================================================================
// Assignments and records
// ============================================================================

#[test]
fn assignment_then_reference() {
    assert_eq!(eval_int("x = 5; add x x;"), 10);
}

#[test]
fn last_expression_statement_is_the_result() {
    assert_eq!(eval_int("add 1 1; add 2 2;"), 4);
}

#[test]
fn program_without_expressions_yields_zero() {
    assert_eq!(eval_int("x = 1;"), 0);
    assert_eq!(eval_int(""), 0);
}

#[test]
fn substituted_values_are_not_shared() {
    // f and g each get their own copy of the partially applied `add 1`
    assert_eq!(eval_int("f = add 1; g = f; add (f 2) (g 3);"), 7);
}

#[test]
fn record_scopes_expression() {
    assert_eq!(eval_int("[x = 3] add x 1"), 4);
    assert_eq!(eval_int("[x = 3, y = 4] mult x y"), 12);
}

#[test]
fn record_shadows_outer_binding() {
    assert_eq!(eval_int("x = 1; [x = 2] x;"), 2);
}

#[test]
fn record_may_shadow_builtins() {
    assert_eq!(eval_int("[add = λ(a, b): mult a b] add 3 4"), 12);
}

#[test]
fn record_applied_to_integer() {
    assert_eq!(eval_int("[x = 1] 5"), 5);
}

#[test]
fn record_fields_resolve_inside_returned_functions() {
    assert_eq!(eval_int("([y = 2] λ(x): add x y) 3"), 5);
}

#[test]
fn record_fields_resolve_inside_pending_cond_branches() {
    assert_eq!(eval_int("m = [k = 7] λ(n): cond n k 0; m 1;"), 7);
    assert_eq!(eval_int("([y = 1] λ(x): cond x y 0) 5;"), 1);
    assert_eq!(eval_int("([y = 1] λ(x): cond x 0 y) 0;"), 1);
}

#[test]
fn record_scope_is_left_once_nothing_changes() {
    let function = eval("[k = 7] λ(n): cond n k 0;");
    assert_eq!(function.to_string(), "λ(n): (cond n, 7, 0)");
}

#[test]
fn record_fields_live_in_a_child_frame() {
    // builtins sit in the root frame only, so a field named like one shadows it
    assert_eq!(eval_int("[add = 1] 5;"), 5);
    assert_eq!(eval_int("[add = 1] add;"), 1);
}

#[test]
fn record_is_a_value() {
    let value = eval("[a = 1, b = 2];");
    assert_eq!(value.to_string(), "[a=1, b=2]");
    assert_eq!(value.type_name(), "record");

    match value {
        Value::Term(Expr::Env(record)) => {
            assert_eq!(record.len(), 2);
            assert_eq!(record.get("b").map(|b| b.to_string()), Some("2".to_string()));
        }
        other => panic!("expected a record, got {}", other),
    }
}

#[test]
fn duplicate_record_fields_overwrite() {
    assert_eq!(eval("[a = 1, a = 2];").to_string(), "[a=2]");
    assert_eq!(eval_int("[a = 1, a = 2] a"), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn undefined_name() {
    let error = eval_err("add y 1;");
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::UndefinedName));
    assert!(error.message.contains("'y'"));
    assert_eq!(error.line(), Some(1));
}

#[test]
fn undefined_name_reports_its_line() {
    let error = eval_err("x = 1;\nadd x z;");
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::UndefinedName));
    assert_eq!(error.line(), Some(2));
    assert_eq!(error.to_string(), "Undefined name 'z' at line 2");
}

#[test]
fn division_by_zero() {
    let error = eval_err("div 1 0;");
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::DivisionByZero));
}

#[test]
fn redefinition_in_same_frame() {
    let error = eval_err("x = 1; x = 2;");
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::Redefinition));
    assert!(error.message.contains("'x'"));
}

#[test]
fn applying_an_integer() {
    let error = eval_err("1 2;");
    assert_eq!(
        error.runtime_kind(),
        Some(RuntimeErrorKind::InvalidApplication)
    );
}

#[test]
fn applying_a_saturated_builtin() {
    let error = eval_err("(add 1 2) 3;");
    assert_eq!(
        error.runtime_kind(),
        Some(RuntimeErrorKind::InvalidApplication)
    );
}

#[test]
fn integer_overflow() {
    let error = eval_err("mult 9223372036854775807 2;");
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::IntegerOverflow));
}

#[test]
fn lexical_and_parse_errors_carry_lines() {
    let lex = eval_err("add 1 @");
    assert_eq!(lex.kind, ErrorKind::LexError);
    assert_eq!(lex.line(), Some(1));

    let parse = eval_err("x = 1;\ny = (add 1 2;");
    assert_eq!(parse.kind, ErrorKind::ParseError);
    assert_eq!(parse.line(), Some(2));
}

#[test]
fn pass_limit_stops_runaway_programs() {
    let program = parse(tokenize("loop = λ(x): loop x; loop 1;").unwrap()).unwrap();
    let mut evaluator = Evaluator::with_pass_limit(50);
    let error = run_with(program, &mut evaluator).unwrap_err();
    assert_eq!(
        error.runtime_kind(),
        Some(RuntimeErrorKind::PassLimitExceeded)
    );
}

// ============================================================================
// Building blocks
// ============================================================================

#[test]
fn normal_forms_take_zero_passes() {
    let mut env = Environment::global();
    let mut evaluator = Evaluator::new();

    for source in ["5", "λ(x): x", "[a = 1]"] {
        let expr = parse_expr(source);
        let rendered = expr.to_string();
        let result = evaluator.reduce(expr, &mut env).unwrap();
        assert_eq!(evaluator.passes(), 0, "{}", source);
        assert_eq!(result.to_string(), rendered);
    }
}

#[test]
fn reduction_counts_passes() {
    let mut env = Environment::global();
    let mut evaluator = Evaluator::new();
    let result = evaluator.reduce(parse_expr("add 1 2"), &mut env).unwrap();

    // resolve `add`, accept 1, accept 2, compute
    assert_eq!(result.to_string(), "3");
    assert_eq!(evaluator.passes(), 4);
}

#[test]
fn assign_node_rebinds_in_current_frame() {
    let mut env = Environment::global();
    let mut evaluator = Evaluator::new();
    let assign = Expr::Assign {
        target: "x".to_string(),
        value: Box::new(parse_expr("add 1 2")),
    };

    let result = evaluator.reduce(assign, &mut env).unwrap();
    assert_eq!(result.to_string(), "x = 3");
    assert_eq!(env.find("x").map(|x| x.to_string()), Some("3".to_string()));
}

#[test]
fn environment_frames() {
    let mut root = Environment::global();
    assert!(root.find("cond").is_some());
    assert!(root.find("missing").is_none());

    root.define("x", Expr::Integer(1)).unwrap();
    let error = root.define("x", Expr::Integer(2)).unwrap_err();
    assert_eq!(error.runtime_kind(), Some(RuntimeErrorKind::Redefinition));

    let mut child = Environment::with_enclosing(&root);
    child.define("x", Expr::Integer(3)).unwrap();
    assert_eq!(child.find("x").map(|x| x.to_string()), Some("3".to_string()));
    assert_eq!(child.find("add").map(|x| x.to_string()), Some("add".to_string()));
    assert_eq!(child.depth(), 2);
    drop(child);

    assert_eq!(root.find("x").map(|x| x.to_string()), Some("1".to_string()));
}

#[test]
fn substitution_skips_shadowing_functions() {
    let expr = parse_expr("add x (λ(y): x)");
    let replaced = substitute(expr, "x", &Expr::Integer(7));
    assert_eq!(replaced.to_string(), "((add 7) λ(y): 7)");

    let shadowed = parse_expr("λ(x): add x 1");
    let untouched = substitute(shadowed, "x", &Expr::Integer(7));
    assert_eq!(untouched.to_string(), "λ(x): ((add x) 1)");
}

#[test]
fn builtin_slots_are_bounded() {
    let add = Builtin::from_name("add").unwrap();
    let add = add.accept(Expr::Integer(1)).unwrap();
    let add = add.accept(Expr::Integer(2)).unwrap();
    assert!(add.is_saturated());

    let (add, rejected) = add.accept(Expr::Integer(3)).unwrap_err();
    assert_eq!(add.to_string(), "(add 1, 2)");
    assert_eq!(rejected.to_string(), "3");

    let cond = Builtin::from_name("cond").unwrap();
    assert_eq!(cond.capacity(), 3);
    assert!(Builtin::from_name("pow").is_none());
}

#[test]
fn lexer_tracks_lines_and_splits_digit_runs() {
    let tokens = tokenize("x = λ(a): a; # comment\n[y = 12ab]").unwrap();
    let types: Vec<TokenType> = tokens.iter().map(|t| t.token_type).collect();
    assert_eq!(
        types,
        vec![
            TokenType::Name,
            TokenType::Assign,
            TokenType::Lambda,
            TokenType::LeftParen,
            TokenType::Name,
            TokenType::RightParen,
            TokenType::Colon,
            TokenType::Name,
            TokenType::Semicolon,
            TokenType::LeftBracket,
            TokenType::Name,
            TokenType::Assign,
            TokenType::Integer,
            TokenType::Name,
            TokenType::RightBracket,
            TokenType::Eof,
        ]
    );
    assert_eq!(tokens[9].line(), 2);
    assert_eq!(tokens[12].lexeme, "12");
    assert_eq!(tokens[13].lexeme, "ab");
}
