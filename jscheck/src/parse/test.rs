use indoc::indoc;
use insta::assert_snapshot;

use super::*;
use crate::diag::Diagnostic;
use crate::span::Source;
use crate::syn::ExprStmt;
use crate::tok::{Lexer, TokenList};
use crate::util::test::parse_str;

/// Parse a source string, rendering either its outline or its error.
fn parse_test(source: &str) -> String {
    match parse_str(source) {
        Ok(program) => program.to_string().trim_end().to_string(),
        Err(e) => e.to_string(),
    }
}

fn parse_err(source: &str) -> SyntaxError {
    match parse_str(source) {
        Ok(program) => panic!("{source:?} parsed without error:\n{program}"),
        Err(e) => e,
    }
}

/// Token source that counts how many times it is scanned.
struct Counting<S> {
    inner: S,
    scans: usize,
}

impl<S: TokenSource> TokenSource for Counting<S> {
    fn scan(&mut self) -> Token {
        self.scans += 1;
        self.inner.scan()
    }

    fn line(&self) -> usize {
        self.inner.line()
    }
}

fn counting(source: &str) -> Counting<Lexer> {
    Counting {
        inner: Lexer::new(source),
        scans: 0,
    }
}

fn token_count(source: &str) -> usize {
    let mut lexer = Lexer::new(source);
    std::iter::from_fn(|| Some(lexer.scan()))
        .take_while(|tok| !tok.is_eof())
        .count()
}

fn tok(kind: TokenKind, value: &str, line: usize) -> Token {
    Token::new(kind, value, Span::default(), line)
}

#[test]
fn empty_function() {
    assert_snapshot!(parse_test("function f(){}"), @"function f() {}");
}

#[test]
fn function_with_return() {
    assert_snapshot!(parse_test("function f(a,b){ return a; }"), @"function f(a, b) { return; }");
}

#[test]
fn var_and_while() {
    assert_snapshot!(parse_test("var x = 1; while (x) { x = 0; }"), @r"
    var x;
    while (..) { assign; }
    ");
}

#[test]
fn err_empty_parameter() {
    assert_snapshot!(parse_test("function f(,){}"), @"near line 1: expected identifier, found `,`");
}

#[test]
fn err_missing_close_brace() {
    let source = indoc! {"
        if (x) {
            y();"};
    assert_snapshot!(parse_test(source), @"near line 2: unclosed braces: expected `}`, found end of input");
}

#[test]
fn allocation_statement() {
    assert_snapshot!(parse_test("new Foo(1,2);"), @"new;");
}

#[test]
fn empty_program() {
    assert_eq!(parse_str("").unwrap().elements, vec![]);
    assert_eq!(parse_str("  // nothing\n/* here */\n").unwrap().elements, vec![]);
}

#[test]
fn statement_dispatch() {
    assert_snapshot!(parse_test("{}"), @"{}");
    assert_snapshot!(parse_test("{ ; { f(); } }"), @"{ ; { call; } }");
    assert_snapshot!(parse_test("var a, b = 2, c;"), @"var a, b, c;");
    assert_snapshot!(parse_test("if (a) b(); else c.d();"), @"if (..) call; else method-call;");
    assert_snapshot!(parse_test("if (a) if (b) c(); else d();"), @"if (..) if (..) call; else call;");
    assert_snapshot!(parse_test("while (i < 10) i++;"), @"while (..) update;");
    assert_snapshot!(parse_test("for (var i = 0, j; i < j; i++) ;"), @"for (..) ;");
    assert_snapshot!(parse_test("for (i = 0; ; ) { continue; }"), @"for (..) { continue; }");
    assert_snapshot!(parse_test("for (;;) break;"), @"for (..) break;");
    assert_snapshot!(
        parse_test("switch (x) { case 1: case 2: f(); break; default: }"),
        @"switch (..) { case ..: case ..: call; break; default: }"
    );
    assert_snapshot!(parse_test("switch (x) {}"), @"switch (..) {}");
    assert_snapshot!(parse_test(";;"), @r"
    ;
    ;
    ");
}

#[test]
fn expression_statement_forms() {
    let forms = [
        ("a.b();", ExprStmt::MethodCall),
        ("a.b.c(1)(2).d(3);", ExprStmt::MethodCall),
        ("a[0]();", ExprStmt::MethodCall),
        ("f();", ExprStmt::FunctionCall),
        ("f(1)(2);", ExprStmt::FunctionCall),
        ("(f)();", ExprStmt::FunctionCall),
        ("this.f();", ExprStmt::MethodCall),
        ("new Foo();", ExprStmt::Allocation),
        ("new Foo().bar();", ExprStmt::MethodCall),
        ("a = 1;", ExprStmt::Assignment),
        ("a.b = c = d;", ExprStmt::Assignment),
        ("a[i + 1] += 2;", ExprStmt::Assignment),
        ("f().x %= 3;", ExprStmt::Assignment),
        ("a++;", ExprStmt::Update),
        ("a.b--;", ExprStmt::Update),
        ("++a;", ExprStmt::Update),
        ("--a[0];", ExprStmt::Update),
    ];

    for (source, expected) in forms {
        let program = parse_str(source).unwrap_or_else(|e| panic!("{source}: {e}"));
        assert_eq!(
            program.elements,
            vec![SourceElement::Stmt(Stmt::Expr(expected))],
            "{source}"
        );
    }
}

#[test]
fn expressions() {
    let accepted = [
        "x = a || b && c == d < e + f * -g;",
        "x = a ? b : c ? d : e;",
        "x = !a === typeof b;",
        "x = -(-a) + +b;",
        "x = a !== b != c;",
        "x = a <= b >= c > d;",
        "x = a++ + ++b - c-- - --d;",
        "x = [1, 'two', [true, null], f(3)];",
        "x = [];",
        "x = 0x1F + 1.5e3 % .5;",
        "x = y = z += 1;",
        "x = a ? b = 1 : c;",
        "x = new Foo(new Bar(), 2).baz[0];",
        "f(a, b = 2, c ? d : e);",
    ];

    for source in accepted {
        if let Err(e) = parse_str(source) {
            panic!("{source}: {e}");
        }
    }
}

#[test]
fn outline() {
    let source = indoc! {r#"
        function fib(n) {
            var a = 0, b = 1;
            for (var i = 0; i < n; i++) {
                var t = a + b;
                a = b;
                b = t;
            }
            return a;
        }
        var out = [];
        for (;;) { break; }
        switch (fib(10)) {
            case 55: out.push("ok"); break;
            default: log("bad");
        }
        if (out.length === 1) console.log(out[0]); else ;
        done();
    "#};

    assert_snapshot!(parse_test(source), @r"
    function fib(n) { var a, b; for (..) { var t; assign; assign; } return; }
    var out;
    for (..) { break; }
    switch (..) { case ..: method-call; break; default: call; }
    if (..) method-call; else ;
    call;
    ");
}

#[test]
fn function_outline_details() {
    let program = parse_str("function add(x, y) { z = x + y; return z; }").unwrap();
    let [SourceElement::Function(fun)] = &program.elements[..] else {
        panic!("expected a single function, got {program}");
    };

    assert_eq!(fun.name.node, "add");
    assert_eq!(fun.name.span, Span::from(9..12));
    let params: Vec<_> = fun.params.iter().map(|p| p.node.as_str()).collect();
    assert_eq!(params, ["x", "y"]);
    assert_eq!(fun.body, vec![Stmt::Expr(ExprStmt::Assignment)]);
    assert!(fun.returns);

    let program = parse_str("function noop() { f(); }").unwrap();
    let [SourceElement::Function(fun)] = &program.elements[..] else {
        panic!("expected a single function, got {program}");
    };
    assert!(!fun.returns);
}

#[test]
fn err_messages() {
    assert_snapshot!(parse_test("x;"), @"near line 1: expression statement must be a call, allocation, assignment or update");
    assert_snapshot!(parse_test("a.b;"), @"near line 1: expression statement must be a call, allocation, assignment or update");
    assert_snapshot!(parse_test("1;"), @"near line 1: expression statement must be a call, allocation, assignment or update");
    assert_snapshot!(parse_test("f() = 1;"), @"near line 1: invalid assignment target");
    assert_snapshot!(parse_test("x = a + b = c;"), @"near line 1: invalid assignment target");
    assert_snapshot!(parse_test("f()++;"), @"near line 1: invalid increment/decrement target");
    assert_snapshot!(parse_test("++f();"), @"near line 1: invalid increment/decrement target");
    assert_snapshot!(parse_test("x = ++1;"), @"near line 1: invalid increment/decrement target");
    assert_snapshot!(parse_test("x = (a)++;"), @"near line 1: invalid increment/decrement target");
    assert_snapshot!(parse_test("return 1;"), @"near line 1: `return` is only allowed at the end of a function body");
    assert_snapshot!(parse_test("function f() { return; g(); }"), @"near line 1: unclosed braces: expected `}`, found identifier `g`");
    assert_snapshot!(parse_test("function f() { if (x) return; }"), @"near line 1: `return` is only allowed at the end of a function body");
    assert_snapshot!(parse_test("break;"), @"near line 1: `break` outside of a loop or switch");
    assert_snapshot!(parse_test("continue;"), @"near line 1: `continue` outside of a loop");
    assert_snapshot!(parse_test("switch (x) { case 1: continue; }"), @"near line 1: `continue` outside of a loop");
    assert_snapshot!(parse_test("switch (x) { default: default: }"), @"near line 1: more than one `default` clause in switch");
    assert_snapshot!(parse_test("switch (x) { f(); }"), @"near line 1: expected `case`, `default`, or `}`, found identifier `f`");
    assert_snapshot!(parse_test("var 1;"), @"near line 1: expected identifier, found number `1`");
    assert_snapshot!(parse_test("var x"), @"near line 1: expected `;`, found end of input");
    assert_snapshot!(parse_test("f(a b);"), @"near line 1: unclosed parentheses: expected `)`, found identifier `b`");
    assert_snapshot!(parse_test("x = [1, 2;"), @"near line 1: unclosed brackets: expected `]`, found `;`");
    assert_snapshot!(parse_test("x = a ? b;"), @"near line 1: expected `:`, found `;`");
    assert_snapshot!(parse_test("new Foo;"), @"near line 1: expected `(`, found `;`");
    assert_snapshot!(parse_test("new 1();"), @"near line 1: expected identifier, found number `1`");
    assert_snapshot!(parse_test("a.new();"), @"near line 1: expected identifier, found `new`");
    assert_snapshot!(parse_test("f(1,);"), @"near line 1: expected expression, found `)`");
    assert_snapshot!(parse_test("}"), @"near line 1: expected statement, found `}`");
    assert_snapshot!(parse_test("else f();"), @"near line 1: expected statement, found `else`");
    assert_snapshot!(parse_test("-x;"), @"near line 1: expected statement, found `-`");
    assert_snapshot!(parse_test("function () {}"), @"near line 1: expected identifier, found `(`");
    assert_snapshot!(parse_test("function f() { function g() {} }"), @"near line 1: expected statement, found `function`");
    assert_snapshot!(parse_test("if x f();"), @"near line 1: expected `(`, found identifier `x`");
    assert_snapshot!(parse_test("f(\"(\";"), @r#"near line 1: unclosed parentheses: expected `)`, found `;`"#);
}

#[test]
fn err_lexical() {
    assert_snapshot!(parse_test("x = @;"), @"near line 1: unrecognized token: `@`");
    assert_snapshot!(parse_test("x = 3in;"), @"near line 1: invalid number literal: `3in`");
    assert_snapshot!(parse_test("x = .5.5;"), @"near line 1: invalid number literal: `.5.5`");
    assert_snapshot!(parse_test("x = 'abc\n';"), @"near line 1: unterminated string literal: `'abc`");
    assert_snapshot!(parse_test("f(); /* never closed"), @"near line 1: unterminated block comment: `/* never closed`");
    assert_snapshot!(parse_test("f() # g();"), @"near line 1: unrecognized token: `#`");
}

#[test]
fn err_lines() {
    let source = indoc! {"
        var a = 1;
        var b = 2;
        a + b;
    "};
    assert_eq!(parse_err(source).line, 3);

    let source = indoc! {"
        var x =

        ;
    "};
    assert_snapshot!(parse_test(source), @"near line 3: expected expression, found `;`");

    let source = indoc! {"
        function f(a,
                   b,
                   ) {}
    "};
    assert_snapshot!(parse_test(source), @"near line 3: expected identifier, found `)`");

    let source = indoc! {"
        while (x) {
            /* a comment
               spanning lines */
            break
        }
    "};
    assert_snapshot!(parse_test(source), @"near line 5: expected `;`, found `}`");

    let source = indoc! {"
        x = 1;
        ++f();
    "};
    let e = parse_err(source);
    assert_eq!(e.line, 2);
    assert_eq!(e.span, Span::from(7..9));
}

#[test]
fn err_spans() {
    let e = parse_err("function f(,){}");
    assert_eq!(e.span, Span::from(11..12));

    let e = parse_err("if (x) { y();");
    assert_eq!(e.span, Span::from(13..13));
    let SyntaxErrorKind::Unclosed { pair, open, found } = e.kind else {
        panic!("expected an unclosed pair, got {e}");
    };
    assert_eq!(pair, Pair::Braces);
    assert_eq!(open, Span::from(7..8));
    assert_eq!(found, Found::EndOfInput);

    let e = parse_err("switch (x) { default: break; default: }");
    assert_eq!(e.span, Span::from(29..36));
    assert_eq!(
        e.kind,
        SyntaxErrorKind::DuplicateDefault {
            first: Span::from(13..20)
        }
    );
}

#[test]
fn idempotent() {
    let sources = [
        "function f(a,b){ return a; }",
        "var x = 1; while (x) { x = 0; }",
        "if (x) {\n  y();",
        "function f(,){}",
        "x = 'abc",
    ];

    for source in sources {
        assert_eq!(parse_str(source), parse_str(source), "{source}");
    }
}

#[test]
fn scans_each_token_once() {
    let sources = [
        "",
        "function f(){}",
        "function f(a,b){ return a; }",
        "var x = 1; while (x) { x = 0; }",
        "new Foo(1,2);",
        "for (var i = 0; i < n; i++) { switch (i) { case 1: continue; default: break; } }",
        "x = a ? [b, c] : typeof d.e[f](g) !== 'h';",
    ];

    for source in sources {
        let mut parser = Parser::new(counting(source));
        parser
            .program()
            .unwrap_or_else(|e| panic!("{source:?}: {e}"));
        assert!(parser.lookahead().is_eof());
        assert_eq!(parser.into_source().scans, token_count(source) + 1, "{source:?}");
    }
}

#[test]
fn primed_with_one_scan() {
    let parser = Parser::new(counting("var x;"));
    assert_eq!(parser.lookahead().value, "var");
    assert_eq!(parser.into_source().scans, 1);
}

#[test]
fn rules_leave_next_token_in_lookahead() {
    let mut parser = Parser::new(Lexer::new("x = 1; y"));
    assert_eq!(parser.statement(), Ok(Stmt::Expr(ExprStmt::Assignment)));
    assert!(parser.lookahead().kind == TokenKind::Ident && parser.lookahead().value == "y");

    let mut parser = Parser::new(Lexer::new("function f() {} while"));
    parser.function_declaration().unwrap();
    assert!(parser.lookahead().is("while"));

    let mut parser = Parser::new(Lexer::new("a + b * (c - d) ) rest"));
    parser.expression().unwrap();
    assert!(parser.lookahead().is(")"));

    let mut parser = Parser::new(Lexer::new("a.b[c](d) = e"));
    assert_eq!(parser.call_member(), Ok(expr::Shape::MethodCall));
    assert!(parser.lookahead().is("="));

    let mut parser = Parser::new(Lexer::new("{ if (a) {} else {} } }"));
    parser.statement().unwrap();
    assert!(parser.lookahead().is("}"));
}

#[test]
fn jumps_do_not_cross_functions() {
    let mut parser = Parser::new(Lexer::new("function g() { while (x) continue; continue; }"));
    parser.loop_depth = 1;
    let e = parser.function_declaration().unwrap_err();
    assert_eq!(e.kind, SyntaxErrorKind::ContinueOutsideLoop);
    assert_eq!(parser.loop_depth, 1);
}

#[test]
fn degenerate_inputs_terminate() {
    let sources = [
        "{", "}", "(", ")", "[", "((((((", "{{{{{{", "function", "function f", "function f(",
        "function f()", "var", "var x =", "if", "if (", "while (x)", "for", "for (;", "switch",
        "switch (x) {", "switch (x) { case", "new", "a.", "a[", "x = ", "x = !", "x = a ?",
        "@@@", "'", "/*", ";;;;}", "}}}}",
    ];

    for source in sources {
        let e = parse_err(source);
        assert!(e.line >= 1, "{source:?}: {e}");
    }
}

#[test]
fn moderate_nesting() {
    const DEPTH: usize = 48;
    let parens = format!("x = {}1{};", "(".repeat(DEPTH), ")".repeat(DEPTH));
    let arrays = format!("x = {}{};", "[".repeat(DEPTH), "]".repeat(DEPTH));
    let blocks = format!("{}f();{}", "{".repeat(DEPTH), "}".repeat(DEPTH));

    for source in [parens, arrays, blocks] {
        if let Err(e) = parse_str(&source) {
            panic!("{source}: {e}");
        }
    }

    let unclosed = format!("x = {}1;", "(".repeat(DEPTH));
    assert_snapshot!(parse_test(&unclosed), @"near line 1: unclosed parentheses: expected `)`, found `;`");
}

#[test]
fn token_list_source() {
    let tokens = vec![
        tok(TokenKind::Keyword, "var", 1),
        tok(TokenKind::Ident, "x", 1),
        tok(TokenKind::Punct, ";", 1),
        tok(TokenKind::Ident, "f", 2),
        tok(TokenKind::Punct, "(", 2),
        tok(TokenKind::Str, "(", 2),
        tok(TokenKind::Punct, ")", 2),
        tok(TokenKind::Punct, ";", 2),
    ];
    let program = parse_program(TokenList::new(tokens)).unwrap();
    assert_snapshot!(program.to_string().trim_end(), @r"
    var x;
    call;
    ");

    let tokens = vec![
        tok(TokenKind::Keyword, "while", 1),
        tok(TokenKind::Punct, "(", 1),
        tok(TokenKind::Ident, "x", 1),
        tok(TokenKind::Punct, ")", 1),
        tok(TokenKind::Punct, "{", 2),
        tok(TokenKind::Keyword, "break", 3),
    ];
    let e = parse_program(TokenList::new(tokens)).unwrap_err();
    assert_snapshot!(e, @"near line 3: expected `;`, found end of input");

    let tokens = vec![tok(TokenKind::Eof, "", 1), tok(TokenKind::Ident, "x", 1)];
    assert_eq!(parse_program(TokenList::new(tokens)), Ok(Program::default()));
}

#[test]
fn independent_parsers() {
    let mut first = Parser::new(Lexer::new("f(); g();"));
    let mut second = Parser::new(Lexer::new("x = 1;"));
    assert_eq!(first.statement(), Ok(Stmt::Expr(ExprStmt::FunctionCall)));
    assert_eq!(second.statement(), Ok(Stmt::Expr(ExprStmt::Assignment)));
    assert_eq!(first.statement(), Ok(Stmt::Expr(ExprStmt::FunctionCall)));
    assert!(first.lookahead().is_eof() && second.lookahead().is_eof());
}

#[test]
fn diagnostic_rendering() {
    let text = "if (x) {\n    y();";
    let source = Source::new("test.js", text);
    let diag = parse_err(text).into_diag();

    assert_eq!(
        diag.message(),
        "syntax error: unclosed braces: expected `}`, found end of input"
    );
    assert_eq!(diag.primary().span, Span::empty(text.len()));
    assert_eq!(diag.primary().label, "braces should have been closed here");
    assert_eq!(diag.secondary().len(), 1);
    assert_eq!(diag.secondary()[0].span, Span::from(7..8));

    let rendered = diag.render(&source);
    assert!(rendered.contains("syntax error: unclosed braces"), "{rendered}");
    assert!(rendered.contains("braces opened here"), "{rendered}");
    assert!(rendered.contains("test.js"), "{rendered}");

    let diag = parse_err("x;").into_diag();
    assert_eq!(diag.notes().len(), 1);
}
