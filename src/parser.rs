//! This module provides the parser for transition table sources, utilizing the `pest` crate.
//! It defines the line grammar in `grammar.pest` and the functions that turn source text
//! into an ordered list of `SourceRule`s, and from there into a compiled `Program`.

use crate::{
    table::{build, Program},
    types::{CompileError, Direction, SourceRule, MAX_PROGRAM_SIZE},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the transition grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TransitionParser;

/// Compiles source text into a `Program`: parses every line, then builds the transition
/// table and its graph.
///
/// Nothing is returned unless the whole source is valid.
pub fn compile(input: &str) -> Result<Program, CompileError> {
    let rules = parse(input)?;
    build(rules)
}

/// Parses source text into rules, in source order.
///
/// Blank lines and comment-only lines (`//`, `#`, `;`) are skipped. Any other line must be
/// a single rule, optionally followed by a comment.
///
/// # Returns
///
/// * `Ok(Vec<SourceRule>)` with one entry per rule line (possibly empty).
/// * `Err(CompileError::Syntax)` pointing at the first malformed line.
/// * `Err(CompileError::ProgramTooLarge)` if the input exceeds `MAX_PROGRAM_SIZE`.
pub fn parse(input: &str) -> Result<Vec<SourceRule>, CompileError> {
    if input.len() > MAX_PROGRAM_SIZE {
        return Err(CompileError::ProgramTooLarge(input.len()));
    }

    let mut rules = Vec::new();
    let program = TransitionParser::parse(Rule::program, input).map_err(Box::new)?;

    for pair in program.flatten() {
        if pair.as_rule() == Rule::transition {
            rules.push(parse_transition(pair)?);
        }
    }

    Ok(rules)
}

/// Parses a single `Pair<Rule::transition>` into a `SourceRule`.
fn parse_transition(pair: Pair<Rule>) -> Result<SourceRule, CompileError> {
    let span = pair.as_span();
    let line = span.start_pos().line_col().0 - 1;
    let mut pairs = pair.into_inner();

    let from = parse_string(&mut pairs, span)?;
    let read = parse_symbol(&mut pairs, span)?;
    let write = parse_symbol(&mut pairs, span)?;
    let direction = parse_direction(&mut pairs, span)?;
    let to = parse_string(&mut pairs, span)?;

    Ok(SourceRule {
        from,
        read,
        write,
        direction,
        to,
        line,
    })
}

/// Parses a direction token. `R`, `L` and `S` are the only accepted spellings.
fn parse_direction(pairs: &mut Pairs<Rule>, span: Span) -> Result<Direction, CompileError> {
    let token = next_pair(pairs, span)?;
    match token.as_str() {
        "L" => Ok(Direction::Left),
        "R" => Ok(Direction::Right),
        "S" => Ok(Direction::Stay),
        other => Err(parse_error(
            &format!("Unsupported direction: {other}"),
            token.as_span(),
        )),
    }
}

/// Parses a single character symbol.
fn parse_symbol(pairs: &mut Pairs<Rule>, span: Span) -> Result<char, CompileError> {
    let token = next_pair(pairs, span)?;
    token
        .as_str()
        .chars()
        .next()
        .ok_or_else(|| parse_error("Empty symbol", token.as_span()))
}

/// Extracts the string content of the next `Pair`.
fn parse_string(pairs: &mut Pairs<Rule>, span: Span) -> Result<String, CompileError> {
    Ok(next_pair(pairs, span)?.as_str().to_string())
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, span: Span) -> Result<Pair<'i, Rule>, CompileError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Incomplete transition", span))
}

/// Creates a `CompileError::Syntax` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> CompileError {
    CompileError::Syntax(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::BLANK_SYMBOL;

    #[test]
    fn test_parse_simple_rule() {
        let rules = parse("q0 a/b,R q1").unwrap();

        assert_eq!(
            rules,
            vec![SourceRule {
                from: "q0".into(),
                read: 'a',
                write: 'b',
                direction: Direction::Right,
                to: "q1".into(),
                line: 0,
            }]
        );
    }

    #[test]
    fn test_parse_skips_blank_and_comment_lines() {
        let input = r#"
// header comment
# another
; and another

q0  a/_,R  q1
   q1 _/_,L q2   // trailing comment
q2 a/a,S ha # hash comment
q2 b/b,S hr ; semicolon comment
"#;
        let rules = parse(input).unwrap();

        assert_eq!(rules.len(), 4);
        assert_eq!(rules[0].line, 5);
        assert_eq!(rules[0].write, BLANK_SYMBOL);
        assert_eq!(rules[1].from, "q1");
        assert_eq!(rules[1].direction, Direction::Left);
        assert_eq!(rules[2].to, "ha");
        assert_eq!(rules[3].to, "hr");
    }

    #[test]
    fn test_parse_flexible_whitespace() {
        let rules = parse("q0\t\ta / b , L \t q_1").unwrap();

        assert_eq!(rules[0].read, 'a');
        assert_eq!(rules[0].write, 'b');
        assert_eq!(rules[0].direction, Direction::Left);
        assert_eq!(rules[0].to, "q_1");
    }

    #[test]
    fn test_parse_punctuation_symbols() {
        let rules = parse("q0 #/;,S q1\nq1 ,/,,R q2").unwrap();

        assert_eq!(rules[0].read, '#');
        assert_eq!(rules[0].write, ';');
        assert_eq!(rules[1].read, ',');
        assert_eq!(rules[1].write, ',');
    }

    #[test]
    fn test_parse_comment_without_space() {
        let rules = parse("q0 a/a,R q1// no space").unwrap();
        assert_eq!(rules[0].to, "q1");
    }

    #[test]
    fn test_parse_crlf_line_endings() {
        let rules = parse("q0 a/a,R q1\r\nq1 a/a,R ha\r\n").unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[1].line, 1);
    }

    #[test]
    fn test_parse_empty_source() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("// only\n# comments\n\n").unwrap(), vec![]);
    }

    #[test]
    fn test_parse_lowercase_direction_is_rejected() {
        let error = parse("q0 a/b,r q1").unwrap_err();

        assert!(matches!(error, CompileError::Syntax(_)));
        assert_eq!(error.line(), Some(1));
    }

    #[test]
    fn test_parse_reports_offending_line() {
        let input = "q0 a/a,R q1\nq1 a/a,R q2\nq2 ab/a,R q3\n";
        let error = parse(input).unwrap_err();

        assert!(matches!(error, CompileError::Syntax(_)));
        assert_eq!(error.line(), Some(3));
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        let error = parse("q0 a/a,R q1 extra").unwrap_err();
        assert!(matches!(error, CompileError::Syntax(_)));
    }

    #[test]
    fn test_parse_rejects_missing_next_state() {
        assert!(parse("q0 a/a,R").is_err());
        assert!(parse("q0 a/a,Rq1").is_err());
        assert!(parse("q0 a a,R q1").is_err());
    }

    #[test]
    fn test_parse_rejects_slash_symbol() {
        assert!(parse("q0 //a,R q1").is_err());
    }

    #[test]
    fn test_parse_too_large() {
        let input = "q0 a/a,R q0\n".repeat(MAX_PROGRAM_SIZE / 4);
        let error = parse(&input).unwrap_err();
        assert!(matches!(error, CompileError::ProgramTooLarge(_)));
    }

    #[test]
    fn test_compile_empty_source() {
        let error = compile("// nothing here\n").unwrap_err();
        assert_eq!(error, CompileError::NoValidStates);
    }
}
