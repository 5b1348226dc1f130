//! Parsers for the compact name forms accepted in definition trees:
//! - Qualified names: `people`, `hive.social.people`, `` hive.`my.table` ``
//! - Label combinations: `Person`, `Person:Employee`, `(Person:Employee)`
//! - Column references: `people.id`, `knows.address.zip`
//! - Join predicates: `people.id = knows.start_id`
//!
//! Backticks quote an identifier that would otherwise be split (dots, colons,
//! spaces). Quoted identifiers cannot contain backticks themselves.

use nom::{
    branch::alt,
    bytes::complete::{take_until, take_while1},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, opt},
    multi::separated_list1,
    sequence::delimited,
    IResult, Parser,
};

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '-'
}

fn parse_bare_identifier(input: &str) -> IResult<&str, String> {
    map(take_while1(is_identifier_char), |s: &str| s.to_string()).parse(input)
}

fn parse_quoted_identifier(input: &str) -> IResult<&str, String> {
    map(
        delimited(char('`'), take_until("`"), char('`')),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

fn parse_identifier(input: &str) -> IResult<&str, String> {
    alt((parse_quoted_identifier, parse_bare_identifier)).parse(input)
}

fn parse_dotted(input: &str) -> IResult<&str, Vec<String>> {
    separated_list1(char('.'), parse_identifier).parse(input)
}

fn parse_labels(input: &str) -> IResult<&str, Vec<String>> {
    let labels = || {
        separated_list1(
            delimited(multispace0, alt((char(':'), char('&'))), multispace0),
            parse_identifier,
        )
    };
    alt((
        delimited(
            (char('('), multispace0, opt(char(':')), multispace0),
            labels(),
            (multispace0, char(')')),
        ),
        map((opt(char(':')), labels()), |(_, labels)| labels),
    ))
    .parse(input)
}

fn parse_join(input: &str) -> IResult<&str, (Vec<String>, Vec<String>)> {
    let (input, left) = parse_dotted(input)?;
    let (input, _) = delimited(multispace0, char('='), multispace0).parse(input)?;
    let (input, right) = parse_dotted(input)?;
    Ok((input, (left, right)))
}

fn run<'a, T>(
    what: &str,
    input: &'a str,
    parser: impl Parser<&'a str, Output = T, Error = nom::error::Error<&'a str>>,
) -> Result<T, String> {
    let trimmed = input.trim();
    all_consuming(parser)
        .parse(trimmed)
        .map(|(_, value)| value)
        .map_err(|e| format!("Invalid {} '{}': {:?}", what, input, e))
}

/// Parse a dotted name into its parts, honouring backtick quoting.
pub fn parse_qualified_name(input: &str) -> Result<Vec<String>, String> {
    run("qualified name", input, parse_dotted)
}

/// Parse a label combination such as `Person:Employee` into its label names.
pub fn parse_label_combination(input: &str) -> Result<Vec<String>, String> {
    run("label combination", input, parse_labels)
}

/// Parse `alias.column[.nested]` into the alias and the column path.
pub fn parse_column_reference(input: &str) -> Result<(String, Vec<String>), String> {
    let mut parts = run("column reference", input, parse_dotted)?;
    if parts.len() < 2 {
        return Err(format!(
            "Invalid column reference '{}': expected `alias.column`",
            input
        ));
    }
    let alias = parts.remove(0);
    Ok((alias, parts))
}

/// Parse `a.x = b.y` into its two column references.
pub fn parse_join_predicate(
    input: &str,
) -> Result<((String, Vec<String>), (String, Vec<String>)), String> {
    let (left, right) = run("join predicate", input, parse_join)?;
    let split = |mut parts: Vec<String>| {
        if parts.len() < 2 {
            return Err(format!(
                "Invalid join predicate '{}': both sides must be `alias.column`",
                input
            ));
        }
        let alias = parts.remove(0);
        Ok((alias, parts))
    };
    Ok((split(left)?, split(right)?))
}

/// Render a single identifier, quoting it when it would not parse back bare.
pub fn render_identifier(name: &str) -> String {
    if !name.is_empty() && name.chars().all(is_identifier_char) {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}
