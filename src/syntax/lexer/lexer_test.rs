use crate::syntax::token_type::TokenType;

use super::Lexer;

fn token_types(input: &str) -> Vec<TokenType> {
    Lexer::new(input)
        .tokenize()
        .into_iter()
        .map(|t| t.token_type)
        .collect()
}

#[test]
fn inserts_semicolon_after_identifier_at_newline() {
    let types = token_types("a := 1\nb := a\n");
    assert_eq!(
        types,
        vec![
            TokenType::Ident,
            TokenType::Define,
            TokenType::Int,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::Define,
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn no_semicolon_after_operator_at_newline() {
    let types = token_types("a +\nb");
    assert_eq!(
        types,
        vec![
            TokenType::Ident,
            TokenType::Plus,
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn longest_operator_wins() {
    let types = token_types("a &^= b <<= c ... d");
    assert_eq!(types[1], TokenType::AndNotAssign);
    assert_eq!(types[3], TokenType::ShlAssign);
    assert_eq!(types[5], TokenType::Ellipsis);
}

#[test]
fn string_escapes_are_decoded() {
    let tokens = Lexer::new(r#""a\tbé""#).tokenize();
    assert_eq!(tokens[0].token_type, TokenType::String);
    assert_eq!(tokens[0].literal, "a\tb\u{e9}");
}

#[test]
fn unterminated_string_is_illegal() {
    let tokens = Lexer::new("\"abc\nx").tokenize();
    assert_eq!(tokens[0].token_type, TokenType::Illegal);
    assert_eq!(tokens[0].literal, "unterminated string");
}

#[test]
fn tracks_one_based_positions_with_tabs() {
    let tokens = Lexer::new("\n\t\tif x < 0 {").tokenize();
    let if_token = &tokens[0];
    assert_eq!(if_token.token_type, TokenType::If);
    assert_eq!((if_token.position.line, if_token.position.column), (2, 3));
    assert_eq!(tokens[1].position.column, 6);
}

#[test]
fn block_comment_spanning_lines_ends_statement() {
    let types = token_types("x /* one\ntwo */ y");
    assert_eq!(
        types,
        vec![
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::Ident,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn numbers_and_chars() {
    let tokens = Lexer::new("0x1f 1.5 2e3 'z'").tokenize();
    assert_eq!(tokens[0].token_type, TokenType::Int);
    assert_eq!(tokens[0].literal, "0x1f");
    assert_eq!(tokens[1].token_type, TokenType::Float);
    assert_eq!(tokens[2].token_type, TokenType::Float);
    assert_eq!(tokens[3].token_type, TokenType::Char);
    assert_eq!(tokens[3].literal, "z");
}
