use std::fmt;

macro_rules! define_tokens {
    (
        symbols { $($sym_name:ident => $sym_str:literal),* $(,)? }
        keywords { $($kw_name:ident => $kw_str:literal),* $(,)? }
    ) => {
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TokenType {
            // Special
            Illegal,
            Eof,

            // Identifiers & Literals
            Ident,
            Int,
            Float,
            Char,
            String,

            // Symbols (operators & delimiters)
            $($sym_name,)*

            // Keywords (auto-generated from macro)
            $($kw_name,)*

            // Keep this as the final variant so it always reflects the enum size.
            __Count,
        }

        impl TokenType {
            pub const COUNT: usize = TokenType::__Count as usize;

            pub const fn as_usize(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for TokenType {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    TokenType::Illegal => "ILLEGAL",
                    TokenType::Eof => "EOF",
                    TokenType::Ident => "IDENT",
                    TokenType::Int => "INT",
                    TokenType::Float => "FLOAT",
                    TokenType::Char => "CHAR",
                    TokenType::String => "STRING",
                    $(TokenType::$sym_name => $sym_str,)*
                    $(TokenType::$kw_name => $kw_str,)*
                    TokenType::__Count => "__COUNT",
                };
                write!(f, "{}", s)
            }
        }

        /// Called by the lexer to check if an identifier is a keyword
        pub fn lookup_ident(ident: &str) -> TokenType {
            match ident {
                $($kw_str => TokenType::$kw_name,)*
                _ => TokenType::Ident,
            }
        }
    };
}

// ════════════════════════════════════════════════════════════════════════════
//  TOKEN DEFINITIONS
// ════════════════════════════════════════════════════════════════════════════

define_tokens! {
    symbols {
        // Arithmetic and bitwise operators
        Plus      => "+",
        Minus     => "-",
        Asterisk  => "*",
        Slash     => "/",
        Percent   => "%",
        Ampersand => "&",
        Bar       => "|",
        Caret     => "^",
        Shl       => "<<",
        Shr       => ">>",
        AndNot    => "&^",

        // Compound assignment
        PlusAssign      => "+=",
        MinusAssign     => "-=",
        AsteriskAssign  => "*=",
        SlashAssign     => "/=",
        PercentAssign   => "%=",
        AmpersandAssign => "&=",
        BarAssign       => "|=",
        CaretAssign     => "^=",
        ShlAssign       => "<<=",
        ShrAssign       => ">>=",
        AndNotAssign    => "&^=",

        // Logical operators
        And => "&&",
        Or  => "||",
        Inc => "++",
        Dec => "--",

        // Comparison
        Eq    => "==",
        NotEq => "!=",
        Lt    => "<",
        Gt    => ">",
        Lte   => "<=",
        Gte   => ">=",

        Assign   => "=",
        Define   => ":=",
        Bang     => "!",
        Ellipsis => "...",
        Question => "?",

        // Delimiters
        LParen    => "(",
        RParen    => ")",
        LBrace    => "{",
        RBrace    => "}",
        LBracket  => "[",
        RBracket  => "]",
        Comma     => ",",
        Semicolon => ";",
        Colon     => ":",
        Dot       => ".",
    }

    keywords {
        Break     => "break",
        Continue  => "continue",
        Else      => "else",
        For       => "for",
        Func      => "func",
        If        => "if",
        Return    => "return",
        Export    => "export",
        True      => "true",
        False     => "false",
        In        => "in",
        Undefined => "undefined",
        Import    => "import",
        Error     => "error",
    }
}

impl TokenType {
    /// Maps a compound assignment token to the binary operator it applies.
    pub fn compound_operator(self) -> Option<TokenType> {
        match self {
            TokenType::PlusAssign => Some(TokenType::Plus),
            TokenType::MinusAssign => Some(TokenType::Minus),
            TokenType::AsteriskAssign => Some(TokenType::Asterisk),
            TokenType::SlashAssign => Some(TokenType::Slash),
            TokenType::PercentAssign => Some(TokenType::Percent),
            TokenType::AmpersandAssign => Some(TokenType::Ampersand),
            TokenType::BarAssign => Some(TokenType::Bar),
            TokenType::CaretAssign => Some(TokenType::Caret),
            TokenType::ShlAssign => Some(TokenType::Shl),
            TokenType::ShrAssign => Some(TokenType::Shr),
            TokenType::AndNotAssign => Some(TokenType::AndNot),
            _ => None,
        }
    }

    pub fn is_assignment(self) -> bool {
        self == TokenType::Assign || self.compound_operator().is_some()
    }

    /// Tokens after which a newline terminates the statement.
    pub fn ends_statement(self) -> bool {
        matches!(
            self,
            TokenType::Ident
                | TokenType::Int
                | TokenType::Float
                | TokenType::Char
                | TokenType::String
                | TokenType::Break
                | TokenType::Continue
                | TokenType::Return
                | TokenType::True
                | TokenType::False
                | TokenType::Undefined
                | TokenType::RParen
                | TokenType::RBracket
                | TokenType::RBrace
                | TokenType::Inc
                | TokenType::Dec
        )
    }
}
